//! Collaborators the reconciler delegates to.
//!
//! Each trait is a narrow seam: the reconciler decides *when* file
//! references, support files and kind-specific target setup happen, the
//! implementations decide *how*. The defaults here work against the real
//! filesystem; tests swap in recording doubles.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::sandbox::SandboxState;
use crate::core::spec::{PodSpec, TargetSet, TargetSpec};
use crate::installer::ReconcileError;
use crate::project::{BuildTarget, ProjectGraph, TargetId, TargetKind};
use crate::util::fs::{glob_files, relative_path, write_if_changed};

/// Extensions of files compiled by a pod target.
const COMPILED_EXTENSIONS: &[&str] = &["c", "cc", "cpp", "cxx", "m", "mm", "swift"];

/// Installs the file references of one package into its group.
pub trait FileReferenceInstaller {
    /// `pods` are every pod spec of `package`. The package group already
    /// exists in `graph` when this is called.
    fn install_file_references(
        &mut self,
        sandbox: &SandboxState,
        graph: &mut ProjectGraph,
        package: &str,
        pods: &[&PodSpec],
    ) -> Result<()>;
}

/// Generates auxiliary files (settings, scripts) for one target.
pub trait SupportFileGenerator {
    fn generate_support_files(&mut self, graph: &ProjectGraph, target: TargetId) -> Result<()>;
}

/// Kind-specific construction steps run right after a target is created.
pub trait TargetExtension {
    fn extend(
        &self,
        graph: &mut ProjectGraph,
        target: TargetId,
        spec: &TargetSpec,
        specs: &TargetSet,
    ) -> Result<()>;
}

/// Adds every file matched by the pods' `source_files` patterns, relative
/// to the package source directory.
#[derive(Debug, Default)]
pub struct SourceTreeInstaller;

impl FileReferenceInstaller for SourceTreeInstaller {
    fn install_file_references(
        &mut self,
        _sandbox: &SandboxState,
        graph: &mut ProjectGraph,
        package: &str,
        pods: &[&PodSpec],
    ) -> Result<()> {
        let Some(group) = graph.group_mut(package) else {
            anyhow::bail!("no group for package `{}`", package);
        };

        if !group.path.is_dir() {
            return Err(ReconcileError::MissingPackageSource {
                package: package.to_string(),
                path: group.path.clone(),
            }
            .into());
        }

        let mut patterns: Vec<String> = pods
            .iter()
            .flat_map(|pod| pod.source_files.iter().cloned())
            .collect();
        patterns.sort();
        patterns.dedup();

        let root = group.path.clone();
        let files = glob_files(&root, &patterns)?
            .into_iter()
            .map(|file| relative_path(&root, &file));
        let added = group.add_files(files);
        tracing::debug!("{}: {} new file references", package, added);
        Ok(())
    }
}

/// Writes one settings file per target to `<dir>/<label>/<label>.xcconfig`.
#[derive(Debug)]
pub struct SupportFileWriter {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl SupportFileWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        SupportFileWriter {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Settings file location for a target label.
    pub fn path_for(&self, label: &str) -> PathBuf {
        self.dir.join(label).join(format!("{}.xcconfig", label))
    }

    /// Files whose content changed during this run.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SupportFileGenerator for SupportFileWriter {
    fn generate_support_files(&mut self, graph: &ProjectGraph, target: TargetId) -> Result<()> {
        let target = graph.expect_target(target)?;
        let path = self.path_for(&target.label);
        if write_if_changed(&path, &render_settings(target))? {
            tracing::debug!("wrote {}", path.display());
            self.written.push(path);
        }
        Ok(())
    }
}

/// Records which targets would get support files without writing any.
#[derive(Debug, Default)]
pub struct PlannedSupportFiles {
    labels: Vec<String>,
}

impl PlannedSupportFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target labels in request order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl SupportFileGenerator for PlannedSupportFiles {
    fn generate_support_files(&mut self, graph: &ProjectGraph, target: TargetId) -> Result<()> {
        let target = graph.expect_target(target)?;
        self.labels.push(target.label.clone());
        Ok(())
    }
}

/// Render a target's settings in xcconfig syntax. Configuration-specific
/// values use the `KEY[config=Name]` form.
fn render_settings(target: &BuildTarget) -> String {
    let mut out = format!(
        "// Generated by Berth. Do not edit.\n// {} ({}, {})\n\n",
        target.label, target.kind, target.platform
    );

    for (key, value) in &target.settings {
        out.push_str(&format!("{} = {}\n", key, value));
    }

    for configuration in &target.configurations {
        for (key, value) in &configuration.settings {
            out.push_str(&format!(
                "{}[config={}] = {}\n",
                key, configuration.name, value
            ));
        }
    }

    out
}

/// Default kind-specific setup: pod targets compile the compilable files of
/// their package group. Aggregates need nothing here; their children are
/// linked by the product-linking step.
#[derive(Debug, Default)]
pub struct StandardExtension;

impl TargetExtension for StandardExtension {
    fn extend(
        &self,
        graph: &mut ProjectGraph,
        target: TargetId,
        spec: &TargetSpec,
        _specs: &TargetSet,
    ) -> Result<()> {
        let TargetSpec::Pod(pod) = spec else {
            return Ok(());
        };

        let sources: Vec<PathBuf> = graph
            .group(&pod.package)
            .map(|group| {
                group
                    .files
                    .iter()
                    .filter(|file| is_compiled(file))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        let built = graph.expect_target_mut(target)?;
        debug_assert_eq!(built.kind, TargetKind::Pod);
        built.compile_sources = sources;
        Ok(())
    }
}

fn is_compiled(file: &Path) -> bool {
    file.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| COMPILED_EXTENSIONS.contains(&ext))
}
