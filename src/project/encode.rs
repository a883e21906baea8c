//! Project file encoding and decoding.
//!
//! The project file is a TOML rendering of the [`ProjectGraph`]. Targets
//! refer to each other by label, paths are stored relative to the project
//! file's directory, and every object carries a stable identifier so that
//! rewriting an unchanged project yields an identical file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::platform::Platform;
use crate::project::graph::ProjectGraph;
use crate::project::group::PackageGroup;
use crate::project::target::{BuildTarget, Configuration, ProductRef, TargetKind};
use crate::util::fs::{relative_path, write_atomic};
use crate::util::hash::object_id;

/// Current project file format version.
pub const PROJECT_FORMAT_VERSION: u32 = 1;

/// Serialized project.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectFile {
    /// Format version
    pub version: u32,

    /// Manifest the project was generated from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,

    /// Project-level build configurations
    #[serde(rename = "configuration", default)]
    pub configurations: Vec<Configuration>,

    /// Package groups, ordered by name
    #[serde(rename = "group", default)]
    pub groups: Vec<EncodedGroup>,

    /// Build targets, ordered by label
    #[serde(rename = "target", default)]
    pub targets: Vec<EncodedTarget>,
}

/// A package group entry.
#[derive(Debug, Serialize, Deserialize)]
pub struct EncodedGroup {
    pub id: String,
    pub name: String,
    pub path: PathBuf,
    #[serde(default)]
    pub local: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<PathBuf>,
}

/// A build target entry.
#[derive(Debug, Serialize, Deserialize)]
pub struct EncodedTarget {
    pub id: String,
    pub label: String,
    pub kind: TargetKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    pub product: ProductRef,

    /// Labels of the targets this one depends on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,

    /// Link phase, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<ProductRef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<PathBuf>,

    pub platform: Platform,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, String>,

    #[serde(rename = "configuration", default)]
    pub configurations: Vec<Configuration>,
}

impl ProjectFile {
    /// Snapshot a graph. `project_dir` anchors relative paths.
    pub fn from_graph(graph: &ProjectGraph, project_dir: &Path) -> Self {
        let groups = graph
            .groups()
            .map(|group| EncodedGroup {
                id: object_id("group", &group.name),
                name: group.name.clone(),
                path: relative_path(project_dir, &group.path),
                local: group.local,
                files: group.files.clone(),
            })
            .collect();

        let targets = graph
            .targets()
            .into_iter()
            .map(|(id, target)| EncodedTarget {
                id: object_id("target", &target.label),
                label: target.label.clone(),
                kind: target.kind,
                package: target.package.clone(),
                product: target.product.clone(),
                dependencies: graph
                    .dependencies(id)
                    .into_iter()
                    .filter_map(|dep| graph.target(dep).map(|t| t.label.clone()))
                    .collect(),
                links: target.link_phase.clone(),
                sources: target.compile_sources.clone(),
                platform: target.platform.clone(),
                settings: target.settings.clone(),
                configurations: target.configurations.clone(),
            })
            .collect();

        ProjectFile {
            version: PROJECT_FORMAT_VERSION,
            manifest: graph
                .manifest_path()
                .map(|path| relative_path(project_dir, path)),
            configurations: graph.configurations().to_vec(),
            groups,
            targets,
        }
    }

    /// Rebuild the graph. `project_dir` anchors relative paths.
    pub fn into_graph(self, project_dir: &Path) -> Result<ProjectGraph> {
        let mut graph = ProjectGraph::new();
        graph.set_configurations(self.configurations);
        if let Some(manifest) = self.manifest {
            graph.set_manifest_path(project_dir.join(manifest));
        }

        for group in self.groups {
            let mut decoded =
                PackageGroup::new(group.name, project_dir.join(group.path), group.local);
            decoded.add_files(group.files);
            graph.insert_group(decoded);
        }

        let mut edges = Vec::new();
        for encoded in self.targets {
            let target = BuildTarget {
                label: encoded.label,
                kind: encoded.kind,
                platform: encoded.platform,
                package: encoded.package,
                product: encoded.product,
                settings: encoded.settings,
                configurations: encoded.configurations,
                link_phase: encoded.links,
                compile_sources: encoded.sources,
            };
            let label = target.label.clone();
            graph.add_target(target)?;
            edges.extend(encoded.dependencies.into_iter().map(|dep| (label.clone(), dep)));
        }

        for (from, to) in edges {
            let (Some(from_id), Some(to_id)) = (graph.find_target(&from), graph.find_target(&to))
            else {
                bail!("target `{}` depends on unknown target `{}`", from, to);
            };
            graph.add_dependency(from_id, to_id)?;
        }

        Ok(graph)
    }

    /// Load a project file from a path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read project file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("failed to parse project file: {}", path.display()))
    }

    /// Write the project file, replacing any previous one atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        let with_header = format!(
            "# This file is automatically generated by Berth.\n\
             # It is not intended for manual editing.\n\n\
             {content}"
        );

        write_atomic(path, &with_header)
    }

    /// Check if this file's format can be read by this version of Berth.
    pub fn is_compatible(&self) -> bool {
        self.version == PROJECT_FORMAT_VERSION
    }
}

/// Read a project from disk into a graph.
pub fn load_project(path: &Path) -> Result<ProjectGraph> {
    let file = ProjectFile::load(path)?;
    if !file.is_compatible() {
        bail!(
            "project file version {} is not compatible with this version of Berth",
            file.version
        );
    }
    file.into_graph(project_dir(path))
        .with_context(|| format!("invalid project file: {}", path.display()))
}

/// Persist a graph to disk.
pub fn save_project(graph: &ProjectGraph, path: &Path) -> Result<()> {
    ProjectFile::from_graph(graph, project_dir(path)).save(path)
}

fn project_dir(path: &Path) -> &Path {
    path.parent().unwrap_or(Path::new("."))
}
