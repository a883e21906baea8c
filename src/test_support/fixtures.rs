//! Fixtures for common reconciliation scenarios.

use std::path::Path;

use anyhow::Result;
use tempfile::TempDir;

use crate::core::platform::{Platform, PlatformFamily};
use crate::core::sandbox::SandboxState;
use crate::core::spec::{AggregateSpec, PodSpec, TargetSet};
use crate::installer::{
    InstallContext, InstallSettings, PlannedSupportFiles, ReconcileReport, Reconciler,
    StandardExtension, Step,
};
use crate::project::{ConfigurationKind, ProjectGraph};
use crate::test_support::RecordingFileReferences;

/// An iOS platform at `deployment_target`.
pub fn ios(deployment_target: &str) -> Platform {
    Platform::new(PlatformFamily::Ios, deployment_target).expect("valid deployment target")
}

/// Aggregate `Pods-App` using packages A and B, with pods `Pods-App-A` and
/// `Pods-App-B`. `a_dependencies` are the packages A declares.
pub fn app_targets(a_dependencies: &[&str]) -> TargetSet {
    let mut specs = TargetSet::new();
    let a = specs
        .add_pod(
            PodSpec::new("Pods-App-A", "A", ios("8.0"))
                .with_dependencies(a_dependencies.iter().map(|d| d.to_string()).collect()),
        )
        .expect("unique label");
    let b = specs
        .add_pod(PodSpec::new("Pods-App-B", "B", ios("8.0")))
        .expect("unique label");
    specs
        .add_aggregate(
            AggregateSpec::new("Pods-App", ios("8.0"))
                .with_name("App")
                .with_dependencies(vec!["A".to_string(), "B".to_string()])
                .with_pods(vec![a, b]),
        )
        .expect("unique label");
    specs
}

/// A temporary workspace with everything a run needs.
///
/// The sandbox is `<tmp>/Pods` and the project file
/// `<tmp>/Pods/Pods.project.toml`. Support files are recorded, not written.
pub struct InstallFixture {
    pub tmp: TempDir,
    pub sandbox: SandboxState,
    pub specs: TargetSet,
    pub settings: InstallSettings,
    pub file_references: RecordingFileReferences,
    pub support_files: PlannedSupportFiles,
    pub extension: StandardExtension,
}

impl InstallFixture {
    pub fn new(specs: TargetSet) -> Self {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let sandbox_root = tmp.path().join("Pods");
        let settings = InstallSettings {
            project_path: sandbox_root.join("Pods.project.toml"),
            manifest_path: tmp.path().join("Berth.toml"),
            configurations: Vec::new(),
        };

        InstallFixture {
            sandbox: SandboxState::new(&sandbox_root).with_workspace_root(tmp.path()),
            tmp,
            specs,
            settings,
            file_references: RecordingFileReferences::new(),
            support_files: PlannedSupportFiles::new(),
            extension: StandardExtension,
        }
    }

    pub fn with_configurations(mut self, configurations: &[(&str, ConfigurationKind)]) -> Self {
        self.settings.configurations = configurations
            .iter()
            .map(|(name, kind)| (name.to_string(), *kind))
            .collect();
        self
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn context(&mut self) -> InstallContext<'_> {
        InstallContext {
            sandbox: &mut self.sandbox,
            specs: &mut self.specs,
            settings: &self.settings,
            file_references: &mut self.file_references,
            support_files: &mut self.support_files,
            extension: &self.extension,
        }
    }

    /// Run every step without persisting.
    pub fn reconcile(&mut self) -> Result<(ProjectGraph, ReconcileReport)> {
        Reconciler::prepare(self.context())?.run()
    }

    /// Run every step and write the project file.
    pub fn reconcile_and_save(&mut self) -> Result<(ProjectGraph, ReconcileReport)> {
        let mut reconciler = Reconciler::prepare(self.context())?;
        for step in Step::PIPELINE {
            reconciler.run_step(step)?;
        }
        reconciler.persist()?;
        Ok(reconciler.finish())
    }

    /// Start the next run over the same workspace with new inputs. The
    /// previous run's bindings do not carry over.
    pub fn next_run(&mut self, specs: TargetSet, sandbox: SandboxState) {
        self.specs = specs;
        self.sandbox = sandbox;
        self.file_references = RecordingFileReferences::new();
        self.support_files = PlannedSupportFiles::new();
    }
}
