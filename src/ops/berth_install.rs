//! Implementation of `berth install`.

use anyhow::Result;

use crate::core::Workspace;
use crate::installer::{
    InstallContext, InstallSettings, PlannedSupportFiles, ReconcileReport, Reconciler,
    SourceTreeInstaller, StandardExtension, Step, SupportFileGenerator, SupportFileWriter,
};

/// Options for install command.
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Reconcile in memory only: no project file, no support files and the
    /// sandbox state is left as is
    pub dry_run: bool,
}

/// Converge the workspace's project to its desired targets.
///
/// Reads the sandbox state and `targets.toml`, runs every reconciliation
/// step, then writes the project file and settles the sandbox state.
pub fn install(ws: &Workspace, opts: &InstallOptions) -> Result<ReconcileReport> {
    if opts.dry_run {
        tracing::info!("Dry run - project file will not be written");
    }

    let mut sandbox = ws.load_sandbox()?;
    let mut specs = ws.load_targets()?;
    let settings = InstallSettings::from_workspace(ws);

    let mut file_references = SourceTreeInstaller;
    let mut writer = SupportFileWriter::new(ws.support_files_dir());
    let mut planned = PlannedSupportFiles::new();
    let support_files: &mut dyn SupportFileGenerator = if opts.dry_run {
        &mut planned
    } else {
        &mut writer
    };
    let extension = StandardExtension;

    let ctx = InstallContext {
        sandbox: &mut sandbox,
        specs: &mut specs,
        settings: &settings,
        file_references: &mut file_references,
        support_files,
        extension: &extension,
    };

    let mut reconciler = Reconciler::prepare(ctx)?;
    for step in Step::PIPELINE {
        reconciler.run_step(step)?;
    }
    if !opts.dry_run {
        reconciler.persist()?;
    }
    let (_, report) = reconciler.finish();

    if !opts.dry_run {
        sandbox.settle()?;
        tracing::info!(
            "Wrote {} ({} support files changed)",
            settings.project_path.display(),
            writer.written().len()
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installer::{ProjectState, ReconcileError};
    use crate::project::load_project;
    use std::path::Path;
    use tempfile::TempDir;

    const TARGETS: &str = r#"
[[aggregate]]
label = "Pods-App"
name = "App"
platform = { family = "ios", deployment-target = "8.0" }
dependencies = ["A", "B"]
pods = ["Pods-App-A", "Pods-App-B"]

[[pod]]
label = "Pods-App-A"
package = "A"
platform = { family = "ios", deployment-target = "8.0" }
dependencies = ["B"]
source-files = ["Classes/*"]

[[pod]]
label = "Pods-App-B"
package = "B"
platform = { family = "ios", deployment-target = "8.0" }
source-files = ["*.m"]
"#;

    fn create_test_workspace(dir: &Path) -> Workspace {
        std::fs::write(
            dir.join("Berth.toml"),
            "[build-configurations]\nBeta = \"release\"\n",
        )
        .unwrap();
        let pods = dir.join("Pods");
        std::fs::create_dir_all(pods.join("A/Classes")).unwrap();
        std::fs::create_dir_all(pods.join("B")).unwrap();
        std::fs::write(pods.join("A/Classes/A.m"), "").unwrap();
        std::fs::write(pods.join("A/Classes/A.h"), "").unwrap();
        std::fs::write(pods.join("B/B.m"), "").unwrap();
        std::fs::write(pods.join("targets.toml"), TARGETS).unwrap();
        std::fs::write(pods.join("state.toml"), "added = [\"A\", \"B\"]\n").unwrap();

        Workspace::new(&dir.join("Berth.toml")).unwrap()
    }

    #[test]
    fn test_install_writes_project() {
        let tmp = TempDir::new().unwrap();
        let ws = create_test_workspace(tmp.path());

        let report = install(&ws, &InstallOptions::default()).unwrap();
        assert_eq!(report.project, ProjectState::Fresh);
        assert_eq!(report.targets_created.len(), 3);

        let graph = load_project(&ws.project_path()).unwrap();
        let a = graph.find_target("Pods-App-A").unwrap();
        let b = graph.find_target("Pods-App-B").unwrap();
        assert!(graph.has_dependency(a, b));
        assert_eq!(
            graph.target(a).unwrap().compile_sources,
            vec![std::path::PathBuf::from("Classes/A.m")]
        );
        assert!(graph.configurations().iter().any(|c| c.name == "Beta"));

        let support = ws.support_files_dir().join("Pods-App/Pods-App.xcconfig");
        assert!(support.exists());

        let state = ws.load_sandbox().unwrap();
        assert!(state.added().is_empty());
    }

    #[test]
    fn test_install_twice_is_noop() {
        let tmp = TempDir::new().unwrap();
        let ws = create_test_workspace(tmp.path());

        install(&ws, &InstallOptions::default()).unwrap();
        let saved = std::fs::read_to_string(ws.project_path()).unwrap();
        let report = install(&ws, &InstallOptions::default()).unwrap();

        assert_eq!(report.project, ProjectState::Reopened);
        assert!(report.is_noop());
        assert_eq!(std::fs::read_to_string(ws.project_path()).unwrap(), saved);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let ws = create_test_workspace(tmp.path());

        let report = install(&ws, &InstallOptions { dry_run: true }).unwrap();

        assert_eq!(report.targets_created.len(), 3);
        assert!(!ws.project_path().exists());
        assert!(!ws.support_files_dir().exists());
        assert!(ws.load_sandbox().unwrap().added().contains("A"));
    }

    #[test]
    fn test_missing_sources_fail() {
        let tmp = TempDir::new().unwrap();
        let ws = create_test_workspace(tmp.path());
        std::fs::remove_dir_all(tmp.path().join("Pods/B")).unwrap();

        let err = install(&ws, &InstallOptions::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReconcileError>(),
            Some(ReconcileError::MissingPackageSource { package, .. }) if package == "B"
        ));
        assert!(!ws.project_path().exists());
    }
}
