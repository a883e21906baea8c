//! Explicit context threaded through every reconciliation step.

use std::path::PathBuf;

use crate::core::sandbox::SandboxState;
use crate::core::spec::TargetSet;
use crate::core::workspace::Workspace;
use crate::installer::collaborators::{
    FileReferenceInstaller, SupportFileGenerator, TargetExtension,
};
use crate::project::ConfigurationKind;

/// Fixed inputs of a run.
#[derive(Debug, Clone)]
pub struct InstallSettings {
    /// Project file to reopen, or to create when absent
    pub project_path: PathBuf,

    /// Manifest recorded on the project as its origin
    pub manifest_path: PathBuf,

    /// User-declared build configurations, in registration order
    pub configurations: Vec<(String, ConfigurationKind)>,
}

impl InstallSettings {
    pub fn from_workspace(ws: &Workspace) -> Self {
        InstallSettings {
            project_path: ws.project_path(),
            manifest_path: ws.manifest_path().to_path_buf(),
            configurations: ws.user_configurations(),
        }
    }
}

/// Everything a run reads or mutates besides the project graph itself.
///
/// The reconciler is the only writer for the duration of the run.
pub struct InstallContext<'a> {
    pub sandbox: &'a mut SandboxState,
    pub specs: &'a mut TargetSet,
    pub settings: &'a InstallSettings,
    pub file_references: &'a mut dyn FileReferenceInstaller,
    pub support_files: &'a mut dyn SupportFileGenerator,
    pub extension: &'a dyn TargetExtension,
}
