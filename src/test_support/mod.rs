//! Test utilities for Berth unit tests.
//!
//! Provides a recording file-reference installer that never touches the
//! filesystem, and fixtures that wire a complete [`InstallContext`] over a
//! temporary workspace.
//!
//! # Example
//!
//! ```rust,ignore
//! use berth::test_support::{app_targets, InstallFixture};
//!
//! #[test]
//! fn test_example() {
//!     let mut fixture = InstallFixture::new(app_targets(&["B"]));
//!     let (graph, report) = fixture.reconcile().unwrap();
//!     assert_eq!(report.edges_added, 3);
//! }
//! ```
//!
//! [`InstallContext`]: crate::installer::InstallContext

pub mod fixtures;

use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::core::sandbox::SandboxState;
use crate::core::spec::PodSpec;
use crate::installer::FileReferenceInstaller;
use crate::project::ProjectGraph;

// Re-export fixtures for convenience
pub use fixtures::*;

/// File-reference installer that records calls and adds one source file
/// per package instead of globbing the sandbox.
#[derive(Debug, Clone, Default)]
pub struct RecordingFileReferences {
    packages: Vec<String>,
    pods: Vec<Vec<String>>,
}

impl RecordingFileReferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Packages in call order.
    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    /// Pod labels passed with each call.
    pub fn pods(&self) -> &[Vec<String>] {
        &self.pods
    }
}

impl FileReferenceInstaller for RecordingFileReferences {
    fn install_file_references(
        &mut self,
        _sandbox: &SandboxState,
        graph: &mut ProjectGraph,
        package: &str,
        pods: &[&PodSpec],
    ) -> Result<()> {
        let Some(group) = graph.group_mut(package) else {
            bail!("no group for package `{}`", package);
        };
        group.add_files([PathBuf::from(format!("{}.m", package))]);

        self.packages.push(package.to_string());
        self.pods
            .push(pods.iter().map(|pod| pod.label.clone()).collect());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ios;

    #[test]
    fn test_recording_file_references() {
        let mut graph = ProjectGraph::new();
        graph.ensure_group("A", &PathBuf::from("/sandbox/A"), false);
        let pod = PodSpec::new("Pods-A", "A", ios("8.0"));

        let mut recorder = RecordingFileReferences::new();
        recorder
            .install_file_references(&SandboxState::new("/sandbox"), &mut graph, "A", &[&pod])
            .unwrap();

        assert_eq!(recorder.packages(), &["A".to_string()]);
        assert_eq!(recorder.pods(), &[vec!["Pods-A".to_string()]]);
        assert_eq!(graph.group("A").unwrap().files, vec![PathBuf::from("A.m")]);
    }

    #[test]
    fn test_recording_needs_group() {
        let mut graph = ProjectGraph::new();
        let mut recorder = RecordingFileReferences::new();
        assert!(recorder
            .install_file_references(&SandboxState::new("/sandbox"), &mut graph, "A", &[])
            .is_err());
    }
}
