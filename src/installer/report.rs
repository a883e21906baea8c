//! Summary of what a run changed.

use serde::Serialize;

use crate::installer::prepare::ProjectState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub project: ProjectState,
    pub packages_removed: Vec<String>,
    pub packages_installed: Vec<String>,
    pub aggregates_installed: Vec<String>,
    pub targets_created: Vec<String>,
    pub targets_removed: Vec<String>,
    pub edges_added: usize,
    pub links_added: usize,
    pub support_files: usize,
}

impl ReconcileReport {
    pub fn new(project: ProjectState) -> Self {
        ReconcileReport {
            project,
            packages_removed: Vec::new(),
            packages_installed: Vec::new(),
            aggregates_installed: Vec::new(),
            targets_created: Vec::new(),
            targets_removed: Vec::new(),
            edges_added: 0,
            links_added: 0,
            support_files: 0,
        }
    }

    /// True when the run left the project graph structurally unchanged.
    pub fn is_noop(&self) -> bool {
        self.targets_created.is_empty()
            && self.targets_removed.is_empty()
            && self.edges_added == 0
            && self.links_added == 0
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        if self.is_noop() {
            return "project is up to date".to_string();
        }
        format!(
            "{} targets created, {} removed, {} dependencies, {} links",
            self.targets_created.len(),
            self.targets_removed.len(),
            self.edges_added,
            self.links_added
        )
    }
}
