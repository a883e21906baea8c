//! Berth - converges an IDE build project to a resolved package graph
//!
//! This crate provides the library side of Berth: the workspace and target
//! model, the persisted project graph, and the reconciler that brings the
//! project in line with the desired targets.

pub mod core;
pub mod installer;
pub mod ops;
pub mod project;
pub mod util;

/// Fixtures and recording collaborators for unit tests.
#[cfg(test)]
pub mod test_support;

pub use core::{sandbox::SandboxState, spec::TargetSet, workspace::Workspace};
pub use installer::{ReconcileError, ReconcileReport, Reconciler};
pub use project::ProjectGraph;
pub use util::context::GlobalContext;
