//! Consistency violations raised during reconciliation.
//!
//! These are fatal: a run that hits one stops instead of writing a project
//! with missing edges.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error raised when the desired target graph and the project disagree.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ReconcileError {
    #[error("pod target `{pod}` of `{aggregate}` has no build target")]
    #[diagnostic(code(berth::reconcile::unbound_target))]
    UnboundTarget { aggregate: String, pod: String },

    #[error("aggregate target `{label}` has no build target")]
    #[diagnostic(code(berth::reconcile::unbound_aggregate))]
    UnboundAggregate { label: String },

    #[error("`{pod}` depends on `{dependency}`, which `{aggregate}` does not build")]
    #[diagnostic(code(berth::reconcile::unresolved_dependency))]
    UnresolvedDependency {
        aggregate: String,
        pod: String,
        dependency: String,
    },

    #[error("target spec `{label}` is already bound to a build target")]
    #[diagnostic(code(berth::reconcile::already_bound))]
    AlreadyBound { label: String },

    #[error("a build target labelled `{label}` already exists")]
    #[diagnostic(code(berth::reconcile::duplicate_label))]
    DuplicateLabel { label: String },

    #[error("no build target with id {id}")]
    #[diagnostic(code(berth::reconcile::unknown_target))]
    UnknownTarget { id: usize },

    #[error("source directory for `{package}` not found: {}", .path.display())]
    #[diagnostic(code(berth::reconcile::missing_source))]
    MissingPackageSource { package: String, path: PathBuf },
}

impl ReconcileError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());
        match self {
            ReconcileError::UnboundTarget { aggregate, pod } => diag
                .with_context(format!(
                    "`{}` links `{}`, but no package install created it",
                    aggregate, pod
                ))
                .with_suggestion(suggestions::RERESOLVE)
                .with_suggestion(suggestions::RESET_PROJECT),

            ReconcileError::UnboundAggregate { .. } => diag
                .with_context("every non-empty aggregate gets a build target before wiring")
                .with_suggestion(suggestions::RESET_PROJECT),

            ReconcileError::UnresolvedDependency {
                aggregate,
                dependency,
                ..
            } => diag
                .with_context(format!(
                    "dependencies resolve only to pod targets of the same aggregate `{}`",
                    aggregate
                ))
                .with_suggestion(format!(
                    "Make sure `{}` is resolved for `{}`",
                    dependency, aggregate
                ))
                .with_suggestion(suggestions::RERESOLVE),

            ReconcileError::AlreadyBound { .. } | ReconcileError::DuplicateLabel { .. } => diag
                .with_context("target labels must be unique within a project")
                .with_suggestion(suggestions::RESET_PROJECT),

            ReconcileError::UnknownTarget { .. } => {
                diag.with_suggestion(suggestions::RESET_PROJECT)
            }

            ReconcileError::MissingPackageSource { path, .. } => diag
                .with_location(path.clone())
                .with_suggestion(suggestions::FETCH_SOURCES),
        }
    }
}
