//! Reconciliation of the project graph against the desired targets.
//!
//! A run prepares the project (reopening the persisted file or starting
//! fresh), computes an [`InstallPlan`] from the sandbox state, then runs the
//! [`Step::PIPELINE`]: configure, remove packages, install packages, install
//! aggregates, regenerate aggregate support files, wire dependencies and link
//! products. Persisting the result is a separate, explicit call.

pub mod aggregates;
pub mod collaborators;
pub mod configurations;
pub mod context;
pub mod dependencies;
pub mod diff;
pub mod errors;
pub mod links;
pub mod packages;
pub mod pipeline;
pub mod prepare;
pub mod report;
pub mod target_builder;

pub use collaborators::{
    FileReferenceInstaller, PlannedSupportFiles, SourceTreeInstaller, StandardExtension,
    SupportFileGenerator, SupportFileWriter, TargetExtension,
};
pub use context::{InstallContext, InstallSettings};
pub use diff::InstallPlan;
pub use errors::ReconcileError;
pub use pipeline::{Reconciler, Step};
pub use prepare::ProjectState;
pub use report::ReconcileReport;
pub use target_builder::TargetBuilder;
