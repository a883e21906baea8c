//! The build project being converged.
//!
//! [`ProjectGraph`] is the in-memory model; [`encode`] reads and writes its
//! on-disk form.

pub mod encode;
pub mod graph;
pub mod group;
pub mod target;

pub use encode::{load_project, save_project, ProjectFile};
pub use graph::{ProjectGraph, TargetId};
pub use group::PackageGroup;
pub use target::{
    BuildTarget, Configuration, ConfigurationKind, Product, ProductRef, TargetKind,
};
