//! Core data structures for Berth.
//!
//! This module contains the inputs of a reconciliation run:
//! - Platforms and deployment targets
//! - The desired target graph (aggregate and pod target specs)
//! - Sandbox state left by the previous installation
//! - Workspace configuration

pub mod platform;
pub mod sandbox;
pub mod spec;
pub mod workspace;

pub use platform::{DeploymentTarget, Platform, PlatformFamily};
pub use sandbox::{PackageSource, SandboxState};
pub use spec::{AggregateSpec, PodSpec, SpecId, TargetSet, TargetSpec};
pub use workspace::{find_manifest, Workspace, MANIFEST_NAME};
