//! High-level operations.
//!
//! This module contains the implementation of Berth commands.

pub mod berth_graph;
pub mod berth_install;

pub use berth_graph::{format_graph, load_graph};
pub use berth_install::{install, InstallOptions};
