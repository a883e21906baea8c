//! Command implementations

pub mod completions;
pub mod graph;
pub mod install;

use std::path::PathBuf;

use anyhow::Result;

use berth::util::GlobalContext;

/// Explicit `--manifest-path`, or the nearest Berth.toml upward from the
/// working directory.
pub fn manifest_path(explicit: Option<PathBuf>, ctx: &GlobalContext) -> Result<PathBuf> {
    match explicit {
        Some(path) if path.is_absolute() => Ok(path),
        Some(path) => Ok(ctx.cwd().join(path)),
        None => Ok(ctx.find_manifest()?),
    }
}
