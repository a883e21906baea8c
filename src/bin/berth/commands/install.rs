//! `berth install` command

use anyhow::{Context, Result};

use crate::cli::InstallArgs;
use berth::core::Workspace;
use berth::ops::berth_install::{install, InstallOptions};
use berth::util::GlobalContext;

pub fn execute(args: InstallArgs, ctx: &GlobalContext) -> Result<()> {
    let manifest_path = super::manifest_path(args.manifest_path, ctx)?;
    let ws = Workspace::new(&manifest_path)?;

    let opts = InstallOptions {
        dry_run: args.dry_run,
    };
    let report = install(&ws, &opts)?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{}", json);
        return Ok(());
    }

    for name in &report.packages_removed {
        println!("Removing {}", name);
    }
    for name in &report.packages_installed {
        println!("Installing {}", name);
    }
    for label in &report.aggregates_installed {
        println!("Installing target {}", label);
    }
    println!("{}", report.summary());

    Ok(())
}
