//! `berth graph` command

use anyhow::Result;

use crate::cli::GraphArgs;
use berth::core::Workspace;
use berth::ops::berth_graph::{format_graph, load_graph};
use berth::util::GlobalContext;

pub fn execute(args: GraphArgs, ctx: &GlobalContext) -> Result<()> {
    let manifest_path = super::manifest_path(args.manifest_path, ctx)?;
    let ws = Workspace::new(&manifest_path)?;

    let graph = load_graph(&ws)?;
    print!("{}", format_graph(&graph));

    Ok(())
}
