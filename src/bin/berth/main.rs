//! Berth CLI - converges an IDE build project to resolved packages

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use berth::installer::ReconcileError;
use berth::util::diagnostic::emit;
use berth::util::GlobalContext;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let mut ctx = match GlobalContext::new() {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("error: {:#}", e);
            std::process::exit(1);
        }
    };
    ctx.set_verbose(cli.verbose);
    ctx.set_color(!cli.no_color);

    init_logging(&ctx);

    if let Err(e) = run(cli.command, &ctx) {
        match e.downcast_ref::<ReconcileError>() {
            Some(err) => emit(&err.to_diagnostic(), ctx.color()),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn init_logging(ctx: &GlobalContext) {
    let filter = if ctx.is_verbose() {
        EnvFilter::new("berth=debug")
    } else {
        EnvFilter::new("berth=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_ansi(ctx.color())
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands, ctx: &GlobalContext) -> Result<()> {
    match command {
        Commands::Install(args) => commands::install::execute(args, ctx),
        Commands::Graph(args) => commands::graph::execute(args, ctx),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
