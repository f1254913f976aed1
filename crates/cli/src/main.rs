//! PinDrop CLI - Pinterest media downloader

use anyhow::Result;
use clap::Parser;
use pindrop_cli::{commands, logging, Cli, Commands};

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { ref path } => {
            commands::init::run(path.as_deref())?;
        }
        Commands::Analyze { ref url } => {
            commands::analyze::run(url, &cli)?;
        }
        Commands::Download {
            ref urls,
            ref output,
            kind,
            fast,
        } => {
            commands::download::run(urls, output.as_deref(), kind.map(Into::into), fast, &cli)?;
        }
        Commands::Simulate { ref kinds, fast } => {
            let kinds: Vec<_> = kinds.iter().copied().map(Into::into).collect();
            commands::simulate::run(&kinds, fast, &cli)?;
        }
        Commands::Premium { ref action } => {
            commands::premium::run(action.as_ref(), &cli)?;
        }
        Commands::History { clear, remove } => {
            commands::history::run(clear, remove)?;
        }
    }

    Ok(())
}
