mod cli;
mod config;
mod error;
mod init;
mod issues;
mod progress;
mod render;
mod ui;
mod update;

use clap::Parser;
use cli::{Cli, Commands};
use std::process;
use update::WriteMode;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Update {
            source,
            common,
            check,
            dry_run,
        } => update::execute(source, common, WriteMode::from_flags(check, dry_run)),
        Commands::Render { source, common } => render::execute(source, common),
        Commands::Init { common, force } => init::execute(common, force),
    };

    if let Err(err) = result {
        ui::error_message(&err.user_message());
        process::exit(1);
    }
}
