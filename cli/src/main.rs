mod args;
mod commands;
mod config;
mod host;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use motion_core::MotionClient;
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, Commands};
use crate::host::TerminalHost;

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let prefs = config::load_preferences(cli.config)?;
    tracing::debug!(?prefs, "preferences loaded");
    let client = MotionClient::new(&prefs)?;

    let mut out = io::stdout();
    let saved = match cli.command {
        Commands::Add(args) => commands::add(&client, &TerminalHost::stdio(), args)?,
        Commands::Edit { id, fields } => commands::edit(&client, &TerminalHost::stdio(), &id, fields)?,
        Commands::List => commands::list(&client, &mut out).map(|()| true)?,
        Commands::Show { id } => commands::show(&client, &id, &mut out).map(|()| true)?,
        Commands::Delete { id } => commands::delete(&client, &id, &mut out).map(|()| true)?,
        Commands::Projects => commands::projects(&client, &mut out).map(|()| true)?,
        Commands::Workspaces => commands::workspaces(&client, &mut out).map(|()| true)?,
        Commands::Labels => commands::labels(&client, &mut out).map(|()| true)?,
    };

    Ok(if saved { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
