//! agterm: lets an AI coding agent find, drive and watch iTerm2 sessions.
//! Serves MCP on stdio by default; subcommands give one-shot CLI access to
//! the same operations.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use agterm_bridge::OsascriptExecutor;

mod cli;
mod commands;
mod protocol;
mod registry;
mod server;
mod service;
mod tools;
mod watch;

use registry::Registry;
use service::Terminals;
use watch::WatchTracker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // stdout carries MCP traffic, so logs go to stderr.
    let filter = std::env::var("AGTERM_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let executor = OsascriptExecutor::new(args.osascript_bin)
        .with_timeout(Duration::from_secs(args.bridge_timeout_secs));
    let terminals = Terminals::new(
        Arc::new(executor),
        Arc::new(Registry::new(&args.state_file)),
        Arc::new(WatchTracker::new()),
    );

    match args.command.unwrap_or(cli::Command::Serve) {
        cli::Command::Serve => {
            tracing::info!(state_file = %args.state_file.display(), "agterm starting");
            server::run_stdio(terminals).await?;
        }
        cli::Command::Ls => commands::cmd_ls(&terminals).await?,
        cli::Command::Read(opts) => commands::cmd_read(&terminals, &opts.identifier, opts.lines).await?,
        cli::Command::Find(opts) => commands::cmd_find(&terminals, &opts.name).await?,
        cli::Command::Register(opts) => commands::cmd_register(&terminals, &opts.tty).await?,
    }

    Ok(())
}
