//! One-shot CLI subcommands. Each prints JSON (or plain output text) to
//! stdout and exits.

use serde::Serialize;

use crate::service::Terminals;

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `agterm ls`
pub async fn cmd_ls(terminals: &Terminals) -> anyhow::Result<()> {
    print_json(&terminals.list_sessions().await?)
}

/// `agterm read <identifier>`: the output text only.
pub async fn cmd_read(terminals: &Terminals, identifier: &str, lines: usize) -> anyhow::Result<()> {
    let read = terminals.read_output(identifier, lines).await?;
    if !read.output.is_empty() {
        println!("{}", read.output);
    }
    Ok(())
}

/// `agterm find <name>`
pub async fn cmd_find(terminals: &Terminals, name: &str) -> anyhow::Result<()> {
    print_json(&terminals.find_by_name(name).await?)
}

/// `agterm register <tty>`
pub async fn cmd_register(terminals: &Terminals, tty: &str) -> anyhow::Result<()> {
    print_json(&terminals.register(tty).await?)
}
