//! CLI command handlers.

pub mod admin;
pub mod analyze;
pub mod auth;
pub mod config;
pub mod images;
pub mod results;

use anyhow::{Context, Result, bail};
use serde::Serialize;

/// Prints `value` as pretty JSON.
fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{json}");
    Ok(())
}

/// Destructive bulk operations must be confirmed with `--yes`.
fn confirm(yes: bool, what: &str) -> Result<()> {
    if !yes {
        bail!("Refusing to {what} without confirmation. Re-run with --yes.");
    }
    Ok(())
}
