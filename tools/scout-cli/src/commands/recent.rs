//! List or clear recent searches.

use anyhow::{Context as _, Result};
use chrono::{Local, TimeZone};
use dialoguer::Confirm;

use super::{RecentAction, RecentArgs};
use crate::context::Context;

/// Run the recent command.
pub async fn run(args: RecentArgs, ctx: &Context) -> Result<()> {
    match args.action.unwrap_or(RecentAction::List) {
        RecentAction::List => list(ctx),
        RecentAction::Clear { yes } => clear(yes, ctx),
    }
}

fn list(ctx: &Context) -> Result<()> {
    let recent = ctx.recent()?;

    if ctx.output.is_json() {
        ctx.output.json(&recent.entries());
        return Ok(());
    }

    if recent.is_empty() {
        ctx.output.info("No recent searches");
        return Ok(());
    }

    ctx.output.header("Recent searches");
    ctx.output.table_row(&["SEARCH", "TAG", "WHEN"], &[32, 16, 0]);
    for entry in recent.entries() {
        let when = Local
            .timestamp_millis_opt(entry.timestamp)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let label = if entry.query.is_empty() { "-" } else { entry.query.as_str() };
        ctx.output
            .table_row(&[label, entry.tag.as_deref().unwrap_or("-"), &when], &[32, 16, 0]);
    }

    Ok(())
}

fn clear(yes: bool, ctx: &Context) -> Result<()> {
    let mut recent = ctx.recent()?;
    if recent.is_empty() {
        ctx.output.info("No recent searches");
        return Ok(());
    }

    if !yes && !ctx.output.is_json() {
        let confirmed = Confirm::new()
            .with_prompt(format!("Clear {} recent searches?", recent.len()))
            .default(false)
            .interact()?;
        if !confirmed {
            ctx.output.warn("Cancelled");
            return Ok(());
        }
    }

    recent.clear().context("Failed to clear recent searches")?;
    ctx.output.success("Cleared recent searches");
    Ok(())
}
