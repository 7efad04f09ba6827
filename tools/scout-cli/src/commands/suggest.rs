//! Print suggestions for a partial query.

use anyhow::Result;
use serde_json::json;

use super::SuggestArgs;
use crate::context::Context;

/// Run the suggest command.
pub async fn run(args: SuggestArgs, ctx: &Context) -> Result<()> {
    let fetcher = ctx.fetcher()?;
    let outcome = fetcher.fetch(&args.partial).await;

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "query": args.partial,
            "suggestions": outcome.suggestions,
            "items": if args.items { Some(&outcome.items) } else { None },
            "notice": outcome.notice,
        }));
        return Ok(());
    }

    // Suggestion failures are never fatal.
    if let Some(notice) = &outcome.notice {
        ctx.output.warn(notice);
    }

    if outcome.is_empty() {
        if outcome.notice.is_none() {
            ctx.output.info(&format!("No suggestions for \"{}\"", args.partial.trim()));
        }
        return Ok(());
    }

    ctx.output.header("Suggestions");
    for suggestion in &outcome.suggestions {
        ctx.output.list_item(suggestion);
    }

    if args.items && !outcome.items.is_empty() {
        ctx.output.header("Items");
        for item in &outcome.items {
            ctx.output.item_row(item);
        }
    }

    Ok(())
}
