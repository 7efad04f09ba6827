//! Interactive search bar.
//!
//! Each round reads a term, shows the debounced suggestions plus recent
//! searches, commits the picked entry and prints the resulting page.

use anyhow::Result;
use dialoguer::{Input, Select};
use scout_search::{
    Navigator, RecentSearchEntry, SearchBar, SearchHandle, SearchOrchestrator, SuggestionState,
    TagRouting,
};

use super::InteractiveArgs;
use crate::context::Context;
use crate::output::{format_price, view_badge};

enum Choice {
    Suggestion(String),
    Submit,
    Recent(RecentSearchEntry),
    ClearRecent,
    Quit,
}

impl Choice {
    fn label(&self, bar: &SearchBar) -> String {
        match self {
            Choice::Suggestion(s) if bar.is_tag(s) => format!("#{}", s),
            Choice::Suggestion(s) => s.clone(),
            Choice::Submit => format!("Search for \"{}\"", bar.term().trim()),
            Choice::Recent(entry) => format!("recent: {}", entry.label()),
            Choice::ClearRecent => "Clear recent searches".to_string(),
            Choice::Quit => "Quit".to_string(),
        }
    }
}

/// Run the interactive command.
pub async fn run(args: InteractiveArgs, ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        anyhow::bail!("interactive mode does not support --json");
    }

    let navigator = Navigator::at("/search");
    let api = ctx.api()?;
    let routing = if args.tag_query {
        TagRouting::QueryParam
    } else {
        TagRouting::LegacyPath
    };
    let mut bar = SearchBar::new(ctx.fetcher()?, ctx.recent()?, navigator.clone())
        .with_debounce(ctx.config.search.suggest_debounce())
        .with_tag_routing(routing);
    bar.seed_catalog().await;

    let search = SearchOrchestrator::new(api, navigator.clone())
        .with_config(ctx.config.search.clone())
        .spawn();
    let mut completed = search.settled(1).await?.completed;

    loop {
        let term: String = Input::new()
            .with_prompt("Search")
            .allow_empty(true)
            .interact_text()?;

        bar.type_text(&term);
        let state = wait_for_suggestions(&bar).await;
        if let Some(notice) = &state.notice {
            ctx.output.warn(notice);
        }

        let mut choices: Vec<Choice> = state
            .suggestions
            .iter()
            .cloned()
            .map(Choice::Suggestion)
            .collect();
        if !term.trim().is_empty() {
            choices.push(Choice::Submit);
        }
        choices.extend(bar.recent().iter().cloned().map(Choice::Recent));
        if !bar.recent().is_empty() {
            choices.push(Choice::ClearRecent);
        }
        choices.push(Choice::Quit);

        let labels: Vec<String> = choices.iter().map(|c| c.label(&bar)).collect();
        let picked = Select::new()
            .with_prompt("Pick")
            .items(&labels)
            .default(0)
            .interact()?;

        let before = navigator.seq();
        match &choices[picked] {
            Choice::Suggestion(s) => bar.select_suggestion(s),
            Choice::Submit => bar.submit(),
            Choice::Recent(entry) => bar.select_recent(entry),
            Choice::ClearRecent => {
                bar.clear_recent()?;
                ctx.output.success("Cleared recent searches");
                continue;
            }
            Choice::Quit => break,
        }
        if navigator.seq() == before {
            continue;
        }

        completed = show_page(&search, completed, ctx).await?;
    }

    search.shutdown().await?;
    Ok(())
}

/// Wait until the lookup for the current term has finished.
async fn wait_for_suggestions(bar: &SearchBar) -> SuggestionState {
    let mut rx = bar.subscribe();
    let term = bar.term().to_string();
    let state = match rx.wait_for(|s| !s.loading && s.term == term).await {
        Ok(state) => state.clone(),
        Err(_) => bar.suggestions(),
    };
    state
}

async fn show_page(search: &SearchHandle, completed: u64, ctx: &Context) -> Result<u64> {
    let spinner = ctx.output.spinner("Searching");
    let snapshot = search.settled(completed + 1).await?;
    spinner.finish_and_clear();

    ctx.output.header(&snapshot.location.to_string());
    ctx.output.kv("Status", &view_badge(snapshot.view()));
    if let Some(failure) = &snapshot.error {
        ctx.output.error(&failure.message);
    } else if let Some(results) = &snapshot.results {
        ctx.output.kv("Total", &results.total.to_string());
        for item in results.items.iter().take(10) {
            ctx.output
                .list_item(&format!("{} {}", item.title, format_price(item.price)));
        }
    }
    Ok(snapshot.completed)
}
