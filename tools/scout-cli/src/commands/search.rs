//! Run one search session against a page URL.

use anyhow::{bail, Result};
use scout_search::{
    Facets, FilterState, Navigator, PriceRange, SearchHandle, SearchOrchestrator, SearchSnapshot,
};
use serde_json::json;

use super::SearchArgs;
use crate::context::Context;
use crate::output::{format_price, view_badge};

/// Run the search command.
pub async fn run(args: SearchArgs, ctx: &Context) -> Result<()> {
    let navigator = Navigator::at(&args.url);
    let location = navigator.current();
    ctx.output.debug(&format!("Loading {} ({:?})", location, location.route()));

    let search = SearchOrchestrator::new(ctx.api()?, navigator.clone())
        .with_config(ctx.config.search.clone())
        .spawn();

    let spinner = ctx.output.spinner(&format!("Searching {}", location));
    let mut snapshot = search.settled(1).await?;

    // Explicit prices are clamped to the facet bounds, so refinements wait
    // for the first response.
    if args.has_refinements() && snapshot.error.is_none() {
        if let (Some(category), Some(results)) = (&args.category, &snapshot.results) {
            if !known_category(&results.facets, category) {
                ctx.output.warn(&format!("Category \"{}\" is not in the current facets", category));
            }
        }
        spinner.set_message("Applying filters");
        snapshot = refine(&search, &args, &snapshot).await?;
    }
    spinner.finish_and_clear();
    search.shutdown().await?;

    render(&snapshot, args.tag_filter.as_deref(), ctx);

    if let Some(failure) = &snapshot.error {
        bail!("{}", failure.message);
    }

    if !args.no_record {
        record(ctx, &snapshot);
    }
    Ok(())
}

async fn refine(
    search: &SearchHandle,
    args: &SearchArgs,
    current: &SearchSnapshot,
) -> Result<SearchSnapshot> {
    let filters = refined_filters(args, current.filters.clone(), current.bounds);
    search.apply_filters(filters)?;
    Ok(search.settled(current.completed + 1).await?)
}

fn refined_filters(args: &SearchArgs, mut filters: FilterState, bounds: PriceRange) -> FilterState {
    if let Some(category) = &args.category {
        filters.category = category.clone();
    }
    if !args.tags.is_empty() {
        let mut tags = filters.tags.clone();
        tags.extend(args.tags.iter().cloned());
        filters.set_tags(tags);
    }
    if let Some(sort) = args.sort {
        filters.sort_by = sort;
    }
    if args.min.is_some() || args.max.is_some() {
        filters.price_range = PriceRange::new(
            args.min.unwrap_or(bounds.min),
            args.max.unwrap_or(bounds.max),
        );
    }
    if args.featured {
        filters.featured = true;
    }
    filters
}

fn known_category(facets: &Facets, category: &str) -> bool {
    facets
        .category_names()
        .iter()
        .any(|name| name.eq_ignore_ascii_case(category))
}

fn render(snapshot: &SearchSnapshot, tag_filter: Option<&str>, ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "location": snapshot.location.to_string(),
            "filters": snapshot.filters,
            "total": snapshot.results.as_ref().map(|r| r.total),
            "items": snapshot.results.as_ref().map(|r| &r.items),
            "facets": snapshot.results.as_ref().map(|r| &r.facets),
            "error": snapshot.error.as_ref().map(|e| &e.message),
        }));
        return;
    }

    ctx.output.header(&format!("Results for {}", snapshot.location));
    ctx.output.kv("Status", &view_badge(snapshot.view()));
    ctx.output.kv("Sort", snapshot.filters.sort_by.display_name());
    ctx.output.kv(
        "Price",
        &format!(
            "{} - {}",
            format_price(snapshot.filters.price_range.min),
            format_price(snapshot.filters.price_range.max)
        ),
    );
    if !snapshot.filters.tags.is_empty() {
        ctx.output.kv("Tags", &snapshot.filters.tags.join(", "));
    }

    let Some(results) = &snapshot.results else {
        return;
    };
    ctx.output.kv("Total", &results.total.to_string());

    if results.is_empty() {
        ctx.output.info("No items match these filters");
    } else {
        println!();
        ctx.output.table_row(&["TITLE", "PRICE", "RATING", "TAGS"], &[32, 10, 6, 0]);
        for item in &results.items {
            ctx.output.item_row(item);
        }
    }

    let facets = &results.facets;
    if !facets.categories.is_empty() {
        ctx.output.header("Categories");
        for category in &facets.categories {
            ctx.output
                .list_item(&format!("{} ({})", category.name, category.count));
        }
    }
    let tags = facets.filter_tags(tag_filter.unwrap_or_default());
    if !tags.is_empty() {
        ctx.output.header("Tags");
        for tag in &facets.tags {
            if tags.contains(&tag.name.as_str()) {
                ctx.output.list_item(&format!("{} ({})", tag.name, tag.count));
            }
        }
    } else if let Some(needle) = tag_filter {
        ctx.output.info(&format!("No tags match \"{}\"", needle));
    }
}

/// Save the URL-owned part of the search, as the search bar would.
fn record(ctx: &Context, snapshot: &SearchSnapshot) {
    let location = &snapshot.location;
    let query = location.url_query().unwrap_or_default();
    let route = location.route();
    let url_tags = location.url_tags();
    let tag = route
        .legacy_tag()
        .or_else(|| match url_tags.as_slice() {
            [single] => Some(single.as_str()),
            _ => None,
        });

    let saved = ctx.recent().and_then(|mut recent| Ok(recent.record(query, tag)?));
    match saved {
        Ok(true) => ctx.output.debug("Saved to recent searches"),
        Ok(false) => {}
        Err(e) => ctx.output.warn(&format!("Failed to save recent search: {:#}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_search::SortBy;

    fn args() -> SearchArgs {
        SearchArgs {
            url: "/search".into(),
            category: None,
            tags: Vec::new(),
            sort: None,
            min: None,
            max: None,
            featured: false,
            tag_filter: None,
            no_record: false,
        }
    }

    #[test]
    fn test_no_refinements_keeps_filters() {
        let filters = FilterState::default();
        assert!(!args().has_refinements());
        assert_eq!(refined_filters(&args(), filters.clone(), PriceRange::DEFAULT), filters);
    }

    #[test]
    fn test_known_category_ignores_case() {
        let facets: Facets = serde_json::from_str(
            r#"{"categories": [{"name": "Electronics", "count": 4}], "tags": []}"#,
        )
        .unwrap();
        assert!(known_category(&facets, "electronics"));
        assert!(!known_category(&facets, "Garden"));
    }

    #[test]
    fn test_refinements() {
        let mut args = args();
        args.category = Some("Electronics".into());
        args.tags = vec!["wireless".into(), "gaming".into()];
        args.sort = Some(SortBy::PriceAsc);
        args.max = Some(200.0);
        args.featured = true;

        let mut filters = FilterState::default();
        filters.tags = vec!["gaming".into()];
        let refined = refined_filters(&args, filters, PriceRange::new(20.0, 300.0));

        assert_eq!(refined.category, "Electronics");
        assert_eq!(refined.tags, vec!["gaming", "wireless"]);
        assert_eq!(refined.sort_by, SortBy::PriceAsc);
        assert_eq!(refined.price_range, PriceRange::new(20.0, 200.0));
        assert!(refined.featured);
    }
}
