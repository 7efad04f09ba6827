//! CLI commands.

pub mod config;
pub mod interactive;
pub mod recent;
pub mod search;
pub mod suggest;

use clap::{Args, Subcommand};
use scout_search::SortBy;

/// Arguments for the search command.
#[derive(Args)]
pub struct SearchArgs {
    /// Page URL to load, e.g. `/search?q=mouse` or `/gaming`
    #[arg(default_value = "/search")]
    pub url: String,

    /// Restrict to one category
    #[arg(long)]
    pub category: Option<String>,

    /// Additional tag to select (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Sort order (relevance, price-asc, price-desc, rating, newest)
    #[arg(long)]
    pub sort: Option<SortBy>,

    /// Minimum price
    #[arg(long)]
    pub min: Option<f64>,

    /// Maximum price
    #[arg(long)]
    pub max: Option<f64>,

    /// Only featured items
    #[arg(long)]
    pub featured: bool,

    /// Only list facet tags containing this text
    #[arg(long)]
    pub tag_filter: Option<String>,

    /// Do not record the search in the recent list
    #[arg(long)]
    pub no_record: bool,
}

impl SearchArgs {
    /// Whether any local refinement was requested.
    pub fn has_refinements(&self) -> bool {
        self.category.is_some()
            || !self.tags.is_empty()
            || self.sort.is_some()
            || self.min.is_some()
            || self.max.is_some()
            || self.featured
    }
}

/// Arguments for the suggest command.
#[derive(Args)]
pub struct SuggestArgs {
    /// Partial query
    pub partial: String,

    /// Also list the items returned with the suggestions
    #[arg(long)]
    pub items: bool,
}

/// Arguments for the recent command.
#[derive(Args)]
pub struct RecentArgs {
    #[command(subcommand)]
    pub action: Option<RecentAction>,
}

#[derive(Subcommand)]
pub enum RecentAction {
    /// List recent searches (default)
    List,
    /// Remove every recent search
    Clear {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the interactive command.
#[derive(Args)]
pub struct InteractiveArgs {
    /// Route tag searches to `/search?tags=` instead of `/<tag>`
    #[arg(long)]
    pub tag_query: bool,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Initialize a new config file
    Init {
        /// Storefront base URL
        #[arg(long, default_value = "http://localhost:3000")]
        base_url: String,
        /// File to create; a `.json` name writes JSON
        #[arg(long, default_value = "scout.toml")]
        file: String,
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}
