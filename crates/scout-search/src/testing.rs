//! Test doubles shared by the module tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::api::SearchApi;
use crate::error::SearchError;
use crate::filter::PriceRange;
use crate::model::{FacetCount, Facets, Item, ResultSet, SuggestionResponse};
use crate::request::SearchRequest;

pub(crate) type Pairs = Vec<(String, String)>;

struct Scripted<T> {
    delay: Duration,
    result: Result<T, SearchError>,
}

/// Scripted in-process [`SearchApi`].
///
/// Every call is recorded. Scripted responses are consumed in order; once
/// they run out, searches answer after 20 ms with one item per sent tag.
#[derive(Default)]
pub(crate) struct FakeApi {
    searches: Mutex<Vec<Pairs>>,
    suggests: Mutex<Vec<String>>,
    search_script: Mutex<VecDeque<Scripted<ResultSet>>>,
    suggest_script: Mutex<VecDeque<Scripted<SuggestionResponse>>>,
}

impl FakeApi {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn push_search(&self, delay_ms: u64, result: Result<ResultSet, SearchError>) {
        self.search_script.lock().unwrap().push_back(Scripted {
            delay: Duration::from_millis(delay_ms),
            result,
        });
    }

    pub(crate) fn push_suggest(
        &self,
        delay_ms: u64,
        result: Result<SuggestionResponse, SearchError>,
    ) {
        self.suggest_script.lock().unwrap().push_back(Scripted {
            delay: Duration::from_millis(delay_ms),
            result,
        });
    }

    pub(crate) fn searches(&self) -> Vec<Pairs> {
        self.searches.lock().unwrap().clone()
    }

    pub(crate) fn suggests(&self) -> Vec<String> {
        self.suggests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchApi for FakeApi {
    async fn search(&self, request: &SearchRequest) -> Result<ResultSet, SearchError> {
        self.searches.lock().unwrap().push(request.to_query_pairs());
        let scripted = self.search_script.lock().unwrap().pop_front();
        let scripted = scripted.unwrap_or_else(|| Scripted {
            delay: Duration::from_millis(20),
            result: Ok(results_for(&request.tags)),
        });
        tokio::time::sleep(scripted.delay).await;
        scripted.result
    }

    async fn suggest(&self, query: &str) -> Result<SuggestionResponse, SearchError> {
        self.suggests.lock().unwrap().push(query.to_string());
        let scripted = self.suggest_script.lock().unwrap().pop_front();
        let scripted = scripted.unwrap_or_else(|| Scripted {
            delay: Duration::from_millis(20),
            result: Ok(SuggestionResponse {
                suggestions: vec![format!("{query} pro")],
                items: Vec::new(),
            }),
        });
        tokio::time::sleep(scripted.delay).await;
        scripted.result
    }
}

pub(crate) fn item(id: &str, title: &str, tags: &[&str]) -> Item {
    Item {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        price: 99.0,
        rating: 4.0,
        image_url: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

/// One item per tag, titled after it.
pub(crate) fn results_for(tags: &[String]) -> ResultSet {
    let items: Vec<Item> = tags
        .iter()
        .enumerate()
        .map(|(i, tag)| item(&i.to_string(), tag, &[tag.as_str()]))
        .collect();
    ResultSet {
        total: items.len() as u64,
        facets: Facets {
            tags: tags
                .iter()
                .map(|t| FacetCount {
                    name: t.clone(),
                    count: 1,
                })
                .collect(),
            ..Facets::default()
        },
        items,
    }
}

/// Results reporting `bounds` as the price facet.
pub(crate) fn results_with_bounds(titles: &[&str], bounds: PriceRange) -> ResultSet {
    let items: Vec<Item> = titles
        .iter()
        .enumerate()
        .map(|(i, title)| item(&i.to_string(), title, &[]))
        .collect();
    ResultSet {
        total: items.len() as u64,
        items,
        facets: Facets {
            price_range: bounds,
            ..Facets::default()
        },
    }
}
