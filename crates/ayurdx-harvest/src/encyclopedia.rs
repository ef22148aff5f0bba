//! Encyclopedia harvester, used when filling blanks in an existing snapshot.
//!
//! Two MediaWiki API calls per query: a full-text search for the best
//! title, then a plain-text extract of that page.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use ayurdx_core::record::SOURCE_ENCYCLOPEDIA;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::http::HttpFetcher;
use crate::{Harvest, Harvester, Topic};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: HashMap<String, ExtractPage>,
}

#[derive(Debug, Deserialize)]
struct ExtractPage {
    #[serde(default)]
    extract: Option<String>,
}

/// First title of a search response.
fn first_title(resp: SearchResponse) -> Option<String> {
    resp.query?.search.into_iter().next().map(|hit| hit.title)
}

/// Non-empty page text of an extract response.
fn page_extract(resp: ExtractResponse) -> Option<String> {
    resp.query?
        .pages
        .into_values()
        .filter_map(|page| page.extract)
        .find(|text| !text.trim().is_empty())
}

/// Keep at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

pub struct EncyclopediaHarvester {
    http: Arc<HttpFetcher>,
    api_url: String,
    max_chars: usize,
}

impl EncyclopediaHarvester {
    pub fn new(http: Arc<HttpFetcher>, api_url: impl Into<String>, max_chars: usize) -> Self {
        Self {
            http,
            api_url: api_url.into(),
            max_chars,
        }
    }

    /// Queries tried in order for `disease`.
    pub fn queries(disease: &str) -> [String; 2] {
        [
            format!("{disease} Ayurveda"),
            format!("{disease} alternative medicine"),
        ]
    }

    async fn page_for(&self, query: &str) -> Result<Option<String>, FetchError> {
        let search: SearchResponse = self
            .http
            .get_json(
                &self.api_url,
                &[
                    ("action", "query"),
                    ("list", "search"),
                    ("srsearch", query),
                    ("format", "json"),
                ],
            )
            .await?;
        let Some(title) = first_title(search) else {
            return Ok(None);
        };
        debug!(query, title = %title, "encyclopedia search hit");
        let extract: ExtractResponse = self
            .http
            .get_json(
                &self.api_url,
                &[
                    ("action", "query"),
                    ("prop", "extracts"),
                    ("explaintext", "1"),
                    ("redirects", "1"),
                    ("titles", title.as_str()),
                    ("format", "json"),
                ],
            )
            .await?;
        Ok(page_extract(extract))
    }
}

#[async_trait]
impl Harvester for EncyclopediaHarvester {
    fn name(&self) -> &str {
        "encyclopedia"
    }

    async fn fetch(&self, topic: &Topic) -> Result<Harvest, FetchError> {
        for query in Self::queries(&topic.disease) {
            match self.page_for(&query).await {
                Ok(Some(text)) => {
                    info!(disease = %topic.disease, query = %query, "encyclopedia page found");
                    return Ok(Harvest::new(
                        truncate_chars(&text, self.max_chars),
                        SOURCE_ENCYCLOPEDIA,
                    ));
                }
                Ok(None) => debug!(query = %query, "no encyclopedia page"),
                Err(e) => debug!(query = %query, error = %e, "encyclopedia query failed"),
            }
        }
        Err(FetchError::NotFound(topic.disease.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_search_title() {
        let json = r#"{"batchcomplete":"","query":{"searchinfo":{"totalhits":2},
            "search":[{"ns":0,"title":"Jaundice","pageid":1},{"ns":0,"title":"Kamala","pageid":2}]}}"#;
        let resp: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(first_title(resp).as_deref(), Some("Jaundice"));
    }

    #[test]
    fn empty_search_has_no_title() {
        let resp: SearchResponse =
            serde_json::from_str(r#"{"query":{"search":[]}}"#).unwrap();
        assert!(first_title(resp).is_none());
        let resp: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(first_title(resp).is_none());
    }

    #[test]
    fn parses_page_extract() {
        let json = r#"{"query":{"pages":{"4242":{"pageid":4242,"title":"Jaundice",
            "extract":"Jaundice is a yellowish pigmentation of the skin."}}}}"#;
        let resp: ExtractResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            page_extract(resp).as_deref(),
            Some("Jaundice is a yellowish pigmentation of the skin.")
        );
    }

    #[test]
    fn missing_page_has_no_extract() {
        let json = r#"{"query":{"pages":{"-1":{"ns":0,"title":"Nope","missing":""}}}}"#;
        let resp: ExtractResponse = serde_json::from_str(json).unwrap();
        assert!(page_extract(resp).is_none());
    }

    #[test]
    fn truncates_on_char_boundary() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("ñandú", 4), "ñand");
        assert_eq!(truncate_chars("ab", 3000), "ab");
    }

    #[test]
    fn query_order() {
        let [first, second] = EncyclopediaHarvester::queries("Malaria");
        assert_eq!(first, "Malaria Ayurveda");
        assert_eq!(second, "Malaria alternative medicine");
    }
}
