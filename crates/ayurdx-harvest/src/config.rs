//! Harvest configuration.

use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Network and budget settings shared by every remote harvester.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Per-request timeout.
    pub timeout: Duration,
    pub user_agent: String,
    /// Minimum gap between two requests to the same host.
    pub pacing: Duration,
    /// Character budget for encyclopedia page text.
    pub encyclopedia_chars: usize,
    /// Pooled text shorter than this triggers the retry queries.
    pub min_pool_chars: usize,
    pub article_search_url: String,
    pub snippet_search_url: String,
    pub encyclopedia_api_url: String,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            pacing: Duration::from_millis(1000),
            encyclopedia_chars: 3000,
            min_pool_chars: 500,
            article_search_url: "https://www.easyayurveda.com/".to_string(),
            snippet_search_url: "https://html.duckduckgo.com/html/".to_string(),
            encyclopedia_api_url: "https://en.wikipedia.org/w/api.php".to_string(),
        }
    }
}
