//! Source harvesters: fetch raw treatment text for a disease topic from a
//! PDF corpus, web articles, search snippets, or an encyclopedia.
//!
//! Every harvester reports failure as a [`FetchError`]; the pipeline turns
//! any failure into "absent" with [`harvest_or_absent`] so one source never
//! aborts another.

pub mod config;
pub mod encyclopedia;
pub mod error;
pub mod http;
pub mod pacing;
pub mod pdf;
pub mod topics;
pub mod web;

use async_trait::async_trait;
use tracing::{info, warn};

pub use config::HarvestConfig;
pub use encyclopedia::EncyclopediaHarvester;
pub use error::FetchError;
pub use http::HttpFetcher;
pub use pacing::HostPacer;
pub use pdf::PdfHarvester;
pub use topics::TopicTable;
pub use web::{
    ArticleHarvester, ArticleSearch, RetryHarvester, SiteArticleSearch, SnippetHarvester,
};

/// A disease and the traditional term used to search for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub disease: String,
    pub synonym: String,
}

/// Raw text from one source, with its provenance tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Harvest {
    pub text: String,
    pub provenance: String,
}

impl Harvest {
    pub fn new(text: impl Into<String>, provenance: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            provenance: provenance.into(),
        }
    }
}

#[async_trait]
pub trait Harvester: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    async fn fetch(&self, topic: &Topic) -> Result<Harvest, FetchError>;
}

/// Run `harvester`, logging and swallowing any failure.
pub async fn harvest_or_absent(harvester: &dyn Harvester, topic: &Topic) -> Option<Harvest> {
    match harvester.fetch(topic).await {
        Ok(harvest) if !harvest.text.trim().is_empty() => {
            info!(
                harvester = harvester.name(),
                disease = %topic.disease,
                chars = harvest.text.len(),
                "harvested"
            );
            Some(harvest)
        }
        Ok(_) => {
            info!(harvester = harvester.name(), disease = %topic.disease, "empty text");
            None
        }
        Err(e) if e.is_absent() => {
            info!(harvester = harvester.name(), disease = %topic.disease, "nothing found");
            None
        }
        Err(e) => {
            warn!(
                harvester = harvester.name(),
                disease = %topic.disease,
                error = %e,
                "harvester failed"
            );
            None
        }
    }
}
