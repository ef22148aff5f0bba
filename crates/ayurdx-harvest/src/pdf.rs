//! PDF corpus harvester.
//!
//! Pages are extracted once and cached; every topic then scans the cached
//! page text for the disease name or its traditional synonym.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use ayurdx_core::record::SOURCE_PDF;
use lopdf::Document;
use regex::Regex;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::{Harvest, Harvester, Topic};

const CONTEXT_BEFORE: usize = 500;
const CONTEXT_AFTER: usize = 1500;

/// A context window is kept only if it mentions one of these.
const TREATMENT_KEYWORDS: &[&str] = &[
    "treatment",
    "cure",
    "medicine",
    "remedy",
    "paste",
    "oil",
    "decoction",
];

pub struct PdfHarvester {
    path: PathBuf,
    pages: OnceCell<Arc<Vec<String>>>,
}

impl PdfHarvester {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pages: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn pages(&self) -> Result<Arc<Vec<String>>, FetchError> {
        let pages = self
            .pages
            .get_or_try_init(|| async {
                let path = self.path.clone();
                let pages = tokio::task::spawn_blocking(move || load_pages(&path))
                    .await
                    .map_err(std::io::Error::other)??;
                info!(path = %self.path.display(), pages = pages.len(), "loaded PDF corpus");
                Ok::<_, FetchError>(Arc::new(pages))
            })
            .await?;
        Ok(Arc::clone(pages))
    }
}

#[async_trait]
impl Harvester for PdfHarvester {
    fn name(&self) -> &str {
        "pdf"
    }

    async fn fetch(&self, topic: &Topic) -> Result<Harvest, FetchError> {
        let pages = self.pages().await?;
        let pattern = topic_pattern(topic)?;
        match scan_pages(&pages, &pattern) {
            Some(text) => Ok(Harvest::new(text, SOURCE_PDF)),
            None => Err(FetchError::NotFound(topic.disease.clone())),
        }
    }
}

fn load_pages(path: &Path) -> Result<Vec<String>, FetchError> {
    let doc = Document::load(path)?;
    let mut pages = Vec::new();
    for page_num in doc.get_pages().keys() {
        match doc.extract_text(&[*page_num]) {
            Ok(text) => pages.push(text),
            Err(e) => {
                debug!(page = page_num, error = %e, "skipping unreadable page");
                pages.push(String::new());
            }
        }
    }
    Ok(pages)
}

/// Case-insensitive alternation of the disease name and its synonym.
fn topic_pattern(topic: &Topic) -> Result<Regex, FetchError> {
    let mut alternatives = vec![regex::escape(&topic.disease)];
    if !topic.synonym.eq_ignore_ascii_case(&topic.disease) {
        alternatives.push(regex::escape(&topic.synonym));
    }
    Regex::new(&format!("(?i)(?:{})", alternatives.join("|")))
        .map_err(|e| FetchError::NotFound(format!("{}: {e}", topic.disease)))
}

/// Return the first treatment context across `pages`.
///
/// On each page only the first hit is considered: a window of 500
/// characters before and 1500 after it. The page is accepted if that
/// window mentions a treatment keyword; otherwise scanning moves on.
pub fn scan_pages(pages: &[String], pattern: &Regex) -> Option<String> {
    for (index, text) in pages.iter().enumerate() {
        let Some(hit) = pattern.find(text) else {
            continue;
        };
        let at = text[..hit.start()].chars().count();
        let start = at.saturating_sub(CONTEXT_BEFORE);
        let context: String = text
            .chars()
            .skip(start)
            .take(at + CONTEXT_AFTER - start)
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect();
        let lower = context.to_lowercase();
        if TREATMENT_KEYWORDS.iter().any(|k| lower.contains(k)) {
            debug!(page = index + 1, "treatment context found");
            return Some(format!("...{context}..."));
        }
    }
    None
}
