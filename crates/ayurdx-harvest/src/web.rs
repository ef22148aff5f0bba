//! Web harvesters: article search, retry queries, and search snippets.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use ayurdx_core::record::{SOURCE_WEB_PRIMARY, SOURCE_WEB_SEARCH, retry_source};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use crate::error::FetchError;
use crate::http::HttpFetcher;
use crate::{Harvest, Harvester, Topic};

// ── HTML parsing ──

struct Selectors {
    result_link: Selector,
    entry_title_link: Selector,
    article: Selector,
    main: Selector,
    body: Selector,
    paragraph: Selector,
    snippet: Selector,
}

fn selectors() -> &'static Selectors {
    static SELECTORS: OnceLock<Selectors> = OnceLock::new();
    SELECTORS.get_or_init(|| Selectors {
        result_link: Selector::parse("article h2 a").expect("result link selector"),
        entry_title_link: Selector::parse(".entry-title a").expect("entry title selector"),
        article: Selector::parse("article").expect("article selector"),
        main: Selector::parse("main").expect("main selector"),
        body: Selector::parse("body").expect("body selector"),
        paragraph: Selector::parse("p").expect("paragraph selector"),
        snippet: Selector::parse("a.result__snippet").expect("snippet selector"),
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// The `href` of the first search result on an article search page.
pub fn first_article_link(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let s = selectors();
    document
        .select(&s.result_link)
        .next()
        .or_else(|| document.select(&s.entry_title_link).next())
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string)
}

/// Paragraph text of an article page, one paragraph per line.
///
/// Paragraphs are taken from the first `article`, else `main`, else `body`.
pub fn article_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let s = selectors();
    let root = document
        .select(&s.article)
        .next()
        .or_else(|| document.select(&s.main).next())
        .or_else(|| document.select(&s.body).next())
        .unwrap_or_else(|| document.root_element());
    root.select(&s.paragraph)
        .map(element_text)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// All result snippets on a search page, joined with spaces.
pub fn snippet_text(html: &str) -> String {
    let document = Html::parse_document(html);
    document
        .select(&selectors().snippet)
        .map(element_text)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// ── Article search ──

/// Finds the first article for a free-text query and returns its text.
#[async_trait]
pub trait ArticleSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<String, FetchError>;
}

/// Site search followed by a crawl of the first result.
pub struct SiteArticleSearch {
    http: Arc<HttpFetcher>,
    search_url: String,
}

impl SiteArticleSearch {
    pub fn new(http: Arc<HttpFetcher>, search_url: impl Into<String>) -> Self {
        Self {
            http,
            search_url: search_url.into(),
        }
    }
}

#[async_trait]
impl ArticleSearch for SiteArticleSearch {
    async fn search(&self, query: &str) -> Result<String, FetchError> {
        let page = self.http.get_text(&self.search_url, &[("s", query)]).await?;
        let href = first_article_link(&page).ok_or_else(|| FetchError::NotFound(query.into()))?;
        let url = reqwest::Url::parse(&self.search_url)
            .and_then(|base| base.join(&href))
            .map_err(|e| FetchError::NotFound(format!("bad article link {href}: {e}")))?;
        info!(query, url = %url, "crawling article");
        let text = article_text(&self.http.get_text(url.as_str(), &[]).await?);
        if text.trim().is_empty() {
            return Err(FetchError::NotFound(query.into()));
        }
        Ok(text)
    }
}

/// Primary web source: `"<synonym> treatment"`.
pub struct ArticleHarvester {
    search: Arc<dyn ArticleSearch>,
}

impl ArticleHarvester {
    pub fn new(search: Arc<dyn ArticleSearch>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl Harvester for ArticleHarvester {
    fn name(&self) -> &str {
        "article"
    }

    async fn fetch(&self, topic: &Topic) -> Result<Harvest, FetchError> {
        let text = self
            .search
            .search(&format!("{} treatment", topic.synonym))
            .await?;
        Ok(Harvest::new(text, SOURCE_WEB_PRIMARY))
    }
}

/// Alternate queries for diseases with poor primary coverage.
///
/// Queries are tried in order; the first non-empty article wins and is
/// tagged with the query that found it.
pub struct RetryHarvester {
    search: Arc<dyn ArticleSearch>,
    queries: BTreeMap<String, Vec<String>>,
}

impl RetryHarvester {
    pub fn new(search: Arc<dyn ArticleSearch>, queries: BTreeMap<String, Vec<String>>) -> Self {
        Self { search, queries }
    }

    pub fn covers(&self, disease: &str) -> bool {
        self.queries.contains_key(disease)
    }
}

#[async_trait]
impl Harvester for RetryHarvester {
    fn name(&self) -> &str {
        "retry"
    }

    async fn fetch(&self, topic: &Topic) -> Result<Harvest, FetchError> {
        let queries = self.queries.get(&topic.disease).map(Vec::as_slice).unwrap_or_default();
        for query in queries {
            info!(disease = %topic.disease, query = %query, "retrying with alternate query");
            match self.search.search(query).await {
                Ok(text) if !text.trim().is_empty() => {
                    return Ok(Harvest::new(text, retry_source(query)));
                }
                Ok(_) => debug!(query = %query, "empty article"),
                Err(e) => debug!(query = %query, error = %e, "retry query failed"),
            }
        }
        Err(FetchError::NotFound(topic.disease.clone()))
    }
}

// ── Search snippets ──

/// Pools result snippets for `"<disease> <synonym> best ayurvedic medicine herbs"`.
pub struct SnippetHarvester {
    http: Arc<HttpFetcher>,
    search_url: String,
}

impl SnippetHarvester {
    pub fn new(http: Arc<HttpFetcher>, search_url: impl Into<String>) -> Self {
        Self {
            http,
            search_url: search_url.into(),
        }
    }
}

#[async_trait]
impl Harvester for SnippetHarvester {
    fn name(&self) -> &str {
        "snippets"
    }

    async fn fetch(&self, topic: &Topic) -> Result<Harvest, FetchError> {
        let query = format!(
            "{} {} best ayurvedic medicine herbs",
            topic.disease, topic.synonym
        );
        let page = self.http.get_text(&self.search_url, &[("q", query.as_str())]).await?;
        let text = snippet_text(&page);
        if text.is_empty() {
            return Err(FetchError::NotFound(query));
        }
        Ok(Harvest::new(text, SOURCE_WEB_SEARCH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    const SEARCH_PAGE: &str = r#"<html><body>
        <div class="sidebar"><a href="/about">About</a></div>
        <article><h2><a href="https://www.easyayurveda.com/kamala-treatment/">Kamala</a></h2></article>
        <article><h2><a href="/second/">Second</a></h2></article>
    </body></html>"#;

    const ARTICLE_PAGE: &str = r#"<html><body>
        <nav><p>Menu</p></nav>
        <article>
          <h1>Kamala treatment</h1>
          <p>Use  Triphala   Churna with honey.</p>
          <p></p>
          <p>Avoid <b>oily</b> food.</p>
        </article>
    </body></html>"#;

    #[test]
    fn picks_first_result_link() {
        assert_eq!(
            first_article_link(SEARCH_PAGE).as_deref(),
            Some("https://www.easyayurveda.com/kamala-treatment/")
        );
    }

    #[test]
    fn falls_back_to_entry_title() {
        let html = r#"<div class="entry-title"><a href="/x/">X</a></div>"#;
        assert_eq!(first_article_link(html).as_deref(), Some("/x/"));
        assert!(first_article_link("<p>No results</p>").is_none());
    }

    #[test]
    fn article_paragraphs_only_from_root() {
        assert_eq!(
            article_text(ARTICLE_PAGE),
            "Use Triphala Churna with honey.\nAvoid oily food."
        );
    }

    #[test]
    fn article_without_article_tag_uses_body() {
        let html = "<html><body><p>Plain page text.</p></body></html>";
        assert_eq!(article_text(html), "Plain page text.");
    }

    #[test]
    fn snippets_are_joined() {
        let html = r##"<div>
            <a class="result__snippet" href="#">Neem is used for <b>skin</b>.</a>
            <a class="result__a" href="#">Title</a>
            <a class="result__snippet" href="#">Guduchi boosts immunity.</a>
        </div>"##;
        assert_eq!(
            snippet_text(html),
            "Neem is used for skin. Guduchi boosts immunity."
        );
    }

    /// Answers from a fixed table and records every query it sees.
    struct StubSearch {
        answers: BTreeMap<String, String>,
        seen: Mutex<Vec<String>>,
    }

    impl StubSearch {
        fn new(answers: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self {
                answers: answers
                    .iter()
                    .map(|(q, a)| (q.to_string(), a.to_string()))
                    .collect(),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ArticleSearch for StubSearch {
        async fn search(&self, query: &str) -> Result<String, FetchError> {
            self.seen.lock().unwrap().push(query.to_string());
            self.answers
                .get(query)
                .cloned()
                .ok_or_else(|| FetchError::NotFound(query.into()))
        }
    }

    fn topic(disease: &str, synonym: &str) -> Topic {
        Topic {
            disease: disease.into(),
            synonym: synonym.into(),
        }
    }

    #[tokio::test]
    async fn article_harvester_queries_synonym() {
        let search = StubSearch::new(&[("Kamala treatment", "Text about Kamala.")]);
        let harvester = ArticleHarvester::new(search.clone());
        let harvest = harvester.fetch(&topic("Jaundice", "Kamala")).await.unwrap();
        assert_eq!(harvest.text, "Text about Kamala.");
        assert_eq!(harvest.provenance, SOURCE_WEB_PRIMARY);
    }

    #[tokio::test]
    async fn retry_stops_at_first_success() {
        let search = StubSearch::new(&[
            ("Enteric fever ayurveda", "Found it."),
            ("Vishamajwara", "Also here."),
        ]);
        let queries = BTreeMap::from([(
            "Typhoid".to_string(),
            vec![
                "Jwara treatment".to_string(),
                "Enteric fever ayurveda".to_string(),
                "Vishamajwara".to_string(),
            ],
        )]);
        let harvester = RetryHarvester::new(search.clone(), queries);
        let harvest = harvester.fetch(&topic("Typhoid", "Jwara")).await.unwrap();
        assert_eq!(harvest.text, "Found it.");
        assert_eq!(harvest.provenance, "EasyAyurveda (Enteric fever ayurveda)");
        assert_eq!(
            *search.seen.lock().unwrap(),
            vec!["Jwara treatment", "Enteric fever ayurveda"]
        );
    }

    #[tokio::test]
    async fn retry_skips_empty_text_and_reports_absent() {
        let search = StubSearch::new(&[("Dandaka jwara", "   ")]);
        let queries = BTreeMap::from([(
            "Dengue".to_string(),
            vec!["Dandaka jwara".to_string(), "Viral fever ayurveda".to_string()],
        )]);
        let harvester = RetryHarvester::new(search, queries);
        assert!(harvester.covers("Dengue"));
        assert!(!harvester.covers("Acne"));
        let err = harvester.fetch(&topic("Dengue", "Dandaka jwara")).await.unwrap_err();
        assert!(err.is_absent());
    }

    #[tokio::test]
    async fn retry_without_queries_is_absent() {
        let harvester = RetryHarvester::new(StubSearch::new(&[]), BTreeMap::new());
        let err = harvester.fetch(&topic("Acne", "Acne")).await.unwrap_err();
        assert!(err.is_absent());
    }
}
