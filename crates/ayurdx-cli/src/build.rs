//! Offline build pipeline: harvest → extract → verify → sanitize, one
//! disease at a time.

use std::sync::Arc;
use std::time::Instant;

use ayurdx_core::{KnowledgeBase, KnowledgeRecord};
use ayurdx_harvest::{Harvest, Harvester, Topic, TopicTable, harvest_or_absent};
use ayurdx_nlp::{ExtractedKnowledge, KnowledgeExtractor, sanitize_record, verify_record};
use tracing::info;

/// A first extraction round with fewer medicines than this pulls in search
/// snippets.
const MIN_MEDICINES_BEFORE_SNIPPETS: usize = 2;

pub struct BuildStats {
    pub diseases: usize,
    /// Diseases where at least one source returned text.
    pub harvested: usize,
    /// Diseases served only by the fallback placeholders.
    pub fallback_only: usize,
    pub elapsed_secs: f64,
}

/// Harvesters in the order they are consulted.
pub struct Sources {
    pub pdf: Option<Arc<dyn Harvester>>,
    pub article: Arc<dyn Harvester>,
    pub retry: Arc<dyn Harvester>,
    pub snippets: Arc<dyn Harvester>,
}

pub struct BuildPipeline {
    sources: Sources,
    extractor: KnowledgeExtractor,
    min_pool_chars: usize,
}

/// Concatenated harvested text and the provenance of each piece.
#[derive(Default)]
struct Pool {
    text: String,
    sources: Vec<String>,
}

impl Pool {
    fn add(&mut self, harvest: Option<Harvest>) {
        let Some(harvest) = harvest else {
            return;
        };
        self.text.push_str(&harvest.text);
        self.text.push('\n');
        if !self.sources.contains(&harvest.provenance) {
            self.sources.push(harvest.provenance);
        }
    }

    fn chars(&self) -> usize {
        self.text.chars().count()
    }
}

impl BuildPipeline {
    pub fn new(sources: Sources, extractor: KnowledgeExtractor, min_pool_chars: usize) -> Self {
        Self {
            sources,
            extractor,
            min_pool_chars,
        }
    }

    /// Build one record. Never fails: with no text at all the record
    /// carries the fallback placeholders and no sources.
    pub async fn build_record(&self, topic: &Topic) -> KnowledgeRecord {
        let mut pool = Pool::default();
        if let Some(pdf) = &self.sources.pdf {
            pool.add(harvest_or_absent(pdf.as_ref(), topic).await);
        }
        pool.add(harvest_or_absent(self.sources.article.as_ref(), topic).await);

        if pool.chars() < self.min_pool_chars {
            info!(disease = %topic.disease, chars = pool.chars(), "little text, trying retry queries");
            pool.add(harvest_or_absent(self.sources.retry.as_ref(), topic).await);
        }

        let mut extracted = self.extract(&pool);
        if extracted.medicine_names.len() < MIN_MEDICINES_BEFORE_SNIPPETS {
            let before = pool.sources.len();
            pool.add(harvest_or_absent(self.sources.snippets.as_ref(), topic).await);
            if pool.sources.len() > before {
                extracted = self.extract(&pool);
            }
        }

        let mut record = extracted.into_record(pool.sources);
        verify_record(&mut record);
        sanitize_record(&mut record);
        record
    }

    fn extract(&self, pool: &Pool) -> ExtractedKnowledge {
        if pool.text.trim().is_empty() {
            return ExtractedKnowledge::default();
        }
        self.extractor.extract(&pool.text)
    }

    /// Build a fresh knowledge base for `diseases`.
    pub async fn run(&self, topics: &TopicTable, diseases: &[String]) -> (KnowledgeBase, BuildStats) {
        let start = Instant::now();
        let mut kb = KnowledgeBase::new();
        let mut harvested = 0usize;

        for (i, disease) in diseases.iter().enumerate() {
            let topic = topics.topic(disease);
            info!(
                disease = %topic.disease,
                synonym = %topic.synonym,
                progress = format!("{}/{}", i + 1, diseases.len()),
                "mining"
            );
            let record = self.build_record(&topic).await;
            if !record.source.is_empty() {
                harvested += 1;
            }
            info!(
                disease = %topic.disease,
                medicines = record.medicine_names.len(),
                sources = record.source.len(),
                "record built"
            );
            kb.insert(disease.clone(), record);
        }

        let stats = BuildStats {
            diseases: diseases.len(),
            harvested,
            fallback_only: diseases.len() - harvested,
            elapsed_secs: start.elapsed().as_secs_f64(),
        };
        (kb, stats)
    }
}
