mod build;
mod display;
mod fill;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use ayurdx_core::{KnowledgeRecord, SymptomCode};
use ayurdx_harvest::{
    ArticleHarvester, EncyclopediaHarvester, HarvestConfig, Harvester, HttpFetcher, PdfHarvester,
    RetryHarvester, SiteArticleSearch, SnippetHarvester, TopicTable,
};
use ayurdx_nlp::{
    ExtractionResult, KnowledgeExtractor, Ontology, SymptomExtractor, Vocabulary, is_sufficient,
    sanitize_knowledge_base, verify_knowledge_base,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use build::{BuildPipeline, Sources};

#[derive(Parser, Debug)]
#[command(name = "ayurdx", version, about = "Symptom extraction and Ayurvedic knowledge base tooling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract symptom codes, severity and duration from free text (JSON output)
    Extract {
        text: String,
        /// Symptom vocabulary: one code per line, or a training CSV header
        #[arg(long, env = "AYURDX_VOCAB")]
        vocab: Option<PathBuf>,
        /// Ontology rules JSON
        #[arg(long, env = "AYURDX_ONTOLOGY")]
        ontology: Option<PathBuf>,
    },
    /// Harvest, extract and clean a fresh knowledge base
    Build {
        #[command(flatten)]
        kb: KbArgs,
        /// PDF corpus to scan before the web sources
        #[arg(long, env = "AYURDX_PDF")]
        pdf: Option<PathBuf>,
        /// Disease list, one per line (default: every mapped disease)
        #[arg(long, env = "AYURDX_DISEASES")]
        diseases: Option<PathBuf>,
        #[command(flatten)]
        net: NetArgs,
    },
    /// Fill empty lists from encyclopedia text
    FillBlanks {
        #[command(flatten)]
        kb: KbArgs,
        #[command(flatten)]
        net: NetArgs,
    },
    /// Clean, dedupe and cap every record
    Sanitize {
        #[command(flatten)]
        kb: KbArgs,
    },
    /// Tag or drop medicine names that are not known Ayurvedic terms
    Verify {
        #[command(flatten)]
        kb: KbArgs,
    },
    /// Print the record for a disease (substring match as fallback)
    Lookup {
        disease: String,
        #[command(flatten)]
        kb: KbArgs,
    },
    /// Print a one-line summary of every record
    Show {
        #[command(flatten)]
        kb: KbArgs,
    },
    /// Export the knowledge base as Parquet
    #[cfg(feature = "parquet")]
    Export {
        #[command(flatten)]
        kb: KbArgs,
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Args, Debug)]
struct KbArgs {
    /// Knowledge base snapshot (JSON)
    #[arg(long = "kb", env = "AYURDX_KB", default_value = "data/ayurveda_kb.json")]
    path: PathBuf,
}

#[derive(Args, Debug)]
struct NetArgs {
    /// Minimum gap between requests to the same host
    #[arg(long, env = "AYURDX_PACING_MS", default_value_t = 1000)]
    pacing_ms: u64,
    /// Per-request timeout
    #[arg(long, env = "AYURDX_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,
}

impl NetArgs {
    fn config(&self) -> HarvestConfig {
        HarvestConfig {
            pacing: Duration::from_millis(self.pacing_ms),
            timeout: Duration::from_secs(self.timeout_secs),
            ..HarvestConfig::default()
        }
    }
}

#[derive(Serialize)]
struct ExtractOutput<'a> {
    #[serde(flatten)]
    result: &'a ExtractionResult,
    unencoded_codes: &'a [SymptomCode],
    sufficient: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Extract {
            text,
            vocab,
            ontology,
        } => cmd_extract(&text, vocab.as_deref(), ontology.as_deref()),
        Command::Build {
            kb,
            pdf,
            diseases,
            net,
        } => cmd_build(&kb.path, pdf, diseases.as_deref(), &net.config()).await,
        Command::FillBlanks { kb, net } => cmd_fill_blanks(&kb.path, &net.config()).await,
        Command::Sanitize { kb } => {
            let mut base = ayurdx_store::load(&kb.path)?;
            let report = sanitize_knowledge_base(&mut base);
            ayurdx_store::save(&base, &kb.path)?;
            eprintln!(
                "Sanitized {} records ({} changed, {} medicines and {} sentences removed)",
                report.records, report.changed, report.medicines_removed, report.sentences_removed
            );
            Ok(())
        }
        Command::Verify { kb } => {
            let mut base = ayurdx_store::load(&kb.path)?;
            let report = verify_knowledge_base(&mut base);
            ayurdx_store::save(&base, &kb.path)?;
            eprintln!(
                "Checked {} medicines: {} verified, {} flagged, {} dropped",
                report.checked, report.verified, report.flagged, report.dropped
            );
            Ok(())
        }
        Command::Lookup { disease, kb } => {
            let base = ayurdx_store::load(&kb.path)?;
            match ayurdx_store::lookup(&base, &disease) {
                Some((name, record)) => display::print_record_card(name, record),
                None => display::print_record_card(&disease, &KnowledgeRecord::not_found()),
            }
            Ok(())
        }
        Command::Show { kb } => {
            let base = ayurdx_store::load(&kb.path)?;
            display::print_summary(&base);
            Ok(())
        }
        #[cfg(feature = "parquet")]
        Command::Export { kb, out } => {
            let base = ayurdx_store::load(&kb.path)?;
            let rows = ayurdx_store::write_parquet(&base, &out)
                .with_context(|| format!("writing {}", out.display()))?;
            eprintln!("Exported {rows} records to {}", out.display());
            Ok(())
        }
    }
}

fn cmd_extract(text: &str, vocab: Option<&Path>, ontology: Option<&Path>) -> anyhow::Result<()> {
    let vocabulary = Vocabulary::load(vocab).context("loading symptom vocabulary")?;
    let ontology = Ontology::load(ontology).context("loading ontology")?;
    let extractor = SymptomExtractor::new(ontology, vocabulary);

    let result = extractor.extract(text);
    let output = ExtractOutput {
        result: &result,
        unencoded_codes: result.unencoded_codes(),
        sufficient: is_sufficient(&result),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn cmd_build(
    kb_path: &Path,
    pdf: Option<PathBuf>,
    diseases: Option<&Path>,
    config: &HarvestConfig,
) -> anyhow::Result<()> {
    let topics = TopicTable::builtin().context("loading topic table")?;
    let diseases = match diseases {
        Some(path) => ayurdx_harvest::topics::read_disease_list(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => topics.diseases().to_vec(),
    };

    let http = Arc::new(HttpFetcher::new(config).context("building HTTP client")?);
    let search = Arc::new(SiteArticleSearch::new(
        Arc::clone(&http),
        config.article_search_url.clone(),
    ));
    let pdf = pdf.map(|path| Arc::new(PdfHarvester::new(path)) as Arc<dyn Harvester>);
    if pdf.is_none() {
        info!("no PDF corpus configured, web sources only");
    }
    let sources = Sources {
        pdf,
        article: Arc::new(ArticleHarvester::new(search.clone())),
        retry: Arc::new(RetryHarvester::new(search, topics.retry_queries().clone())),
        snippets: Arc::new(SnippetHarvester::new(
            Arc::clone(&http),
            config.snippet_search_url.clone(),
        )),
    };
    let pipeline = BuildPipeline::new(sources, KnowledgeExtractor::default(), config.min_pool_chars);

    eprintln!("Building knowledge base for {} diseases", diseases.len());
    let (kb, stats) = pipeline.run(&topics, &diseases).await;
    ayurdx_store::save(&kb, kb_path).context("saving knowledge base")?;
    eprintln!(
        "Built {} records in {:.1}s ({} harvested, {} fallback only) → {}",
        stats.diseases,
        stats.elapsed_secs,
        stats.harvested,
        stats.fallback_only,
        kb_path.display()
    );
    Ok(())
}

async fn cmd_fill_blanks(kb_path: &Path, config: &HarvestConfig) -> anyhow::Result<()> {
    let mut kb = ayurdx_store::load(kb_path)?;
    let topics = TopicTable::builtin().context("loading topic table")?;
    let http = Arc::new(HttpFetcher::new(config).context("building HTTP client")?);
    let harvester = EncyclopediaHarvester::new(
        http,
        config.encyclopedia_api_url.clone(),
        config.encyclopedia_chars,
    );

    let stats = fill::run_fill_blanks(&mut kb, &harvester, &topics).await;
    if stats.changed > 0 {
        ayurdx_store::save(&kb, kb_path).context("saving knowledge base")?;
    }
    eprintln!(
        "{} records had blanks, {} updated",
        stats.candidates, stats.changed
    );
    Ok(())
}
