//! Lexical ontology: static rule tables mapping natural-language triggers to
//! symptom codes, plus the severity lexicon and default duration.
//!
//! Rules are held as one list sorted by [`RuleStage`], so precedence is a
//! property of the data rather than of call order. Built once at start-up
//! and shared read-only.

use std::collections::BTreeSet;
use std::path::Path;

use ayurdx_core::{Severity, SymptomCode};
use serde::Deserialize;
use thiserror::Error;

const EMBEDDED_ONTOLOGY: &str = include_str!("../data/ontology.json");

#[derive(Debug, Error)]
pub enum OntologyError {
    #[error("failed to read ontology {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("invalid ontology JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{stage} rule has an empty trigger")]
    EmptyTrigger { stage: RuleStage },
    #[error("{stage} rule '{trigger}' maps to no codes")]
    NoCodes { stage: RuleStage, trigger: String },
}

// ── Rule model ──

/// Matching stage, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStage {
    ExactPhrase,
    Keyword,
    PairIntersection,
}

impl RuleStage {
    /// Evaluation order: most specific first, most permissive last.
    pub const ORDER: [RuleStage; 3] = [
        RuleStage::ExactPhrase,
        RuleStage::Keyword,
        RuleStage::PairIntersection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExactPhrase => "exact_phrase",
            Self::Keyword => "keyword",
            Self::PairIntersection => "pair_intersection",
        }
    }
}

impl std::fmt::Display for RuleStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OntologyRule {
    ExactPhrase {
        phrase: String,
        codes: Vec<SymptomCode>,
    },
    Keyword {
        word: String,
        codes: Vec<SymptomCode>,
    },
    PairIntersection {
        first: String,
        second: String,
        code: SymptomCode,
    },
}

impl OntologyRule {
    pub fn stage(&self) -> RuleStage {
        match self {
            Self::ExactPhrase { .. } => RuleStage::ExactPhrase,
            Self::Keyword { .. } => RuleStage::Keyword,
            Self::PairIntersection { .. } => RuleStage::PairIntersection,
        }
    }

    pub fn codes(&self) -> &[SymptomCode] {
        match self {
            Self::ExactPhrase { codes, .. } | Self::Keyword { codes, .. } => codes,
            Self::PairIntersection { code, .. } => std::slice::from_ref(code),
        }
    }

    /// Human-readable trigger, e.g. `body pain` or `skin+yellow`.
    pub fn trigger(&self) -> String {
        match self {
            Self::ExactPhrase { phrase, .. } => phrase.clone(),
            Self::Keyword { word, .. } => word.clone(),
            Self::PairIntersection { first, second, .. } => format!("{first}+{second}"),
        }
    }
}

// ── On-disk format ──

#[derive(Deserialize)]
struct RawOntology {
    phrases: Vec<RawPhrase>,
    keywords: Vec<RawKeyword>,
    pairs: Vec<RawPair>,
    #[serde(default)]
    severity: RawSeverity,
    #[serde(default = "default_duration")]
    default_duration: String,
}

#[derive(Deserialize)]
struct RawPhrase {
    phrase: String,
    codes: Vec<SymptomCode>,
}

#[derive(Deserialize)]
struct RawKeyword {
    word: String,
    codes: Vec<SymptomCode>,
}

#[derive(Deserialize)]
struct RawPair {
    words: [String; 2],
    code: SymptomCode,
}

#[derive(Deserialize, Default)]
struct RawSeverity {
    #[serde(default)]
    high: Vec<String>,
    #[serde(default)]
    low: Vec<String>,
}

fn default_duration() -> String {
    "Recent".to_string()
}

// ── Ontology ──

/// Immutable rule set plus metadata lexicons.
#[derive(Debug, Clone)]
pub struct Ontology {
    rules: Vec<OntologyRule>,
    high_severity: Vec<String>,
    low_severity: Vec<String>,
    default_duration: String,
}

impl Ontology {
    pub fn from_json(json: &str) -> Result<Self, OntologyError> {
        let raw: RawOntology = serde_json::from_str(json)?;

        let mut rules = Vec::with_capacity(raw.phrases.len() + raw.keywords.len() + raw.pairs.len());
        rules.extend(raw.phrases.into_iter().map(|p| OntologyRule::ExactPhrase {
            phrase: p.phrase.trim().to_lowercase(),
            codes: p.codes,
        }));
        rules.extend(raw.keywords.into_iter().map(|k| OntologyRule::Keyword {
            word: k.word.trim().to_lowercase(),
            codes: k.codes,
        }));
        rules.extend(raw.pairs.into_iter().map(|p| {
            let [first, second] = p.words;
            OntologyRule::PairIntersection {
                first: first.trim().to_lowercase(),
                second: second.trim().to_lowercase(),
                code: p.code,
            }
        }));

        for rule in &rules {
            validate(rule)?;
        }
        // Stable: table order is kept within a stage.
        rules.sort_by_key(OntologyRule::stage);

        let lower = |words: Vec<String>| -> Vec<String> {
            words.into_iter().map(|w| w.trim().to_lowercase()).collect()
        };

        Ok(Self {
            rules,
            high_severity: lower(raw.severity.high),
            low_severity: lower(raw.severity.low),
            default_duration: raw.default_duration,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, OntologyError> {
        let json = std::fs::read_to_string(path).map_err(|source| OntologyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// The embedded rule tables.
    pub fn builtin() -> Result<Self, OntologyError> {
        Self::from_json(EMBEDDED_ONTOLOGY)
    }

    /// Disk override if given, embedded tables otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, OntologyError> {
        match path {
            Some(p) => Self::from_path(p),
            None => Self::builtin(),
        }
    }

    /// All rules, sorted by stage.
    pub fn rules(&self) -> &[OntologyRule] {
        &self.rules
    }

    pub fn rules_in(&self, stage: RuleStage) -> impl Iterator<Item = &OntologyRule> {
        self.rules.iter().filter(move |r| r.stage() == stage)
    }

    /// Severity class of a single lower-case word, if it is in the lexicon.
    pub fn severity_of(&self, word: &str) -> Option<Severity> {
        if self.high_severity.iter().any(|w| w == word) {
            Some(Severity::High)
        } else if self.low_severity.iter().any(|w| w == word) {
            Some(Severity::Low)
        } else {
            None
        }
    }

    pub fn default_duration(&self) -> &str {
        &self.default_duration
    }

    /// Every code any rule can emit.
    pub fn referenced_codes(&self) -> BTreeSet<&SymptomCode> {
        self.rules.iter().flat_map(|r| r.codes()).collect()
    }
}

fn validate(rule: &OntologyRule) -> Result<(), OntologyError> {
    let stage = rule.stage();
    let empty_trigger = match rule {
        OntologyRule::ExactPhrase { phrase, .. } => phrase.is_empty(),
        OntologyRule::Keyword { word, .. } => word.is_empty(),
        OntologyRule::PairIntersection { first, second, .. } => first.is_empty() || second.is_empty(),
    };
    if empty_trigger {
        return Err(OntologyError::EmptyTrigger { stage });
    }
    if rule.codes().is_empty() {
        return Err(OntologyError::NoCodes {
            stage,
            trigger: rule.trigger(),
        });
    }
    Ok(())
}
