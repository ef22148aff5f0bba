//! Symptom extraction: free text → matched symptom codes, severity/duration
//! metadata and a binary feature vector aligned with the classifier's
//! training vocabulary.
//!
//! Rules run stage by stage in [`RuleStage::ORDER`]; every stage unions its
//! codes into one set, so a later, more permissive stage can add codes but
//! never remove what an earlier stage found. Codes the ontology emits that
//! are outside the vocabulary are reported but never encoded.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use ayurdx_core::{Severity, SymptomCode};
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::normalize::{NormalizedText, Normalizer, title_case};
use crate::ontology::{Ontology, OntologyRule, RuleStage};
use crate::vocabulary::Vocabulary;

/// Minimum lemma length used for substring matching. Shorter stems
/// ("ach", "pee") produce too many accidental hits inside other words.
const MIN_LEMMA_MATCH_LEN: usize = 4;

// Tried in order; the first pattern that matches anywhere wins.
fn duration_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"\b\d+\s*(?:days?|weeks?|months?|years?)\b",
            r"\bsince\s+\w+",
            r"\bfor\s+\d+\s*\w+\b",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("duration pattern is valid"))
        .collect()
    })
}

// ── Output types ──

/// Binary vector, one slot per vocabulary code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<u8>);

impl FeatureVector {
    pub fn zeros(len: usize) -> Self {
        Self(vec![0; len])
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_set(&self, index: usize) -> bool {
        self.0.get(index).is_some_and(|v| *v == 1)
    }

    pub fn count_ones(&self) -> usize {
        self.0.iter().filter(|v| **v == 1).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymptomMetadata {
    pub severity: Severity,
    pub duration: String,
}

/// One rule that fired, with the codes it contributed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleHit {
    pub stage: RuleStage,
    pub trigger: String,
    pub codes: Vec<SymptomCode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    pub feature_vector: FeatureVector,
    /// Encoded codes in vocabulary order, then unencoded codes sorted.
    pub matched_codes: Vec<SymptomCode>,
    pub metadata: SymptomMetadata,
    pub hits: Vec<RuleHit>,
    #[serde(skip)]
    encoded: usize,
}

impl ExtractionResult {
    /// Codes present in the feature vector.
    pub fn encoded_codes(&self) -> &[SymptomCode] {
        &self.matched_codes[..self.encoded]
    }

    /// Codes detected by the ontology but absent from the vocabulary.
    pub fn unencoded_codes(&self) -> &[SymptomCode] {
        &self.matched_codes[self.encoded..]
    }

    pub fn encoded_count(&self) -> usize {
        self.encoded
    }

    pub fn is_empty(&self) -> bool {
        self.matched_codes.is_empty()
    }
}

// ── Compiled rules ──

/// A surface word with its lemma, when the lemma is worth matching on.
#[derive(Debug)]
struct Term {
    surface: String,
    lemma: Option<String>,
}

impl Term {
    fn new(surface: &str, normalizer: &Normalizer) -> Self {
        let lemma = normalizer.lemma_phrase(surface);
        let lemma = (lemma != surface && lemma.len() >= MIN_LEMMA_MATCH_LEN).then_some(lemma);
        Self {
            surface: surface.to_string(),
            lemma,
        }
    }

    fn found_in(&self, raw_lower: &str, lemma_text: &str) -> bool {
        raw_lower.contains(&self.surface)
            || lemma_text.contains(&self.surface)
            || self.lemma.as_ref().is_some_and(|l| lemma_text.contains(l.as_str()))
    }
}

#[derive(Debug)]
enum Matcher {
    /// Contiguous lemma sequence over the full token stream.
    Phrase(Vec<String>),
    Keyword(Term),
    Pair(Term, Term),
}

#[derive(Debug)]
struct CompiledRule {
    stage: RuleStage,
    trigger: String,
    codes: Vec<SymptomCode>,
    matcher: Matcher,
}

impl CompiledRule {
    fn compile(rule: &OntologyRule, normalizer: &Normalizer) -> Self {
        let matcher = match rule {
            OntologyRule::ExactPhrase { phrase, .. } => Matcher::Phrase(
                normalizer
                    .lemma_phrase(phrase)
                    .split(' ')
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            OntologyRule::Keyword { word, .. } => Matcher::Keyword(Term::new(word, normalizer)),
            OntologyRule::PairIntersection { first, second, .. } => {
                Matcher::Pair(Term::new(first, normalizer), Term::new(second, normalizer))
            }
        };
        Self {
            stage: rule.stage(),
            trigger: rule.trigger(),
            codes: rule.codes().to_vec(),
            matcher,
        }
    }

    fn matches(&self, text: &NormalizedText, lemma_text: &str) -> bool {
        match &self.matcher {
            Matcher::Phrase(seq) => {
                !seq.is_empty() && text.tokens.windows(seq.len()).any(|w| w == seq.as_slice())
            }
            Matcher::Keyword(term) => term.found_in(&text.raw_lower, lemma_text),
            Matcher::Pair(a, b) => {
                a.found_in(&text.raw_lower, lemma_text) && b.found_in(&text.raw_lower, lemma_text)
            }
        }
    }
}

// ── Extractor ──

/// Rule-based symptom extractor. Immutable after construction; share it
/// across request handlers behind an `Arc`.
pub struct SymptomExtractor {
    normalizer: Normalizer,
    ontology: Ontology,
    vocabulary: Vocabulary,
    rules: Vec<CompiledRule>,
}

impl SymptomExtractor {
    pub fn new(ontology: Ontology, vocabulary: Vocabulary) -> Self {
        let normalizer = Normalizer::new();
        let mut rules = Vec::with_capacity(ontology.rules().len());
        for stage in RuleStage::ORDER {
            rules.extend(
                ontology
                    .rules_in(stage)
                    .map(|r| CompiledRule::compile(r, &normalizer)),
            );
        }
        Self {
            normalizer,
            ontology,
            vocabulary,
            rules,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn ontology(&self) -> &Ontology {
        &self.ontology
    }

    /// Extract symptoms from free text. Never fails: unmatched input yields
    /// an empty code list, an all-zero vector and default metadata.
    pub fn extract(&self, text: &str) -> ExtractionResult {
        let normalized = self.normalizer.normalize(text);
        let lemma_text = normalized.lemma_text();

        let mut found: BTreeSet<SymptomCode> = BTreeSet::new();
        let mut hits = Vec::new();
        for rule in &self.rules {
            if rule.matches(&normalized, &lemma_text) {
                debug!(stage = %rule.stage, trigger = %rule.trigger, "rule hit");
                found.extend(rule.codes.iter().cloned());
                hits.push(RuleHit {
                    stage: rule.stage,
                    trigger: rule.trigger.clone(),
                    codes: rule.codes.clone(),
                });
            }
        }

        let metadata = self.metadata(&normalized);

        let mut feature_vector = FeatureVector::zeros(self.vocabulary.len());
        let mut matched_codes = Vec::with_capacity(found.len());
        for (i, code) in self.vocabulary.codes().iter().enumerate() {
            if found.contains(code) {
                feature_vector.0[i] = 1;
                matched_codes.push(code.clone());
            }
        }
        let encoded = matched_codes.len();
        matched_codes.extend(
            found
                .into_iter()
                .filter(|c| !self.vocabulary.contains(c.as_str())),
        );

        ExtractionResult {
            feature_vector,
            matched_codes,
            metadata,
            hits,
            encoded,
        }
    }

    fn metadata(&self, text: &NormalizedText) -> SymptomMetadata {
        // Last severity word in the sentence wins.
        let severity = text
            .words
            .iter()
            .filter_map(|w| self.ontology.severity_of(w))
            .last()
            .unwrap_or_default();

        let duration = duration_patterns()
            .iter()
            .find_map(|re| re.find(&text.raw_lower))
            .map(|m| title_case(m.as_str().trim()))
            .unwrap_or_else(|| self.ontology.default_duration().to_string());

        SymptomMetadata { severity, duration }
    }
}
