//! Knowledge extraction: harvested treatment text → candidate medicine names,
//! precaution sentences and preparation tips.
//!
//! Medicines come from two sources, formulation-suffix matches first and
//! gazetteer herbs second, deduplicated case-insensitively in discovery
//! order. Sentences are classified by keyword.

use std::collections::HashSet;
use std::sync::OnceLock;

use ayurdx_core::KnowledgeRecord;
use ayurdx_core::record::{DEFAULT_PRECAUTIONS, DEFAULT_PREPARATION_TIPS, MEDICINE_PLACEHOLDER};
use regex::Regex;
use tracing::debug;

use crate::herbs::{EXTRACTION_HERBS, FORMULATION_SUFFIXES};
use crate::normalize::title_case;

pub const MIN_SENTENCE_CHARS: usize = 20;
pub const MAX_SENTENCE_CHARS: usize = 300;

pub const PRECAUTION_KEYWORDS: &[&str] = &[
    "avoid",
    "do not",
    "restrict",
    "contraindicated",
    "abstain",
    "harmful",
    "reduce",
    "diet",
];

pub const TIP_KEYWORDS: &[&str] = &[
    "mix", "boil", "decoction", "powder", "paste", "water", "milk", "honey", "grind", "drink",
    "apply",
];

struct Patterns {
    page_marker: Regex,
    whitespace: Regex,
    formulation: Regex,
    herbs: Vec<(&'static str, Regex)>,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let suffixes = FORMULATION_SUFFIXES.join("|");
        Patterns {
            page_marker: Regex::new(r"(?i)\bpage\s+\d+").expect("page pattern is valid"),
            whitespace: Regex::new(r"\s+").expect("whitespace pattern is valid"),
            formulation: Regex::new(&format!(r"(?i)\b[A-Z][a-z]+ (?:{suffixes})\b"))
                .expect("formulation pattern is valid"),
            herbs: EXTRACTION_HERBS
                .iter()
                .map(|h| {
                    let re = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(h)))
                        .expect("herb pattern is valid");
                    (*h, re)
                })
                .collect(),
        }
    })
}

/// Candidate lists pulled from one text pool. Not yet capped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedKnowledge {
    pub medicine_names: Vec<String>,
    pub precautions: Vec<String>,
    pub preparation_tips: Vec<String>,
}

impl ExtractedKnowledge {
    /// Replace empty lists with the generic placeholder and defaults.
    pub fn with_fallbacks(mut self) -> Self {
        if self.medicine_names.is_empty() {
            self.medicine_names.push(MEDICINE_PLACEHOLDER.to_string());
        }
        if self.precautions.is_empty() {
            self.precautions = DEFAULT_PRECAUTIONS.iter().map(|s| s.to_string()).collect();
        }
        if self.preparation_tips.is_empty() {
            self.preparation_tips = DEFAULT_PREPARATION_TIPS
                .iter()
                .map(|s| s.to_string())
                .collect();
        }
        self
    }

    /// Finished record: fallbacks applied, lists capped, links derived.
    pub fn into_record(self, sources: Vec<String>) -> KnowledgeRecord {
        let filled = self.with_fallbacks();
        let mut record = KnowledgeRecord {
            medicine_names: filled.medicine_names,
            precautions: filled.precautions,
            preparation_tips: filled.preparation_tips,
            buy_links: Vec::new(),
            source: sources,
        };
        record.enforce_caps();
        record.regenerate_links();
        record
    }
}

/// How preparation-tip sentences are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TipPolicy {
    /// Any sentence with a preparation keyword.
    Keyword,
    /// Keyword sentences that also name a discovered medicine.
    #[default]
    MentionsMedicine,
}

#[derive(Debug, Clone, Default)]
pub struct KnowledgeExtractor {
    tip_policy: TipPolicy,
}

impl KnowledgeExtractor {
    pub fn new(tip_policy: TipPolicy) -> Self {
        Self { tip_policy }
    }

    pub fn extract(&self, raw_text: &str) -> ExtractedKnowledge {
        let text = clean_raw_text(raw_text);
        if text.is_empty() {
            return ExtractedKnowledge::default();
        }

        let medicine_names = find_medicines(&text);
        let lowered_medicines: Vec<String> =
            medicine_names.iter().map(|m| m.to_lowercase()).collect();

        let mut precautions = OrderedSet::default();
        let mut preparation_tips = OrderedSet::default();
        for sentence in split_sentences(&text) {
            let len = sentence.chars().count();
            if !(MIN_SENTENCE_CHARS..=MAX_SENTENCE_CHARS).contains(&len) {
                continue;
            }
            let lower = sentence.to_lowercase();
            if PRECAUTION_KEYWORDS.iter().any(|k| lower.contains(k)) {
                precautions.push(sentence);
            }
            if TIP_KEYWORDS.iter().any(|k| lower.contains(k)) {
                let accepted = match self.tip_policy {
                    TipPolicy::Keyword => true,
                    TipPolicy::MentionsMedicine => {
                        lowered_medicines.iter().any(|m| lower.contains(m.as_str()))
                    }
                };
                if accepted {
                    preparation_tips.push(sentence);
                }
            }
        }

        debug!(
            medicines = medicine_names.len(),
            precautions = precautions.len(),
            tips = preparation_tips.len(),
            "extracted knowledge"
        );

        ExtractedKnowledge {
            medicine_names,
            precautions: precautions.into_vec(),
            preparation_tips: preparation_tips.into_vec(),
        }
    }
}

/// Drop page markers, join hyphenated line breaks, collapse whitespace.
pub fn clean_raw_text(raw: &str) -> String {
    let p = patterns();
    let text = p.page_marker.replace_all(raw, "");
    let text = text.replace("-\n", "");
    p.whitespace.replace_all(&text, " ").trim().to_string()
}

fn find_medicines(text: &str) -> Vec<String> {
    let p = patterns();
    let mut found = OrderedSet::default();
    for m in p.formulation.find_iter(text) {
        found.push(&title_case(m.as_str()));
    }
    for (herb, re) in &p.herbs {
        if re.is_match(text) {
            found.push(&title_case(herb));
        }
    }
    found.into_vec()
}

/// Split prose into sentences on `.`, `?` or `!` followed by whitespace,
/// except after short titles ("Dr.") and dotted abbreviations ("e.g.").
pub fn split_sentences(text: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0;
    for (i, &(_, c)) in chars.iter().enumerate() {
        if !matches!(c, '.' | '?' | '!') {
            continue;
        }
        let Some(&(next_pos, next)) = chars.get(i + 1) else {
            continue;
        };
        if !next.is_whitespace() || (c == '.' && is_abbreviation(&chars, i)) {
            continue;
        }
        let sentence = text[start..next_pos].trim();
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        start = next_pos;
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

fn is_abbreviation(chars: &[(usize, char)], dot: usize) -> bool {
    let back = |k: usize| dot.checked_sub(k).map(|j| chars[j].1);
    let title = matches!(
        (back(3), back(2), back(1)),
        (prev, Some(a), Some(b))
            if a.is_uppercase() && b.is_lowercase() && !prev.is_some_and(char::is_alphabetic)
    );
    let dotted = matches!(
        (back(3), back(2), back(1)),
        (Some(a), Some('.'), Some(b)) if a.is_alphanumeric() && b.is_alphanumeric()
    );
    title || dotted
}

/// Insertion-ordered, case-insensitive string set.
#[derive(Default)]
struct OrderedSet {
    seen: HashSet<String>,
    items: Vec<String>,
}

impl OrderedSet {
    fn push(&mut self, item: &str) {
        if self.seen.insert(item.to_lowercase()) {
            self.items.push(item.to_string());
        }
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn into_vec(self) -> Vec<String> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ayurdx_core::record::{MAX_MEDICINES, MAX_PRECAUTIONS, MAX_PREPARATION_TIPS};

    const PASSAGE: &str = "Page 12 Treatment of Amlapitta. Avipattikar Churna is given \
        with warm water after food. Avoid spicy, sour and fermented food. Mix Amla powder \
        with honey and take twice a day. Boil water with cumin for the family. \
        Ok.";

    #[test]
    fn formulations_and_herbs_are_title_cased() {
        let k = KnowledgeExtractor::default().extract("use TRIPHALA churna and some neem daily");
        assert_eq!(k.medicine_names, vec!["Triphala Churna", "Neem", "Triphala"]);
    }

    #[test]
    fn herbs_match_on_word_boundaries() {
        let k = KnowledgeExtractor::default().extract("Balance is restored with Balarishta");
        assert!(!k.medicine_names.iter().any(|m| m == "Bala"));
    }

    #[test]
    fn precautions_and_strict_tips() {
        let k = KnowledgeExtractor::default().extract(PASSAGE);
        assert_eq!(k.precautions, vec!["Avoid spicy, sour and fermented food."]);
        assert!(k.preparation_tips.iter().any(|t| t.starts_with("Mix Amla powder")));
        assert!(k.preparation_tips.iter().any(|t| t.starts_with("Avipattikar Churna")));
        // Generic cooking sentence names no medicine.
        assert!(!k.preparation_tips.iter().any(|t| t.contains("cumin")));
    }

    #[test]
    fn lenient_policy_keeps_generic_tips() {
        let k = KnowledgeExtractor::new(TipPolicy::Keyword).extract(PASSAGE);
        assert!(k.preparation_tips.iter().any(|t| t.contains("cumin")));
    }

    #[test]
    fn sentence_length_window() {
        let long = format!("Avoid {}.", "cold ".repeat(80));
        let text = format!("Avoid it. {long} Avoid curd and heavy food at night.");
        let k = KnowledgeExtractor::default().extract(&text);
        assert_eq!(k.precautions, vec!["Avoid curd and heavy food at night."]);
    }

    #[test]
    fn page_markers_and_hyphen_breaks_are_cleaned() {
        assert_eq!(
            clean_raw_text("Page 4 Ashwa-\ngandha   helps\n\nsleep"),
            "Ashwagandha helps sleep"
        );
        assert_eq!(clean_raw_text("Neem page 7 is bitter"), "Neem is bitter");
    }

    #[test]
    fn splitter_tolerates_abbreviations() {
        let s = split_sentences("Consult Dr. Sharma daily. Use herbs e.g. neem often. Done!");
        assert_eq!(
            s,
            vec!["Consult Dr. Sharma daily.", "Use herbs e.g. neem often.", "Done!"]
        );
    }

    #[test]
    fn empty_text_extracts_nothing() {
        assert_eq!(KnowledgeExtractor::default().extract("  \n"), ExtractedKnowledge::default());
    }

    #[test]
    fn fallbacks_fill_empty_lists() {
        let record = ExtractedKnowledge::default().into_record(vec![]);
        assert_eq!(record.medicine_names, vec![MEDICINE_PLACEHOLDER]);
        assert_eq!(record.precautions.len(), 2);
        assert_eq!(record.preparation_tips.len(), 1);
        assert!(record.buy_links.is_empty());
    }

    #[test]
    fn ten_formulations_and_short_herb() {
        let names = [
            "Triphala", "Sitopaladi", "Talisadi", "Lavan", "Hingvastak", "Avipattikar",
            "Panchasakar", "Ajmodadi", "Dadimashtak", "Pushyanug",
        ];
        let text: String = names.iter().map(|n| format!("{n} churna. ")).collect::<String>()
            + "Chew one ela pod after meals.";
        let k = KnowledgeExtractor::default().extract(&text);
        for n in names {
            assert!(k.medicine_names.contains(&format!("{n} Churna")), "{n} missing");
        }
        assert!(k.medicine_names.contains(&"Ela".to_string()));

        let record = k.into_record(vec!["test".into()]);
        assert_eq!(record.medicine_names.len(), MAX_MEDICINES);
        assert_eq!(record.buy_links.len(), MAX_MEDICINES);
    }

    #[test]
    fn record_respects_caps() {
        let text = (0..10)
            .map(|i| format!("Avoid heavy food number {i} at night. Mix neem with water {i} times."))
            .collect::<Vec<_>>()
            .join(" ");
        let record = KnowledgeExtractor::default().extract(&text).into_record(vec![]);
        assert_eq!(record.precautions.len(), MAX_PRECAUTIONS);
        assert_eq!(record.preparation_tips.len(), MAX_PREPARATION_TIPS);
        assert!(record.within_caps());
    }
}
