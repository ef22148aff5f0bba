//! Blank filling from encyclopedia text.
//!
//! Only lists that are currently empty are touched; anything already in the
//! record stays as it is.

use ayurdx_core::KnowledgeRecord;
use ayurdx_core::record::{MAX_MEDICINES, MAX_PRECAUTIONS, MAX_PREPARATION_TIPS, SOURCE_ENCYCLOPEDIA};
use regex::Regex;
use std::sync::OnceLock;

use crate::herbs::ENCYCLOPEDIA_HERBS;
use crate::normalize::title_case;
use crate::sanitize::{clean_medicine_name, clean_sentence};

const FILL_MIN_SENTENCE_CHARS: usize = 20;

const FILL_PRECAUTION_KEYWORDS: &[&str] = &["avoid", "diet", "risk", "reduce", "do not"];
const FILL_TIP_KEYWORDS: &[&str] = &["mix", "water", "boil", "extract", "consume"];

fn herb_patterns() -> &'static [(&'static str, Regex)] {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        ENCYCLOPEDIA_HERBS
            .iter()
            .map(|h| {
                let re = Regex::new(&format!(r"\b{}\b", regex::escape(h)))
                    .expect("herb pattern is valid");
                (*h, re)
            })
            .collect()
    })
}

/// Which lists a fill pass populated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillOutcome {
    pub medicines: bool,
    pub precautions: bool,
    pub preparation_tips: bool,
}

impl FillOutcome {
    pub fn any(&self) -> bool {
        self.medicines || self.precautions || self.preparation_tips
    }
}

/// Fill the empty lists of `record` from `text` and tag the encyclopedia
/// as a source. Filled names and sentences pass the same validity rules as
/// the sanitizer. Blank text leaves the record untouched.
pub fn fill_blanks(record: &mut KnowledgeRecord, text: &str) -> FillOutcome {
    let mut outcome = FillOutcome::default();
    let text = text.to_lowercase();
    if text.trim().is_empty() {
        return outcome;
    }

    if record.medicine_names.is_empty() {
        let herbs: Vec<String> = herb_patterns()
            .iter()
            .filter(|(_, re)| re.is_match(&text))
            .filter_map(|(h, _)| clean_medicine_name(&title_case(h)))
            .take(MAX_MEDICINES)
            .collect();
        if !herbs.is_empty() {
            record.medicine_names = herbs;
            record.regenerate_links();
            outcome.medicines = true;
        }
    }

    let sentences: Vec<String> = text
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| s.chars().count() > FILL_MIN_SENTENCE_CHARS)
        .filter_map(clean_sentence)
        .collect();
    let pick = |keywords: &[&str], cap: usize| -> Vec<String> {
        sentences
            .iter()
            .filter(|s| {
                let lower = s.to_lowercase();
                keywords.iter().any(|k| lower.contains(k))
            })
            .take(cap)
            .cloned()
            .collect()
    };

    if record.precautions.is_empty() {
        let found = pick(FILL_PRECAUTION_KEYWORDS, MAX_PRECAUTIONS);
        if !found.is_empty() {
            record.precautions = found;
            outcome.precautions = true;
        }
    }
    if record.preparation_tips.is_empty() {
        let found = pick(FILL_TIP_KEYWORDS, MAX_PREPARATION_TIPS);
        if !found.is_empty() {
            record.preparation_tips = found;
            outcome.preparation_tips = true;
        }
    }

    record.add_source(SOURCE_ENCYCLOPEDIA);
    outcome
}
