//! Record sanitizer and medicine verifier.
//!
//! Both passes are idempotent: running either on its own output changes
//! nothing. Sanitized lists come out in lexicographic order (`BTreeSet`),
//! not discovery order.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use ayurdx_core::record::{
    MAX_MEDICINES, MAX_PRECAUTIONS, MAX_PREPARATION_TIPS, MEDICINE_PLACEHOLDER, UNVERIFIED_TAG,
    VAIDYA_PRECAUTION,
};
use ayurdx_core::{KnowledgeBase, KnowledgeRecord, strip_unverified};
use regex::Regex;
use tracing::{debug, info};

use crate::herbs::{is_bare_suffix, is_herb_name, is_verified};
use crate::normalize::capitalize_first;

pub const MIN_CLEAN_SENTENCE_CHARS: usize = 20;
pub const MIN_MEDICINE_CHARS: usize = 4;

/// Words that open extraction fragments rather than medicine names.
const BAD_LEADING_WORDS: &[&str] = &[
    "The", "Of", "In", "And", "Like", "If", "This", "That", "A", "An", "Consult", "Old",
    "Specific", "Also", "Dicated", "Especially", "Once", "For", "With", "Or", "To", "Use", "Apply",
    "Here", "When", "While", "After", "Before",
];

struct Patterns {
    read_nav: Regex,
    email_artifact: Regex,
    citation: Regex,
    page_marker: Regex,
    leading_numbering: Regex,
    space_before_punct: Regex,
    whitespace: Regex,
    bad_leading_word: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let re = |p: &str| Regex::new(p).expect("sanitizer pattern is valid");
        Patterns {
            read_nav: re(r"(?i)\bread\s*[-:]\s*.*$"),
            email_artifact: re(r"(?i)\[email\s*protected\]"),
            citation: re(r"\[\d+\]"),
            page_marker: re(r"(?i)\bpage\s*\d+"),
            leading_numbering: re(r"^[\d.\-*,;:\s]+"),
            space_before_punct: re(r"\s+([?.!,;:])"),
            whitespace: re(r"\s+"),
            bad_leading_word: re(&format!(
                r"(?i)^(?:{})\b\s*",
                BAD_LEADING_WORDS.join("|")
            )),
        }
    })
}

fn strip_non_ascii(text: &str) -> String {
    text.chars()
        .map(|c| if matches!(c, '\u{2013}' | '\u{2014}') { '-' } else { c })
        .filter(char::is_ascii)
        .collect()
}

fn collapse(text: &str) -> String {
    patterns().whitespace.replace_all(text, " ").into_owned()
}

// ── Sentences ──

/// Scrub one precaution or tip. `None` when nothing usable is left.
pub fn clean_sentence(text: &str) -> Option<String> {
    let p = patterns();
    let text = strip_non_ascii(text);
    let text = p.read_nav.replace(&text, "");
    let text = p.email_artifact.replace_all(&text, "");
    let text = p.citation.replace_all(&text, "");
    let text = text.replace('|', "");
    let text = p.page_marker.replace_all(&text, "");
    let text = collapse(&text);
    let text = p.leading_numbering.replace(&text, "");
    let text = p.space_before_punct.replace_all(&text, "$1");
    let text = collapse(&text);
    let text = text.trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | ',' | ';' | ':'));

    if text.len() < MIN_CLEAN_SENTENCE_CHARS || !text.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let mut sentence = capitalize_first(text);
    if !sentence.ends_with(['.', '?', '!']) {
        sentence.push('.');
    }
    Some(sentence)
}

// ── Medicines ──

/// Validate and tidy one medicine candidate. An `(Unverified)` tag is kept
/// if present but ignored for validation.
pub fn clean_medicine_name(name: &str) -> Option<String> {
    let p = patterns();
    let tagged = name.contains(UNVERIFIED_TAG);
    let base = strip_non_ascii(&name.replace(UNVERIFIED_TAG, ""));
    let lower = base.to_lowercase();
    if lower.contains("consult") || lower.contains("vaidya") {
        return None;
    }

    let mut base = collapse(&base)
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | ',' | ';' | ':' | '.'))
        .to_string();
    loop {
        let stripped = p.bad_leading_word.replace(&base, "").trim().to_string();
        if stripped == base {
            break;
        }
        base = stripped;
    }

    if base.len() < MIN_MEDICINE_CHARS && !is_herb_name(&base) {
        return None;
    }
    if is_bare_suffix(&base) || !base.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    Some(if tagged {
        format!("{base} {UNVERIFIED_TAG}")
    } else {
        base
    })
}

/// Verify one medicine against the herb vocabulary. Verified names come
/// back plain, unverified capitalised ones tagged, the rest dropped.
pub fn verify_medicine(name: &str) -> Option<String> {
    let base = strip_unverified(name);
    let base = base
        .strip_prefix("Use ")
        .or_else(|| base.strip_prefix("Apply "))
        .unwrap_or(base)
        .trim();
    if base.is_empty() {
        return None;
    }
    if is_verified(base) {
        Some(base.to_string())
    } else if base.starts_with(|c: char| c.is_uppercase()) {
        Some(format!("{base} {UNVERIFIED_TAG}"))
    } else {
        None
    }
}

// ── Record passes ──

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    pub records: usize,
    pub changed: usize,
    pub medicines_removed: usize,
    pub sentences_removed: usize,
}

fn clean_sentences(items: &[String], cap: usize, removed: &mut usize) -> Vec<String> {
    let cleaned: BTreeSet<String> = items.iter().filter_map(|s| clean_sentence(s)).collect();
    *removed += items.len().saturating_sub(cleaned.len());
    cleaned.into_iter().take(cap).collect()
}

/// Clean, dedupe, cap and re-derive links for one record.
pub fn sanitize_record(record: &mut KnowledgeRecord) -> SanitizeReport {
    let mut report = SanitizeReport {
        records: 1,
        ..Default::default()
    };
    let before = record.clone();

    let had_placeholder = record
        .medicine_names
        .iter()
        .any(|m| strip_unverified(m) == MEDICINE_PLACEHOLDER);
    let medicines: BTreeSet<String> = record
        .medicine_names
        .iter()
        .filter_map(|m| clean_medicine_name(m))
        .collect();
    report.medicines_removed = record.medicine_names.len().saturating_sub(medicines.len());
    record.medicine_names = medicines.into_iter().take(MAX_MEDICINES).collect();
    if record.medicine_names.is_empty() && had_placeholder {
        record.medicine_names.push(MEDICINE_PLACEHOLDER.to_string());
        report.medicines_removed = report.medicines_removed.saturating_sub(1);
    }

    let mut removed = 0;
    record.precautions = clean_sentences(&record.precautions, MAX_PRECAUTIONS, &mut removed);
    record.preparation_tips =
        clean_sentences(&record.preparation_tips, MAX_PREPARATION_TIPS, &mut removed);
    report.sentences_removed = removed;

    record.regenerate_links();
    if *record != before {
        report.changed = 1;
    }
    report
}

/// Sanitize every record in place.
pub fn sanitize_knowledge_base(kb: &mut KnowledgeBase) -> SanitizeReport {
    let mut total = SanitizeReport::default();
    for (disease, record) in kb.iter_mut() {
        let r = sanitize_record(record);
        if r.changed > 0 {
            debug!(disease, medicines_removed = r.medicines_removed, "sanitized");
        }
        total.records += r.records;
        total.changed += r.changed;
        total.medicines_removed += r.medicines_removed;
        total.sentences_removed += r.sentences_removed;
    }
    info!(
        records = total.records,
        changed = total.changed,
        medicines_removed = total.medicines_removed,
        sentences_removed = total.sentences_removed,
        "sanitization complete"
    );
    total
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifyReport {
    pub checked: usize,
    pub verified: usize,
    pub flagged: usize,
    pub dropped: usize,
}

/// Tag or drop unverified medicines and guarantee a precaution.
pub fn verify_record(record: &mut KnowledgeRecord) -> VerifyReport {
    let mut report = VerifyReport::default();
    let mut kept: Vec<String> = Vec::with_capacity(record.medicine_names.len());
    for name in &record.medicine_names {
        report.checked += 1;
        if name == MEDICINE_PLACEHOLDER {
            kept.push(name.clone());
            continue;
        }
        match verify_medicine(name) {
            Some(v) if v.ends_with(UNVERIFIED_TAG) => {
                report.flagged += 1;
                if !kept.contains(&v) {
                    kept.push(v);
                }
            }
            Some(v) => {
                report.verified += 1;
                if !kept.contains(&v) {
                    kept.push(v);
                }
            }
            None => report.dropped += 1,
        }
    }
    record.medicine_names = kept;
    record.regenerate_links();
    if record.precautions.is_empty() {
        record.precautions.push(VAIDYA_PRECAUTION.to_string());
    }
    report
}

pub fn verify_knowledge_base(kb: &mut KnowledgeBase) -> VerifyReport {
    let mut total = VerifyReport::default();
    for (_, record) in kb.iter_mut() {
        let r = verify_record(record);
        total.checked += r.checked;
        total.verified += r.verified;
        total.flagged += r.flagged;
        total.dropped += r.dropped;
    }
    info!(
        checked = total.checked,
        verified = total.verified,
        flagged = total.flagged,
        dropped = total.dropped,
        "verification complete"
    );
    total
}
