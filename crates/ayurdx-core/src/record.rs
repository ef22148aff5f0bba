//! Knowledge base records shared by the build pipeline, the store, and the CLI.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

pub const MAX_MEDICINES: usize = 6;
pub const MAX_PRECAUTIONS: usize = 3;
pub const MAX_PREPARATION_TIPS: usize = 3;
pub const MAX_BUY_LINKS: usize = 6;

/// Vendor search endpoint used for derived buy links.
pub const BUY_LINK_BASE: &str = "https://www.1mg.com/search/all";

/// Suffix appended to medicine names that failed herb verification.
pub const UNVERIFIED_TAG: &str = "(Unverified)";

/// Injected when extraction finds no medicine at all.
pub const MEDICINE_PLACEHOLDER: &str = "Consult a certified Ayurvedic Vaidya";

pub const DEFAULT_PRECAUTIONS: &[&str] = &[
    "Maintain a light, easily digestible diet.",
    "Avoid cold, heavy, and oily foods.",
];

pub const DEFAULT_PREPARATION_TIPS: &[&str] =
    &["Consume herbs with warm water unless directed otherwise."];

/// Precaution inserted by the verification pass when none survived.
pub const VAIDYA_PRECAUTION: &str = "Consult a Vaidya for specific diet restrictions.";

/// Precaution served when a disease has no knowledge base entry.
pub const NOT_FOUND_PRECAUTION: &str = "No specific Ayurvedic data found.";

// ── Provenance tags ──

pub const SOURCE_PDF: &str = "Sushruta Samhita (PDF)";
pub const SOURCE_WEB_PRIMARY: &str = "EasyAyurveda (Primary)";
pub const SOURCE_WEB_SEARCH: &str = "Web Search Aggregation";
pub const SOURCE_ENCYCLOPEDIA: &str = "Wikipedia API";
pub const SOURCE_SYSTEM: &str = "System";

/// Provenance tag for a retry query that succeeded.
pub fn retry_source(query: &str) -> String {
    format!("EasyAyurveda ({query})")
}

/// Derive the vendor search link for a medicine name.
///
/// Any `(Unverified)` tag is dropped before the name is encoded; spaces
/// become `+`.
pub fn buy_link(medicine: &str) -> String {
    let name = strip_unverified(medicine);
    format!("{BUY_LINK_BASE}?name={}", name.replace(' ', "+"))
}

/// Remove a trailing `(Unverified)` tag and surrounding whitespace.
pub fn strip_unverified(name: &str) -> &str {
    let trimmed = name.trim();
    trimmed
        .strip_suffix(UNVERIFIED_TAG)
        .map(str::trim_end)
        .unwrap_or(trimmed)
}

/// Structured Ayurvedic knowledge for a single disease.
///
/// Every list is an ordered set bounded by its `MAX_*` cap. `buy_links` is
/// always derived from `medicine_names` via [`regenerate_links`](Self::regenerate_links).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    #[serde(default)]
    pub medicine_names: Vec<String>,
    #[serde(default)]
    pub precautions: Vec<String>,
    #[serde(default)]
    pub preparation_tips: Vec<String>,
    #[serde(default)]
    pub buy_links: Vec<String>,
    /// Provenance tags. Older snapshots stored a single `" + "`-joined string.
    #[serde(default, deserialize_with = "deserialize_source")]
    pub source: Vec<String>,
}

impl KnowledgeRecord {
    /// Record served when a disease has no knowledge base entry.
    pub fn not_found() -> Self {
        Self {
            precautions: vec![NOT_FOUND_PRECAUTION.to_string()],
            source: vec![SOURCE_SYSTEM.to_string()],
            ..Self::default()
        }
    }

    /// True when any of the three extracted lists is empty.
    pub fn has_blanks(&self) -> bool {
        self.medicine_names.is_empty()
            || self.precautions.is_empty()
            || self.preparation_tips.is_empty()
    }

    /// Add a provenance tag unless already present.
    pub fn add_source(&mut self, tag: &str) {
        if !self.source.iter().any(|s| s == tag) {
            self.source.push(tag.to_string());
        }
    }

    /// Rebuild `buy_links` from the current medicine list.
    ///
    /// The placeholder medicine gets no link.
    pub fn regenerate_links(&mut self) {
        self.buy_links = self
            .medicine_names
            .iter()
            .filter(|m| m.as_str() != MEDICINE_PLACEHOLDER)
            .take(MAX_BUY_LINKS)
            .map(|m| buy_link(m))
            .collect();
    }

    /// Truncate every list to its cap.
    pub fn enforce_caps(&mut self) {
        self.medicine_names.truncate(MAX_MEDICINES);
        self.precautions.truncate(MAX_PRECAUTIONS);
        self.preparation_tips.truncate(MAX_PREPARATION_TIPS);
        self.buy_links.truncate(MAX_BUY_LINKS);
    }

    /// Whether every list respects its cap.
    pub fn within_caps(&self) -> bool {
        self.medicine_names.len() <= MAX_MEDICINES
            && self.precautions.len() <= MAX_PRECAUTIONS
            && self.preparation_tips.len() <= MAX_PREPARATION_TIPS
            && self.buy_links.len() <= MAX_BUY_LINKS
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SourceField {
    Joined(String),
    Tags(Vec<String>),
}

fn deserialize_source<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match SourceField::deserialize(deserializer)? {
        SourceField::Tags(tags) => tags,
        SourceField::Joined(joined) => joined
            .split(" + ")
            .flat_map(|part| part.split(", "))
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(String::from)
            .collect(),
    })
}

/// Disease name → [`KnowledgeRecord`], serialised as a flat JSON object.
///
/// Keys are kept in a `BTreeMap` so snapshots are byte-stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnowledgeBase {
    records: BTreeMap<String, KnowledgeRecord>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for `disease`, returning the previous one.
    pub fn insert(
        &mut self,
        disease: impl Into<String>,
        record: KnowledgeRecord,
    ) -> Option<KnowledgeRecord> {
        self.records.insert(disease.into(), record)
    }

    /// Exact-name lookup.
    pub fn get(&self, disease: &str) -> Option<&KnowledgeRecord> {
        self.records.get(disease)
    }

    pub fn get_mut(&mut self, disease: &str) -> Option<&mut KnowledgeRecord> {
        self.records.get_mut(disease)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &KnowledgeRecord)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut KnowledgeRecord)> {
        self.records.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<(String, KnowledgeRecord)> for KnowledgeBase {
    fn from_iter<I: IntoIterator<Item = (String, KnowledgeRecord)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
