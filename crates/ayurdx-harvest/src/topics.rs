//! Disease topics: traditional-terminology synonyms and retry queries.
//!
//! The synonym table is an ordered list of pairs. A disease listed twice
//! takes its last synonym, while the disease list keeps first-appearance
//! order.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;

use crate::Topic;
use crate::error::FetchError;

const BUILTIN_TOPICS: &str = include_str!("../data/topics.json");

#[derive(Debug, Deserialize)]
struct RawTopics {
    synonyms: Vec<(String, String)>,
    #[serde(default)]
    retry_queries: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct TopicTable {
    diseases: Vec<String>,
    synonyms: HashMap<String, String>,
    retry_queries: BTreeMap<String, Vec<String>>,
}

impl TopicTable {
    pub fn from_json(json: &str) -> Result<Self, FetchError> {
        let raw: RawTopics = serde_json::from_str(json)?;
        let mut diseases = Vec::new();
        let mut synonyms = HashMap::new();
        for (disease, synonym) in raw.synonyms {
            if synonyms.insert(disease.clone(), synonym).is_none() {
                diseases.push(disease);
            }
        }
        Ok(Self {
            diseases,
            synonyms,
            retry_queries: raw.retry_queries,
        })
    }

    /// The table shipped with the crate.
    pub fn builtin() -> Result<Self, FetchError> {
        Self::from_json(BUILTIN_TOPICS)
    }

    /// Every mapped disease, in first-appearance order.
    pub fn diseases(&self) -> &[String] {
        &self.diseases
    }

    pub fn synonym(&self, disease: &str) -> Option<&str> {
        self.synonyms.get(disease).map(String::as_str)
    }

    /// Build the topic for `disease`; unmapped diseases are their own synonym.
    pub fn topic(&self, disease: &str) -> Topic {
        Topic {
            disease: disease.to_string(),
            synonym: self.synonym(disease).unwrap_or(disease).to_string(),
        }
    }

    pub fn retry_queries(&self) -> &BTreeMap<String, Vec<String>> {
        &self.retry_queries
    }
}

/// Read a disease list: one name per line, blank lines and `#` comments
/// skipped.
pub fn read_disease_list(path: &Path) -> Result<Vec<String>, FetchError> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_disease_list(&text))
}

pub fn parse_disease_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_loads() {
        let table = TopicTable::builtin().unwrap();
        assert_eq!(table.diseases().len(), 41);
        assert_eq!(table.diseases()[0], "Fungal infection");
        assert_eq!(table.diseases().last().unwrap(), "Impetigo");
    }

    #[test]
    fn later_entries_override() {
        let table = TopicTable::builtin().unwrap();
        assert_eq!(table.synonym("Typhoid"), Some("Jwara"));
        assert_eq!(table.synonym("Acne"), Some("Mukha Dushika"));
        assert_eq!(
            table.synonym("Peptic ulcer diseae"),
            Some("Parinamasula Amlapitta")
        );
        let pos = table.diseases().iter().position(|d| d == "Typhoid").unwrap();
        assert_eq!(pos, 18);
    }

    #[test]
    fn unmapped_disease_is_its_own_synonym() {
        let table = TopicTable::builtin().unwrap();
        let topic = table.topic("Scurvy");
        assert_eq!(topic.synonym, "Scurvy");
        assert_eq!(table.topic("Jaundice").synonym, "Kamala");
    }

    #[test]
    fn retry_queries_are_ordered() {
        let table = TopicTable::builtin().unwrap();
        let queries = &table.retry_queries()["Hyperthyroidism"];
        assert_eq!(
            queries,
            &["Bhasmaka roga", "Thyroid ayurveda", "Metabolism disorder"]
        );
        assert_eq!(table.retry_queries().len(), 5);
    }

    #[test]
    fn disease_list_skips_comments() {
        let list = parse_disease_list("# diseases\nAcne\n\n  Malaria  \n");
        assert_eq!(list, vec!["Acne", "Malaria"]);
    }

    #[test]
    fn rejects_malformed_table() {
        assert!(TopicTable::from_json(r#"{"synonyms": [["only one"]]}"#).is_err());
    }
}
