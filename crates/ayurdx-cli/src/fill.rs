//! Blank-filling pass over a loaded snapshot.

use ayurdx_core::KnowledgeBase;
use ayurdx_harvest::{Harvester, TopicTable, harvest_or_absent};
use ayurdx_nlp::fill_blanks;
use tracing::info;

pub struct FillStats {
    /// Records that had at least one empty list.
    pub candidates: usize,
    /// Records that were modified.
    pub changed: usize,
}

/// Fill empty lists of every incomplete record from `harvester`.
pub async fn run_fill_blanks(
    kb: &mut KnowledgeBase,
    harvester: &dyn Harvester,
    topics: &TopicTable,
) -> FillStats {
    let blanks: Vec<String> = kb
        .iter()
        .filter(|(_, record)| record.has_blanks())
        .map(|(disease, _)| disease.to_string())
        .collect();
    let mut stats = FillStats {
        candidates: blanks.len(),
        changed: 0,
    };

    for disease in &blanks {
        let topic = topics.topic(disease);
        let Some(harvest) = harvest_or_absent(harvester, &topic).await else {
            continue;
        };
        let Some(record) = kb.get_mut(disease) else {
            continue;
        };
        let before = record.clone();
        let outcome = fill_blanks(record, &harvest.text);
        if *record != before {
            stats.changed += 1;
            info!(
                disease = %disease,
                medicines = outcome.medicines,
                precautions = outcome.precautions,
                preparation_tips = outcome.preparation_tips,
                "filled blanks"
            );
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ayurdx_core::KnowledgeRecord;
    use ayurdx_core::record::SOURCE_ENCYCLOPEDIA;
    use ayurdx_harvest::{FetchError, Harvest, Topic};
    use std::sync::Mutex;

    struct Encyclopedia {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Harvester for Encyclopedia {
        fn name(&self) -> &str {
            "encyclopedia"
        }

        async fn fetch(&self, topic: &Topic) -> Result<Harvest, FetchError> {
            self.seen.lock().unwrap().push(topic.disease.clone());
            if topic.disease == "Malaria" {
                return Err(FetchError::NotFound(topic.disease.clone()));
            }
            Ok(Harvest::new(
                "Neem and tulsi are used. Patients should avoid stagnant water and mosquitoes.",
                SOURCE_ENCYCLOPEDIA,
            ))
        }
    }

    #[tokio::test]
    async fn only_incomplete_records_are_fetched() {
        let complete = KnowledgeRecord {
            medicine_names: vec!["Neem".into()],
            precautions: vec!["Avoid oily food at all times.".into()],
            preparation_tips: vec!["Boil neem leaves in water.".into()],
            ..Default::default()
        };
        let mut kb = KnowledgeBase::new();
        kb.insert("Acne", complete.clone());
        kb.insert("Dengue", KnowledgeRecord::default());
        kb.insert("Malaria", KnowledgeRecord::default());

        let harvester = Encyclopedia {
            seen: Mutex::new(Vec::new()),
        };
        let topics = TopicTable::builtin().unwrap();
        let stats = run_fill_blanks(&mut kb, &harvester, &topics).await;

        assert_eq!(stats.candidates, 2);
        assert_eq!(stats.changed, 1);
        assert_eq!(*harvester.seen.lock().unwrap(), vec!["Dengue", "Malaria"]);
        assert_eq!(kb.get("Acne"), Some(&complete));
        let dengue = kb.get("Dengue").unwrap();
        assert_eq!(dengue.medicine_names, vec!["Neem", "Tulsi"]);
        assert_eq!(dengue.source, vec![SOURCE_ENCYCLOPEDIA]);
        assert_eq!(kb.get("Malaria"), Some(&KnowledgeRecord::default()));
    }
}
