//! Disease screening on top of an opaque classifier.
//!
//! The classifier itself is external: anything that maps a [`FeatureVector`]
//! to a probability per label. This module owns the caller-side guardrail
//! (too few symptoms means no diagnosis path), the co-occurrence
//! adjustments, and the top-3 renormalisation.

use serde::Serialize;

use crate::symptoms::{ExtractionResult, FeatureVector};

/// Fewer encoded symptoms than this is informational only.
pub const MIN_SCREENING_SYMPTOMS: usize = 2;

/// Number of ranked predictions kept.
pub const TOP_PREDICTIONS: usize = 3;

/// Below this top confidence (percent) a follow-up explains the split.
pub const SPLIT_CONFIDENCE: f64 = 80.0;

/// Black-box probabilistic classifier over a fixed, ordered label set.
pub trait DiseaseClassifier {
    fn labels(&self) -> &[String];

    /// One probability per label, in label order.
    fn predict_proba(&self, features: &FeatureVector) -> Vec<f64>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub disease: String,
    /// Percent, rounded to one decimal after renormalisation.
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Screening {
    /// Guardrail tripped: do not treat as a diagnosis.
    Insufficient { reason: String, detected: usize },
    Ranked {
        top: Prediction,
        alternatives: Vec<Prediction>,
        follow_up: Option<String>,
    },
}

impl Screening {
    pub fn is_sufficient(&self) -> bool {
        matches!(self, Self::Ranked { .. })
    }
}

/// Whether an extraction carries enough evidence to reach the classifier.
pub fn is_sufficient(result: &ExtractionResult) -> bool {
    result.encoded_count() >= MIN_SCREENING_SYMPTOMS
}

/// Guardrail, classify, adjust and rank.
pub fn screen(result: &ExtractionResult, classifier: &dyn DiseaseClassifier) -> Screening {
    let encoded = result.encoded_codes();
    if encoded.len() < MIN_SCREENING_SYMPTOMS {
        let reason = match encoded.first() {
            None => "I couldn't detect any specific medical symptoms in your text.".to_string(),
            Some(only) => format!(
                "You only mentioned '{}'. A single symptom is too broad for an accurate diagnosis.",
                only.display_name()
            ),
        };
        return Screening::Insufficient {
            reason: format!("{reason} Please describe your condition in more detail."),
            detected: encoded.len(),
        };
    }

    let has = |code: &str| encoded.iter().any(|c| c.as_str() == code);
    let jaundice_pattern = has("yellowish_skin") && has("yellowing_of_eyes");
    let itching = has("itching");
    let dengue_pattern = has("joint_pain") && has("skin_rash");

    let probabilities = classifier.predict_proba(&result.feature_vector);
    let mut predictions: Vec<Prediction> = classifier
        .labels()
        .iter()
        .zip(probabilities)
        .filter(|(_, p)| *p > 0.0)
        .map(|(label, p)| {
            let disease = label.trim().to_string();
            let mut confidence = p * 100.0;
            if jaundice_pattern {
                if disease == "Jaundice" && !itching {
                    confidence += 50.0;
                } else if disease == "Chronic cholestasis" && itching {
                    confidence += 50.0;
                }
            }
            if dengue_pattern && disease == "Dengue" {
                confidence += 30.0;
            }
            Prediction {
                disease,
                confidence,
            }
        })
        .collect();

    // Stable sort keeps label order among ties.
    predictions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    predictions.truncate(TOP_PREDICTIONS);

    let total: f64 = predictions.iter().map(|p| p.confidence).sum();
    if total > 0.0 {
        for p in &mut predictions {
            p.confidence = (p.confidence / total * 1000.0).round() / 10.0;
        }
    }

    let mut ranked = predictions.into_iter();
    let Some(top) = ranked.next() else {
        return Screening::Insufficient {
            reason: "The classifier returned no candidate diseases.".to_string(),
            detected: encoded.len(),
        };
    };
    let alternatives: Vec<Prediction> = ranked.collect();

    let follow_up = match alternatives.first() {
        Some(second) if top.confidence < SPLIT_CONFIDENCE => Some(format!(
            "Confidence is split. It is most likely {} ({:.1}%), but symptoms also align with {} ({:.1}%).",
            top.disease, top.confidence, second.disease, second.confidence
        )),
        _ => None,
    };

    Screening::Ranked {
        top,
        alternatives,
        follow_up,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Ontology, SymptomExtractor, Vocabulary};

    struct FixedClassifier {
        labels: Vec<String>,
        probs: Vec<f64>,
    }

    impl FixedClassifier {
        fn new(pairs: &[(&str, f64)]) -> Self {
            Self {
                labels: pairs.iter().map(|(l, _)| l.to_string()).collect(),
                probs: pairs.iter().map(|(_, p)| *p).collect(),
            }
        }
    }

    impl DiseaseClassifier for FixedClassifier {
        fn labels(&self) -> &[String] {
            &self.labels
        }

        fn predict_proba(&self, _features: &FeatureVector) -> Vec<f64> {
            self.probs.clone()
        }
    }

    fn extractor() -> SymptomExtractor {
        SymptomExtractor::new(Ontology::builtin().unwrap(), Vocabulary::builtin().unwrap())
    }

    #[test]
    fn zero_symptoms_trip_guardrail() {
        let r = extractor().extract("ok");
        let clf = FixedClassifier::new(&[("Malaria", 1.0)]);
        match screen(&r, &clf) {
            Screening::Insufficient { reason, detected } => {
                assert_eq!(detected, 0);
                assert!(reason.starts_with("I couldn't detect"));
            }
            other => panic!("expected insufficient, got {other:?}"),
        }
        assert!(!is_sufficient(&r));
    }

    #[test]
    fn single_symptom_trips_guardrail() {
        let r = extractor().extract("just a cough");
        assert_eq!(r.encoded_count(), 1);
        let clf = FixedClassifier::new(&[("Bronchial Asthma", 1.0)]);
        let s = screen(&r, &clf);
        assert!(!s.is_sufficient());
        if let Screening::Insufficient { reason, .. } = s {
            assert!(reason.contains("'cough'"));
            assert!(reason.ends_with("Please describe your condition in more detail."));
        }
    }

    #[test]
    fn two_symptoms_reach_classifier() {
        let r = extractor().extract("cough and fever");
        assert!(is_sufficient(&r));
        let clf = FixedClassifier::new(&[("Common Cold", 0.9), ("Pneumonia", 0.1)]);
        match screen(&r, &clf) {
            Screening::Ranked { top, alternatives, follow_up } => {
                assert_eq!(top.disease, "Common Cold");
                assert_eq!(top.confidence, 90.0);
                assert_eq!(alternatives.len(), 1);
                assert!(follow_up.is_none());
            }
            other => panic!("expected ranked, got {other:?}"),
        }
    }

    #[test]
    fn keeps_top_three_and_renormalises() {
        let r = extractor().extract("cough and fever");
        let clf = FixedClassifier::new(&[
            ("A", 0.4),
            ("B", 0.3),
            ("C", 0.2),
            ("D", 0.1),
            ("E", 0.0),
        ]);
        let Screening::Ranked { top, alternatives, follow_up } = screen(&r, &clf) else {
            panic!("expected ranked");
        };
        assert_eq!(top.disease, "A");
        assert_eq!(top.confidence, 44.4);
        assert_eq!(alternatives[0].confidence, 33.3);
        assert_eq!(alternatives[1].confidence, 22.2);
        assert_eq!(
            follow_up.as_deref(),
            Some("Confidence is split. It is most likely A (44.4%), but symptoms also align with B (33.3%).")
        );
    }

    #[test]
    fn yellow_skin_and_eyes_boost_jaundice_without_itching() {
        let r = extractor().extract("yellow skin and yellow eyes, also vomiting");
        let clf = FixedClassifier::new(&[("Hepatitis A", 0.6), ("Jaundice", 0.4)]);
        let Screening::Ranked { top, .. } = screen(&r, &clf) else {
            panic!("expected ranked");
        };
        assert_eq!(top.disease, "Jaundice");
    }

    #[test]
    fn itching_shifts_boost_to_cholestasis() {
        let r = extractor().extract("yellow skin, yellow eyes and itching");
        let clf = FixedClassifier::new(&[
            ("Jaundice", 0.5),
            ("Chronic cholestasis ", 0.3),
        ]);
        let Screening::Ranked { top, .. } = screen(&r, &clf) else {
            panic!("expected ranked");
        };
        assert_eq!(top.disease, "Chronic cholestasis");
    }

    #[test]
    fn joint_pain_with_rash_boosts_dengue() {
        let r = extractor().extract("joint pain and a rash");
        let clf = FixedClassifier::new(&[("Chicken pox", 0.6), ("Dengue", 0.4)]);
        let Screening::Ranked { top, .. } = screen(&r, &clf) else {
            panic!("expected ranked");
        };
        assert_eq!(top.disease, "Dengue");
    }

    #[test]
    fn all_zero_probabilities_are_insufficient() {
        let r = extractor().extract("cough and fever");
        let clf = FixedClassifier::new(&[("A", 0.0)]);
        assert!(!screen(&r, &clf).is_sufficient());
    }
}
