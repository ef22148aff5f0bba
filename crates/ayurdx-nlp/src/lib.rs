//! Language layer: symptom extraction for screening, and knowledge
//! extraction, verification and sanitization for the offline build.

pub mod classifier;
pub mod fill;
pub mod herbs;
pub mod knowledge;
pub mod normalize;
pub mod ontology;
pub mod sanitize;
pub mod symptoms;
pub mod vocabulary;

pub use classifier::{DiseaseClassifier, Prediction, Screening, is_sufficient, screen};
pub use fill::{FillOutcome, fill_blanks};
pub use knowledge::{ExtractedKnowledge, KnowledgeExtractor, TipPolicy};
pub use normalize::{NormalizedText, Normalizer};
pub use ontology::{Ontology, OntologyError, OntologyRule, RuleStage};
pub use sanitize::{
    SanitizeReport, VerifyReport, sanitize_knowledge_base, sanitize_record, verify_knowledge_base,
    verify_record,
};
pub use symptoms::{ExtractionResult, FeatureVector, RuleHit, SymptomExtractor, SymptomMetadata};
pub use vocabulary::{Vocabulary, VocabularyError};
