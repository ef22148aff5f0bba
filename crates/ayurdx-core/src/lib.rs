pub mod record;
pub mod schema;
pub mod symptom;

pub use record::{KnowledgeBase, KnowledgeRecord, buy_link, strip_unverified};
pub use schema::kb;
pub use symptom::{Severity, SymptomCode};
