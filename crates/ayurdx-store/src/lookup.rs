//! Serving-time lookup by disease name.

use ayurdx_core::{KnowledgeBase, KnowledgeRecord};
use tracing::debug;

/// Exact match first; otherwise the first key (in key order) that contains
/// `name` or is contained in it, ignoring case.
pub fn lookup<'a>(kb: &'a KnowledgeBase, name: &str) -> Option<(&'a str, &'a KnowledgeRecord)> {
    if let Some((key, record)) = kb.iter().find(|(key, _)| *key == name) {
        return Some((key, record));
    }
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    let found = kb.iter().find(|(key, _)| {
        let key = key.to_lowercase();
        key.contains(&needle) || needle.contains(&key)
    });
    if let Some((key, _)) = found {
        debug!(query = name, matched = key, "substring lookup");
    }
    found
}

/// Like [`lookup`], but serves the not-found record instead of nothing.
pub fn lookup_or_not_found(kb: &KnowledgeBase, name: &str) -> KnowledgeRecord {
    lookup(kb, name)
        .map(|(_, record)| record.clone())
        .unwrap_or_else(KnowledgeRecord::not_found)
}
