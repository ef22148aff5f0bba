//! JSON snapshot load/save.
//!
//! Saving writes a temp file next to the target and renames it into place,
//! so a reader sees either the old snapshot or the new one.

use std::io::Write;
use std::path::Path;

use ayurdx_core::KnowledgeBase;
use tempfile::NamedTempFile;
use tracing::info;

use crate::StoreError;

pub fn load(path: &Path) -> Result<KnowledgeBase, StoreError> {
    if !path.exists() {
        return Err(StoreError::NotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    let kb: KnowledgeBase = serde_json::from_str(&text).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), records = kb.len(), "loaded knowledge base");
    Ok(kb)
}

/// Load `path`, or start empty if it does not exist yet.
pub fn load_or_default(path: &Path) -> Result<KnowledgeBase, StoreError> {
    match load(path) {
        Err(StoreError::NotFound(_)) => Ok(KnowledgeBase::new()),
        other => other,
    }
}

pub fn save(kb: &KnowledgeBase, path: &Path) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;

    let json = serde_json::to_string_pretty(kb).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
    writeln!(tmp, "{json}").map_err(|e| StoreError::io(path, e))?;
    tmp.persist(path)?;

    info!(path = %path.display(), records = kb.len(), "saved knowledge base");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ayurdx_core::KnowledgeRecord;
    use tempfile::TempDir;

    fn sample() -> KnowledgeBase {
        let mut kb = KnowledgeBase::new();
        let mut record = KnowledgeRecord {
            medicine_names: vec!["Arogyavardhini Vati".into(), "Kutki".into()],
            precautions: vec!["Avoid fried and oily food.".into()],
            preparation_tips: vec!["Take Kutki powder with warm water.".into()],
            ..Default::default()
        };
        record.regenerate_links();
        record.add_source("Sushruta Samhita (PDF)");
        kb.insert("Jaundice", record);
        kb
    }

    #[test]
    fn save_then_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("kb.json");
        let kb = sample();
        save(&kb, &path).unwrap();
        assert_eq!(load(&path).unwrap(), kb);
    }

    #[test]
    fn save_creates_parent_dirs_and_overwrites() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/data/kb.json");
        save(&sample(), &path).unwrap();
        save(&KnowledgeBase::new(), &path).unwrap();
        assert!(load(&path).unwrap().is_empty());
        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn snapshot_is_pretty_and_keyed_by_disease() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("kb.json");
        save(&sample(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n  \"Jaundice\": {"));
    }

    #[test]
    fn missing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("absent.json");
        assert!(matches!(load(&path), Err(StoreError::NotFound(_))));
        assert!(load_or_default(&path).unwrap().is_empty());
    }

    #[test]
    fn malformed_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("kb.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load(&path), Err(StoreError::Json { .. })));
    }
}
