//! The classifier's closed, ordered symptom vocabulary.
//!
//! Order defines feature-vector alignment, so it is preserved exactly as
//! loaded. Disk-first with an embedded fallback: the training-set column
//! list ships inside the binary.

use std::collections::HashMap;
use std::path::Path;

use ayurdx_core::SymptomCode;
use thiserror::Error;

const EMBEDDED_VOCABULARY: &str = include_str!("../data/symptom_vocabulary.txt");

/// Training-set column holding the label, excluded from the vocabulary.
const LABEL_COLUMN: &str = "prognosis";

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("failed to read vocabulary {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("vocabulary is empty")]
    Empty,
    #[error("duplicate symptom code: {0}")]
    Duplicate(String),
}

/// Fixed, ordered list of symptom codes with O(1) position lookup.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    codes: Vec<SymptomCode>,
    index: HashMap<SymptomCode, usize>,
}

impl Vocabulary {
    /// Build from codes in vector order. Rejects empty input and duplicates.
    pub fn from_codes<I, S>(codes: I) -> Result<Self, VocabularyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<SymptomCode>,
    {
        let mut ordered = Vec::new();
        let mut index = HashMap::new();
        for code in codes {
            let code = code.into();
            if index.insert(code.clone(), ordered.len()).is_some() {
                return Err(VocabularyError::Duplicate(code.to_string()));
            }
            ordered.push(code);
        }
        if ordered.is_empty() {
            return Err(VocabularyError::Empty);
        }
        Ok(Self {
            codes: ordered,
            index,
        })
    }

    /// One code per line; blank lines are skipped.
    pub fn from_lines(text: &str) -> Result<Self, VocabularyError> {
        Self::from_codes(text.lines().map(str::trim).filter(|l| !l.is_empty()))
    }

    /// Column header of the training CSV, minus the label column.
    pub fn from_csv_header(header: &str) -> Result<Self, VocabularyError> {
        Self::from_codes(
            header
                .trim()
                .split(',')
                .map(|c| c.trim().trim_matches('"'))
                .filter(|c| !c.is_empty() && *c != LABEL_COLUMN),
        )
    }

    /// Load from disk. `.csv` files are read as a training-set header,
    /// anything else as one code per line.
    pub fn from_path(path: &Path) -> Result<Self, VocabularyError> {
        let text = std::fs::read_to_string(path).map_err(|source| VocabularyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            Self::from_csv_header(text.lines().next().unwrap_or_default())
        } else {
            Self::from_lines(&text)
        }
    }

    /// The embedded training-set vocabulary.
    pub fn builtin() -> Result<Self, VocabularyError> {
        Self::from_lines(EMBEDDED_VOCABULARY)
    }

    /// Disk override if given, embedded vocabulary otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, VocabularyError> {
        match path {
            Some(p) => Self::from_path(p),
            None => Self::builtin(),
        }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn codes(&self) -> &[SymptomCode] {
        &self.codes
    }

    /// Vector index of `code`, if it belongs to the vocabulary.
    pub fn position(&self, code: &str) -> Option<usize> {
        self.index.get(code).copied()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.index.contains_key(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_training_width() {
        let vocab = Vocabulary::builtin().unwrap();
        assert_eq!(vocab.len(), 132);
        assert_eq!(vocab.codes()[0].as_str(), "itching");
        assert_eq!(vocab.position("yellow_crust_ooze"), Some(131));
    }

    #[test]
    fn builtin_keeps_irregular_column_names() {
        let vocab = Vocabulary::builtin().unwrap();
        assert!(vocab.contains("spotting_ urination"));
        assert!(vocab.contains("dischromic _patches"));
        assert!(vocab.contains("fluid_overload.1"));
    }

    #[test]
    fn duplicates_rejected() {
        let err = Vocabulary::from_codes(["cough", "nausea", "cough"]).unwrap_err();
        assert!(matches!(err, VocabularyError::Duplicate(c) if c == "cough"));
    }

    #[test]
    fn empty_rejected() {
        assert!(matches!(
            Vocabulary::from_lines("\n\n"),
            Err(VocabularyError::Empty)
        ));
    }

    #[test]
    fn csv_header_drops_label_column() {
        let vocab = Vocabulary::from_csv_header("itching,skin_rash,prognosis\r\n").unwrap();
        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.position("skin_rash"), Some(1));
        assert!(!vocab.contains("prognosis"));
    }

    #[test]
    fn from_path_reads_csv_header() {
        let dir = std::env::temp_dir().join(format!("ayurdx-vocab-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("Training.csv");
        std::fs::write(&path, "cough,high_fever,prognosis\n1,0,Common Cold\n").unwrap();
        let vocab = Vocabulary::from_path(&path).unwrap();
        assert_eq!(vocab.codes().len(), 2);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Vocabulary::from_path(Path::new("/nonexistent/vocab.txt")).unwrap_err();
        assert!(matches!(err, VocabularyError::Io { .. }));
    }
}
