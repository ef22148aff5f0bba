//! Text normalisation shared by symptom extraction and knowledge mining.
//!
//! Pipeline: raw input → lower-case → word tokens → lemma per alphabetic
//! token → stopword filter. The lowered raw string is kept alongside the
//! lemma forms because several ontology rules match raw substrings to
//! tolerate inflections the lemmatiser misses.
//!
//! Lemmas come from an irregular-form table first and the Snowball English
//! stemmer otherwise. Rule patterns are lemmatised with the same function,
//! so both sides of a comparison always agree.

use std::collections::{HashMap, HashSet};

use rust_stemmers::{Algorithm, Stemmer};

/// Irregular inflections the stemmer cannot reduce.
const IRREGULAR_FORMS: &[(&str, &str)] = &[
    ("threw", "throw"),
    ("thrown", "throw"),
    ("ate", "eat"),
    ("eaten", "eat"),
    ("felt", "feel"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("was", "be"),
    ("were", "be"),
    ("been", "be"),
    ("is", "be"),
    ("are", "be"),
    ("am", "be"),
    ("had", "have"),
    ("has", "have"),
    ("did", "do"),
    ("does", "do"),
    ("slept", "sleep"),
    ("lost", "lose"),
    ("worse", "bad"),
    ("worst", "bad"),
];

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "almost", "also", "always", "am",
    "among", "an", "and", "any", "are", "around", "as", "at", "be", "because", "been", "before",
    "being", "below", "between", "both", "but", "by", "can", "could", "did", "do", "does",
    "doing", "done", "down", "during", "each", "either", "else", "even", "ever", "every", "few",
    "for", "from", "further", "get", "go", "had", "has", "have", "having", "he", "her", "here",
    "hers", "herself", "him", "himself", "his", "how", "however", "i", "if", "in", "into", "is",
    "it", "its", "itself", "just", "keep", "last", "least", "less", "made", "make", "many", "may",
    "me", "might", "mine", "more", "most", "mostly", "much", "must", "my", "myself", "neither",
    "never", "no", "nor", "not", "now", "of", "off", "often", "on", "once", "only", "or", "other",
    "our", "ours", "ourselves", "out", "over", "own", "per", "quite", "rather", "really", "same",
    "say", "see", "seem", "seems", "several", "she", "should", "since", "so", "some", "still",
    "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then", "there",
    "these", "they", "this", "those", "though", "through", "thus", "to", "together", "too",
    "under", "until", "up", "upon", "us", "very", "via", "was", "we", "well", "were", "what",
    "whatever", "when", "where", "whether", "which", "while", "who", "whole", "whom", "whose",
    "why", "will", "with", "within", "without", "would", "yet", "you", "your", "yours",
    "yourself", "yourselves",
];

/// Result of normalising one input string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedText {
    /// The input, lower-cased, otherwise untouched.
    pub raw_lower: String,
    /// Lower-cased surface word tokens, digits included.
    pub words: Vec<String>,
    /// Lemma of every alphabetic token, stopwords kept (phrase matching).
    pub tokens: Vec<String>,
    /// Lemmas with stopwords removed.
    pub lemmas: Vec<String>,
}

impl NormalizedText {
    /// Lemmas joined with single spaces.
    pub fn lemma_text(&self) -> String {
        self.lemmas.join(" ")
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Lower-casing, tokenising, lemmatising normaliser.
///
/// Holds the stemmer and lookup tables; build once and share by reference.
pub struct Normalizer {
    stemmer: Stemmer,
    irregular: HashMap<&'static str, &'static str>,
    stopwords: HashSet<&'static str>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
            irregular: IRREGULAR_FORMS.iter().copied().collect(),
            stopwords: STOPWORDS.iter().copied().collect(),
        }
    }

    /// Normalise `text`. Empty or symbol-only input yields empty sequences.
    pub fn normalize(&self, text: &str) -> NormalizedText {
        let raw_lower = text.to_lowercase();
        let words = tokenize(&raw_lower);

        let mut tokens = Vec::with_capacity(words.len());
        let mut lemmas = Vec::with_capacity(words.len());
        for word in &words {
            if !word.chars().all(char::is_alphabetic) {
                continue;
            }
            let lemma = self.lemma(word);
            if !self.stopwords.contains(word.as_str()) {
                lemmas.push(lemma.clone());
            }
            tokens.push(lemma);
        }

        NormalizedText {
            raw_lower,
            words,
            tokens,
            lemmas,
        }
    }

    /// Lemma of a single lower-case word.
    pub fn lemma(&self, word: &str) -> String {
        match self.irregular.get(word) {
            Some(base) => (*base).to_string(),
            None => self.stemmer.stem(word).into_owned(),
        }
    }

    /// Lemmatise every word of a multi-word term and rejoin with spaces.
    pub fn lemma_phrase(&self, phrase: &str) -> String {
        tokenize(&phrase.to_lowercase())
            .iter()
            .map(|w| self.lemma(w))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }
}

/// Split lower-cased text into alphanumeric word tokens.
///
/// Contractions keep only the part before the apostrophe ("i'm" → "i").
pub fn tokenize(lower: &str) -> Vec<String> {
    lower
        .split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '\u{2019}'))
        .filter_map(|chunk| {
            let head = chunk.split(['\'', '\u{2019}']).next().unwrap_or_default();
            (!head.is_empty()).then(|| head.to_string())
        })
        .collect()
}

/// Title-case a string the way Python's `str.title` does: a cased letter is
/// upper-cased when the previous character is not a letter, lower-cased
/// otherwise.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if prev_alpha {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_alpha = c.is_alphabetic();
    }
    out
}

/// Upper-case the first character, leave the rest untouched.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
