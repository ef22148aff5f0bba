//! Herb vocabularies and formulation suffixes.
//!
//! Three lists with different jobs: the extraction gazetteer scanned over
//! harvested text, the shorter encyclopedia list used when filling blanks,
//! and the wider verification vocabulary that decides whether a candidate
//! name is a known Ayurvedic term.

use std::collections::HashSet;
use std::sync::OnceLock;

/// Single herbs scanned for in harvested text (word-boundary, any case).
pub const EXTRACTION_HERBS: &[&str] = &[
    "ashwagandha", "neem", "tulsi", "turmeric", "giloy", "amla", "triphala", "guduchi",
    "shatavari", "brahmi", "arjuna", "guggulu", "shilajit", "licorice", "yashtimadhu", "haridra",
    "ginger", "garlic", "pippali", "cardamom", "clove", "sandalwood", "aloe vera", "bhringraj",
    "manjistha", "kutki", "chirata", "kalmegh", "punarnava", "gokshura", "vacha", "lodhra",
    "dhanyaka", "shallaki", "bhumyamalaki", "katuki", "pushkarmool", "rasna", "dashamula",
    "bala", "vidari", "kapikacchu", "shankhapushpi", "jatamansi", "musta", "sariva", "usheera",
    "chandana", "papaya leaf", "gandhak", "haritaki", "bibhitaki", "maricha", "shunti", "kumari",
    "bakuchi", "khadira", "kamadudha", "avipattikar", "sutashekhar", "haridra khanda",
    "mahasudarshan", "trikatu", "ela",
];

/// Terms scanned for in encyclopedia text during blank filling.
pub const ENCYCLOPEDIA_HERBS: &[&str] = &[
    "ashwagandha", "neem", "tulsi", "turmeric", "giloy", "amla", "triphala", "guduchi",
    "shatavari", "brahmi", "arjuna", "guggulu", "shilajit", "licorice", "yashtimadhu", "haridra",
    "ginger", "pippali", "cardamom", "clove", "sandalwood", "punarnava", "gokshura", "vacha",
    "shallaki", "bhumyamalaki", "katuki", "mukta", "sarpagandha", "jatamansi", "rudraksha",
    "bhasma", "churna", "taila", "ghrita",
];

/// Known Ayurvedic terms: herbs, classical formulations and dosage forms.
pub const VERIFIED_TERMS: &[&str] = &[
    "ashwagandha", "neem", "tulsi", "turmeric", "giloy", "amla", "triphala", "guduchi",
    "shatavari", "brahmi", "arjuna", "guggulu", "shilajit", "licorice", "yashtimadhu", "haridra",
    "ginger", "pippali", "cardamom", "clove", "sandalwood", "aloe vera", "bhringraj", "manjistha",
    "kutki", "chirata", "kalmegh", "punarnava", "gokshura", "kaishore", "chandraprabha",
    "arogyavardhini", "sanjivani", "tribhuvana", "sitopaladi", "avipattikar", "mahanarayan",
    "khadirarishta", "dashamularishta", "ashokarishta", "kumaryasava", "chyawanprash", "vacha",
    "lodhra", "dhanyaka", "gandhak", "rasayan", "bhasma", "pishti", "lauha", "mandur", "parpati",
    "prakara", "taila", "ghrita", "churna", "kashayam", "arishta", "asava", "vati", "gutika",
    "rasa", "lepa", "anjana", "nasyam", "mahasudarshan", "kanchanara", "sahachara",
    "balashwagandha", "dhanwantharam", "kottamchukkadi", "murivenna", "anu taila", "shadbindu",
    "kunkumadi", "ela",
];

/// Dosage-form words that close a classical formulation name
/// ("Triphala Churna", "Mahanarayan Taila").
pub const FORMULATION_SUFFIXES: &[&str] = &[
    "Vati", "Churna", "Bhasma", "Taila", "Tailam", "Ghrita", "Ghritam", "Ras", "Rasa", "Arishta",
    "Asava", "Kwath", "Kashayam", "Guggulu", "Lehya", "Lepa",
];

fn verified_terms() -> &'static HashSet<&'static str> {
    static TERMS: OnceLock<HashSet<&'static str>> = OnceLock::new();
    TERMS.get_or_init(|| VERIFIED_TERMS.iter().copied().collect())
}

/// True if the whole name, or any of its whitespace/hyphen-separated parts,
/// is a known Ayurvedic term.
pub fn is_verified(name: &str) -> bool {
    let lower = name.to_lowercase();
    let terms = verified_terms();
    if terms.contains(lower.trim()) {
        return true;
    }
    lower
        .split(|c: char| c.is_whitespace() || c == '-')
        .any(|part| terms.contains(part))
}

/// True if `name` is exactly a vocabulary herb (any list), ignoring case.
pub fn is_herb_name(name: &str) -> bool {
    let lower = name.trim().to_lowercase();
    verified_terms().contains(lower.as_str())
        || EXTRACTION_HERBS.contains(&lower.as_str())
        || ENCYCLOPEDIA_HERBS.contains(&lower.as_str())
}

/// True if `name` is nothing but a dosage-form word, e.g. "Churna".
pub fn is_bare_suffix(name: &str) -> bool {
    let trimmed = name.trim();
    FORMULATION_SUFFIXES
        .iter()
        .any(|s| s.eq_ignore_ascii_case(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_on_any_part() {
        assert!(is_verified("Triphala Churna"));
        assert!(is_verified("Maha-Sudarshan Vati"));
        assert!(is_verified("Neem"));
        assert!(!is_verified("The Doctor"));
        assert!(!is_verified("Page 10"));
    }

    #[test]
    fn verifies_multiword_terms_whole() {
        assert!(is_verified("Aloe Vera"));
        assert!(is_verified("anu taila"));
    }

    #[test]
    fn herb_name_is_exact() {
        assert!(is_herb_name("Ela"));
        assert!(is_herb_name("papaya leaf"));
        assert!(!is_herb_name("Ela Churna"));
    }

    #[test]
    fn bare_suffix_detection() {
        assert!(is_bare_suffix("Churna"));
        assert!(is_bare_suffix(" lepa "));
        assert!(!is_bare_suffix("Triphala Churna"));
    }

    #[test]
    fn gazetteer_has_short_herb() {
        assert!(EXTRACTION_HERBS.iter().any(|h| h.len() < 4));
    }
}
