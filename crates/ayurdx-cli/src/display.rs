//! Vertical card display for knowledge records.

use ayurdx_core::{KnowledgeBase, KnowledgeRecord};

const MAX_LIST_ITEMS: usize = 10;

// ── Public API ──

/// Print one record as a card: medicines, precautions, tips, links, sources.
pub fn print_record_card(disease: &str, record: &KnowledgeRecord) {
    print!("{}", render_record_card(disease, record));
}

/// Print one line per disease with list sizes.
pub fn print_summary(kb: &KnowledgeBase) {
    print!("{}", render_summary(kb));
}

pub fn render_record_card(disease: &str, record: &KnowledgeRecord) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {disease} ===\n"));
    if !record.source.is_empty() {
        out.push_str(&record.source.join(" + "));
        out.push('\n');
    }
    out.push('\n');

    render_section(&mut out, "Medicines", &record.medicine_names);
    render_section(&mut out, "Precautions", &record.precautions);
    render_section(&mut out, "Preparation", &record.preparation_tips);
    render_section(&mut out, "Buy Links", &record.buy_links);
    out
}

pub fn render_summary(kb: &KnowledgeBase) -> String {
    let mut out = format!(
        "{:<42} {:>4} {:>4} {:>4}  source\n",
        "disease", "med", "prec", "tips"
    );
    for (disease, record) in kb.iter() {
        out.push_str(&format!(
            "{:<42} {:>4} {:>4} {:>4}  {}\n",
            disease,
            record.medicine_names.len(),
            record.precautions.len(),
            record.preparation_tips.len(),
            record.source.join(" + ")
        ));
    }
    out.push_str(&format!("\n{} diseases\n", kb.len()));
    out
}

// ── Section rendering ──

fn render_section(out: &mut String, header: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(header);
    out.push('\n');
    for item in items.iter().take(MAX_LIST_ITEMS) {
        out.push_str(&format!("  - {item}\n"));
    }
    if items.len() > MAX_LIST_ITEMS {
        out.push_str(&format!("  ... ({} more)\n", items.len() - MAX_LIST_ITEMS));
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_skips_empty_sections() {
        let mut record = KnowledgeRecord {
            medicine_names: vec!["Kutki".into()],
            precautions: vec!["Avoid alcohol completely.".into()],
            source: vec!["Sushruta Samhita (PDF)".into(), "Wikipedia API".into()],
            ..Default::default()
        };
        record.regenerate_links();
        let card = render_record_card("Jaundice", &record);
        assert!(card.starts_with("=== Jaundice ===\nSushruta Samhita (PDF) + Wikipedia API\n"));
        assert!(card.contains("Medicines\n  - Kutki\n"));
        assert!(card.contains("Buy Links\n  - https://www.1mg.com/search/all?name=Kutki\n"));
        assert!(!card.contains("Preparation"));
    }

    #[test]
    fn card_layout_is_exact() {
        let record = KnowledgeRecord {
            precautions: vec!["Avoid cold water.".into()],
            source: vec!["Wikipedia API".into()],
            ..Default::default()
        };
        assert_eq!(
            render_record_card("Cough", &record),
            "=== Cough ===\nWikipedia API\n\nPrecautions\n  - Avoid cold water.\n\n"
        );
    }

    #[test]
    fn not_found_card() {
        let card = render_record_card("Scurvy", &KnowledgeRecord::not_found());
        assert!(card.contains("System"));
        assert!(card.contains("  - No specific Ayurvedic data found."));
        assert!(!card.contains("Medicines"));
    }

    #[test]
    fn summary_lists_every_disease() {
        let mut kb = KnowledgeBase::new();
        kb.insert("Acne", KnowledgeRecord::not_found());
        kb.insert("Malaria", KnowledgeRecord::default());
        let summary = render_summary(&kb);
        assert_eq!(summary.lines().count(), 5);
        assert!(summary.contains("\n2 diseases"));
        assert!(summary.lines().nth(1).unwrap().starts_with("Acne "));
    }

    #[test]
    fn long_lists_are_truncated() {
        let mut out = String::new();
        let items: Vec<String> = (0..12).map(|i| format!("item {i}")).collect();
        render_section(&mut out, "Items", &items);
        assert!(out.contains("  ... (2 more)"));
        assert!(!out.contains("item 10"));
    }
}
