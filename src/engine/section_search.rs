// ==========================================
// HMS Manager - handbook section search engine
// ==========================================
// Responsibility: flatten the section tree and run a case-insensitive
// substring search over titles and bodies. Each hit carries the ancestor
// breadcrumb so the UI can show where in the handbook it sits.
// ==========================================

use crate::domain::handbook::Section;
use serde::{Deserialize, Serialize};

// ==========================================
// SearchHit
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub section_id: String,
    pub title: String,
    /// Titles of the ancestors, root first (the hit itself excluded).
    pub path: Vec<String>,
    /// True when the query matched the title (and not only the body).
    pub title_match: bool,
}

// ==========================================
// SectionSearchEngine
// ==========================================
pub struct SectionSearchEngine;

impl SectionSearchEngine {
    pub fn new() -> Self {
        Self
    }

    /// Search the given trees. A blank query matches nothing.
    ///
    /// Title hits are ordered before body-only hits; within each group the
    /// original tree order is kept.
    pub fn search(&self, roots: &[Section], query: &str) -> Vec<SearchHit> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut hits = Vec::new();
        for root in roots {
            Self::walk(root, &needle, &mut Vec::new(), &mut hits);
        }

        hits.sort_by_key(|h| !h.title_match);
        hits
    }

    fn walk(section: &Section, needle: &str, path: &mut Vec<String>, hits: &mut Vec<SearchHit>) {
        let title_match = section.title.to_lowercase().contains(needle);
        let body_match = section.body.to_lowercase().contains(needle);

        if title_match || body_match {
            hits.push(SearchHit {
                section_id: section.section_id.clone(),
                title: section.title.clone(),
                path: path.clone(),
                title_match,
            });
        }

        path.push(section.title.clone());
        for child in &section.subsections {
            Self::walk(child, needle, path, hits);
        }
        path.pop();
    }
}

impl Default for SectionSearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn section(id: &str, title: &str, body: &str, children: Vec<Section>) -> Section {
        Section {
            section_id: id.to_string(),
            handbook_id: "H1".to_string(),
            parent_section_id: None,
            title: title.to_string(),
            body: body.to_string(),
            sort_order: 0,
            updated_at: NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            subsections: children,
        }
    }

    #[test]
    fn test_search_matches_title_and_body() {
        let tree = section(
            "a",
            "Verneutstyr",
            "",
            vec![
                section("b", "Hjelm", "Påbudt på hele anlegget", vec![]),
                section("c", "Hørselvern", "Bruk ved støy over 85 dB", vec![]),
            ],
        );

        let engine = SectionSearchEngine::new();
        let hits = engine.search(std::slice::from_ref(&tree), "hjelm");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].section_id, "b");
        assert_eq!(hits[0].path, vec!["Verneutstyr"]);
        assert!(hits[0].title_match);

        let hits = engine.search(std::slice::from_ref(&tree), "støy");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].section_id, "c");
        assert!(!hits[0].title_match);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let tree = section("a", "Brannvern", "", vec![]);
        let engine = SectionSearchEngine::new();
        assert_eq!(engine.search(std::slice::from_ref(&tree), "BRANN").len(), 1);
    }

    #[test]
    fn test_blank_query_matches_nothing() {
        let tree = section("a", "Brannvern", "", vec![]);
        let engine = SectionSearchEngine::new();
        assert!(engine.search(std::slice::from_ref(&tree), "   ").is_empty());
    }

    #[test]
    fn test_title_hits_sort_first() {
        let tree = section(
            "a",
            "Rutiner",
            "",
            vec![
                section("b", "Avfall", "Kjemikalier leveres godkjent mottak", vec![]),
                section("c", "Kjemikalier", "Stoffkartotek", vec![]),
            ],
        );

        let engine = SectionSearchEngine::new();
        let hits = engine.search(std::slice::from_ref(&tree), "kjemikalier");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].section_id, "c");
        assert!(hits[0].title_match);
    }
}
