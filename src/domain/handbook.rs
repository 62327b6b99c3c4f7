// ==========================================
// HMS Manager - handbook domain model
// ==========================================
// The HMS handbook is a tree of sections. Published content is kept as
// immutable section versions so older revisions stay readable.
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Handbook
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Handbook {
    pub handbook_id: String,
    pub title: String,
    pub description: Option<String>,
    pub revision: i32,
    pub updated_at: NaiveDateTime,
}

// ==========================================
// Section - one node in the handbook tree
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub section_id: String,
    pub handbook_id: String,
    pub parent_section_id: Option<String>,
    pub title: String,
    pub body: String,
    pub sort_order: i32,
    pub updated_at: NaiveDateTime,

    /// Child sections, ordered by sort_order.
    #[serde(default)]
    pub subsections: Vec<Section>,
}

impl Section {
    /// Find a section by id in this subtree (self included).
    pub fn find_section(&self, section_id: &str) -> Option<&Section> {
        if self.section_id == section_id {
            return Some(self);
        }
        for child in &self.subsections {
            if let Some(found) = child.find_section(section_id) {
                return Some(found);
            }
        }
        None
    }

    /// Depth-first flattening of this subtree (self first).
    pub fn flatten(&self) -> Vec<&Section> {
        let mut out = vec![self];
        for child in &self.subsections {
            out.extend(child.flatten());
        }
        out
    }

    /// Total number of sections in this subtree (self included).
    pub fn count(&self) -> usize {
        1 + self.subsections.iter().map(Section::count).sum::<usize>()
    }
}

// ==========================================
// SectionVersion - published snapshot
// ==========================================
// Immutable once written; version_no is monotonically increasing per
// section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionVersion {
    pub version_id: String,
    pub section_id: String,
    pub version_no: i32,
    pub title: String,
    pub body: String,
    pub published_by: String,
    pub published_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn section(id: &str, children: Vec<Section>) -> Section {
        Section {
            section_id: id.to_string(),
            handbook_id: "H1".to_string(),
            parent_section_id: None,
            title: format!("Section {}", id),
            body: String::new(),
            sort_order: 0,
            updated_at: NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            subsections: children,
        }
    }

    #[test]
    fn test_find_section_nested() {
        let tree = section("a", vec![section("b", vec![section("c", vec![])]), section("d", vec![])]);

        assert!(tree.find_section("a").is_some());
        assert_eq!(tree.find_section("c").unwrap().section_id, "c");
        assert!(tree.find_section("x").is_none());
    }

    #[test]
    fn test_flatten_is_depth_first() {
        let tree = section("a", vec![section("b", vec![section("c", vec![])]), section("d", vec![])]);

        let ids: Vec<&str> = tree.flatten().iter().map(|s| s.section_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        assert_eq!(tree.count(), 4);
    }
}
