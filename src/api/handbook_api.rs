// ==========================================
// HMS Manager - handbook API
// ==========================================
// Responsibility: section CRUD on the handbook tree, publishing (version
// snapshots), search. Every mutation lands in the audit log.
// ==========================================

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{
    validate_id, validate_optional_text, validate_required_text, MAX_BODY_LEN, MAX_TITLE_LEN,
};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::handbook::{Handbook, Section, SectionVersion};
use crate::engine::section_search::{SearchHit, SectionSearchEngine};
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::handbook_repo::HandbookRepository;

// ==========================================
// Inputs
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionInput {
    pub handbook_id: String,
    pub parent_section_id: Option<String>,
    pub title: String,
    pub body: String,
    pub sort_order: i32,
}

// ==========================================
// HandbookApi
// ==========================================
pub struct HandbookApi {
    handbook_repo: Arc<HandbookRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    search_engine: SectionSearchEngine,
}

impl HandbookApi {
    pub fn new(
        handbook_repo: Arc<HandbookRepository>,
        action_log_repo: Arc<ActionLogRepository>,
    ) -> Self {
        Self {
            handbook_repo,
            action_log_repo,
            search_engine: SectionSearchEngine::new(),
        }
    }

    // ==========================================
    // Handbooks
    // ==========================================

    /// Create a handbook, or return the existing one with the same id.
    pub fn ensure_handbook(
        &self,
        handbook_id: &str,
        title: &str,
        description: Option<&str>,
    ) -> ApiResult<Handbook> {
        validate_id("handbook_id", handbook_id)?;
        validate_required_text("title", title, MAX_TITLE_LEN)?;

        if let Some(existing) = self.handbook_repo.find_handbook(handbook_id)? {
            return Ok(existing);
        }

        let handbook = Handbook {
            handbook_id: handbook_id.to_string(),
            title: title.to_string(),
            description: description.map(|s| s.to_string()),
            revision: 1,
            updated_at: Utc::now().naive_utc(),
        };
        self.handbook_repo.upsert_handbook(&handbook)?;
        Ok(handbook)
    }

    pub fn list_handbooks(&self) -> ApiResult<Vec<Handbook>> {
        Ok(self.handbook_repo.list_handbooks()?)
    }

    /// The full section tree of one handbook.
    pub fn get_tree(&self, handbook_id: &str) -> ApiResult<Vec<Section>> {
        validate_id("handbook_id", handbook_id)?;
        Ok(self.handbook_repo.load_tree(handbook_id)?)
    }

    // ==========================================
    // Sections
    // ==========================================

    pub fn create_section(&self, input: SectionInput, actor: &str) -> ApiResult<Section> {
        validate_id("handbook_id", &input.handbook_id)?;
        validate_required_text("title", &input.title, MAX_TITLE_LEN)?;
        validate_optional_text("body", Some(&input.body), MAX_BODY_LEN)?;

        if self.handbook_repo.find_handbook(&input.handbook_id)?.is_none() {
            return Err(ApiError::NotFound(format!(
                "Handbook (id={}) does not exist",
                input.handbook_id
            )));
        }

        // The parent must exist and belong to the same handbook.
        if let Some(ref parent_id) = input.parent_section_id {
            match self.handbook_repo.find_section(parent_id)? {
                None => {
                    return Err(ApiError::NotFound(format!(
                        "Section (id={}) does not exist",
                        parent_id
                    )))
                }
                Some(parent) if parent.handbook_id != input.handbook_id => {
                    return Err(ApiError::BusinessRuleViolation(
                        "parent section belongs to a different handbook".to_string(),
                    ))
                }
                Some(_) => {}
            }
        }

        let section = Section {
            section_id: Uuid::new_v4().to_string(),
            handbook_id: input.handbook_id,
            parent_section_id: input.parent_section_id,
            title: input.title,
            body: input.body,
            sort_order: input.sort_order,
            updated_at: Utc::now().naive_utc(),
            subsections: Vec::new(),
        };
        self.handbook_repo.insert_section(&section)?;

        self.log(
            ActionType::SectionCreated,
            &section.section_id,
            actor,
            format!("Created section '{}'", section.title),
        );
        info!(section_id = %section.section_id, "section created");

        Ok(section)
    }

    pub fn update_section(
        &self,
        section_id: &str,
        title: &str,
        body: &str,
        actor: &str,
    ) -> ApiResult<Section> {
        validate_id("section_id", section_id)?;
        validate_required_text("title", title, MAX_TITLE_LEN)?;
        validate_optional_text("body", Some(body), MAX_BODY_LEN)?;

        let mut section = self
            .handbook_repo
            .find_section(section_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Section (id={}) does not exist", section_id)))?;

        section.title = title.to_string();
        section.body = body.to_string();
        section.updated_at = Utc::now().naive_utc();
        self.handbook_repo.update_section(&section)?;

        self.log(
            ActionType::SectionUpdated,
            section_id,
            actor,
            format!("Updated section '{}'", section.title),
        );

        Ok(section)
    }

    /// Move a section within the tree and/or give it a new sort position.
    pub fn move_section(
        &self,
        section_id: &str,
        new_parent_id: Option<&str>,
        sort_order: i32,
        actor: &str,
    ) -> ApiResult<Section> {
        validate_id("section_id", section_id)?;

        let mut section = self
            .handbook_repo
            .find_section(section_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Section (id={}) does not exist", section_id)))?;

        if let Some(parent_id) = new_parent_id {
            if parent_id == section_id {
                return Err(ApiError::BusinessRuleViolation(
                    "a section cannot be its own parent".to_string(),
                ));
            }
            let parent = self
                .handbook_repo
                .find_section(parent_id)?
                .ok_or_else(|| ApiError::NotFound(format!("Section (id={}) does not exist", parent_id)))?;
            if parent.handbook_id != section.handbook_id {
                return Err(ApiError::BusinessRuleViolation(
                    "parent section belongs to a different handbook".to_string(),
                ));
            }
            // Reparenting under a descendant would detach the subtree.
            let tree = self.handbook_repo.load_tree(&section.handbook_id)?;
            if let Some(own) = tree.iter().find_map(|root| root.find_section(section_id)) {
                if own.find_section(parent_id).is_some() {
                    return Err(ApiError::BusinessRuleViolation(
                        "cannot move a section under its own subsection".to_string(),
                    ));
                }
            }
        }

        section.parent_section_id = new_parent_id.map(|s| s.to_string());
        section.sort_order = sort_order;
        section.updated_at = Utc::now().naive_utc();
        self.handbook_repo.update_section(&section)?;

        self.log(
            ActionType::SectionUpdated,
            section_id,
            actor,
            format!("Moved section '{}'", section.title),
        );

        Ok(section)
    }

    /// Delete a section and its subsections.
    pub fn delete_section(&self, section_id: &str, actor: &str) -> ApiResult<()> {
        validate_id("section_id", section_id)?;

        let section = self
            .handbook_repo
            .find_section(section_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Section (id={}) does not exist", section_id)))?;

        self.handbook_repo.delete_section(section_id)?;

        self.log(
            ActionType::SectionDeleted,
            section_id,
            actor,
            format!("Deleted section '{}'", section.title),
        );

        Ok(())
    }

    // ==========================================
    // Publishing
    // ==========================================

    /// Publish the current content of a section as the next immutable
    /// version.
    pub fn publish_section(&self, section_id: &str, actor: &str) -> ApiResult<SectionVersion> {
        validate_id("section_id", section_id)?;
        validate_id("actor", actor)?;

        let section = self
            .handbook_repo
            .find_section(section_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Section (id={}) does not exist", section_id)))?;

        let version_no = self.handbook_repo.next_version_no(section_id)?;
        let version = SectionVersion {
            version_id: Uuid::new_v4().to_string(),
            section_id: section_id.to_string(),
            version_no,
            title: section.title.clone(),
            body: section.body.clone(),
            published_by: actor.to_string(),
            published_at: Utc::now().naive_utc(),
        };
        self.handbook_repo.insert_section_version(&version)?;

        self.log(
            ActionType::SectionPublished,
            section_id,
            actor,
            format!("Published section '{}' as v{}", section.title, version_no),
        );
        info!(section_id = %section_id, version_no, "section published");

        Ok(version)
    }

    pub fn list_section_versions(&self, section_id: &str) -> ApiResult<Vec<SectionVersion>> {
        validate_id("section_id", section_id)?;
        Ok(self.handbook_repo.list_section_versions(section_id)?)
    }

    // ==========================================
    // Search
    // ==========================================

    /// Search the handbook tree (titles and bodies, case-insensitive).
    pub fn search(&self, handbook_id: &str, query: &str) -> ApiResult<Vec<SearchHit>> {
        validate_id("handbook_id", handbook_id)?;
        let tree = self.handbook_repo.load_tree(handbook_id)?;
        Ok(self.search_engine.search(&tree, query))
    }

    // ==========================================
    // Helpers
    // ==========================================

    fn log(&self, action_type: ActionType, entity_id: &str, actor: &str, summary: String) {
        let entry = ActionLog::new(action_type, "SECTION", entity_id, actor, summary);
        // Audit failures must not fail the primary operation.
        if let Err(e) = self.action_log_repo.insert(&entry) {
            tracing::warn!(error = %e, "failed to write action log entry");
        }
    }
}
