// ==========================================
// Handbook API tests
// ==========================================
// Tree CRUD, publishing (version snapshots) and search.
// ==========================================


use hms_manager::api::{ApiError, SectionInput};
use test_helpers::create_test_state;

const HANDBOOK_ID: &str = "hms-handbok";

fn section_input(parent: Option<&str>, title: &str, body: &str, sort: i32) -> SectionInput {
    SectionInput {
        handbook_id: HANDBOOK_ID.to_string(),
        parent_section_id: parent.map(|s| s.to_string()),
        title: title.to_string(),
        body: body.to_string(),
        sort_order: sort,
    }
}

#[test]
fn test_tree_crud() {
    let (_tmp, state) = create_test_state(Vec::new()).unwrap();
    state
        .handbook_api
        .ensure_handbook(HANDBOOK_ID, "HMS-håndbok", None)
        .unwrap();

    let root = state
        .handbook_api
        .create_section(section_input(None, "Rutiner", "", 1), "kari")
        .unwrap();
    let child = state
        .handbook_api
        .create_section(
            section_input(Some(&root.section_id), "Verneutstyr", "Hjelm er påbudt.", 1),
            "kari",
        )
        .unwrap();
    state
        .handbook_api
        .create_section(
            section_input(Some(&root.section_id), "Brannvern", "", 2),
            "kari",
        )
        .unwrap();

    let tree = state.handbook_api.get_tree(HANDBOOK_ID).unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].subsections.len(), 2);
    assert_eq!(tree[0].subsections[0].title, "Verneutstyr");

    // Recursive lookup over the nested tree.
    let found = tree[0].find_section(&child.section_id).unwrap();
    assert_eq!(found.title, "Verneutstyr");

    // Deleting the root cascades to the children.
    state
        .handbook_api
        .delete_section(&root.section_id, "kari")
        .unwrap();
    assert!(state.handbook_api.get_tree(HANDBOOK_ID).unwrap().is_empty());
}

#[test]
fn test_parent_must_exist_and_share_handbook() {
    let (_tmp, state) = create_test_state(Vec::new()).unwrap();
    state
        .handbook_api
        .ensure_handbook(HANDBOOK_ID, "HMS-håndbok", None)
        .unwrap();

    let result = state.handbook_api.create_section(
        section_input(Some("missing-parent"), "Foreldreløs", "", 1),
        "kari",
    );
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[test]
fn test_move_section_rejects_cycles() {
    let (_tmp, state) = create_test_state(Vec::new()).unwrap();
    state
        .handbook_api
        .ensure_handbook(HANDBOOK_ID, "HMS-håndbok", None)
        .unwrap();

    let a = state
        .handbook_api
        .create_section(section_input(None, "A", "", 1), "kari")
        .unwrap();
    let b = state
        .handbook_api
        .create_section(section_input(Some(&a.section_id), "B", "", 1), "kari")
        .unwrap();

    // A under its own child B would orphan the subtree.
    let result = state
        .handbook_api
        .move_section(&a.section_id, Some(&b.section_id), 1, "kari");
    assert!(matches!(result, Err(ApiError::BusinessRuleViolation(_))));

    // Self-parenting is rejected outright.
    let result = state
        .handbook_api
        .move_section(&a.section_id, Some(&a.section_id), 1, "kari");
    assert!(matches!(result, Err(ApiError::BusinessRuleViolation(_))));
}

#[test]
fn test_publishing_appends_versions() {
    let (_tmp, state) = create_test_state(Vec::new()).unwrap();
    state
        .handbook_api
        .ensure_handbook(HANDBOOK_ID, "HMS-håndbok", None)
        .unwrap();

    let section = state
        .handbook_api
        .create_section(section_input(None, "Avviksbehandling", "Meld avvik i skjema.", 1), "kari")
        .unwrap();

    let v1 = state
        .handbook_api
        .publish_section(&section.section_id, "kari")
        .unwrap();
    assert_eq!(v1.version_no, 1);

    state
        .handbook_api
        .update_section(
            &section.section_id,
            "Avviksbehandling",
            "Meld avvik i appen innen 24 timer.",
            "kari",
        )
        .unwrap();
    let v2 = state
        .handbook_api
        .publish_section(&section.section_id, "kari")
        .unwrap();
    assert_eq!(v2.version_no, 2);

    // Versions are immutable snapshots, newest first.
    let versions = state
        .handbook_api
        .list_section_versions(&section.section_id)
        .unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0].version_no, 2);
    assert_eq!(versions[1].body, "Meld avvik i skjema.");
}

#[test]
fn test_search_over_tree() {
    let (_tmp, state) = create_test_state(Vec::new()).unwrap();
    state
        .handbook_api
        .ensure_handbook(HANDBOOK_ID, "HMS-håndbok", None)
        .unwrap();

    let root = state
        .handbook_api
        .create_section(section_input(None, "Rutiner", "", 1), "kari")
        .unwrap();
    state
        .handbook_api
        .create_section(
            section_input(
                Some(&root.section_id),
                "Kjemikalier",
                "Stoffkartotek oppdateres årlig.",
                1,
            ),
            "kari",
        )
        .unwrap();

    let hits = state.handbook_api.search(HANDBOOK_ID, "stoffkartotek").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Kjemikalier");
    assert_eq!(hits[0].path, vec!["Rutiner"]);

    assert!(state.handbook_api.search(HANDBOOK_ID, "").unwrap().is_empty());
    assert!(state
        .handbook_api
        .search(HANDBOOK_ID, "finnes-ikke")
        .unwrap()
        .is_empty());
}

#[test]
fn test_title_validation() {
    let (_tmp, state) = create_test_state(Vec::new()).unwrap();
    state
        .handbook_api
        .ensure_handbook(HANDBOOK_ID, "HMS-håndbok", None)
        .unwrap();

    let result = state
        .handbook_api
        .create_section(section_input(None, "   ", "", 1), "kari");
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
}
