// ==========================================
// Repository integration tests
// ==========================================
// Round trips over a temp database, below the API layer.
// ==========================================


use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};
use hms_manager::db::open_sqlite_connection;
use hms_manager::domain::action_log::{ActionLog, ActionType};
use hms_manager::domain::handbook::{Handbook, Section};
use hms_manager::domain::sja::SjaRecord;
use hms_manager::domain::types::{RiskLevel, SjaStatus};
use hms_manager::repository::{
    ActionLogRepository, HandbookRepository, RiskAssessmentRepository, SjaRepository,
};
use test_helpers::create_test_db;

fn now() -> chrono::NaiveDateTime {
    Utc::now().naive_utc()
}

fn section(id: &str, parent: Option<&str>, title: &str, sort: i32) -> Section {
    Section {
        section_id: id.to_string(),
        handbook_id: "H1".to_string(),
        parent_section_id: parent.map(|s| s.to_string()),
        title: title.to_string(),
        body: String::new(),
        sort_order: sort,
        updated_at: now(),
        subsections: Vec::new(),
    }
}

#[test]
fn test_tree_assembly_from_flat_rows() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let repo = HandbookRepository::new(&db_path).unwrap();

    repo.upsert_handbook(&Handbook {
        handbook_id: "H1".to_string(),
        title: "HMS-håndbok".to_string(),
        description: None,
        revision: 1,
        updated_at: now(),
    })
    .unwrap();

    repo.insert_section(&section("a", None, "Rutiner", 2)).unwrap();
    repo.insert_section(&section("b", None, "Beredskap", 1)).unwrap();
    repo.insert_section(&section("a1", Some("a"), "Verneutstyr", 1)).unwrap();
    repo.insert_section(&section("a2", Some("a"), "Brannvern", 2)).unwrap();
    repo.insert_section(&section("a1x", Some("a1"), "Hjelm", 1)).unwrap();

    let tree = repo.load_tree("H1").unwrap();

    // Roots ordered by sort_order.
    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0].title, "Beredskap");
    assert_eq!(tree[1].title, "Rutiner");

    let rutiner = &tree[1];
    assert_eq!(rutiner.subsections.len(), 2);
    assert_eq!(rutiner.subsections[0].title, "Verneutstyr");
    assert_eq!(rutiner.subsections[0].subsections[0].title, "Hjelm");
    assert_eq!(rutiner.count(), 4);
}

#[test]
fn test_shared_connection_repositories() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = Arc::new(Mutex::new(open_sqlite_connection(&db_path).unwrap()));

    let sja_repo = SjaRepository::from_connection(conn.clone());
    let log_repo = ActionLogRepository::from_connection(conn);

    let record = SjaRecord {
        sja_id: "S1".to_string(),
        title: "Gravearbeid".to_string(),
        work_description: "Grøft for fiberkabel".to_string(),
        location: Some("Byggefelt B".to_string()),
        latitude: Some(60.39),
        longitude: Some(5.32),
        planned_date: NaiveDate::from_ymd_opt(2026, 9, 1),
        status: SjaStatus::Draft,
        created_by: "kari".to_string(),
        approved_by: None,
        approved_at: None,
        weather_snapshot_json: Some(r#"{"captured_at":"2026-08-01T10:00:00Z","days":[]}"#.to_string()),
        created_at: now(),
        updated_at: now(),
    };
    sja_repo.insert_record(&record).unwrap();

    let loaded = sja_repo.find_record("S1").unwrap().unwrap();
    assert_eq!(loaded.title, "Gravearbeid");
    assert_eq!(loaded.planned_date, NaiveDate::from_ymd_opt(2026, 9, 1));
    assert!(loaded.weather_snapshot_json.is_some());

    log_repo
        .insert(&ActionLog::new(
            ActionType::SjaCreated,
            "SJA",
            "S1",
            "kari",
            "Created SJA 'Gravearbeid'".to_string(),
        ))
        .unwrap();

    let entries = log_repo.list_by_entity("SJA", "S1").unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action_type, ActionType::SjaCreated);
}

#[test]
fn test_find_missing_returns_none() {
    let (_tmp, db_path) = create_test_db().unwrap();

    let risk_repo = RiskAssessmentRepository::new(&db_path).unwrap();
    assert!(risk_repo.find_assessment("missing").unwrap().is_none());
    assert!(risk_repo.find_hazard("missing").unwrap().is_none());

    let sja_repo = SjaRepository::new(&db_path).unwrap();
    assert!(sja_repo.find_record("missing").unwrap().is_none());
}

#[test]
fn test_hazards_listed_by_risk_level() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let repo = RiskAssessmentRepository::new(&db_path).unwrap();

    repo.insert_assessment(&hms_manager::domain::risk_assessment::RiskAssessment {
        assessment_id: "A1".to_string(),
        title: "Verksted".to_string(),
        area: None,
        status: hms_manager::domain::types::AssessmentStatus::Draft,
        created_by: "kari".to_string(),
        created_at: now(),
        updated_at: now(),
    })
    .unwrap();

    for (id, p, s) in [("h1", 5, 5), ("h2", 2, 2), ("h3", 4, 4)] {
        let value = p * s;
        repo.upsert_hazard(&hms_manager::domain::risk_assessment::Hazard {
            hazard_id: id.to_string(),
            assessment_id: "A1".to_string(),
            description: format!("hazard {}", id),
            probability: p,
            severity: s,
            risk_value: value,
            risk_level: if value > 15 {
                RiskLevel::High
            } else if value > 8 {
                RiskLevel::Medium
            } else {
                RiskLevel::Low
            },
            existing_controls: None,
            created_at: now(),
            updated_at: now(),
        })
        .unwrap();
    }

    let high = repo.list_hazards_by_level(RiskLevel::High).unwrap();
    assert_eq!(high.len(), 2);
    // Highest risk value first.
    assert_eq!(high[0].hazard_id, "h1");

    let all = repo.list_hazards("A1").unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.windows(2).all(|w| w[0].risk_value >= w[1].risk_value));
}
