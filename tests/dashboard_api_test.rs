// ==========================================
// Dashboard API tests
// ==========================================
// Overview counts assembled across the aggregates.
// ==========================================


use chrono::NaiveDate;
use hms_manager::api::{
    CompetencyInput, EmployeeInput, HazardInput, MeasureInput, SjaInput,
};
use hms_manager::domain::types::{MeasureStatus, SjaStatus};
use test_helpers::create_test_state;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn test_overview_counts() {
    let (_tmp, state) = create_test_state(Vec::new()).unwrap();
    let today = d(2026, 8, 1);

    // One high-risk hazard with one open measure.
    let assessment = state
        .risk_api
        .create_assessment("Risikovurdering kran", None, "kari")
        .unwrap();
    let hazard = state
        .risk_api
        .save_hazard(
            HazardInput {
                hazard_id: None,
                assessment_id: assessment.assessment_id.clone(),
                description: "Hengende last".to_string(),
                probability: 4,
                severity: 5,
                existing_controls: None,
            },
            "kari",
        )
        .unwrap();
    state
        .risk_api
        .save_measure(
            MeasureInput {
                measure_id: None,
                hazard_id: hazard.hazard_id.clone(),
                description: "Avsperring".to_string(),
                responsible: None,
                due_date: None,
                status: MeasureStatus::Planned,
            },
            "kari",
        )
        .unwrap();

    // One SJA waiting for approval.
    let sja = state
        .sja_api
        .create_sja(
            SjaInput {
                title: "Kranløft".to_string(),
                work_description: String::new(),
                location: None,
                latitude: None,
                longitude: None,
                planned_date: None,
            },
            "kari",
        )
        .unwrap();
    state
        .sja_api
        .transition_status(&sja.sja_id, SjaStatus::AwaitingApproval, "kari")
        .unwrap();

    // One expired and one expiring competency.
    let employee = state
        .competency_api
        .save_employee(
            EmployeeInput {
                employee_id: None,
                name: "Ola Hansen".to_string(),
                email: None,
                role: None,
                active: true,
            },
            "admin",
        )
        .unwrap();
    for (title, expiry) in [
        ("Førstehjelpskurs", d(2026, 6, 1)),
        ("Kranførerbevis", d(2026, 9, 1)),
    ] {
        state
            .competency_api
            .save_competency(
                CompetencyInput {
                    competency_id: None,
                    employee_id: employee.employee_id.clone(),
                    title: title.to_string(),
                    category: None,
                    issued_date: None,
                    expiry_date: Some(expiry),
                    certificate_ref: None,
                },
                "admin",
            )
            .unwrap();
    }

    let overview = state.dashboard_api.get_overview(today).unwrap();

    assert_eq!(overview.open_measure_count, 1);
    assert_eq!(overview.high_risk_hazard_count, 1);
    assert_eq!(overview.sja_awaiting_approval_count, 1);
    assert_eq!(overview.expired_competency_count, 1);
    assert_eq!(overview.expiring_competency_count, 1);

    // The feed saw every mutation above.
    assert!(!overview.recent_actions.is_empty());
}

#[test]
fn test_overview_on_empty_database() {
    let (_tmp, state) = create_test_state(Vec::new()).unwrap();

    let overview = state.dashboard_api.get_overview(d(2026, 8, 1)).unwrap();
    assert_eq!(overview.open_measure_count, 0);
    assert_eq!(overview.high_risk_hazard_count, 0);
    assert_eq!(overview.sja_awaiting_approval_count, 0);
    assert_eq!(overview.expired_competency_count, 0);
    assert_eq!(overview.expiring_competency_count, 0);
    assert!(overview.recent_actions.is_empty());
}
