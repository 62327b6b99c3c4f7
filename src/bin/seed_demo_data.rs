// ==========================================
// HMS Manager - demo data seeder
// ==========================================
// Seeds a database with a small handbook, one risk assessment, one SJA
// and a handful of employees/competencies. Intended for local demos and
// manual testing.
//
// Usage: seed_demo_data [db_path]
// ==========================================

use chrono::NaiveDate;
use hms_manager::api::{
    CompetencyInput, EmployeeInput, HazardInput, MeasureInput, SectionInput, SjaHazardInput,
    SjaInput,
};
use hms_manager::app::{get_default_db_path, AppState};
use hms_manager::domain::types::MeasureStatus;

const ACTOR: &str = "seed";

fn main() {
    hms_manager::logging::init();

    let db_path = std::env::args()
        .nth(1)
        .unwrap_or_else(get_default_db_path);
    tracing::info!("seeding demo data into {}", db_path);

    let state = AppState::new(db_path).expect("unable to initialize AppState");

    seed(&state).expect("seeding failed");
    tracing::info!("demo data seeded");
}

fn seed(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    // ===== handbook =====
    let handbook = state.handbook_api.ensure_handbook(
        "hms-handbok",
        "HMS-håndbok",
        Some("Helse, miljø og sikkerhet"),
    )?;

    let routines = state.handbook_api.create_section(
        SectionInput {
            handbook_id: handbook.handbook_id.clone(),
            parent_section_id: None,
            title: "Rutiner".to_string(),
            body: "Overordnede HMS-rutiner.".to_string(),
            sort_order: 1,
        },
        ACTOR,
    )?;
    state.handbook_api.create_section(
        SectionInput {
            handbook_id: handbook.handbook_id.clone(),
            parent_section_id: Some(routines.section_id.clone()),
            title: "Verneutstyr".to_string(),
            body: "Hjelm og vernesko er påbudt på hele anlegget.".to_string(),
            sort_order: 1,
        },
        ACTOR,
    )?;
    let fire = state.handbook_api.create_section(
        SectionInput {
            handbook_id: handbook.handbook_id.clone(),
            parent_section_id: Some(routines.section_id.clone()),
            title: "Brannvern".to_string(),
            body: "Rømningsveier skal holdes frie.".to_string(),
            sort_order: 2,
        },
        ACTOR,
    )?;
    state.handbook_api.publish_section(&fire.section_id, ACTOR)?;

    // ===== risk assessment =====
    let assessment =
        state
            .risk_api
            .create_assessment("Risikovurdering verksted", Some("Verksted"), ACTOR)?;
    let hazard = state.risk_api.save_hazard(
        HazardInput {
            hazard_id: None,
            assessment_id: assessment.assessment_id.clone(),
            description: "Fall fra stillas".to_string(),
            probability: 3,
            severity: 4,
            existing_controls: Some("Rekkverk montert".to_string()),
        },
        ACTOR,
    )?;
    state.risk_api.save_measure(
        MeasureInput {
            measure_id: None,
            hazard_id: hazard.hazard_id.clone(),
            description: "Montere fallsikringsnett".to_string(),
            responsible: Some("Kari Nordmann".to_string()),
            due_date: NaiveDate::from_ymd_opt(2026, 9, 15),
            status: MeasureStatus::Planned,
        },
        ACTOR,
    )?;

    // ===== SJA =====
    let sja = state.sja_api.create_sja(
        SjaInput {
            title: "Kranløft ved kai".to_string(),
            work_description: "Løft av betongelementer".to_string(),
            location: Some("Kai 3, Oslo".to_string()),
            latitude: Some(59.9050),
            longitude: Some(10.7527),
            planned_date: NaiveDate::from_ymd_opt(2026, 8, 20),
        },
        ACTOR,
    )?;
    state.sja_api.save_hazard(
        SjaHazardInput {
            sja_hazard_id: None,
            sja_id: sja.sja_id.clone(),
            description: "Hengende last over personell".to_string(),
            probability: 2,
            severity: 5,
            mitigation: Some("Sperre av området under løftet".to_string()),
        },
        ACTOR,
    )?;

    // ===== employees / competencies =====
    let employee = state.competency_api.save_employee(
        EmployeeInput {
            employee_id: None,
            name: "Ola Hansen".to_string(),
            email: Some("ola.hansen@example.com".to_string()),
            role: Some("Kranfører".to_string()),
            active: true,
        },
        ACTOR,
    )?;
    state.competency_api.save_competency(
        CompetencyInput {
            competency_id: None,
            employee_id: employee.employee_id.clone(),
            title: "Kranførerbevis G4".to_string(),
            category: Some("Sertifikat".to_string()),
            issued_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            expiry_date: NaiveDate::from_ymd_opt(2026, 10, 1),
            certificate_ref: Some("G4-2024-0117".to_string()),
        },
        ACTOR,
    )?;

    Ok(())
}
