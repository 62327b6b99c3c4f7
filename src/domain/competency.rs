// ==========================================
// HMS Manager - competency domain model
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// Employee
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub employee_id: String,
    pub name: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub active: bool,
}

// ==========================================
// Competency
// ==========================================
// A certificate/course held by an employee. expiry_date is optional: some
// competencies (e.g. internal inductions) never expire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Competency {
    pub competency_id: String,
    pub employee_id: String,
    pub title: String,
    pub category: Option<String>,
    pub issued_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub certificate_ref: Option<String>,
    pub created_at: NaiveDateTime,
}
