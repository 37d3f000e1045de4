use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

// ============ Database Models ============

/// One childminder registration case record, as persisted.
///
/// This is the aggregate root. The nested form sub-structures (home address,
/// qualifications, household, etc.) are stored as JSON-encoded text and kept
/// opaque here; only the intake builders and the dashboard transform read
/// into them.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ApplicationRow {
    /// Human-readable application id, e.g. `RK-2026-00001`. Immutable.
    pub id: String,
    pub title: Option<String>,
    pub first_name: Option<String>,
    pub middle_names: Option<String>,
    pub last_name: Option<String>,
    /// Display name, set to "<first> <last>" at creation.
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Date of birth as supplied on the form (free text, expected ISO).
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub right_to_work: Option<String>,
    /// National-insurance number.
    pub ni_number: Option<String>,
    /// JSON-encoded home address sub-structure.
    pub home_address: Option<String>,
    /// Premises type, lowercased (e.g. "domestic").
    pub premises_type: Option<String>,
    /// Derived single-line display address.
    pub premises_address: Option<String>,
    /// JSON-encoded premises flags snapshot (sameAsHome, outdoorSpace, pets).
    pub premises_details: Option<String>,
    pub local_authority: Option<String>,
    /// JSON-encoded list of registers (age groups) applied for.
    pub registers: Option<String>,
    /// JSON-encoded service offering sub-structure.
    pub service: Option<String>,
    /// Workflow stage, one of the seven fixed values.
    pub stage: Option<String>,
    /// Risk level, defaults to "low".
    pub risk: Option<String>,
    /// Checklist completion percentage, 0-100.
    pub progress: Option<i32>,
    /// JSON-encoded eleven-entry compliance checklist.
    pub checks: Option<String>,
    /// JSON-encoded list of connected persons.
    pub connected_persons: Option<String>,
    pub previous_names: Option<String>,
    pub address_history: Option<String>,
    pub qualifications: Option<String>,
    pub employment_history: Option<String>,
    pub references_data: Option<String>,
    pub household: Option<String>,
    pub suitability: Option<String>,
    pub declaration: Option<String>,
    /// JSON-encoded Ofsted check outcome, set via the update path.
    pub ofsted_check: Option<String>,
    pub registration_date: Option<String>,
    pub registration_number: Option<String>,
    pub start_date: Option<NaiveDateTime>,
    /// Bumped on every update; drives the days-in-stage figure.
    pub last_updated: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
}

/// One immutable, append-only event log row attached to an application.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TimelineRow {
    pub id: i64,
    pub application_id: String,
    pub event: String,
    /// One of: action, complete, alert, note.
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub event_type: String,
    pub created_at: NaiveDateTime,
}

// ============ API Response Models ============

/// The externally-visible projection of an application plus its timeline.
///
/// Field defaults and formatting follow the dashboard contract: blank strings
/// for missing contact fields, "new"/"low"/0 for missing stage/risk/progress,
/// and the trailing optional fields omitted entirely when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardApplication {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub dob: Option<String>,
    pub stage: String,
    pub start_date: Option<String>,
    pub registration_date: Option<String>,
    pub last_updated: Option<String>,
    /// Whole days since the last update, never negative.
    pub days_in_stage: i64,
    pub risk: String,
    pub progress: i32,
    pub premises_type: String,
    pub premises_address: String,
    pub local_authority: String,
    pub registers: Value,
    pub checks: Value,
    pub connected_persons: Value,
    /// Newest first.
    pub timeline: Vec<TimelineItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ni_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ofsted_check: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub household: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premises_details: Option<Value>,
}

/// A timeline entry reduced to its display form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineItem {
    /// `YYYY-MM-DD HH:MM`, minute precision.
    pub date: Option<String>,
    pub event: String,
    #[serde(rename = "type")]
    pub event_type: String,
}
