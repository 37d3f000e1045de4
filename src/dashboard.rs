//! Read-side projection of a stored application into its dashboard shape.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{json, Value};

use crate::models::{ApplicationRow, DashboardApplication, TimelineItem, TimelineRow};

/// Parses a JSON-encoded text column. Absent columns stay None; a column
/// that does not parse is treated the same way rather than failing the read.
pub fn parse_json_column(raw: Option<&str>) -> Option<Value> {
    raw.and_then(|s| serde_json::from_str(s).ok())
}

/// Formats a timestamp column as a `YYYY-MM-DD` display date.
pub fn format_date(dt: Option<NaiveDateTime>) -> Option<String> {
    dt.map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// Formats a timestamp column as `YYYY-MM-DD HH:MM` (minute precision).
pub fn format_datetime(dt: Option<NaiveDateTime>) -> Option<String> {
    dt.map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
}

/// Clips a free-text date to its date portion: the first 10 characters,
/// which turns a full ISO timestamp into `YYYY-MM-DD` and leaves a plain
/// date untouched.
pub fn clip_date(raw: Option<&str>) -> Option<String> {
    raw.map(|s| s.chars().take(10).collect())
}

/// Whole days between `now` and the last update, floored at 0.
///
/// Stored timestamps are timezone-naive and read as UTC. A missing
/// last-updated value counts as "just now".
pub fn days_in_stage(last_updated: Option<NaiveDateTime>, now: DateTime<Utc>) -> i64 {
    let last_updated = match last_updated {
        Some(dt) => dt.and_utc(),
        None => now,
    };
    (now - last_updated).num_days().max(0)
}

/// Combines a persisted application row and its timeline (oldest first) into
/// the externally-visible dashboard shape.
///
/// Applies the display defaults, parses the JSON-encoded columns, derives
/// days-in-stage, and reverses the timeline so the newest entry leads.
pub fn to_dashboard_shape(
    row: &ApplicationRow,
    timeline: &[TimelineRow],
    now: DateTime<Utc>,
) -> DashboardApplication {
    let checks = parse_json_column(row.checks.as_deref()).unwrap_or_else(|| json!({}));
    let connected_persons =
        parse_json_column(row.connected_persons.as_deref()).unwrap_or_else(|| json!([]));
    let registers = parse_json_column(row.registers.as_deref()).unwrap_or_else(|| json!([]));

    DashboardApplication {
        id: row.id.clone(),
        name: row.name.clone().unwrap_or_default(),
        email: row.email.clone().unwrap_or_default(),
        phone: row.phone.clone().unwrap_or_default(),
        dob: clip_date(row.dob.as_deref()),
        stage: row.stage.clone().unwrap_or_else(|| "new".to_string()),
        start_date: format_date(row.start_date),
        registration_date: clip_date(row.registration_date.as_deref()),
        last_updated: format_date(row.last_updated),
        days_in_stage: days_in_stage(row.last_updated, now),
        risk: row.risk.clone().unwrap_or_else(|| "low".to_string()),
        progress: row.progress.unwrap_or(0),
        premises_type: row.premises_type.clone().unwrap_or_default(),
        premises_address: row.premises_address.clone().unwrap_or_default(),
        local_authority: row.local_authority.clone().unwrap_or_default(),
        registers,
        checks,
        connected_persons,
        timeline: timeline
            .iter()
            .rev()
            .map(|entry| TimelineItem {
                date: format_datetime(Some(entry.created_at)),
                event: entry.event.clone(),
                event_type: entry.event_type.clone(),
            })
            .collect(),
        ni_number: row.ni_number.clone(),
        registration_number: row.registration_number.clone(),
        ofsted_check: parse_json_column(row.ofsted_check.as_deref()),
        household: parse_json_column(row.household.as_deref()),
        service: parse_json_column(row.service.as_deref()),
        premises_details: parse_json_column(row.premises_details.as_deref()),
    }
}
