//! Derivation rules applied to a raw application form at intake.
//!
//! Everything here is a pure transform over the submitted JSON payload. The
//! form arrives from an external web form and any nested sub-structure may be
//! missing or incomplete, so all reads are defensive navigation rather than
//! strict deserialization.

use chrono::NaiveDate;
use serde_json::{json, Value};

/// Builds a human-readable application id from a sequence value and year.
///
/// The numeric part is zero-padded to a minimum of 5 digits; larger sequence
/// values render in full (100000 stays "100000").
pub fn generate_id(seq_val: i64, year: i32) -> String {
    format!("RK-{}-{:05}", year, seq_val)
}

/// Percentage of checklist entries whose status is exactly "complete".
///
/// Rounds half away from zero. Empty or absent checks map to 0.
pub fn calculate_progress(checks: Option<&Value>) -> i32 {
    let entries = match checks.and_then(Value::as_object) {
        Some(obj) if !obj.is_empty() => obj,
        _ => return 0,
    };

    let complete = entries
        .values()
        .filter(|entry| entry.get("status").and_then(Value::as_str) == Some("complete"))
        .count();

    ((complete as f64 / entries.len() as f64) * 100.0).round() as i32
}

/// Reads a string field off a nested object, treating empty strings as absent.
fn non_empty_str<'a>(obj: Option<&'a Value>, key: &str) -> Option<&'a str> {
    obj.and_then(|o| o.get(key))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Nulls out falsy values the way the form layer treats them: absent, null,
/// empty string, false, and zero all become null. Anything else passes
/// through unchanged.
fn value_or_null(v: Option<&Value>) -> Value {
    match v {
        Some(Value::String(s)) if s.is_empty() => Value::Null,
        Some(Value::Bool(false)) => Value::Null,
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Value::Null,
        Some(other) => other.clone(),
        None => Value::Null,
    }
}

/// Derives the initial eleven-entry compliance checklist from the form.
///
/// Every key starts at not-started; the suitability, qualifications, and
/// references sub-structures can independently upgrade individual entries.
/// `today` is a single snapshot for the whole invocation, so both references
/// (if present) carry the identical date.
pub fn build_checks(form: &Value, today: NaiveDate) -> Value {
    let today = today.format("%Y-%m-%d").to_string();

    let mut checks = json!({
        "dbs": {"status": "not-started", "date": null},
        "dbs_update": {"status": "not-started", "date": null},
        "la_check": {"status": "not-started", "date": null},
        "ofsted": {"status": "not-started", "date": null},
        "gp_health": {"status": "not-started", "date": null},
        "ref_1": {"status": "not-started", "date": null},
        "ref_2": {"status": "not-started", "date": null},
        "first_aid": {"status": "not-started", "date": null},
        "safeguarding": {"status": "not-started", "date": null},
        "food_hygiene": {"status": "not-started", "date": null},
        "insurance": {"status": "not-started", "date": null},
    });

    // DBS requires both the declaration and a certificate number; the flag
    // alone leaves the entry at its default.
    let suitability = form.get("suitability");
    if non_empty_str(suitability, "hasDBS") == Some("Yes") {
        if let Some(number) = non_empty_str(suitability, "dbsNumber") {
            checks["dbs"] = json!({
                "status": "pending",
                "date": today,
                "certificate": number,
                "details": "Certificate number provided on application",
            });
        }
    }

    let quals = form.get("qualifications");
    for (slot, completed, date, org) in [
        ("first_aid", "firstAidCompleted", "firstAidDate", "firstAidOrg"),
        (
            "safeguarding",
            "safeguardingCompleted",
            "safeguardingDate",
            "safeguardingOrg",
        ),
        (
            "food_hygiene",
            "foodHygieneCompleted",
            "foodHygieneDate",
            "foodHygieneOrg",
        ),
    ] {
        if non_empty_str(quals, completed) == Some("Yes") {
            checks[slot] = json!({
                "status": "complete",
                "date": non_empty_str(quals, date),
                "provider": non_empty_str(quals, org),
            });
        }
    }

    let references = form.get("references");
    for (slot, key) in [("ref_1", "ref1"), ("ref_2", "ref2")] {
        let referee = references.and_then(|r| r.get(key));
        if let Some(name) = non_empty_str(referee, "name") {
            checks[slot] = json!({
                "status": "pending",
                "date": today,
                "referee": name,
                "relationship": non_empty_str(referee, "relationship"),
                "details": "Reference request to be sent",
            });
        }
    }

    checks
}

/// Derives the connected-persons list from `household.adults`.
///
/// Adults missing either name part are dropped, not rejected. The synthetic
/// id keeps the 1-based position from the original input list, so ids stay
/// stable even when earlier entries are skipped.
pub fn build_connected_persons(form: &Value) -> Value {
    let adults = form
        .get("household")
        .and_then(|h| h.get("adults"))
        .and_then(Value::as_array);

    let mut persons = Vec::new();
    if let Some(adults) = adults {
        for (i, adult) in adults.iter().enumerate() {
            let first = non_empty_str(Some(adult), "firstName");
            let last = non_empty_str(Some(adult), "lastName");
            let (first, last) = match (first, last) {
                (Some(f), Some(l)) => (f, l),
                _ => continue,
            };

            persons.push(json!({
                "id": format!("CP-NEW-{:03}", i + 1),
                "name": format!("{} {}", first, last),
                "type": "household",
                "relationship": non_empty_str(Some(adult), "relationship")
                    .unwrap_or("Household member"),
                "dob": non_empty_str(Some(adult), "dob"),
                "formStatus": "not-started",
                "formType": "CMA-H2",
                "checks": {
                    "dbs": {"status": "not-started", "date": null},
                    "la_check": {"status": "not-started", "date": null},
                },
            }));
        }
    }

    Value::Array(persons)
}

/// Resolves the single display address for the premises.
///
/// Domestic premises (the default when type is absent) use the home address
/// unless `sameAsHome` is explicitly false; everything else uses the
/// premises' own address block. Returns None when no usable parts exist.
pub fn build_premises_address(form: &Value) -> Option<String> {
    let premises = form.get("premises");

    let premises_type = non_empty_str(premises, "type").unwrap_or("Domestic");
    let same_as_home = premises.and_then(|p| p.get("sameAsHome"));

    let source = if premises_type == "Domestic" && same_as_home != Some(&Value::Bool(false)) {
        form.get("homeAddress")
    } else {
        premises.and_then(|p| p.get("address"))
    };

    join_address_parts(source)
}

/// Joins line1, line2, town, postcode (in that order) with ", ", dropping
/// empty or absent parts. Zero surviving parts yields None, not "".
fn join_address_parts(address: Option<&Value>) -> Option<String> {
    let parts: Vec<&str> = ["line1", "line2", "town", "postcode"]
        .iter()
        .filter_map(|key| non_empty_str(address, key))
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// The registers applied for: `service.ageGroups`, defaulting to an empty
/// list.
pub fn build_registers(form: &Value) -> Value {
    form.get("service")
        .and_then(|s| s.get("ageGroups"))
        .filter(|v| !v.is_null())
        .cloned()
        .unwrap_or_else(|| json!([]))
}

/// Snapshot of the situational premises flags persisted alongside the
/// derived address.
pub fn build_premises_details(form: &Value) -> Value {
    let premises = form.get("premises");
    json!({
        "sameAsHome": premises.and_then(|p| p.get("sameAsHome")).cloned().unwrap_or(Value::Null),
        "outdoorSpace": value_or_null(premises.and_then(|p| p.get("outdoorSpace"))),
        "pets": value_or_null(premises.and_then(|p| p.get("pets"))),
        "petsDetails": value_or_null(premises.and_then(|p| p.get("petsDetails"))),
    })
}
