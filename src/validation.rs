//! Request validation applied before the core is invoked.
//!
//! Enforces required fields, maximum lengths, the email-shape pattern, and
//! the stage / timeline-type whitelists. The derivation core still handles
//! arbitrarily incomplete nested sub-structures on its own; this layer only
//! guards the fields named here.

use regex::Regex;
use serde_json::Value;

use crate::errors::AppError;

/// The seven workflow stages an application can be in.
pub const VALID_STAGES: [&str; 7] = [
    "new",
    "form-submitted",
    "checks",
    "review",
    "approved",
    "blocked",
    "registered",
];

/// The four timeline event types.
pub const VALID_TIMELINE_TYPES: [&str; 4] = ["action", "complete", "alert", "note"];

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_EVENT_LEN: usize = 2000;

/// Email-shape check: minimal length and structure first, then a simplified
/// RFC 5322 pattern for local@domain.tld.
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 5 || !email.contains('@') || !email.contains('.') {
        return false;
    }

    let email_regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();

    email_regex.is_match(email)
}

fn trimmed_str<'a>(obj: Option<&'a Value>, key: &str) -> Option<&'a str> {
    obj.and_then(|o| o.get(key))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Validates a creation payload: firstName, lastName, and email present and
/// non-blank, name parts within 200 characters, email within 254 and
/// email-shaped.
pub fn validate_create(body: &Value) -> Result<(), AppError> {
    let personal = body.get("personal");

    let first_name = trimmed_str(personal, "firstName");
    let last_name = trimmed_str(personal, "lastName");
    let email = trimmed_str(personal, "email");

    let (first_name, last_name, email) = match (first_name, last_name, email) {
        (Some(f), Some(l), Some(e)) => (f, l, e),
        _ => {
            return Err(AppError::BadRequest(
                "First name, last name, and email are required".to_string(),
            ))
        }
    };

    if first_name.len() > MAX_NAME_LEN {
        return Err(AppError::BadRequest(
            "First name must not exceed 200 characters".to_string(),
        ));
    }
    if last_name.len() > MAX_NAME_LEN {
        return Err(AppError::BadRequest(
            "Last name must not exceed 200 characters".to_string(),
        ));
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(AppError::BadRequest(
            "Email must not exceed 254 characters".to_string(),
        ));
    }
    if !is_valid_email(email) {
        return Err(AppError::BadRequest("Invalid email format".to_string()));
    }

    Ok(())
}

/// Validates an update payload. Only `stage` carries a whitelist; the rest
/// of the allow-listed fields are filtered by the store, not rejected here.
pub fn validate_update(body: &Value) -> Result<(), AppError> {
    if let Some(stage) = body.get("stage") {
        let valid = stage
            .as_str()
            .map(|s| VALID_STAGES.contains(&s))
            .unwrap_or(false);
        if !valid {
            return Err(AppError::BadRequest(format!(
                "Invalid stage. Must be one of: {}",
                VALID_STAGES.join(", ")
            )));
        }
    }
    Ok(())
}

/// Validates a timeline-event payload and returns the event text and type.
/// The type defaults to "action" when absent.
pub fn validate_timeline_event(body: &Value) -> Result<(&str, &str), AppError> {
    let event = body
        .get("event")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Event text is required".to_string()))?;

    if event.len() > MAX_EVENT_LEN {
        return Err(AppError::BadRequest(
            "Event text must not exceed 2000 characters".to_string(),
        ));
    }

    let event_type = body
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("action");

    if !VALID_TIMELINE_TYPES.contains(&event_type) {
        return Err(AppError::BadRequest(format!(
            "Invalid event type. Must be one of: {}",
            VALID_TIMELINE_TYPES.join(", ")
        )));
    }

    Ok((event, event_type))
}
