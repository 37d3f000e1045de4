/// Tests for the request-validation layer and the update allow-list.
use readykids_cma_api::errors::AppError;
use readykids_cma_api::store::updatable_column;
use readykids_cma_api::validation::{
    is_valid_email, validate_create, validate_timeline_event, validate_update, VALID_STAGES,
    VALID_TIMELINE_TYPES,
};
use serde_json::json;

fn bad_request_message(err: AppError) -> String {
    match err {
        AppError::BadRequest(msg) => msg,
        other => panic!("expected BadRequest, got {:?}", other),
    }
}

#[cfg(test)]
mod email_tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("test.user@example.com"));
        assert!(is_valid_email("user+tag@example.co.uk"));
        assert!(is_valid_email("user_name@example-domain.com"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email("notanemail"));
        assert!(!is_valid_email("missing@domain"));
        assert!(!is_valid_email("@nodomain.com"));
        assert!(!is_valid_email("no@.com"));
        assert!(!is_valid_email("spaces in@email.com"));
        assert!(!is_valid_email("double@@domain.com"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("a@b"));
    }
}

#[cfg(test)]
mod create_validation_tests {
    use super::*;

    fn valid_body() -> serde_json::Value {
        json!({
            "personal": {
                "firstName": "John",
                "lastName": "Doe",
                "email": "john@example.com",
            }
        })
    }

    #[test]
    fn test_valid_body_passes() {
        assert!(validate_create(&valid_body()).is_ok());
    }

    #[test]
    fn test_missing_personal() {
        let err = validate_create(&json!({})).unwrap_err();
        assert_eq!(
            bad_request_message(err),
            "First name, last name, and email are required"
        );
    }

    #[test]
    fn test_missing_email() {
        let body = json!({"personal": {"firstName": "John", "lastName": "Doe"}});
        assert!(validate_create(&body).is_err());
    }

    #[test]
    fn test_blank_first_name() {
        let body = json!({
            "personal": {"firstName": "   ", "lastName": "Doe", "email": "john@example.com"}
        });
        assert!(validate_create(&body).is_err());
    }

    #[test]
    fn test_first_name_too_long() {
        let body = json!({
            "personal": {
                "firstName": "A".repeat(201),
                "lastName": "Doe",
                "email": "john@example.com",
            }
        });
        let err = validate_create(&body).unwrap_err();
        assert_eq!(
            bad_request_message(err),
            "First name must not exceed 200 characters"
        );
    }

    #[test]
    fn test_last_name_too_long() {
        let body = json!({
            "personal": {
                "firstName": "John",
                "lastName": "B".repeat(201),
                "email": "john@example.com",
            }
        });
        let err = validate_create(&body).unwrap_err();
        assert_eq!(
            bad_request_message(err),
            "Last name must not exceed 200 characters"
        );
    }

    #[test]
    fn test_name_at_limit_passes() {
        let body = json!({
            "personal": {
                "firstName": "A".repeat(200),
                "lastName": "Doe",
                "email": "john@example.com",
            }
        });
        assert!(validate_create(&body).is_ok());
    }

    #[test]
    fn test_email_too_long() {
        let body = json!({
            "personal": {
                "firstName": "John",
                "lastName": "Doe",
                "email": format!("{}@test.com", "a".repeat(250)),
            }
        });
        let err = validate_create(&body).unwrap_err();
        assert_eq!(
            bad_request_message(err),
            "Email must not exceed 254 characters"
        );
    }

    #[test]
    fn test_invalid_email_shape() {
        let body = json!({
            "personal": {"firstName": "John", "lastName": "Doe", "email": "notanemail"}
        });
        assert!(validate_create(&body).is_err());
    }
}

#[cfg(test)]
mod update_validation_tests {
    use super::*;

    #[test]
    fn test_all_valid_stages_pass() {
        for stage in VALID_STAGES {
            assert!(validate_update(&json!({"stage": stage})).is_ok(), "{}", stage);
        }
    }

    #[test]
    fn test_invalid_stage() {
        let err = validate_update(&json!({"stage": "invalid-stage"})).unwrap_err();
        assert!(bad_request_message(err).contains("Invalid stage"));
    }

    #[test]
    fn test_empty_stage() {
        assert!(validate_update(&json!({"stage": ""})).is_err());
    }

    #[test]
    fn test_non_string_stage() {
        assert!(validate_update(&json!({"stage": 7})).is_err());
    }

    #[test]
    fn test_non_stage_fields_pass_through() {
        assert!(validate_update(&json!({"risk": "high", "progress": 75})).is_ok());
    }
}

#[cfg(test)]
mod timeline_validation_tests {
    use super::*;

    #[test]
    fn test_event_with_type() {
        let body = json!({"event": "DBS check completed", "type": "complete"});
        let (event, event_type) = validate_timeline_event(&body).unwrap();
        assert_eq!(event, "DBS check completed");
        assert_eq!(event_type, "complete");
    }

    #[test]
    fn test_type_defaults_to_action() {
        let body = json!({"event": "Note added"});
        let (_, event_type) = validate_timeline_event(&body).unwrap();
        assert_eq!(event_type, "action");
    }

    #[test]
    fn test_missing_event() {
        let err = validate_timeline_event(&json!({"type": "action"})).unwrap_err();
        assert_eq!(bad_request_message(err), "Event text is required");
    }

    #[test]
    fn test_blank_event() {
        assert!(validate_timeline_event(&json!({"event": "  "})).is_err());
    }

    #[test]
    fn test_event_too_long() {
        let body = json!({"event": "A".repeat(2001), "type": "action"});
        let err = validate_timeline_event(&body).unwrap_err();
        assert_eq!(
            bad_request_message(err),
            "Event text must not exceed 2000 characters"
        );
    }

    #[test]
    fn test_event_at_limit_passes() {
        let body = json!({"event": "A".repeat(2000), "type": "action"});
        assert!(validate_timeline_event(&body).is_ok());
    }

    #[test]
    fn test_all_valid_types_pass() {
        for event_type in VALID_TIMELINE_TYPES {
            let body = json!({"event": "Test event", "type": event_type});
            assert!(validate_timeline_event(&body).is_ok(), "{}", event_type);
        }
    }

    #[test]
    fn test_invalid_type() {
        let body = json!({"event": "Test event", "type": "urgent"});
        assert!(validate_timeline_event(&body).is_err());
    }
}

#[cfg(test)]
mod update_allow_list_tests {
    use super::*;

    #[test]
    fn test_snake_case_keys() {
        assert_eq!(updatable_column("stage"), Some("stage"));
        assert_eq!(updatable_column("risk"), Some("risk"));
        assert_eq!(updatable_column("progress"), Some("progress"));
        assert_eq!(updatable_column("checks"), Some("checks"));
        assert_eq!(updatable_column("connected_persons"), Some("connected_persons"));
        assert_eq!(updatable_column("ofsted_check"), Some("ofsted_check"));
        assert_eq!(updatable_column("registration_date"), Some("registration_date"));
        assert_eq!(updatable_column("registration_number"), Some("registration_number"));
    }

    #[test]
    fn test_camel_case_aliases() {
        assert_eq!(updatable_column("connectedPersons"), Some("connected_persons"));
        assert_eq!(updatable_column("ofstedCheck"), Some("ofsted_check"));
        assert_eq!(updatable_column("registrationDate"), Some("registration_date"));
        assert_eq!(updatable_column("registrationNumber"), Some("registration_number"));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        assert_eq!(updatable_column("id"), None);
        assert_eq!(updatable_column("email"), None);
        assert_eq!(updatable_column("last_updated"), None);
        assert_eq!(updatable_column("checks; DROP TABLE applications"), None);
    }
}
