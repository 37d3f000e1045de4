/// Property-based tests using proptest
/// Tests invariants that should hold for all inputs to the intake core.
use chrono::NaiveDate;
use proptest::prelude::*;
use readykids_cma_api::intake::{
    build_checks, build_connected_persons, build_premises_address, build_premises_details,
    build_registers, calculate_progress, generate_id,
};
use serde_json::{json, Value};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 14).unwrap()
}

// Property: id format holds across the padded range and beyond
proptest! {
    #[test]
    fn id_is_zero_padded_to_five_digits(seq in 1i64..=99999) {
        let id = generate_id(seq, 2026);
        prop_assert!(id.starts_with("RK-2026-"));
        let digits = &id["RK-2026-".len()..];
        prop_assert_eq!(digits.len(), 5);
        prop_assert!(digits.chars().all(|c| c.is_ascii_digit()));
        prop_assert_eq!(digits.parse::<i64>().unwrap(), seq);
    }

    #[test]
    fn id_never_truncates_large_sequences(seq in 100000i64..=10_000_000) {
        let id = generate_id(seq, 2026);
        let digits = &id["RK-2026-".len()..];
        prop_assert_eq!(digits, seq.to_string());
    }

    #[test]
    fn ids_with_distinct_sequences_never_collide(a in 1i64..=1_000_000, b in 1i64..=1_000_000) {
        prop_assume!(a != b);
        prop_assert_ne!(generate_id(a, 2026), generate_id(b, 2026));
    }
}

// Property: progress is always a percentage
proptest! {
    #[test]
    fn progress_is_bounded(statuses in proptest::collection::vec("[a-z-]{1,12}", 0..20)) {
        let mut checks = serde_json::Map::new();
        for (i, status) in statuses.iter().enumerate() {
            checks.insert(format!("check_{}", i), json!({"status": status}));
        }
        let progress = calculate_progress(Some(&Value::Object(checks)));
        prop_assert!((0..=100).contains(&progress));
    }

    #[test]
    fn all_complete_is_always_100(n in 1usize..=20) {
        let mut checks = serde_json::Map::new();
        for i in 0..n {
            checks.insert(format!("check_{}", i), json!({"status": "complete"}));
        }
        prop_assert_eq!(calculate_progress(Some(&Value::Object(checks))), 100);
    }
}

// Property: the builders never panic, whatever the form contains
proptest! {
    #[test]
    fn builders_tolerate_arbitrary_strings(s in "\\PC*") {
        let form = json!({
            "suitability": {"hasDBS": s.clone(), "dbsNumber": s.clone()},
            "qualifications": {"firstAidCompleted": s.clone()},
            "references": {"ref1": {"name": s.clone()}},
            "household": {"adults": [{"firstName": s.clone(), "lastName": s.clone()}]},
            "premises": {"type": s.clone(), "outdoorSpace": s.clone()},
            "homeAddress": {"line1": s.clone(), "postcode": s.clone()},
            "service": {"ageGroups": s.clone()},
        });
        let checks = build_checks(&form, today());
        prop_assert_eq!(checks.as_object().unwrap().len(), 11);
        let _ = build_connected_persons(&form);
        let _ = build_premises_address(&form);
        let _ = build_premises_details(&form);
        let _ = build_registers(&form);
    }

    #[test]
    fn builders_tolerate_wrong_shapes(n in any::<i64>()) {
        let form = json!({
            "suitability": n,
            "qualifications": [n],
            "references": n,
            "household": {"adults": n},
            "premises": n,
            "homeAddress": n,
            "service": n,
        });
        let checks = build_checks(&form, today());
        prop_assert_eq!(checks.as_object().unwrap().len(), 11);
        prop_assert_eq!(build_connected_persons(&form), json!([]));
        prop_assert_eq!(build_premises_address(&form), None);
        prop_assert_eq!(build_registers(&form), json!([]));
    }
}

// Property: connected-person ids track original list positions
proptest! {
    #[test]
    fn connected_person_ids_match_input_positions(
        names in proptest::collection::vec(("[A-Za-z]{0,8}", "[A-Za-z]{0,8}"), 0..10)
    ) {
        let adults: Vec<Value> = names
            .iter()
            .map(|(first, last)| json!({"firstName": first, "lastName": last}))
            .collect();
        let form = json!({"household": {"adults": adults}});

        let result = build_connected_persons(&form);
        let persons = result.as_array().unwrap();

        let expected: Vec<(usize, String)> = names
            .iter()
            .enumerate()
            .filter(|(_, (first, last))| !first.is_empty() && !last.is_empty())
            .map(|(i, (first, last))| (i, format!("{} {}", first, last)))
            .collect();

        prop_assert_eq!(persons.len(), expected.len());
        for (person, (i, name)) in persons.iter().zip(&expected) {
            prop_assert_eq!(person["id"].as_str().unwrap(), format!("CP-NEW-{:03}", i + 1));
            prop_assert_eq!(person["name"].as_str().unwrap(), name.as_str());
        }
    }
}

// Property: the joined address never carries empty segments
proptest! {
    #[test]
    fn premises_address_join_is_clean(
        line1 in proptest::option::of("[A-Za-z0-9 ]{0,12}"),
        line2 in proptest::option::of("[A-Za-z0-9 ]{0,12}"),
        town in proptest::option::of("[A-Za-z]{0,10}"),
        postcode in proptest::option::of("[A-Z0-9 ]{0,8}"),
    ) {
        let mut home = serde_json::Map::new();
        if let Some(v) = &line1 { home.insert("line1".to_string(), json!(v)); }
        if let Some(v) = &line2 { home.insert("line2".to_string(), json!(v)); }
        if let Some(v) = &town { home.insert("town".to_string(), json!(v)); }
        if let Some(v) = &postcode { home.insert("postcode".to_string(), json!(v)); }
        let form = json!({"homeAddress": home});

        let parts: Vec<&String> = [&line1, &line2, &town, &postcode]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();

        match build_premises_address(&form) {
            Some(addr) => {
                prop_assert!(!parts.is_empty());
                prop_assert_eq!(addr.split(", ").count(), parts.len());
                prop_assert!(!addr.starts_with(", ") && !addr.ends_with(", "));
            }
            None => prop_assert!(parts.is_empty()),
        }
    }
}
