// tests/config_resolve.rs
//
// Configuration loading and fragment -> event resolution.
//
use std::fs;
use std::path::PathBuf;

use hallbot::config::Config;
use hallbot::model::{BookingPolicy, Event};

fn write_config(name: &str, json: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("hallbot-test-{name}-{}.json", std::process::id()));
    fs::write(&path, json).unwrap();
    path
}

fn catalog() -> Vec<Event> {
    vec![
        Event::new(1, "Formal Hall"),
        Event::new(2, "Formal Hall (vegetarian)"),
        Event::new(3, "Cafeteria Lunch"),
    ]
}

const BASE: &str = r#"{
  "default_user_id": "svc001",
  "default_password": "pw",
  "smtp_username": "bot@example.org",
  "smtp_password": "pw",
  "users": [
    {
      "user_id": "abc123",
      "password": "pw",
      "friends": ["Jones"],
      "events": {
        "Tue": "formal hall",
        "fri": ["cafeteria", "no such event"],
        "weekend": "formal"
      }
    },
    {
      "user_id": "xyz789",
      "password": "pw",
      "policy": "all",
      "events": { "mon": ["formal", "cafeteria"] }
    }
  ]
}"#;

#[test]
fn fragments_resolve_case_insensitively_in_catalog_order() {
    let path = write_config("resolve", BASE);
    let config = Config::load(&path).unwrap();
    let users = config.resolve_users(&catalog());
    fs::remove_file(&path).unwrap();

    let abc = &users[0];
    // "Tue" is day index 2, matched case-insensitively
    let tue = abc.preferences.for_weekday(2);
    assert_eq!(tue.len(), 2);
    assert_eq!(tue[0].code, 1);
    assert_eq!(tue[1].code, 2);
}

#[test]
fn unresolved_fragments_and_unknown_days_leave_empty_slots() {
    let path = write_config("unresolved", BASE);
    let config = Config::load(&path).unwrap();
    let users = config.resolve_users(&catalog());
    fs::remove_file(&path).unwrap();

    let abc = &users[0];
    // fri: "cafeteria" resolves, "no such event" contributes nothing
    let fri = abc.preferences.for_weekday(5);
    assert_eq!(fri.len(), 1);
    assert_eq!(fri[0].code, 3);
    // "weekend" is not a weekday key; no slot gains anything from it
    for day in [0, 1, 3, 4, 6] {
        assert!(abc.preferences.for_weekday(day).is_empty(), "day {day}");
    }
}

#[test]
fn single_string_and_list_values_both_work() {
    let path = write_config("oneormany", BASE);
    let config = Config::load(&path).unwrap();
    let users = config.resolve_users(&catalog());
    fs::remove_file(&path).unwrap();

    // abc123's "Tue" was a plain string, xyz789's "mon" a list
    assert!(!users[0].preferences.for_weekday(2).is_empty());
    let mon = users[1].preferences.for_weekday(1);
    // "formal" matches both halls, "cafeteria" adds the third; deduped by code
    assert_eq!(mon.iter().map(|e| e.code).collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[test]
fn policy_defaults_to_first_success() {
    let path = write_config("policy", BASE);
    let config = Config::load(&path).unwrap();
    let users = config.resolve_users(&catalog());
    fs::remove_file(&path).unwrap();

    assert_eq!(users[0].policy, BookingPolicy::FirstSuccess);
    assert_eq!(users[1].policy, BookingPolicy::AllCandidates);
    assert_eq!(users[0].friends, vec!["Jones".to_string()]);
    assert!(users[1].friends.is_empty());
    assert_eq!(users[0].recipient(), "abc123@cam.ac.uk");
}

#[test]
fn missing_file_and_bad_json_are_config_errors() {
    let missing = Config::load(std::path::Path::new("/nonexistent/hallbot.json")).unwrap_err();
    assert!(missing.to_string().contains("cannot load configuration file"));

    let path = write_config("badjson", "{ not json");
    let bad = Config::load(&path).unwrap_err();
    fs::remove_file(&path).unwrap();
    assert!(bad.to_string().contains("incorrect configuration file format"));
}

#[test]
fn missing_required_keys_are_rejected() {
    let path = write_config("missingkeys", r#"{ "default_user_id": "x" }"#);
    let err = Config::load(&path).unwrap_err();
    fs::remove_file(&path).unwrap();
    assert!(err.to_string().contains("incorrect configuration file format"));
}
