// tests/model.rs
//
use chrono::NaiveDate;
use hallbot::model::{Booking, Event, Identity};

#[test]
fn event_equality_is_code_only() {
    let a = Event::new(42, "Formal Hall");
    let b = Event::new(42, "Formal Hall (renamed)");
    let c = Event::new(43, "Formal Hall");
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn display_formats() {
    let event = Event::new(7, "Formal Hall");
    assert_eq!(event.to_string(), "Formal Hall [7]");

    let date = NaiveDate::from_ymd_opt(2026, 8, 11).unwrap();
    let booking = Booking::new(event, "abc123", date);
    assert_eq!(booking.to_string(), "abc123 - 2026-08-11 - Formal Hall [7]");
}

#[test]
fn identity_debug_never_shows_the_secret() {
    let identity = Identity::new("abc123", "hunter2");
    let debug = format!("{identity:?}");
    assert!(debug.contains("abc123"));
    assert!(!debug.contains("hunter2"));
    assert!(debug.contains("<redacted>"));
}
