// tests/report.rs
//
// Friend matching semantics and report assembly over canned portal pages.
//
use std::collections::HashMap;

use chrono::NaiveDate;
use hallbot::catalog::{event_url, EventCatalog, PortalClient};
use hallbot::error::Result;
use hallbot::model::{BookingPolicy, Identity, PreferenceTable, User};
use hallbot::params::PORTAL_URL;
use hallbot::report::{compose, matching_friends};

fn names(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

#[test]
fn friend_matching_is_case_insensitive_substring() {
    let attendees = names(&["Bob Jones", "bob JONES-smith", "Jonestown", "Alice"]);
    let found = matching_friends(&attendees, &names(&["jones"]));
    // substring semantics on purpose: "Jonestown" matches too
    assert_eq!(found, names(&["Bob Jones", "bob JONES-smith", "Jonestown"]));
}

#[test]
fn friend_matching_with_several_fragments() {
    let attendees = names(&["Bob Jones", "Alice Smith", "Carol"]);
    let found = matching_friends(&attendees, &names(&["smith", "carol"]));
    assert_eq!(found, names(&["Alice Smith", "Carol"]));
}

#[test]
fn no_fragments_match_nothing() {
    let attendees = names(&["Bob Jones"]);
    assert!(matching_friends(&attendees, &[]).is_empty());
}

/* ---------------- compose over canned pages ---------------- */

const LISTING: &str = r#"<html><body>
<table class="list"><td>nav</td></table>
<table class="list">
<td><a href="index.php?event=1">Formal Hall</a></td>
<td><a href="index.php?event=2">Cafeteria</a></td>
</table></body></html>"#;

const HALL_PAGE: &str = r#"<html><body>
<table class="list"><tr><td>Bob Jones</td><td>(guest)</td><td>Alice Smith</td></tr></table>
<div class="menu">  Soup  <br>  Roast &amp; trimmings  </div>
</body></html>"#;

const CAFETERIA_PAGE: &str = r#"<html><body>
<table class="list"><tr><td>Carol Brown</td></tr></table>
</body></html>"#;

const BOOKED_PAGE: &str =
    "<html><body><p>Other dietary or non-dietary requirements</p></body></html>";

const UNBOOKED_PAGE: &str = "<html><body><p>Book here.</p></body></html>";

/// Default session serves the listing and both event pages; the user's own
/// session sees a booking for event 1 only.
struct ReportPortal {
    date: NaiveDate,
}

impl PortalClient for ReportPortal {
    fn get(&mut self, url: &str) -> Result<String> {
        let pages = HashMap::from([
            (PORTAL_URL.to_string(), LISTING),
            (event_url(1, self.date), HALL_PAGE),
            (event_url(2, self.date), CAFETERIA_PAGE),
        ]);
        match pages.get(url) {
            Some(page) => Ok(page.to_string()),
            None => panic!("unexpected fetch: {url}"),
        }
    }

    fn get_as(&mut self, _identity: &Identity, url: &str) -> Result<String> {
        if url == event_url(1, self.date) {
            Ok(BOOKED_PAGE.to_string())
        } else {
            Ok(UNBOOKED_PAGE.to_string())
        }
    }

    fn post_form_as(
        &mut self,
        _identity: &Identity,
        url: &str,
        _fields: &[(String, String)],
    ) -> Result<String> {
        panic!("report composition must not write: {url}");
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 11).unwrap()
}

fn user_with_friends(friends: &[&str]) -> User {
    User {
        identity: Identity::new("abc123", "secret"),
        friends: names(friends),
        preferences: PreferenceTable::default(),
        policy: BookingPolicy::FirstSuccess,
    }
}

#[test]
fn report_lists_bookings_menus_and_friends() {
    let mut catalog = EventCatalog::new(Box::new(ReportPortal { date: date() }));
    let body = compose(&mut catalog, &user_with_friends(&["jones"]), date()).unwrap();

    assert!(body.contains("<h3>Formal Hall</h3>"));
    assert!(body.contains("Soup<br>Roast &amp; trimmings"));
    assert!(body.contains("<li>Bob Jones</li>"));
    // not booked into the cafeteria and nobody matching there
    assert!(!body.contains("<h3>Cafeteria</h3>"));
    assert!(!body.contains("No friends found"));
}

#[test]
fn report_marks_missing_menu_and_missing_friends() {
    struct NoMenuPortal {
        date: NaiveDate,
    }
    impl PortalClient for NoMenuPortal {
        fn get(&mut self, url: &str) -> Result<String> {
            if url == PORTAL_URL {
                Ok(LISTING.replace(
                    r#"<td><a href="index.php?event=2">Cafeteria</a></td>"#,
                    "",
                ))
            } else {
                assert_eq!(url, event_url(1, self.date));
                Ok(CAFETERIA_PAGE.to_string()) // attendee table, no menu div
            }
        }
        fn get_as(&mut self, _identity: &Identity, _url: &str) -> Result<String> {
            Ok(BOOKED_PAGE.to_string())
        }
        fn post_form_as(
            &mut self,
            _identity: &Identity,
            _url: &str,
            _fields: &[(String, String)],
        ) -> Result<String> {
            panic!("report composition must not write");
        }
    }

    let mut catalog = EventCatalog::new(Box::new(NoMenuPortal { date: date() }));
    let body = compose(&mut catalog, &user_with_friends(&["nobody"]), date()).unwrap();

    assert!(body.contains("No menu found."));
    assert!(body.contains("No friends found at any event."));
}
