// src/report.rs
// Per-user report: which events the user is booked into (with menus), and
// which friends appear on the attendee lists of everything running that day.
// Output is a standalone HTML document for the mailer.

use chrono::NaiveDate;

use crate::catalog::EventCatalog;
use crate::core::sanitize::escape_html;
use crate::error::Result;
use crate::model::{Booking, User};

/// Attendees whose display name contains any of `fragments`,
/// case-insensitively. Plain substring containment: "jones" matches
/// "Jonestown" too, and that is the intended behavior.
pub fn matching_friends(attendees: &[String], fragments: &[String]) -> Vec<String> {
    attendees
        .iter()
        .filter(|name| {
            let lower = name.to_lowercase();
            fragments.iter().any(|f| lower.contains(&f.to_lowercase()))
        })
        .cloned()
        .collect()
}

/// Build the HTML report for `user` on `date`.
pub fn compose(catalog: &mut EventCatalog, user: &User, date: NaiveDate) -> Result<String> {
    let events = catalog.list_events()?;

    let mut occurring = Vec::new();
    for event in &events {
        if catalog.is_occurring(event, date)? {
            occurring.push(event.clone());
        }
    }

    // A user may hold bookings for several events on the same date.
    let mut bookings: Vec<Booking> = Vec::new();
    for event in &occurring {
        if let Some(booking) = catalog.booking_for(event, user, date)? {
            bookings.push(booking);
        }
    }

    let mut body = String::new();
    body.push_str("<html><body>\n");

    body.push_str(&format!("<h2>Your bookings for {date}</h2>\n"));
    if bookings.is_empty() {
        body.push_str(&format!("<p>You have no bookings for {date}.</p>\n"));
    }
    for booking in &bookings {
        body.push_str(&format!("<h3>{}</h3>\n", escape_html(&booking.event.name)));
        match catalog.menu(&booking.event, date)? {
            Some(menu) => {
                body.push_str("<p>");
                body.push_str(&escape_html(&menu).replace('\n', "<br>"));
                body.push_str("</p>\n");
            }
            None => body.push_str("<p>No menu found.</p>\n"),
        }
    }

    body.push_str(&format!("<h2>Friends attending on {date}</h2>\n"));
    let mut any_friends = false;
    for event in &occurring {
        let attendees = catalog.attendees(event, date)?;
        let friends = matching_friends(&attendees, &user.friends);
        if friends.is_empty() {
            continue;
        }
        any_friends = true;
        body.push_str(&format!("<h3>{}</h3>\n<ul>\n", escape_html(&event.name)));
        for name in &friends {
            body.push_str(&format!("<li>{}</li>\n", escape_html(name)));
        }
        body.push_str("</ul>\n");
    }
    if !any_friends {
        body.push_str("<p>No friends found at any event.</p>\n");
    }

    body.push_str("</body></html>\n");
    Ok(body)
}
