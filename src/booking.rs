// src/booking.rs
// Per-user booking state machine: walk the weekday's candidate events in
// preference order and commit what the policy asks for. Stateless per call;
// everything durable lives in the catalog's caches and on the portal.

use chrono::{Datelike, NaiveDate};

use crate::catalog::EventCatalog;
use crate::error::Result;
use crate::model::{Booking, BookingPolicy, Event, User};

/// Outcome of one candidate attempt. An unavailable event is an ordinary
/// result here, not an error: the machine branches on the tag.
enum Attempt {
    Booked(Booking),
    Unavailable,
}

fn attempt(catalog: &mut EventCatalog, event: &Event, user: &User, date: NaiveDate) -> Result<Attempt> {
    match catalog.create_booking(event, user, date) {
        Ok(booking) => Ok(Attempt::Booked(booking)),
        Err(e) if e.is_unavailable() => {
            log::info!("{e}");
            Ok(Attempt::Unavailable)
        }
        // Auth/scrape/network failures abort this user's remaining attempts.
        Err(e) => Err(e),
    }
}

/// Book `user`'s preferred events for `date`'s weekday.
///
/// First-success: stop at the first candidate that books; unavailable means
/// try the next one; all candidates unavailable yields an empty list.
/// All-candidates: attempt every candidate, accumulating each success.
pub fn create_bookings_for(
    catalog: &mut EventCatalog,
    user: &User,
    date: NaiveDate,
) -> Result<Vec<Booking>> {
    let weekday = date.weekday().num_days_from_sunday() as usize;
    let candidates = user.preferences.for_weekday(weekday).to_vec();

    let mut bookings = Vec::new();
    for event in &candidates {
        match attempt(catalog, event, user, date)? {
            Attempt::Booked(booking) => {
                log::info!("booked: {booking}");
                bookings.push(booking);
                if user.policy == BookingPolicy::FirstSuccess {
                    break;
                }
            }
            Attempt::Unavailable => {}
        }
    }

    if bookings.is_empty() && !candidates.is_empty() {
        log::info!("no bookable candidate for {} on {}", user.user_id(), date);
    }
    Ok(bookings)
}
