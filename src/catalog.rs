// src/catalog.rs
//! Event catalog and fact cache.
//!
//! Purpose:
//! - Parse the **listing page** into the set of bookable [`Event`]s
//!   (second `table.list`; linked cells carry the event code in the href).
//! - Parse **event/date pages** into three derived facts per (code, date):
//!   occurrence, attendee names, menu text.
//! - Detect and create **bookings** through the same pages, using the
//!   booking user's own session.
//!
//! Every fact is expensive (network fetch + parse) and memoized for the
//! process lifetime in a [`FactCache`]; entries are populated once and never
//! invalidated. A single event/date fetch back-fills whichever facts it can,
//! so callers may ask for facts in any order without extra round trips.
//!
//! Non-responsibilities:
//! - **No session bookkeeping** (delegated through [`PortalClient`]).
//! - **No booking strategy** (the state machine in `booking` decides what
//!   to attempt; this module only executes single operations).

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::core::html;
use crate::core::sanitize::{normalize_entities, normalize_menu, strip_tags, strip_tags_keep_lines};
use crate::error::{Error, Result};
use crate::model::{Booking, Event, Identity, User};
use crate::params::{
    BOOKED_MARKER, EVENTS_TABLE_INDEX, LIST_TABLE_CLASS, MENU_DIV_CLASS, NOT_RUNNING_MARKER,
    PORTAL_URL,
};
use crate::session::SessionManager;

/// Network seam between the catalog and the portal. The real implementation
/// routes through cached sessions; tests substitute canned pages.
pub trait PortalClient {
    /// Identity-agnostic read, using the default session.
    fn get(&mut self, url: &str) -> Result<String>;
    /// Read as a specific identity (per-identity page state matters for
    /// booking detection).
    fn get_as(&mut self, identity: &Identity, url: &str) -> Result<String>;
    /// Form submission as a specific identity.
    fn post_form_as(
        &mut self,
        identity: &Identity,
        url: &str,
        fields: &[(String, String)],
    ) -> Result<String>;
}

/// [`PortalClient`] over real authenticated sessions.
pub struct PortalGateway {
    sessions: SessionManager,
}

impl PortalGateway {
    pub fn new(sessions: SessionManager) -> Self {
        Self { sessions }
    }
}

impl PortalClient for PortalGateway {
    fn get(&mut self, url: &str) -> Result<String> {
        self.sessions.default_session()?.get(url)
    }

    fn get_as(&mut self, identity: &Identity, url: &str) -> Result<String> {
        self.sessions.session_for(identity)?.get(url)
    }

    fn post_form_as(
        &mut self,
        identity: &Identity,
        url: &str,
        fields: &[(String, String)],
    ) -> Result<String> {
        self.sessions.session_for(identity)?.post_form(url, fields)
    }
}

/// Memoized derived data. Populate-once: entries are never overwritten or
/// invalidated within a process run.
#[derive(Default)]
pub struct FactCache {
    events: Option<Vec<Event>>,
    occurring: HashMap<(u32, NaiveDate), bool>,
    attendees: HashMap<(u32, NaiveDate), Vec<String>>,
    menus: HashMap<(u32, NaiveDate), Option<String>>,
}

pub struct EventCatalog {
    client: Box<dyn PortalClient>,
    cache: FactCache,
}

/// Address of the event/date page.
pub fn event_url(code: u32, date: NaiveDate) -> String {
    format!("{}?event={}&date={}", PORTAL_URL, code, date.format("%Y-%m-%d"))
}

impl EventCatalog {
    pub fn new(client: Box<dyn PortalClient>) -> Self {
        Self { client, cache: FactCache::default() }
    }

    /// All bookable events, fetched and parsed once per process.
    pub fn list_events(&mut self) -> Result<Vec<Event>> {
        if self.cache.events.is_none() {
            let page = self.client.get(PORTAL_URL)?;
            let events = parse_listing(&page)?;
            log::debug!("listing page yielded {} events", events.len());
            self.cache.events = Some(events);
        }
        Ok(self.cache.events.clone().unwrap_or_default())
    }

    /// Does `event` run on `date`? Fetches the event/date page on first
    /// request for the key and back-fills the other facts from it.
    pub fn is_occurring(&mut self, event: &Event, date: NaiveDate) -> Result<bool> {
        let key = (event.code, date);
        if !self.cache.occurring.contains_key(&key) {
            let page = self.client.get(&event_url(event.code, date))?;
            let occurring = !page.contains(NOT_RUNNING_MARKER);
            self.cache.occurring.insert(key, occurring);
            if occurring {
                self.backfill(key, &page);
            }
        }
        Ok(self.cache.occurring[&key])
    }

    /// Names of everyone attending `event` on `date`.
    pub fn attendees(&mut self, event: &Event, date: NaiveDate) -> Result<Vec<String>> {
        self.ensure_occurring(event, date)?;
        let key = (event.code, date);
        if !self.cache.attendees.contains_key(&key) {
            let page = self.client.get(&event_url(event.code, date))?;
            let names = parse_attendees(&page)?;
            self.cache.attendees.insert(key, names);
            self.cache.menus.entry(key).or_insert_with(|| parse_menu(&page));
        }
        Ok(self.cache.attendees[&key].clone())
    }

    /// Published menu for `event` on `date`, if any. `None` (no menu div)
    /// is cached like any other value.
    pub fn menu(&mut self, event: &Event, date: NaiveDate) -> Result<Option<String>> {
        self.ensure_occurring(event, date)?;
        let key = (event.code, date);
        if !self.cache.menus.contains_key(&key) {
            let page = self.client.get(&event_url(event.code, date))?;
            self.cache.menus.insert(key, parse_menu(&page));
            if let Ok(names) = parse_attendees(&page) {
                self.cache.attendees.entry(key).or_insert(names);
            }
        }
        Ok(self.cache.menus[&key].clone())
    }

    /// Existing booking for `user` into `event` on `date`, if the portal
    /// shows one. Always a fresh per-identity read, never cached.
    pub fn booking_for(
        &mut self,
        event: &Event,
        user: &User,
        date: NaiveDate,
    ) -> Result<Option<Booking>> {
        self.ensure_occurring(event, date)?;
        let page = self.client.get_as(&user.identity, &event_url(event.code, date))?;
        if page.contains(BOOKED_MARKER) {
            Ok(Some(Booking::new(event.clone(), user.user_id(), date)))
        } else {
            Ok(None)
        }
    }

    /// Ensure `user` is booked into `event` on `date`. Idempotent: when the
    /// page already shows the booking, no write is issued; otherwise the
    /// page's first form is submitted twice (confirm, then finalize) with
    /// no field changes.
    pub fn create_booking(&mut self, event: &Event, user: &User, date: NaiveDate) -> Result<Booking> {
        self.ensure_occurring(event, date)?;
        let url = event_url(event.code, date);
        let page = self.client.get_as(&user.identity, &url)?;

        if page.contains(BOOKED_MARKER) {
            log::debug!("{} already booked into {} on {}", user.user_id(), event, date);
        } else {
            log::info!("booking {} into {} on {}", user.user_id(), event, date);
            let (confirm_page, confirm_url) =
                self.submit_first_form(&user.identity, &url, &page, "booking form")?;
            self.submit_first_form(
                &user.identity,
                &confirm_url,
                &confirm_page,
                "booking confirmation form",
            )?;
        }
        Ok(Booking::new(event.clone(), user.user_id(), date))
    }

    fn ensure_occurring(&mut self, event: &Event, date: NaiveDate) -> Result<()> {
        if self.is_occurring(event, date)? {
            Ok(())
        } else {
            Err(Error::Unavailable { event: event.to_string(), date })
        }
    }

    // Fill whatever the fetched page can answer beyond occurrence. Parse
    // failures here are ignored; a direct request for the fact will refetch
    // and surface them.
    fn backfill(&mut self, key: (u32, NaiveDate), page: &str) {
        if let Ok(names) = parse_attendees(page) {
            self.cache.attendees.entry(key).or_insert(names);
        }
        self.cache.menus.entry(key).or_insert_with(|| parse_menu(page));
    }

    // Submit the first form on `page`, returning the response body and the
    // absolute URL it was submitted to (the base for any follow-up form).
    fn submit_first_form(
        &mut self,
        identity: &Identity,
        page_url: &str,
        page: &str,
        context: &str,
    ) -> Result<(String, String)> {
        let form = html::first_form(page)
            .ok_or_else(|| Error::scrape(context, "no form to submit"))?;
        let action = form.action_url(page_url)?;
        let body = if form.is_post() {
            self.client.post_form_as(identity, &action, &form.fields)?
        } else {
            self.client.get_as(identity, &html::append_query(&action, &form.fields)?)?
        };
        Ok((body, action))
    }
}

/* ---------------- page parsers ---------------- */

/// Listing page → events. The page carries at least two `table.list`;
/// the second holds the event cells. Cells without a hyperlink are
/// headings or placeholders and are skipped.
pub fn parse_listing(doc: &str) -> Result<Vec<Event>> {
    let tables = html::blocks_with_class(doc, "table", LIST_TABLE_CLASS);
    if tables.len() <= EVENTS_TABLE_INDEX {
        return Err(Error::scrape(
            "event listing",
            format!(
                "expected at least {} tables of class \"{}\", found {}",
                EVENTS_TABLE_INDEX + 1,
                LIST_TABLE_CLASS,
                tables.len()
            ),
        ));
    }

    let mut events = Vec::new();
    for cell in html::td_cells(tables[EVENTS_TABLE_INDEX]) {
        let Some(href) = html::first_href(cell) else { continue };
        let Some(code) = first_digit_run(&href) else {
            log::warn!("event link without a numeric code: {href}");
            continue;
        };
        let name = strip_tags(&normalize_entities(cell));
        if name.is_empty() {
            continue;
        }
        events.push(Event::new(code, name));
    }
    Ok(events)
}

/// Event/date page → attendee names: cells of the first `table.list`,
/// dropping empties and parenthesized placeholders like `(guest)`.
pub fn parse_attendees(doc: &str) -> Result<Vec<String>> {
    let tables = html::blocks_with_class(doc, "table", LIST_TABLE_CLASS);
    let table = tables.first().ok_or_else(|| {
        Error::scrape("attendee list", format!("no table of class \"{LIST_TABLE_CLASS}\""))
    })?;

    Ok(html::td_cells(table)
        .into_iter()
        .map(|cell| strip_tags(&normalize_entities(cell)))
        .filter(|name| !name.is_empty() && !name.starts_with('('))
        .collect())
}

/// Event/date page → normalized menu text, or `None` when no menu div is
/// published (or it holds nothing but whitespace).
pub fn parse_menu(doc: &str) -> Option<String> {
    let divs = html::blocks_with_class(doc, "div", MENU_DIV_CLASS);
    let inner = html::inner_after_open_tag(divs.first()?);
    let text = normalize_menu(&normalize_entities(&strip_tags_keep_lines(inner)));
    if text.is_empty() { None } else { Some(text) }
}

/// First contiguous digit run, the way event codes are embedded in listing
/// hrefs (`...?event=482&x=1` yields 482).
fn first_digit_run(s: &str) -> Option<u32> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let digits: String = s[start..].chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}
