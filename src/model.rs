// src/model.rs
//
// Domain values. Plain data, no behavior beyond identity/display rules:
// - Event equality is code-only (the portal renames events freely).
// - Identity never exposes its secret through Debug or Display.
// - Booking is only ever constructed for a state the portal has confirmed.

use std::fmt;

use chrono::NaiveDate;

use crate::params::EMAIL_DOMAIN;

/// Credential pair for the identity provider. The secret stays private to
/// this struct and is redacted from Debug output; nothing in this crate
/// logs or persists it.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    user_id: String,
    secret: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), secret: secret.into() }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub(crate) fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("user_id", &self.user_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// A bookable event as listed by the portal.
#[derive(Clone, Debug, Eq)]
pub struct Event {
    pub code: u32,
    pub name: String,
}

impl Event {
    pub fn new(code: u32, name: impl Into<String>) -> Self {
        Self { code, name: name.into() }
    }
}

// Equality is code-only by contract.
impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl std::hash::Hash for Event {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.code)
    }
}

/// A committed reservation, as confirmed by the portal. Immutable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Booking {
    pub event: Event,
    pub user_id: String,
    pub date: NaiveDate,
}

impl Booking {
    pub fn new(event: Event, user_id: impl Into<String>, date: NaiveDate) -> Self {
        Self { event, user_id: user_id.into(), date }
    }
}

impl fmt::Display for Booking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} - {}", self.user_id, self.date, self.event)
    }
}

/// How a user's candidate list for a weekday is worked through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BookingPolicy {
    /// Stop at the first candidate that books; unavailable means try next.
    #[default]
    FirstSuccess,
    /// Attempt every candidate in the slot; the slot means "all of these".
    AllCandidates,
}

/// Ordered booking candidates per weekday, Sunday-first (0 = Sunday).
/// Always exactly 7 slots; empty slots are fine.
#[derive(Clone, Debug, Default)]
pub struct PreferenceTable {
    slots: [Vec<Event>; 7],
}

impl PreferenceTable {
    pub fn new(slots: [Vec<Event>; 7]) -> Self {
        Self { slots }
    }

    pub fn for_weekday(&self, weekday: usize) -> &[Event] {
        &self.slots[weekday]
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Vec::is_empty)
    }
}

/// One configured user: credentials, friends to look for in attendee lists,
/// booking preferences. Sessions and cached facts are owned elsewhere.
#[derive(Clone, Debug)]
pub struct User {
    pub identity: Identity,
    pub friends: Vec<String>,
    pub preferences: PreferenceTable,
    pub policy: BookingPolicy,
}

impl User {
    pub fn user_id(&self) -> &str {
        self.identity.user_id()
    }

    /// Where this user's report goes.
    pub fn recipient(&self) -> String {
        format!("{}@{}", self.user_id(), EMAIL_DOMAIN)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.user_id())
    }
}
