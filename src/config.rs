// src/config.rs
// Configuration file loading and preference resolution.
//
// The file is JSON (see config.example.json). Weekday preference values may
// be a single event-name fragment or a list of fragments; both normalize to
// an ordered fragment list at this boundary. Fragments only become Events
// once the live catalog is known, via resolve_users.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::{BookingPolicy, Event, Identity, PreferenceTable, User};

const DAY_KEYS: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum PolicyChoice {
    FirstSuccess,
    All,
}

impl From<&PolicyChoice> for BookingPolicy {
    fn from(choice: &PolicyChoice) -> Self {
        match choice {
            PolicyChoice::FirstSuccess => BookingPolicy::FirstSuccess,
            PolicyChoice::All => BookingPolicy::AllCandidates,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawUser {
    user_id: String,
    password: String,
    #[serde(default)]
    friends: Vec<String>,
    #[serde(default)]
    events: BTreeMap<String, OneOrMany>,
    #[serde(default)]
    policy: Option<PolicyChoice>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    default_user_id: String,
    default_password: String,
    smtp_username: String,
    smtp_password: String,
    #[serde(default)]
    users: Vec<RawUser>,
}

#[derive(Debug)]
pub struct Config {
    raw: RawConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot load configuration file: {e}")))?;
        let raw: RawConfig = serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("incorrect configuration file format: {e}")))?;
        Ok(Self { raw })
    }

    pub fn default_identity(&self) -> Identity {
        Identity::new(&self.raw.default_user_id, &self.raw.default_password)
    }

    pub fn smtp_username(&self) -> &str {
        &self.raw.smtp_username
    }

    pub fn smtp_password(&self) -> &str {
        &self.raw.smtp_password
    }

    /// Turn the raw user entries into Users with resolved preference tables.
    /// Fragment matching is case-insensitive substring against the live
    /// catalog, in catalog order; a fragment nothing matches leaves its slot
    /// empty (logged, not an error); unknown weekday keys are ignored.
    pub fn resolve_users(&self, events: &[Event]) -> Vec<User> {
        self.raw
            .users
            .iter()
            .map(|raw| User {
                identity: Identity::new(&raw.user_id, &raw.password),
                friends: raw.friends.clone(),
                preferences: resolve_preferences(&raw.user_id, &raw.events, events),
                policy: raw.policy.as_ref().map(BookingPolicy::from).unwrap_or_default(),
            })
            .collect()
    }
}

fn resolve_preferences(
    user_id: &str,
    prefs: &BTreeMap<String, OneOrMany>,
    events: &[Event],
) -> PreferenceTable {
    let mut slots: [Vec<Event>; 7] = Default::default();

    for (day, value) in prefs {
        let Some(index) = DAY_KEYS.iter().position(|k| k.eq_ignore_ascii_case(day)) else {
            log::warn!("{user_id}: unknown weekday key '{day}' in preferences, ignoring");
            continue;
        };
        let fragments = match value {
            OneOrMany::One(s) => vec![s.clone()],
            OneOrMany::Many(v) => v.clone(),
        };
        for fragment in &fragments {
            let needle = fragment.to_lowercase();
            let mut matched = false;
            for event in events {
                if event.name.to_lowercase().contains(&needle) {
                    matched = true;
                    // Event equality is code-only, so contains() dedupes
                    // overlapping fragments.
                    if !slots[index].contains(event) {
                        slots[index].push(event.clone());
                    }
                }
            }
            if !matched {
                log::warn!("{user_id}: no event matches '{fragment}' for {}", DAY_KEYS[index]);
            }
        }
    }

    PreferenceTable::new(slots)
}
