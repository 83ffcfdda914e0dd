// src/error.rs

use chrono::NaiveDate;

/// Everything that can go wrong talking to the portal or its collaborators.
///
/// `Unavailable` is the one recoverable variant: the booking state machine
/// treats it as "try the next candidate". Everything else aborts the
/// operation that raised it (and, outside the default identity, only that
/// user's processing).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("authentication failed for '{user_id}': {reason}")]
    Authentication { user_id: String, reason: String },

    #[error("{context}: page structure mismatch: {detail}")]
    Scrape { context: String, detail: String },

    #[error("{event} not occurring on {date}")]
    Unavailable { event: String, date: NaiveDate },

    #[error("network failure for {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("mail delivery to {recipient} failed: {detail}")]
    Mail { recipient: String, detail: String },
}

impl Error {
    pub fn scrape(context: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::Scrape { context: context.into(), detail: detail.into() }
    }

    /// True for the only variant callers may swallow during fallback.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Error::Unavailable { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
