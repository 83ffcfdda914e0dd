// src/runner.rs
// Top-level orchestration: bootstrap the default session, load the catalog,
// then process each configured user in turn. One user's failure never stops
// the others; it is logged, recorded in the summary and skipped past.

use chrono::{Days, Local, NaiveDate};

use crate::booking;
use crate::catalog::{EventCatalog, PortalGateway};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::mail::Mailer;
use crate::model::{Booking, Event, User};
use crate::params::{DEFAULT_DAYS_AHEAD, MAIL_SUBJECT};
use crate::report;
use crate::session::SessionManager;

/// Run inputs beyond the configuration file.
#[derive(Clone, Debug)]
pub struct Params {
    pub days_ahead: u32,
    pub date: Option<NaiveDate>,
    pub dry_run: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self { days_ahead: DEFAULT_DAYS_AHEAD, date: None, dry_run: false }
    }
}

/// What a run produced.
#[derive(Default)]
pub struct RunSummary {
    pub date: Option<NaiveDate>,
    pub bookings: Vec<Booking>,
    pub reports_sent: usize,
    pub failures: Vec<(String, Error)>,
}

/// Book and report for every configured user. Fails outright only when the
/// default identity cannot authenticate or the listing page cannot be read;
/// per-user errors end up in the summary instead.
pub fn run(config: &Config, params: &Params, mailer: &dyn Mailer) -> Result<RunSummary> {
    let mut catalog = open_catalog(config)?;
    let events = catalog.list_events()?;
    let users = config.resolve_users(&events);

    let date = target_date(params);
    log::info!("processing {} users for {}", users.len(), date);

    let mut summary = RunSummary { date: Some(date), ..RunSummary::default() };
    for user in &users {
        match process_user(&mut catalog, user, date, mailer) {
            Ok(bookings) => {
                summary.bookings.extend(bookings);
                summary.reports_sent += 1;
            }
            Err(e) => {
                log::error!("skipping {}: {e}", user.user_id());
                summary.failures.push((user.user_id().to_string(), e));
            }
        }
    }
    Ok(summary)
}

/// Authenticate the default identity and list the catalog. Used by the
/// `--list-events` mode as well as by `run`.
pub fn list_events(config: &Config) -> Result<Vec<Event>> {
    open_catalog(config)?.list_events()
}

fn open_catalog(config: &Config) -> Result<EventCatalog> {
    let mut sessions = SessionManager::new();
    sessions.authenticate_default(&config.default_identity())?;
    Ok(EventCatalog::new(Box::new(PortalGateway::new(sessions))))
}

fn target_date(params: &Params) -> NaiveDate {
    match params.date {
        Some(date) => date,
        None => Local::now()
            .date_naive()
            .checked_add_days(Days::new(params.days_ahead.into()))
            .unwrap_or_else(|| Local::now().date_naive()),
    }
}

// Strictly sequential per user: bookings first, then the report over the
// day's final state, then the email.
fn process_user(
    catalog: &mut EventCatalog,
    user: &User,
    date: NaiveDate,
    mailer: &dyn Mailer,
) -> Result<Vec<Booking>> {
    if user.preferences.is_empty() {
        log::info!("{}: no booking preferences resolved", user.user_id());
    }
    let bookings = booking::create_bookings_for(catalog, user, date)?;
    let body = report::compose(catalog, user, date)?;
    mailer.send(&user.recipient(), MAIL_SUBJECT, &body)?;
    Ok(bookings)
}
