// src/cli.rs
use std::env;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::mail::{LogMailer, Mailer, SmtpMailer};
use crate::runner::{self, Params};

pub struct Args {
    pub config_path: PathBuf,
    pub params: Params,
    pub list_events: bool,
}

pub fn run() -> Result<()> {
    let args = parse_cli()?;
    let config = Config::load(&args.config_path)?;

    if args.list_events {
        for event in runner::list_events(&config)? {
            println!("{},{}", event.code, event.name);
        }
        return Ok(());
    }

    let mailer: Box<dyn Mailer> = if args.params.dry_run {
        Box::new(LogMailer)
    } else {
        Box::new(SmtpMailer::new(config.smtp_username(), config.smtp_password())?)
    };

    let summary = runner::run(&config, &args.params, mailer.as_ref())?;

    if let Some(date) = summary.date {
        println!("Run for {date}:");
    }
    for booking in &summary.bookings {
        println!("  booked {booking}");
    }
    println!(
        "  {} bookings, {} reports, {} users failed",
        summary.bookings.len(),
        summary.reports_sent,
        summary.failures.len()
    );
    for (user_id, error) in &summary.failures {
        eprintln!("  {user_id} failed: {error}");
    }
    Ok(())
}

fn parse_cli() -> Result<Args> {
    let mut config_path: Option<PathBuf> = None;
    let mut params = Params::default();
    let mut list_events = false;

    let bad = |msg: String| Error::Config(msg);

    let mut args = env::args().skip(1);
    while let Some(a) = args.next() {
        match a.as_str() {
            "-d" | "--days-ahead" => {
                let v = args.next().ok_or_else(|| bad("missing value for --days-ahead".into()))?;
                params.days_ahead = v
                    .parse()
                    .map_err(|_| bad(format!("invalid --days-ahead value: {v}")))?;
            }
            "--date" => {
                let v = args.next().ok_or_else(|| bad("missing value for --date".into()))?;
                let date = NaiveDate::parse_from_str(&v, "%Y-%m-%d")
                    .map_err(|_| bad(format!("invalid --date (want YYYY-MM-DD): {v}")))?;
                params.date = Some(date);
            }
            "--list-events" => list_events = true,
            "-n" | "--dry-run" => params.dry_run = true,
            "-h" | "--help" => {
                eprintln!(include_str!("cli_help.txt"));
                std::process::exit(0);
            }
            other if other.starts_with('-') => {
                return Err(bad(format!("unknown arg: {other}")));
            }
            _ => {
                if config_path.is_some() {
                    return Err(bad(format!("unexpected extra argument: {a}")));
                }
                config_path = Some(PathBuf::from(a));
            }
        }
    }

    let config_path =
        config_path.ok_or_else(|| bad("missing configuration file path (see --help)".into()))?;
    Ok(Args { config_path, params, list_events })
}
