// src/params.rs

// Remote endpoints
pub const PORTAL_URL: &str = "https://www.mealbookings.cai.cam.ac.uk/index.php";
pub const LOGIN_URL: &str = "https://raven.cam.ac.uk/auth/login.html";

// Login form field names as the identity provider spells them
pub const LOGIN_USER_FIELD: &str = "userid";
pub const LOGIN_PASSWORD_FIELD: &str = "pwd";

// Page markers. The portal has no structured API; these phrases are the
// contract. Keep every marker here so nothing outside the catalog ever
// sniffs raw page text.
pub const NOT_RUNNING_MARKER: &str = "not running on";
pub const BOOKED_MARKER: &str = "Other dietary or non-dietary requirements";

// HTML structure expectations
pub const LIST_TABLE_CLASS: &str = "list";
pub const MENU_DIV_CLASS: &str = "menu";
// The listing page has (at least) two tables of class "list";
// the events live in the second one.
pub const EVENTS_TABLE_INDEX: usize = 1;

// Net config
pub const HTTP_TIMEOUT_SECS: u64 = 30;
pub const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/115.0";

// Mail
pub const EMAIL_DOMAIN: &str = "cam.ac.uk";
pub const SMTP_HOST: &str = "smtp.gmail.com";
pub const MAIL_SENDER_NAME: &str = "HallHelper";
pub const MAIL_SUBJECT: &str = "HallHelper";

// Scheduling
pub const DEFAULT_DAYS_AHEAD: u32 = 2;
