// src/session.rs
//! Authenticated sessions against the identity provider.
//!
//! A [`Session`] is an [`HttpClient`] that has been walked through the login
//! flow once: fetch the login page, fill `userid`/`pwd` into its first form,
//! submit, follow redirects. Success leaves a session cookie in the jar;
//! an empty jar means the credentials were rejected.
//!
//! The [`SessionManager`] owns every session for the process lifetime:
//! one per distinct identity, created on first use and reused thereafter,
//! plus one "default" session for identity-agnostic catalog reads. There is
//! no invalidation or re-login; if the portal expires a session mid-run the
//! failing operation surfaces the error and the caller decides.

use std::collections::HashMap;

use crate::core::html;
use crate::core::net::HttpClient;
use crate::error::{Error, Result};
use crate::model::Identity;
use crate::params::{LOGIN_PASSWORD_FIELD, LOGIN_URL, LOGIN_USER_FIELD, PORTAL_URL};

/// An authenticated handle bound to one identity. Only ever handed out by
/// reference; the transport state (cookie jar) is not cloneable by design.
pub struct Session {
    client: HttpClient,
}

impl Session {
    fn login(identity: &Identity) -> Result<Self> {
        log::info!("authenticating '{}'", identity.user_id());

        let client = HttpClient::new()?;
        let page = client.get(LOGIN_URL)?;
        let mut form = html::first_form(&page)
            .ok_or_else(|| Error::scrape("login page", "no login form found"))?;
        form.set_field(LOGIN_USER_FIELD, identity.user_id());
        form.set_field(LOGIN_PASSWORD_FIELD, identity.secret());

        let action = form.action_url(LOGIN_URL)?;
        if form.is_post() {
            client.post_form(&action, &form.fields)?;
        } else {
            client.get(&html::append_query(&action, &form.fields)?)?;
        }

        if !client.has_cookies(LOGIN_URL) && !client.has_cookies(PORTAL_URL) {
            return Err(Error::Authentication {
                user_id: identity.user_id().to_string(),
                reason: "credentials rejected (no session cookie after login)".to_string(),
            });
        }
        Ok(Self { client })
    }

    pub fn get(&self, url: &str) -> Result<String> {
        self.client.get(url)
    }

    pub fn post_form(&self, url: &str, fields: &[(String, String)]) -> Result<String> {
        self.client.post_form(url, fields)
    }
}

/// Login-once store, generic so the once-per-identity rule is testable
/// without a network.
struct SessionCache<S> {
    default: Option<S>,
    by_user: HashMap<String, S>,
}

impl<S> SessionCache<S> {
    fn new() -> Self {
        Self { default: None, by_user: HashMap::new() }
    }

    fn get_or_create(
        &mut self,
        user_id: &str,
        create: impl FnOnce() -> Result<S>,
    ) -> Result<&S> {
        if !self.by_user.contains_key(user_id) {
            let session = create()?;
            self.by_user.insert(user_id.to_string(), session);
        }
        Ok(&self.by_user[user_id])
    }
}

/// Login once per identity, reuse forever after.
pub struct SessionManager {
    cache: SessionCache<Session>,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionManager {
    pub fn new() -> Self {
        Self { cache: SessionCache::new() }
    }

    /// Establish the session used for identity-agnostic reads. Rejected
    /// credentials here are a configuration error and abort the run.
    pub fn authenticate_default(&mut self, identity: &Identity) -> Result<()> {
        let session = Session::login(identity)?;
        self.cache.default = Some(session);
        Ok(())
    }

    pub fn default_session(&self) -> Result<&Session> {
        self.cache.default.as_ref().ok_or_else(|| Error::Authentication {
            user_id: "(default)".to_string(),
            reason: "no default credentials supplied".to_string(),
        })
    }

    /// Session for `identity`, logging in on first use.
    pub fn session_for(&mut self, identity: &Identity) -> Result<&Session> {
        self.cache.get_or_create(identity.user_id(), || Session::login(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_login_per_identity() {
        let mut cache: SessionCache<u32> = SessionCache::new();
        let mut logins = 0;

        for _ in 0..3 {
            cache
                .get_or_create("abc123", || {
                    logins += 1;
                    Ok(logins)
                })
                .unwrap();
        }
        assert_eq!(logins, 1);

        cache
            .get_or_create("xyz789", || {
                logins += 1;
                Ok(logins)
            })
            .unwrap();
        assert_eq!(logins, 2, "a new identity gets its own login flow");

        assert_eq!(cache.get_or_create("abc123", || unreachable!()).unwrap(), &1);
    }

    #[test]
    fn failed_login_is_not_cached() {
        let mut cache: SessionCache<u32> = SessionCache::new();

        let err = cache.get_or_create("abc123", || {
            Err(Error::Authentication {
                user_id: "abc123".to_string(),
                reason: "rejected".to_string(),
            })
        });
        assert!(err.is_err());

        // a later attempt runs the login again rather than serving a husk
        let ok = cache.get_or_create("abc123", || Ok(7)).unwrap();
        assert_eq!(ok, &7);
    }
}
