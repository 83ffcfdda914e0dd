// src/core/net.rs
// Blocking HTTPS with a cookie jar. One client per authenticated session;
// redirects are followed automatically and cookies persist across the
// redirect chain, which is all the identity provider's login dance needs.

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::cookie::{CookieStore, Jar};

use crate::error::{Error, Result};
use crate::params::{HTTP_TIMEOUT_SECS, USER_AGENT};

pub struct HttpClient {
    inner: Client,
    jar: Arc<Jar>,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let inner = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Network { url: "(client setup)".to_string(), source: e })?;
        Ok(Self { inner, jar })
    }

    pub fn get(&self, url: &str) -> Result<String> {
        self.with_retry(url, || self.inner.get(url).send())
    }

    pub fn post_form(&self, url: &str, fields: &[(String, String)]) -> Result<String> {
        self.with_retry(url, || self.inner.post(url).form(&fields).send())
    }

    /// Any cookie stored for `url`'s origin?
    pub fn has_cookies(&self, url: &str) -> bool {
        reqwest::Url::parse(url)
            .map(|u| self.jar.cookies(&u).is_some())
            .unwrap_or(false)
    }

    // One immediate retry on any request failure, then give up. Structural
    // mismatches in the body are the caller's problem; transport flakiness
    // stops here.
    fn with_retry(
        &self,
        url: &str,
        attempt: impl Fn() -> reqwest::Result<Response>,
    ) -> Result<String> {
        let first = attempt().and_then(|r| r.error_for_status()).and_then(|r| r.text());
        match first {
            Ok(body) => Ok(body),
            Err(e) => {
                log::warn!("request to {url} failed ({e}), retrying once");
                attempt()
                    .and_then(|r| r.error_for_status())
                    .and_then(|r| r.text())
                    .map_err(|e| Error::Network { url: url.to_string(), source: e })
            }
        }
    }
}
