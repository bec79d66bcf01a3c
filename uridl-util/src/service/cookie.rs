use std::convert::TryFrom as _;

use cookie::Cookie as RawCookie;
use cookie_store::CookieStore;
use reqwest::blocking::{Request, Response};
use reqwest::header::{HeaderValue, COOKIE, SET_COOKIE};

use crate::Result;

/// In-memory cookie jar of a browsing session.
///
/// Nothing is written to disk, so the session ends with the process.
#[derive(Default)]
pub struct CookieJar {
    store: CookieStore,
}

impl CookieJar {
    /// Sets a single `Cookie` header of `name=value` pairs matching the request url.
    pub fn load_into(&self, request: &mut Request) -> Result<()> {
        let header = self
            .store
            .get_request_cookies(request.url())
            .map(|rc| {
                let (name, value) = rc.name_value();
                format!("{}={}", name, value)
            })
            .collect::<Vec<_>>()
            .join("; ");
        if !header.is_empty() {
            request
                .headers_mut()
                .insert(COOKIE, HeaderValue::try_from(header)?);
        }
        Ok(())
    }

    pub fn store_from(&mut self, response: &Response) {
        let cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|val| {
                val.to_str()
                    .ok()
                    .and_then(|cookie_str| RawCookie::parse(cookie_str.to_owned()).ok())
            });
        let url = response.url();
        self.store.store_response_cookies(cookies, url);
    }
}
