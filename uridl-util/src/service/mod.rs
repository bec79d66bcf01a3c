use anyhow::Context as _;
use reqwest::blocking::Response;
use reqwest::header::LOCATION;
use reqwest::{StatusCode, Url};
use scraper::{ElementRef, Html};

use crate::console::Console;
use crate::Result;

mod browser;
mod cookie;
#[cfg(any(test, feature = "mock"))]
mod mock;
pub mod scrape;
mod session;

pub use self::browser::HttpBrowser;
pub use self::cookie::CookieJar;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockBrowser;
pub use self::scrape::{OrMissing, Scrape, ScrapeError};

/// A fetched html page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Url of the page after following redirects.
    pub url: Url,
    pub status: StatusCode,
    pub html: Html,
}

impl Page {
    pub fn new(url: Url, status: StatusCode, text: &str) -> Self {
        Self {
            url,
            status,
            html: Html::parse_document(text),
        }
    }
}

impl Scrape for Page {
    fn elem(&self) -> ElementRef {
        self.html.root_element()
    }
}

/// Stateful browsing over http.
///
/// Implementations keep cookies between requests and follow redirects.
pub trait Browse {
    fn get(&self, url: &Url, cnsl: &mut Console) -> Result<Page>;

    fn post_form(&self, url: &Url, form: &[(String, String)], cnsl: &mut Console)
        -> Result<Page>;
}

impl<B: Browse + ?Sized> Browse for &B {
    fn get(&self, url: &Url, cnsl: &mut Console) -> Result<Page> {
        (**self).get(url, cnsl)
    }

    fn post_form(
        &self,
        url: &Url,
        form: &[(String, String)],
        cnsl: &mut Console,
    ) -> Result<Page> {
        (**self).post_form(url, form, cnsl)
    }
}

pub trait ResponseExt {
    fn location_url(&self, base: &Url) -> Result<Url>;
}

impl ResponseExt for Response {
    fn location_url(&self, base: &Url) -> Result<Url> {
        let loc_str = self
            .headers()
            .get(LOCATION)
            .context("Could not find location header in response")?
            .to_str()?;
        base.join(loc_str)
            .context("Could not parse redirection url")
    }
}
