use reqwest::Url;
use scraper::ElementRef;
use uridl_util::select;

use crate::page::{GetPage as _, HasUrl};
use crate::service::{Browse, OrMissing as _, Page, Scrape};
use crate::{Console, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPageBuilder<'a> {
    url: &'a Url,
}

impl<'a> SubmissionPageBuilder<'a> {
    pub fn new(url: &'a Url) -> Self {
        Self { url }
    }

    pub fn build<B: Browse + ?Sized>(
        self,
        browser: &B,
        cnsl: &mut Console,
    ) -> Result<SubmissionPage<'a>> {
        self.get_page_ok(browser, cnsl).map(|content| SubmissionPage {
            builder: self,
            content,
        })
    }
}

impl HasUrl for SubmissionPageBuilder<'_> {
    fn url(&self) -> Result<Url> {
        Ok(self.url.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPage<'a> {
    builder: SubmissionPageBuilder<'a>,
    content: Page,
}

impl SubmissionPage<'_> {
    /// Returns the source code exactly as shown in the page.
    pub fn extract_code(&self) -> Result<String> {
        let code = self
            .find_first(select!("pre"))
            .or_missing("code block", self.builder.url)?
            .inner_text();
        Ok(code)
    }
}

impl Scrape for SubmissionPage<'_> {
    fn elem(&self) -> ElementRef {
        self.content.elem()
    }
}
