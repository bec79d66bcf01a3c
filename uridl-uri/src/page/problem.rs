use anyhow::anyhow;
use reqwest::{StatusCode, Url};
use scraper::ElementRef;
use uridl_util::select;

use crate::page::{GetPage as _, HasUrl};
use crate::service::{Browse, OrMissing as _, Page, Scrape};
use crate::{Console, Result};

// The site sometimes serves this message with its encoding mangled.
static NOT_FOUND_MESSAGES: &[&str] = &[
    "a url solicitada não foi encontrada neste servidor",
    "a url solicitada n√£o foi encontrada neste servidor",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemPageBuilder<'a> {
    url: &'a Url,
}

impl<'a> ProblemPageBuilder<'a> {
    pub fn new(url: &'a Url) -> Self {
        Self { url }
    }

    pub fn build<B: Browse + ?Sized>(
        self,
        browser: &B,
        cnsl: &mut Console,
    ) -> Result<ProblemPage<'a>> {
        self.get_page(browser, cnsl).map(|content| ProblemPage {
            builder: self,
            content,
        })
    }
}

impl HasUrl for ProblemPageBuilder<'_> {
    fn url(&self) -> Result<Url> {
        Ok(self.url.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemPage<'a> {
    builder: ProblemPageBuilder<'a>,
    content: Page,
}

impl ProblemPage<'_> {
    pub fn is_not_found(&self) -> bool {
        if self.content.status == StatusCode::NOT_FOUND {
            return true;
        }
        let text = self.inner_text().to_lowercase();
        NOT_FOUND_MESSAGES.iter().any(|msg| text.contains(msg))
    }

    /// Returns the category shown in the problem menu, title-cased.
    ///
    /// Problems that no longer exist have no category.
    pub fn extract_category(&self) -> Result<Option<String>> {
        if self.is_not_found() {
            return Ok(None);
        }
        if !self.content.status.is_success() {
            return Err(anyhow!(
                "Received invalid response ({}) : {}",
                self.content.status,
                self.content.url
            ));
        }
        let label = self
            .find_first(select!("div.tour-step-problem-menu ul li"))
            .or_missing("category menu", self.builder.url)?
            .inner_text();
        let label = title_case(label.trim());
        if label.is_empty() {
            Ok(None)
        } else {
            Ok(Some(label))
        }
    }
}

impl Scrape for ProblemPage<'_> {
    fn elem(&self) -> ElementRef {
        self.content.elem()
    }
}

/// Upper-cases the first letter of every run of letters and lower-cases the rest.
fn title_case(s: &str) -> String {
    let mut ret = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                ret.extend(c.to_lowercase());
            } else {
                ret.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            ret.push(c);
            in_word = false;
        }
    }
    ret
}
