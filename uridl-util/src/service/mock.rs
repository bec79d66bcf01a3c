use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write as _;

use anyhow::anyhow;
use reqwest::{StatusCode, Url};

use crate::console::Console;
use crate::service::{Browse, Page};
use crate::Result;

/// A request received by `MockBrowser`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRequest {
    pub method: &'static str,
    pub url: Url,
    pub form: Vec<(String, String)>,
}

/// Browser that serves canned pages and records every request.
///
/// Requests without a registered route fail.
#[derive(Debug, Default)]
pub struct MockBrowser {
    routes: HashMap<(&'static str, Url), (StatusCode, String)>,
    requests: RefCell<Vec<MockRequest>>,
}

impl MockBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_get(mut self, url: &str, status: StatusCode, body: impl Into<String>) -> Self {
        self.routes
            .insert(("GET", Self::parse(url)), (status, body.into()));
        self
    }

    pub fn on_post(mut self, url: &str, status: StatusCode, body: impl Into<String>) -> Self {
        self.routes
            .insert(("POST", Self::parse(url)), (status, body.into()));
        self
    }

    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.borrow().clone()
    }

    /// Returns `METHOD url` of every request, in order.
    pub fn request_lines(&self) -> Vec<String> {
        self.requests
            .borrow()
            .iter()
            .map(|req| format!("{} {}", req.method, req.url))
            .collect()
    }

    fn parse(url: &str) -> Url {
        Url::parse(url).unwrap_or_else(|err| panic!("invalid mock url {} : {}", url, err))
    }

    fn respond(
        &self,
        method: &'static str,
        url: &Url,
        form: &[(String, String)],
        cnsl: &mut Console,
    ) -> Result<Page> {
        self.requests.borrow_mut().push(MockRequest {
            method,
            url: url.clone(),
            form: form.to_vec(),
        });
        write!(cnsl, "{:7} {} ... ", method, url)?;
        match self.routes.get(&(method, url.clone())) {
            Some((status, body)) => {
                writeln!(cnsl, "{}", status)?;
                Ok(Page::new(url.clone(), *status, body))
            }
            None => {
                writeln!(cnsl, "failed")?;
                Err(anyhow!("No mock route for {} {}", method, url))
            }
        }
    }
}

impl Browse for MockBrowser {
    fn get(&self, url: &Url, cnsl: &mut Console) -> Result<Page> {
        self.respond("GET", url, &[], cnsl)
    }

    fn post_form(
        &self,
        url: &Url,
        form: &[(String, String)],
        cnsl: &mut Console,
    ) -> Result<Page> {
        self.respond("POST", url, form, cnsl)
    }
}
