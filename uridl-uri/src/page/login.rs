use reqwest::Url;
use scraper::ElementRef;
use uridl_util::select;

use crate::model::Credentials;
use crate::page::{join_url, GetPage as _, HasDashboard, HasUrl};
use crate::service::{Browse, OrMissing as _, Page, Scrape};
use crate::{Console, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPageBuilder<'a> {
    base_url: &'a Url,
}

impl<'a> LoginPageBuilder<'a> {
    pub const PATH: &'static str = "/judge/pt/login";

    pub fn new(base_url: &'a Url) -> Self {
        Self { base_url }
    }

    pub fn build<B: Browse + ?Sized>(self, browser: &B, cnsl: &mut Console) -> Result<LoginPage<'a>> {
        self.get_page_ok(browser, cnsl).map(|content| LoginPage {
            builder: self,
            content,
        })
    }
}

impl HasUrl for LoginPageBuilder<'_> {
    fn url(&self) -> Result<Url> {
        join_url(self.base_url, Self::PATH)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPage<'a> {
    builder: LoginPageBuilder<'a>,
    content: Page,
}

impl LoginPage<'_> {
    pub fn extract_form(&self) -> Result<LoginForm> {
        let url = &self.content.url;
        let form = self
            .elem()
            .select(select!("form[action]"))
            .find(|form| {
                form.value().attr("action").map(|action| action.trim_end_matches('/'))
                    == Some(LoginPageBuilder::PATH)
            })
            .or_missing("login form", url)?;
        let action = form.value().attr("action").unwrap_or(LoginPageBuilder::PATH);
        let fields = form
            .select(select!("input[name]"))
            .filter(is_submitted)
            .filter_map(|input| {
                let name = input.value().attr("name")?;
                let value = input.value().attr("value").unwrap_or("");
                Some((name.to_owned(), value.to_owned()))
            })
            .collect();
        Ok(LoginForm {
            action: join_url(self.builder.base_url, action)?,
            fields,
        })
    }
}

impl Scrape for LoginPage<'_> {
    fn elem(&self) -> ElementRef {
        self.content.elem()
    }
}

impl HasDashboard for LoginPage<'_> {}

// Mirrors what a browser submits: no buttons, only checked boxes.
fn is_submitted(input: &ElementRef) -> bool {
    let elem = input.value();
    match elem.attr("type").map(str::to_ascii_lowercase).as_deref() {
        Some("submit") | Some("button") | Some("image") | Some("reset") => false,
        Some("checkbox") | Some("radio") => elem.attr("checked").is_some(),
        _ => true,
    }
}

/// The login form with its prefilled fields, e.g. the csrf token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub action: Url,
    fields: Vec<(String, String)>,
}

impl LoginForm {
    /// Returns form data with `email` and `password` filled in.
    pub fn fill(mut self, creds: &Credentials) -> Vec<(String, String)> {
        self.set("email", creds.email());
        self.set("password", creds.expose_password());
        self.fields
    }

    fn set(&mut self, name: &str, value: &str) {
        match self.fields.iter_mut().find(|(key, _)| key == name) {
            Some((_, val)) => *val = value.to_owned(),
            None => self.fields.push((name.to_owned(), value.to_owned())),
        }
    }
}
