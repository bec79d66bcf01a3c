use anyhow::{anyhow, Context as _};
use reqwest::Url;
use uridl_util::select;

use crate::service::{Browse, Page, Scrape};
use crate::{Console, Result};

mod login;
mod problem;
mod runs;
mod submission;

pub use login::LoginPageBuilder;
pub use problem::ProblemPageBuilder;
pub use runs::RunsPageBuilder;
pub use submission::SubmissionPageBuilder;

#[cfg(test)]
pub(crate) use runs::tests::runs_html;

pub trait HasUrl {
    fn url(&self) -> Result<Url>;
}

/// Joins `path` to `base`, the way a browser resolves an href.
pub fn join_url(base: &Url, path: &str) -> Result<Url> {
    base.join(path)
        .with_context(|| format!("Could not parse url path: {}", path))
}

pub trait GetPage: HasUrl {
    fn get_page<B: Browse + ?Sized>(&self, browser: &B, cnsl: &mut Console) -> Result<Page> {
        browser.get(&self.url()?, cnsl)
    }

    /// Fetches the page, failing on any non-success status.
    fn get_page_ok<B: Browse + ?Sized>(&self, browser: &B, cnsl: &mut Console) -> Result<Page> {
        let page = self.get_page(browser, cnsl)?;
        if page.status.is_success() {
            Ok(page)
        } else {
            Err(anyhow!(
                "Received invalid response ({}) : {}",
                page.status,
                page.url
            ))
        }
    }
}

impl<T: HasUrl> GetPage for T {}

/// Pages that show the dashboard once the user is logged in.
pub trait HasDashboard: Scrape {
    fn is_logged_in(&self) -> bool {
        self.find_first(select!("div.pn-dashboard")).is_some()
    }
}

impl HasDashboard for Page {}
