use std::io::Write as _;
use std::thread;
use std::time::Duration;

use reqwest::Url;

use crate::config::Config;
use crate::model::{Credentials, SubmissionMap};
use crate::page::{ProblemPageBuilder, RunsPageBuilder, SubmissionPageBuilder};
use crate::service::Browse;
use crate::session::Session;
use crate::{Console, Result};

/// Talks to URI Online Judge on behalf of the logged in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriActor {
    base_url: Url,
    delay: Duration,
    max_pages: Option<usize>,
}

impl UriActor {
    pub fn new(conf: &Config) -> Self {
        Self {
            base_url: conf.base_url().clone(),
            delay: conf.delay(),
            max_pages: conf.max_pages(),
        }
    }

    pub fn login<B: Browse>(
        &self,
        browser: B,
        creds: &Credentials,
        cnsl: &mut Console,
    ) -> Result<Session<B>> {
        writeln!(cnsl, "Logging in as {} ...", creds.email())?;
        Session::login(browser, self.base_url.clone(), creds, cnsl)
    }

    /// Walks the runs pages until the last one and collects accepted submissions.
    ///
    /// A problem accepted more than once keeps the record found last.
    pub fn list_accepted_submissions<B: Browse>(
        &self,
        session: &Session<B>,
        cnsl: &mut Console,
    ) -> Result<SubmissionMap> {
        let browser = session.browser()?;
        let mut submissions = SubmissionMap::new();
        let mut page_no = 1;
        loop {
            writeln!(cnsl, "Extracting submissions from page: {}...", page_no)?;
            let page = RunsPageBuilder::new(session.base_url(), page_no).build(browser, cnsl)?;
            for record in page.extract_accepted()? {
                submissions.insert(record);
            }
            let is_last = page.is_last_page()?;
            self.pause();
            if is_last {
                break;
            }
            if let Some(max_pages) = self.max_pages {
                if page.page_no() >= max_pages {
                    cnsl.warn(&format!(
                        "Stopped listing at page {} (max_pages). Some submissions may be missing.",
                        page_no
                    ))?;
                    break;
                }
            }
            page_no += 1;
        }
        Ok(submissions)
    }

    pub fn extract_code<B: Browse>(
        &self,
        session: &Session<B>,
        submission_url: &Url,
        cnsl: &mut Console,
    ) -> Result<String> {
        SubmissionPageBuilder::new(submission_url)
            .build(session.browser()?, cnsl)?
            .extract_code()
    }

    pub fn extract_category<B: Browse>(
        &self,
        session: &Session<B>,
        problem_url: &Url,
        cnsl: &mut Console,
    ) -> Result<Option<String>> {
        ProblemPageBuilder::new(problem_url)
            .build(session.browser()?, cnsl)?
            .extract_category()
    }

    /// Waits between requests so as not to flood the site.
    pub fn pause(&self) {
        if self.delay > Duration::from_secs(0) {
            thread::sleep(self.delay);
        }
    }
}
