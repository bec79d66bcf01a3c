use reqwest::Url;
use scraper::ElementRef;
use uridl_util::select;

use crate::model::{LangName, SubmissionRecord};
use crate::page::{join_url, GetPage as _, HasUrl};
use crate::service::{Browse, OrMissing as _, Page, Scrape, ScrapeError};
use crate::{Console, Result};

static ACCEPTED: &str = "accepted";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunsPageBuilder<'a> {
    base_url: &'a Url,
    page_no: usize,
}

impl<'a> RunsPageBuilder<'a> {
    pub const PATH: &'static str = "/judge/pt/runs";

    pub fn new(base_url: &'a Url, page_no: usize) -> Self {
        Self { base_url, page_no }
    }

    pub fn build<B: Browse + ?Sized>(self, browser: &B, cnsl: &mut Console) -> Result<RunsPage<'a>> {
        self.get_page_ok(browser, cnsl).map(|content| RunsPage {
            builder: self,
            content,
        })
    }
}

impl HasUrl for RunsPageBuilder<'_> {
    fn url(&self) -> Result<Url> {
        let mut url = join_url(self.base_url, Self::PATH)?;
        url.query_pairs_mut()
            .append_pair("page", &self.page_no.to_string());
        Ok(url)
    }
}

/// One page of the user's runs table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunsPage<'a> {
    builder: RunsPageBuilder<'a>,
    content: Page,
}

impl RunsPage<'_> {
    pub fn page_no(&self) -> usize {
        self.builder.page_no
    }

    /// Extracts accepted runs in the order they appear on the page.
    pub fn extract_accepted(&self) -> Result<Vec<SubmissionRecord>> {
        let mut records = Vec::new();
        for row in self.select_rows() {
            if row.inner_text().trim().is_empty() {
                continue;
            }
            if let Some(record) = row.extract_if_accepted(self.builder.base_url, &self.content.url)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Returns true if the "next" pagination control is disabled.
    pub fn is_last_page(&self) -> Result<bool> {
        let next = self
            .find_first(select!("li.next"))
            .or_missing("next page control", &self.content.url)?;
        Ok(next.value().classes().any(|class| class == "disabled"))
    }

    fn select_rows(&self) -> impl Iterator<Item = RunRowElem> {
        // "par" and "impar" only stripe the table
        self.content
            .html
            .select(select!("tr.par, tr.impar"))
            .map(RunRowElem)
    }
}

impl Scrape for RunsPage<'_> {
    fn elem(&self) -> ElementRef {
        self.content.elem()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RunRowElem<'a>(ElementRef<'a>);

impl RunRowElem<'_> {
    const SUBMISSION_CELL: usize = 0;
    const PROBLEM_CELL: usize = 2;
    const STATUS_CELL: usize = 4;
    const LANGUAGE_CELL: usize = 5;

    fn extract_if_accepted(&self, base_url: &Url, page_url: &Url) -> Result<Option<SubmissionRecord>> {
        let cells: Vec<ElementRef> = self.0.select(select!("td")).collect();
        let cell = |index: usize, what: &'static str| cells.get(index).copied().or_missing(what, page_url);

        let status = cell(Self::STATUS_CELL, "status cell")?.inner_text();
        if status.trim().to_lowercase() != ACCEPTED {
            return Ok(None);
        }

        let problem_cell = cell(Self::PROBLEM_CELL, "problem cell")?;
        let problem_number = problem_cell.inner_text().trim().to_owned();
        if problem_number.is_empty() {
            return Err(ScrapeError::InvalidValue {
                what: "problem number",
                value: problem_number,
                url: page_url.clone(),
            }
            .into());
        }
        let language = LangName::normalize(&cell(Self::LANGUAGE_CELL, "language cell")?.inner_text());
        let submission_url = extract_href(
            cell(Self::SUBMISSION_CELL, "submission cell")?,
            "link to submission",
            base_url,
            page_url,
        )?;
        let problem_url = extract_href(problem_cell, "link to problem", base_url, page_url)?;

        Ok(Some(SubmissionRecord::new(
            problem_number,
            language,
            submission_url,
            problem_url,
        )))
    }
}

impl Scrape for RunRowElem<'_> {
    fn elem(&self) -> ElementRef {
        self.0
    }
}

fn extract_href(cell: ElementRef, what: &'static str, base_url: &Url, page_url: &Url) -> Result<Url> {
    let href = cell
        .find_first(select!("a[href]"))
        .and_then(|a| a.value().attr("href"))
        .or_missing(what, page_url)?;
    join_url(base_url, href)
}
