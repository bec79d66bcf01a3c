use reqwest::Url;
use scraper::{ElementRef, Selector};
use thiserror::Error;

/// A structural assumption about a page that did not hold.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScrapeError {
    #[error("Could not find {what} in page : {url}")]
    MissingElement { what: &'static str, url: Url },
    #[error("Could not parse {what} ({value:?}) in page : {url}")]
    InvalidValue {
        what: &'static str,
        value: String,
        url: Url,
    },
}

pub trait OrMissing<T> {
    fn or_missing(self, what: &'static str, url: &Url) -> Result<T, ScrapeError>;
}

impl<T> OrMissing<T> for Option<T> {
    fn or_missing(self, what: &'static str, url: &Url) -> Result<T, ScrapeError> {
        self.ok_or_else(|| ScrapeError::MissingElement {
            what,
            url: url.clone(),
        })
    }
}

pub trait Scrape {
    fn elem(&self) -> ElementRef;

    fn find_first(&self, selector: &Selector) -> Option<ElementRef> {
        self.elem().select(selector).next()
    }

    /// Concatenated text of all descendant text nodes, whitespace untouched.
    fn inner_text(&self) -> String {
        self.elem().text().fold(String::new(), |mut ret, s| {
            ret.push_str(s);
            ret
        })
    }
}

impl Scrape for ElementRef<'_> {
    fn elem(&self) -> ElementRef {
        *self
    }
}

#[cfg(test)]
mod tests {
    use scraper::Html;

    use super::*;
    use crate::select;

    #[test]
    fn test_inner_text_preserves_whitespace() {
        let html = Html::parse_document("<html><body><pre>a\n  b <b>c</b>\n\n</pre></body></html>");
        let root = html.root_element();
        let pre = root.find_first(select!("pre")).unwrap();
        assert_eq!(pre.inner_text(), "a\n  b c\n\n");
    }

    #[test]
    fn test_or_missing() {
        let url = Url::parse("https://example.com/a").unwrap();
        let none: Option<u8> = None;
        let err = none.or_missing("code block", &url).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not find code block in page : https://example.com/a"
        );
        assert_eq!(Some(1).or_missing("x", &url), Ok(1));
    }
}
