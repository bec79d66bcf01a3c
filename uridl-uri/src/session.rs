use reqwest::Url;
use thiserror::Error;

use crate::model::Credentials;
use crate::page::{HasDashboard as _, LoginPageBuilder};
use crate::service::Browse;
use crate::{Console, Result};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("Failed to login! Check your credentials.")]
    InvalidCredentials,
    #[error("Not logged in")]
    LoggedOut,
}

/// An authenticated browsing session.
///
/// The session owns its browser, so logging out drops the cookie jar
/// together with the http client.
#[derive(Debug)]
pub struct Session<B> {
    browser: Option<B>,
    base_url: Url,
}

impl<B: Browse> Session<B> {
    /// Submits the login form and checks that the dashboard shows up.
    pub fn login(
        browser: B,
        base_url: Url,
        creds: &Credentials,
        cnsl: &mut Console,
    ) -> Result<Self> {
        let form = LoginPageBuilder::new(&base_url)
            .build(&browser, cnsl)?
            .extract_form()?;
        let action = form.action.clone();
        let result_page = browser.post_form(&action, &form.fill(creds), cnsl)?;
        if !result_page.is_logged_in() {
            return Err(AuthError::InvalidCredentials.into());
        }
        Ok(Self {
            browser: Some(browser),
            base_url,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.browser.is_some()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn browser(&self) -> Result<&B> {
        self.browser.as_ref().ok_or_else(|| AuthError::LoggedOut.into())
    }

    /// Releases the browser. Calling this again does nothing.
    pub fn logout(&mut self) {
        self.browser = None;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use reqwest::StatusCode;

    use super::*;
    use crate::console::ConsoleConfig;
    use crate::service::MockBrowser;

    pub static BASE_URL: &str = "https://www.urionlinejudge.com.br";
    pub static LOGIN_URL: &str = "https://www.urionlinejudge.com.br/judge/pt/login";

    pub static LOGIN_FORM_HTML: &str = r#"<html><body>
<form method="post" accept-charset="utf-8" action="/judge/pt/login">
  <input type="hidden" name="_csrfToken" value="token">
  <input type="email" name="email">
  <input type="password" name="password">
  <input type="submit" value="Entrar">
</form>
</body></html>"#;

    pub static DASHBOARD_HTML: &str =
        r#"<html><body><div class="pn-dashboard"><h1>Dashboard</h1></div></body></html>"#;

    pub fn creds() -> Credentials {
        Credentials::new("user@example.com", "secret".into())
    }

    /// A browser on which logging in with any credentials succeeds.
    pub fn logged_in_browser() -> MockBrowser {
        MockBrowser::new()
            .on_get(LOGIN_URL, StatusCode::OK, LOGIN_FORM_HTML)
            .on_post(LOGIN_URL, StatusCode::OK, DASHBOARD_HTML)
    }

    #[test]
    fn test_login_logout() -> anyhow::Result<()> {
        let browser = logged_in_browser();
        let mut cnsl = Console::buf(ConsoleConfig::default());
        let mut session = Session::login(&browser, Url::parse(BASE_URL)?, &creds(), &mut cnsl)?;
        assert!(session.is_authenticated());
        assert!(session.browser().is_ok());

        let requests = browser.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].method, "POST");
        assert!(requests[1]
            .form
            .contains(&("email".to_owned(), "user@example.com".to_owned())));
        assert!(requests[1]
            .form
            .contains(&("password".to_owned(), "secret".into())));
        assert!(!cnsl.take_output()?.contains("secret"));

        session.logout();
        assert!(!session.is_authenticated());
        session.logout();
        assert!(!session.is_authenticated());
        let err = session.browser().unwrap_err();
        assert_eq!(err.downcast_ref::<AuthError>(), Some(&AuthError::LoggedOut));
        Ok(())
    }

    #[test]
    fn test_login_fails_without_dashboard() -> anyhow::Result<()> {
        let browser = MockBrowser::new()
            .on_get(LOGIN_URL, StatusCode::OK, LOGIN_FORM_HTML)
            .on_post(LOGIN_URL, StatusCode::OK, LOGIN_FORM_HTML);
        let mut cnsl = Console::sink(ConsoleConfig::default());
        let err = Session::login(&browser, Url::parse(BASE_URL)?, &creds(), &mut cnsl)
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<AuthError>(),
            Some(&AuthError::InvalidCredentials)
        );
        assert_eq!(err.to_string(), "Failed to login! Check your credentials.");
        Ok(())
    }
}
