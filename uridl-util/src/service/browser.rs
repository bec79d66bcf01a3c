use std::cell::RefCell;
use std::time::Duration;

use anyhow::{anyhow, Context as _};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::redirect::Policy;
use reqwest::Url;

use crate::console::Console;
use crate::service::session::WithRetry as _;
use crate::service::{Browse, CookieJar, Page, ResponseExt as _};
use crate::Result;

static USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const MAX_REDIRECTS: usize = 10;

/// Blocking http browser with an in-memory cookie jar.
///
/// Redirects are followed by hand so that cookies set on every hop are kept.
pub struct HttpBrowser {
    client: Client,
    jar: RefCell<CookieJar>,
    retry_limit: usize,
    retry_interval: Duration,
}

impl HttpBrowser {
    pub fn new(timeout: Duration, retry_limit: usize, retry_interval: Duration) -> Result<Self> {
        let client = Client::builder()
            .redirect(Policy::none()) // redirects manually
            .timeout(Some(timeout))
            .user_agent(USER_AGENT)
            .build()
            .context("Could not build http client")?;
        Ok(Self {
            client,
            jar: RefCell::new(CookieJar::default()),
            retry_limit,
            retry_interval,
        })
    }

    fn open(&self, mut request: RequestBuilder, cnsl: &mut Console) -> Result<Page> {
        for _ in 0..=MAX_REDIRECTS {
            let res = request
                .with_retry(
                    &self.client,
                    &self.jar,
                    self.retry_limit,
                    self.retry_interval,
                    cnsl,
                )
                .retry_send()?;
            if res.status().is_redirection() {
                let next_url = res.location_url(res.url())?;
                request = self.client.get(next_url);
                continue;
            }
            let url = res.url().clone();
            let status = res.status();
            let text = res.text().context("Could not read response body")?;
            return Ok(Page::new(url, status, &text));
        }
        Err(anyhow!("Exceeded {} redirects", MAX_REDIRECTS))
    }
}

impl Browse for HttpBrowser {
    fn get(&self, url: &Url, cnsl: &mut Console) -> Result<Page> {
        self.open(self.client.get(url.clone()), cnsl)
            .with_context(|| format!("Could not get page : {}", url))
    }

    fn post_form(
        &self,
        url: &Url,
        form: &[(String, String)],
        cnsl: &mut Console,
    ) -> Result<Page> {
        self.open(self.client.post(url.clone()).form(form), cnsl)
            .with_context(|| format!("Could not post form : {}", url))
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead as _, BufReader, Read as _, Write as _};
    use std::net::{TcpListener, TcpStream};
    use std::thread::{self, JoinHandle};

    use reqwest::StatusCode;

    use super::*;
    use crate::console::ConsoleConfig;
    use crate::service::Scrape as _;
    use crate::select;

    fn response(status: &str, headers: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            headers,
            body.len(),
            body
        )
    }

    /// Reads one request and returns its head and body as text.
    fn read_request(stream: &TcpStream) -> String {
        let mut reader = BufReader::new(stream);
        let mut request = String::new();
        let mut content_length = 0;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
            let lower = line.to_lowercase();
            if let Some(len) = lower.strip_prefix("content-length:") {
                content_length = len.trim().parse().unwrap();
            }
            request.push_str(&lower);
        }
        let mut body = vec![0; content_length];
        reader.read_exact(&mut body).unwrap();
        request + &String::from_utf8(body).unwrap()
    }

    /// Serves `responses` on localhost, one connection each, and returns the requests.
    fn serve(responses: Vec<String>) -> (Url, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            responses
                .into_iter()
                .map(|response| {
                    let (mut stream, _) = listener.accept().unwrap();
                    let request = read_request(&stream);
                    stream.write_all(response.as_bytes()).unwrap();
                    request
                })
                .collect()
        });
        (Url::parse(&format!("http://{}/", addr)).unwrap(), handle)
    }

    fn browser(retry_limit: usize) -> HttpBrowser {
        HttpBrowser::new(Duration::from_secs(5), retry_limit, Duration::from_millis(0)).unwrap()
    }

    #[test]
    fn test_post_follows_redirect_with_cookies() -> anyhow::Result<()> {
        let (base, server) = serve(vec![
            response(
                "302 Found",
                "Location: /dash\r\nSet-Cookie: sid=abc123; Path=/\r\n",
                "",
            ),
            response(
                "200 OK",
                "Content-Type: text/html\r\n",
                r#"<html><body><div class="pn-dashboard">hi</div></body></html>"#,
            ),
        ]);
        let browser = browser(0);
        let mut cnsl = Console::buf(ConsoleConfig::default());
        let form = vec![("email".to_owned(), "user@example.com".to_owned())];
        let page = browser.post_form(&base.join("login")?, &form, &mut cnsl)?;

        assert_eq!(page.url, base.join("dash")?);
        assert_eq!(page.status, StatusCode::OK);
        assert!(page.find_first(select!("div.pn-dashboard")).is_some());

        let requests = server.join().unwrap();
        assert!(requests[0].starts_with("post /login http/1.1\r\n"));
        assert!(requests[0].ends_with("email=user%40example.com"));
        assert!(requests[1].starts_with("get /dash http/1.1\r\n"));
        assert!(requests[1].contains("cookie: sid=abc123\r\n"));

        let output = cnsl.take_output()?;
        assert_eq!(
            output,
            format!(
                "POST    {}login ... 302 Found\nGET     {}dash ... 200 OK\n",
                base, base
            )
        );
        Ok(())
    }

    #[test]
    fn test_retries_server_error() -> anyhow::Result<()> {
        let (base, server) = serve(vec![
            response("503 Service Unavailable", "", ""),
            response("200 OK", "", "<html><body>ok</body></html>"),
        ]);
        let mut cnsl = Console::buf(ConsoleConfig::default());
        let page = browser(1).get(&base.join("runs")?, &mut cnsl)?;
        assert_eq!(page.status, StatusCode::OK);
        assert_eq!(server.join().unwrap().len(), 2);
        let output = cnsl.take_output()?;
        assert!(output.contains("... 503 Service Unavailable\n"));
        assert!(output.ends_with("... 200 OK\n"));
        Ok(())
    }

    #[test]
    fn test_server_error_without_retry() -> anyhow::Result<()> {
        let (base, server) = serve(vec![response("500 Internal Server Error", "", "")]);
        let mut cnsl = Console::sink(ConsoleConfig::default());
        let err = browser(0).get(&base, &mut cnsl).unwrap_err();
        assert_eq!(
            format!("{:#}", err),
            format!("Could not get page : {}: Received server error", base)
        );
        assert_eq!(server.join().unwrap().len(), 1);
        Ok(())
    }

    #[test]
    fn test_too_many_redirects() -> anyhow::Result<()> {
        let responses = (0..=MAX_REDIRECTS)
            .map(|_| response("302 Found", "Location: /loop\r\n", ""))
            .collect();
        let (base, server) = serve(responses);
        let mut cnsl = Console::sink(ConsoleConfig::default());
        let err = browser(0).get(&base, &mut cnsl).unwrap_err();
        assert!(format!("{:#}", err).ends_with("Exceeded 10 redirects"));
        assert_eq!(server.join().unwrap().len(), MAX_REDIRECTS + 1);
        Ok(())
    }

    #[test]
    fn test_timeout() -> anyhow::Result<()> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let base = Url::parse(&format!("http://{}/", listener.local_addr()?))?;
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            read_request(&stream);
            // hold the connection open past the client timeout
            thread::sleep(Duration::from_secs(1));
        });
        let browser = HttpBrowser::new(Duration::from_millis(100), 0, Duration::from_millis(0))?;
        let mut cnsl = Console::buf(ConsoleConfig::default());
        assert!(browser.get(&base, &mut cnsl).is_err());
        assert!(cnsl.take_output()?.ends_with("... failed\n"));
        server.join().unwrap();
        Ok(())
    }
}
