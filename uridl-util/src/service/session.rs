use std::cell::RefCell;
use std::io::Write as _;
use std::time::Duration;

use anyhow::Context as _;
use reqwest::blocking::{Client, Request, RequestBuilder, Response};
use retry::{delay, retry, OperationResult};

use crate::console::Console;
use crate::service::CookieJar;
use crate::{Error, Result};

trait ExecSession {
    fn exec_session(&self, request: Request, jar: &RefCell<CookieJar>) -> Result<Response>;
}

impl ExecSession for Client {
    fn exec_session(&self, mut request: Request, jar: &RefCell<CookieJar>) -> Result<Response> {
        jar.borrow()
            .load_into(&mut request)
            .context("Could not load cookies into request")?;
        let response = self.execute(request)?;
        jar.borrow_mut().store_from(&response);
        Ok(response)
    }
}

pub struct RetryRequestBuilder<'a> {
    inner: RequestBuilder,
    client: &'a Client,
    jar: &'a RefCell<CookieJar>,
    retry_limit: usize,
    retry_interval: Duration,
    cnsl: &'a mut Console,
}

impl<'a> RetryRequestBuilder<'a> {
    pub fn send_pretty(&mut self) -> Result<Response> {
        let req = self
            .inner
            .try_clone()
            .ok_or_else(|| Error::msg("Could not build request"))?
            .build()?;
        write!(self.cnsl, "{:7} {} ... ", req.method().as_str(), req.url()).unwrap_or(());
        let result = self
            .client
            .exec_session(req, self.jar)
            .context("Could not send request");
        match &result {
            Ok(res) => writeln!(self.cnsl, "{}", res.status()),
            Err(_) => writeln!(self.cnsl, "failed"),
        }
        .unwrap_or(());
        result
    }

    /// Sends the request, retrying on transport errors and server errors.
    pub fn retry_send(&mut self) -> Result<Response> {
        let retry_interval = self.retry_interval.as_millis() as u64;
        let retry_limit = self.retry_limit;
        let durations = delay::Fixed::from_millis(retry_interval).take(retry_limit);
        retry(durations, || match self.send_pretty() {
            Ok(res) => {
                if res.status().is_server_error() {
                    OperationResult::Retry(Error::msg("Received server error"))
                } else {
                    OperationResult::Ok(res)
                }
            }
            Err(err) => OperationResult::Retry(err),
        })
        .map_err(|err| match err {
            retry::Error::Operation { error, .. } => error,
            retry::Error::Internal(msg) => Error::msg(msg),
        })
    }
}

pub trait WithRetry {
    fn with_retry<'a>(
        self,
        client: &'a Client,
        jar: &'a RefCell<CookieJar>,
        retry_limit: usize,
        retry_interval: Duration,
        cnsl: &'a mut Console,
    ) -> RetryRequestBuilder<'a>;
}

impl WithRetry for RequestBuilder {
    fn with_retry<'a>(
        self,
        client: &'a Client,
        jar: &'a RefCell<CookieJar>,
        retry_limit: usize,
        retry_interval: Duration,
        cnsl: &'a mut Console,
    ) -> RetryRequestBuilder<'a> {
        RetryRequestBuilder {
            inner: self,
            client,
            jar,
            retry_limit,
            retry_interval,
            cnsl,
        }
    }
}
