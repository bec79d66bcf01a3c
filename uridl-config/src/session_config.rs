use std::time::Duration;

use getset::CopyGetters;
use serde::{Deserialize, Serialize};

use crate::service::HttpBrowser;
use crate::Result;

#[derive(Serialize, Deserialize, CopyGetters, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct SessionConfig {
    #[serde(with = "humantime_serde")]
    #[get_copy = "pub"]
    timeout: Duration,
    #[get_copy = "pub"]
    retry_limit: usize,
    #[serde(with = "humantime_serde")]
    #[get_copy = "pub"]
    retry_interval: Duration,
}

impl SessionConfig {
    /// Builds a fresh browser with an empty cookie jar.
    pub fn build_browser(&self) -> Result<HttpBrowser> {
        HttpBrowser::new(self.timeout, self.retry_limit, self.retry_interval)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry_limit: 0,
            retry_interval: Duration::from_secs(2),
        }
    }
}
