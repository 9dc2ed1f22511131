use std::time::Duration;

use log::debug;
use url::Url;

use crate::error::{Error, Result};

const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; bibfetch/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Something that can retrieve a document body for a URL.
pub trait Fetcher {
    fn get(&self, url: &Url) -> Result<String>;
}

/// Blocking HTTP client. One request at a time, no retries.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    pub fn new() -> Self {
        let cfg = ureq::Agent::config_builder()
            .timeout_connect(Some(Duration::from_secs(5)))
            .timeout_global(Some(Duration::from_secs(15)))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(cfg),
        }
    }
}

impl Fetcher for HttpFetcher {
    fn get(&self, url: &Url) -> Result<String> {
        debug!("GET {url}");
        let res = self
            .agent
            .get(url.as_str())
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(|e| request_error(url, e))?;
        res.into_body()
            .read_to_string()
            .map_err(|e| Error::FatalConnection(format!("failed to read response from {url}: {e}")))
    }
}

fn request_error(url: &Url, err: ureq::Error) -> Error {
    match err {
        ureq::Error::StatusCode(403) => Error::FatalConnection(format!(
            "403 Forbidden from {url}: the server refused the request, \
             possibly because of its robots policy"
        )),
        ureq::Error::StatusCode(404) => Error::NotFound(url.to_string()),
        ureq::Error::StatusCode(code) => {
            Error::FatalConnection(format!("HTTP {code} from {url}"))
        }
        other => Error::FatalConnection(format!("failed request for URL {url}: {other}")),
    }
}
