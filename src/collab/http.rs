//! HTTP resource fetcher backed by ureq.

use std::time::Duration;

use ureq::Agent;

use crate::error::{Error, Result};

use super::ResourceFetcher;

/// Some image hosts reject unknown clients; a curl UA passes everywhere.
const USER_AGENT: &str = "curl/7.61";

/// Blocking HTTP fetcher with a shared connection-pooling agent.
pub struct UreqFetcher {
    agent: Agent,
}

impl UreqFetcher {
    pub fn new(timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }
}

impl Default for UreqFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl ResourceFetcher for UreqFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .agent
            .get(url)
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(|e| Error::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            return Err(Error::Fetch {
                url: url.to_string(),
                reason: format!("HTTP {status}"),
            });
        }

        body.read_to_vec().map_err(|e| Error::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}
