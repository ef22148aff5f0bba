//! Shared HTTP client with a bounded timeout and per-host pacing.

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::HarvestConfig;
use crate::error::FetchError;
use crate::pacing::HostPacer;

pub struct HttpFetcher {
    client: reqwest::Client,
    pacer: HostPacer,
}

impl HttpFetcher {
    pub fn new(config: &HarvestConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            pacer: HostPacer::new(config.pacing),
        })
    }

    /// GET `url` with `query` parameters and return the body as text.
    pub async fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String, FetchError> {
        let resp = self.send(url, query).await?;
        Ok(resp.text().await?)
    }

    /// GET `url` with `query` parameters and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let body = self.send(url, query).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn send(&self, url: &str, query: &[(&str, &str)]) -> Result<reqwest::Response, FetchError> {
        let request = self.client.get(url).query(query).build()?;
        let host = request.url().host_str().unwrap_or_default().to_string();
        self.pacer.wait(&host).await;

        info!(url = %request.url(), "fetching");
        let resp = self.client.execute(request).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        debug!(url, status = status.as_u16(), "fetched");
        Ok(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_default_config() {
        assert!(HttpFetcher::new(&HarvestConfig::default()).is_ok());
    }
}
