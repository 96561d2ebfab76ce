use std::time::Duration;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{
    domain::ExternalId,
    error::ErrorBody,
    protocol::{ExpensesResponse, ListQuery, OperatorDetail, OperatorPage, Statistics},
};
use tracing::debug;
use url::Url;

use crate::{config::ClientSettings, error::TransportError, DirectoryApi};

/// reqwest-backed [`DirectoryApi`]. Cloning shares the connection pool.
#[derive(Debug, Clone)]
pub struct HttpDirectoryClient {
    http: Client,
    base_url: Url,
}

impl HttpDirectoryClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("invalid api base url '{base_url}'"))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("api base url '{base_url}' cannot carry a path"));
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self { http, base_url })
    }

    pub fn from_settings(settings: &ClientSettings) -> anyhow::Result<Self> {
        Self::new(&settings.api_base_url, settings.request_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `segments` to the base path, percent-encoding each one, so an
    /// identifier such as `12.345.678/0001-99` stays a single segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                TransportError::Network(format!("invalid api base url '{}'", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: Option<&ListQuery>,
    ) -> Result<T, TransportError> {
        debug!(url = %url, ?query, "directory: GET");
        let mut request = self.http.get(url);
        if let Some(query) = query {
            request = request.query(query);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .bytes()
                .await
                .ok()
                .and_then(|bytes| ErrorBody::from_slice(&bytes));
            return Err(TransportError::status(status.as_u16(), body));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

#[async_trait]
impl DirectoryApi for HttpDirectoryClient {
    async fn statistics(&self) -> Result<Statistics, TransportError> {
        let url = self.endpoint(&["api", "statistics"])?;
        self.get_json(url, None).await
    }

    async fn list_operators(&self, query: &ListQuery) -> Result<OperatorPage, TransportError> {
        let url = self.endpoint(&["api", "operators"])?;
        self.get_json(url, Some(query)).await
    }

    async fn operator(&self, external_id: &ExternalId) -> Result<OperatorDetail, TransportError> {
        let url = self.endpoint(&["api", "operators", external_id.as_str()])?;
        self.get_json(url, None).await
    }

    async fn operator_expenses(
        &self,
        external_id: &ExternalId,
    ) -> Result<ExpensesResponse, TransportError> {
        let url = self.endpoint(&["api", "operators", external_id.as_str(), "expenses"])?;
        self.get_json(url, None).await
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
