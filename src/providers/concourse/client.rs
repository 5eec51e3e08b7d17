use log::debug;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::auth::Token;
use crate::error::{DashboardError, Result};
use crate::target::Target;

use super::types::{ConcourseJob, ConcoursePipeline};

const USER_AGENT: &str = concat!("concourse-summary/", env!("CARGO_PKG_VERSION"));

pub struct ConcourseClient {
    client: Client,
    base_url: Url,
    token: Option<Token>,
    legacy_auth_header: bool,
}

impl ConcourseClient {
    /// Creates a client for the given target.
    ///
    /// Every request carries the same user agent and gives up after `timeout`.
    /// There are no retries here; the refresh schedule is the retry loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(target: &Target, timeout: Duration, legacy_auth_header: bool) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| DashboardError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: target.base_url.clone(),
            token: target.token.clone(),
            legacy_auth_header,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) if self.legacy_auth_header => {
                request.header(AUTHORIZATION, format!("Bearer+{}", token.as_str()))
            }
            Some(token) => request.bearer_auth(token.as_str()),
            None => request,
        }
    }

    /// GETs `base_url + path` and decodes the JSON body into `T`.
    pub async fn fetch_json<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let raw = format!("{}{path}", self.base_url.as_str().trim_end_matches('/'));
        let url = Url::parse(&raw)
            .map_err(|e| DashboardError::Request(format!("invalid URL '{raw}': {e}")))?;
        self.get_json(url).await
    }

    async fn get_json<T>(&self, url: Url) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let path = url.path().to_string();
        debug!("GET {url}");

        let response = self.auth_request(self.client.get(url)).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DashboardError::HttpStatus {
                status: status.as_u16(),
                path,
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| DashboardError::Decode { path, source })
    }

    pub async fn fetch_pipelines(&self) -> Result<Vec<ConcoursePipeline>> {
        self.fetch_json("/api/v1/pipelines").await
    }

    pub async fn fetch_jobs(&self) -> Result<Vec<ConcourseJob>> {
        self.fetch_json("/api/v1/jobs").await
    }

    /// Jobs of a single pipeline, with team and pipeline names percent-encoded.
    pub async fn fetch_pipeline_jobs(&self, team: &str, pipeline: &str) -> Result<Vec<ConcourseJob>> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| DashboardError::Request(format!("invalid API URL '{}'", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "v1", "teams", team, "pipelines", pipeline, "jobs"]);
        self.get_json(url).await
    }
}
