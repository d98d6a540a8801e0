//! REST backend.
//!
//! Every request carries the user's bearer token. Responses wrap their
//! payload in a single-key object (`{"timelines": [...]}`,
//! `{"timeline": {...}}`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use timeliner_api::{NewTimeline, Timeline, TimelineId, TimelinePatch, TimelineSummary};

use crate::error::{GatewayError, Result};
use crate::gateway::Gateway;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct ListResponse {
    timelines: Vec<TimelineSummary>,
}

#[derive(Deserialize)]
struct TimelineResponse {
    timeline: Timeline,
}

#[derive(Deserialize)]
struct StatusResponse {
    #[serde(default)]
    status: String,
}

pub struct HttpGateway {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
    }

    async fn send<T: DeserializeOwned>(&self, path: &str, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(path, %status, "backend response");

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(GatewayError::Unauthorized),
            StatusCode::NOT_FOUND => return Err(GatewayError::NotFound(path.to_string())),
            _ => {}
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn list(&self) -> Result<Vec<TimelineSummary>> {
        let path = "/timelines";
        let response: ListResponse = self.send(path, self.request(Method::GET, path)).await?;
        Ok(response.timelines)
    }

    async fn get(&self, id: &TimelineId) -> Result<Timeline> {
        let path = format!("/timelines/{id}");
        let response: TimelineResponse = self.send(&path, self.request(Method::GET, &path)).await?;
        Ok(response.timeline)
    }

    async fn create(&self, timeline: NewTimeline) -> Result<Timeline> {
        let path = "/timelines";
        let request = self.request(Method::POST, path).json(&timeline);
        let response: TimelineResponse = self.send(path, request).await?;
        tracing::info!(id = ?response.timeline.id, "timeline created");
        Ok(response.timeline)
    }

    async fn update(&self, id: &TimelineId, patch: TimelinePatch) -> Result<Timeline> {
        let path = format!("/timelines/{id}");
        let request = self.request(Method::PATCH, &path).json(&patch);
        let response: TimelineResponse = self.send(&path, request).await?;
        Ok(response.timeline)
    }

    async fn delete(&self, id: &TimelineId) -> Result<()> {
        let path = format!("/timelines/{id}");
        let response: StatusResponse = self.send(&path, self.request(Method::DELETE, &path)).await?;
        tracing::info!(%id, status = %response.status, "timeline deleted");
        Ok(())
    }
}
