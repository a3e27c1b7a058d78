use crate::types::{ProbeResponse, RegisterPayload, ScreeningRecord};
use anyhow::{Context, Result};
use std::time::Duration;

/// Thin wrapper over `reqwest::Client` for the three target endpoints.
///
/// Errors returned here are transport-level only (connect refused, timeout);
/// any HTTP status, matching or not, comes back as an `Ok` response.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client for the given base URL with a total per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        reqwest::Url::parse(base_url).with_context(|| format!("invalid base URL: {base_url}"))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("alco-probe-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `POST /api/auth/register` with a full registration payload.
    pub async fn register(&self, payload: &RegisterPayload) -> Result<ProbeResponse> {
        let url = format!("{}/api/auth/register", self.base_url);
        let response = self.http.post(&url).json(payload).send().await?;
        Ok(Self::split_response(response).await)
    }

    /// `GET /api/doctor/results`.
    pub async fn fetch_results(&self) -> Result<ProbeResponse> {
        let url = format!("{}/api/doctor/results", self.base_url);
        let response = self.http.get(&url).send().await?;
        Ok(Self::split_response(response).await)
    }

    /// `POST /api/responses` with one synthetic screening record.
    pub async fn submit_screening(&self, record: &ScreeningRecord) -> Result<ProbeResponse> {
        let url = format!("{}/api/responses", self.base_url);
        let response = self.http.post(&url).json(record).send().await?;
        Ok(Self::split_response(response).await)
    }

    /// Split a response into status plus best-effort parsed JSON body.
    /// Bodies that fail to read or parse degrade to `None`.
    async fn split_response(response: reqwest::Response) -> ProbeResponse {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok());
        ProbeResponse { status, body }
    }
}
