use anyhow::{anyhow, Result};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{error, warn};

use crate::config::Config;
use crate::domain::{AnalysisResult, AnalyzeRequest, DebugStatus, HealthResponse};

/// HTTP client for the meme coin analyser.
///
/// Every call is independent: no retries, no shared state beyond the pooled
/// connection. Failures are logged and collapsed into `false`/`None`.
#[derive(Clone)]
pub struct AnalyzerClient {
    base_url: String,
    chain: String,
    health_timeout: Duration,
    analyze_timeout: Duration,
    http: Client,
}

impl AnalyzerClient {
    pub fn new(base_url: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            chain: "bsc".to_string(),
            health_timeout: Duration::from_secs(10),
            analyze_timeout: Duration::from_secs(30),
            http,
        }
    }

    pub fn from_config(cfg: &Config, http: Client) -> Self {
        Self {
            chain: cfg.chain.clone(),
            health_timeout: cfg.health_timeout,
            analyze_timeout: cfg.analyze_timeout,
            ..Self::new(cfg.mca_url.clone(), http)
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<String> {
        if self.base_url.is_empty() {
            return Err(anyhow!("MCA_URL is not configured"));
        }
        Ok(format!("{}{path}", self.base_url))
    }

    pub async fn check_health(&self) -> bool {
        match self.health().await {
            Ok(ok) => ok,
            Err(e) => {
                warn!(error = %e, "analyzer.health.failed");
                false
            }
        }
    }

    async fn health(&self) -> Result<bool> {
        let resp = self
            .http
            .get(self.url("/health")?)
            .timeout(self.health_timeout)
            .send()
            .await?;
        if resp.status() != StatusCode::OK {
            return Err(anyhow!("health returned {}", resp.status()));
        }
        let body: HealthResponse = resp.json().await?;
        Ok(body.ok == Value::Bool(true))
    }

    pub async fn analyze(&self, address: &str) -> Option<AnalysisResult> {
        match self.try_analyze(address).await {
            Ok(result) => result,
            Err(e) => {
                error!(address, error = %e, "analyzer.analyze.failed");
                None
            }
        }
    }

    /// `Ok(None)` is a non-200 answer, already logged; `Err` is transport or decode.
    async fn try_analyze(&self, address: &str) -> Result<Option<AnalysisResult>> {
        let resp = self
            .http
            .post(self.url("/analyze")?)
            .timeout(self.analyze_timeout)
            .json(&AnalyzeRequest { chain: &self.chain, address })
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            warn!(address, %status, body = %body, "analyzer.analyze.rejected");
            return Ok(None);
        }
        Ok(Some(resp.json().await?))
    }

    pub async fn debug_status(&self, address: &str) -> Option<DebugStatus> {
        match self.try_debug_status(address).await {
            Ok(status) => Some(status),
            Err(e) => {
                warn!(address, error = %e, "analyzer.debug.failed");
                None
            }
        }
    }

    async fn try_debug_status(&self, address: &str) -> Result<DebugStatus> {
        let resp = self
            .http
            .get(self.url("/debug/bscscan")?)
            .query(&[("address", address)])
            .timeout(self.health_timeout)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }
}
