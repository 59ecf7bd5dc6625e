use reqwest::{Client, StatusCode};
use serde_json::json;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Clone)]
pub struct DeployHook {
    url: Option<String>,
    timeout: Duration,
    http: Client,
}

impl DeployHook {
    pub fn new(url: Option<String>, timeout: Duration, http: Client) -> Self {
        Self { url, timeout, http }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    /// POSTs `{}` to the hook. Only 200/201/202 count as accepted.
    pub async fn trigger_redeploy(&self) -> bool {
        let Some(url) = self.url.as_deref() else {
            warn!("deploy.trigger.unconfigured");
            return false;
        };

        let resp = match self.http.post(url).timeout(self.timeout).json(&json!({})).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, "deploy.trigger.failed");
                return false;
            }
        };

        let status = resp.status();
        let accepted = matches!(status, StatusCode::OK | StatusCode::CREATED | StatusCode::ACCEPTED);
        if accepted {
            info!(%status, "deploy.trigger.accepted");
        } else {
            warn!(%status, "deploy.trigger.rejected");
        }
        accepted
    }
}
