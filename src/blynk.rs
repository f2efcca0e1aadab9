use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use lambda_http::tracing::{debug, warn};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::Config;

// Outcome of one virtual pin update; failures are data, not errors
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    #[serde(skip)]
    pub pin: String,
    pub value: f64,
    pub success: bool,
    pub status_code: Option<u16>,
    pub response_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[async_trait]
pub trait PinUpdater: Send + Sync {
    async fn update(&self, pin: &str, value: f64) -> UpdateResult;
}

// Writes virtual pins through GET /external/api/update
pub struct BlynkClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl BlynkClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        }
    }
}

#[async_trait]
impl PinUpdater for BlynkClient {
    async fn update(&self, pin: &str, value: f64) -> UpdateResult {
        let url = format!("{}/external/api/update", self.base_url);
        // f64's Display drops the ".0" on whole numbers
        let rendered = value.to_string();
        let sent = self
            .http
            .get(&url)
            .query(&[("token", self.token.as_str()), (pin, rendered.as_str())])
            .send()
            .await;

        match sent {
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                if !status.is_success() {
                    warn!(pin, value, status = status.as_u16(), body = %body, "pin update rejected");
                } else {
                    debug!(pin, value, "pin updated");
                }
                UpdateResult {
                    pin: pin.to_string(),
                    value,
                    success: status.is_success(),
                    status_code: Some(status.as_u16()),
                    response_body: Some(body),
                    error: None,
                }
            }
            Err(e) => {
                warn!(pin, value, error = %e, "pin update failed");
                UpdateResult {
                    pin: pin.to_string(),
                    value,
                    success: false,
                    status_code: None,
                    response_body: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

// Fire every update, at most `concurrency` in flight; one failure never cancels the rest
pub async fn dispatch(
    updater: &dyn PinUpdater,
    params: &[(&'static str, f64)],
    concurrency: usize,
) -> BTreeMap<String, UpdateResult> {
    // Collected first so the stream holds boxed futures, not a borrowing closure
    let updates: Vec<_> = params
        .iter()
        .map(|(pin, value)| updater.update(pin, *value))
        .collect();
    stream::iter(updates)
        .buffer_unordered(concurrency.max(1))
        .map(|result| (result.pin.clone(), result))
        .collect()
        .await
}
