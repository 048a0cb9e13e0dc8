// src/probe/prober.rs
use super::result::{ProbeBody, ProbeResult};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::error::Error as StdError;
use tokio::time::{timeout, Duration};
use tracing::{debug, error, warn};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Issues single GET requests and folds every outcome into a [`ProbeResult`].
#[derive(Debug, Clone)]
pub struct ServiceProber {
    client: Client,
    timeout: Duration,
}

impl ServiceProber {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET `url` once. Never fails: transport errors become a 500 result.
    pub async fn probe(&self, url: &str) -> ProbeResult {
        let start = std::time::Instant::now();

        let outcome = match timeout(self.timeout, self.exchange(url)).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => Err(describe(&e)),
            Err(_) => Err(format!("Request timed out after {:?}", self.timeout)),
        };

        match outcome {
            Ok(result) => {
                debug!(
                    %url,
                    status = result.status_code(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Probe completed"
                );
                result
            }
            Err(message) => {
                error!(%url, error = %message, "Probe failed");
                ProbeResult::failed(message)
            }
        }
    }

    async fn exchange(&self, url: &str) -> reqwest::Result<ProbeResult> {
        let response = self.client.get(url).send().await?;

        let status = response.status().as_u16();
        let declares_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(is_json_content_type)
            .unwrap_or(false);

        let text = response.text().await?;
        let body = if declares_json {
            match serde_json::from_str(&text) {
                Ok(value) => ProbeBody::Json(value),
                Err(e) => {
                    warn!(%url, error = %e, "Response declared JSON but did not parse, keeping raw text");
                    ProbeBody::Text(text)
                }
            }
        } else {
            ProbeBody::Text(text)
        };

        Ok(ProbeResult::completed(status, body))
    }
}

/// `application/json` or any `application/*+json`, parameters ignored.
pub fn is_json_content_type(value: &str) -> bool {
    let mime = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

// reqwest hides the root cause (refused, DNS) behind its top-level message.
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_content_types() {
        assert!(is_json_content_type("application/json"));
        assert!(is_json_content_type("application/json; charset=utf-8"));
        assert!(is_json_content_type("Application/JSON"));
        assert!(is_json_content_type("application/problem+json"));
    }

    #[test]
    fn test_non_json_content_types() {
        assert!(!is_json_content_type("text/plain"));
        assert!(!is_json_content_type("text/html; charset=utf-8"));
        assert!(!is_json_content_type("application/javascript"));
        assert!(!is_json_content_type(""));
    }
}
