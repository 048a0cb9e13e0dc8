// src/probe/result.rs
use serde::Serialize;
use serde_json::Value;

/// Status recorded when the exchange never completed.
pub const FAILURE_STATUS: u16 = 500;

/// Decoded response body of a completed probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProbeBody {
    Json(Value),
    Text(String),
}

impl ProbeBody {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ProbeBody::Json(value) => Some(value),
            ProbeBody::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ProbeBody::Text(text) => Some(text),
            ProbeBody::Json(_) => None,
        }
    }
}

/// Outcome of a single probe.
///
/// Either a completed HTTP exchange (any status, with a body) or a transport
/// failure (status 500, an error message and no body). The two constructors
/// are the only way to build one, so a result can never carry both.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResult {
    status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<ProbeBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ProbeResult {
    pub fn completed(status_code: u16, body: ProbeBody) -> Self {
        Self {
            status_code,
            response: Some(body),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = "unknown transport error".to_string();
        }

        Self {
            status_code: FAILURE_STATUS,
            response: None,
            error: Some(message),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn response(&self) -> Option<&ProbeBody> {
        self.response.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}
