// src/probe/summary.rs
use super::prober::ServiceProber;
use super::result::ProbeResult;
use crate::config::Config;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{error, info};

/// Combined outcome of the startup probes, keyed by logical service name.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeSummary {
    #[serde(flatten)]
    pub services: BTreeMap<String, ProbeResult>,
    pub timestamp: DateTime<Utc>,
}

impl ProbeSummary {
    pub fn get(&self, name: &str) -> Option<&ProbeResult> {
        self.services.get(name)
    }

    pub fn failures(&self) -> usize {
        self.services.values().filter(|r| r.is_failure()).count()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Probe both configured upstreams one after the other and log the outcome.
pub async fn run_startup_probes(config: &Config, prober: &ServiceProber) -> ProbeSummary {
    for upstream in config.upstreams() {
        info!("Calling {}: {}", upstream.name, upstream.url);
    }

    let mut services = BTreeMap::new();
    for upstream in config.upstreams() {
        let result = prober.probe(upstream.url.as_str()).await;
        services.insert(upstream.name.clone(), result);
    }

    let summary = ProbeSummary {
        services,
        timestamp: Utc::now(),
    };

    info!("Response from upstream services:");
    match summary.to_json() {
        Ok(json) => info!("{}", json),
        Err(e) => error!("Failed to encode probe summary: {}", e),
    }

    summary
}
