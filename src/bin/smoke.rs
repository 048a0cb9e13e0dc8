//! src/bin/smoke.rs
//! Manual smoke test for the service mesh.
//! Run: cargo run --bin smoke -- [name=url ...]

use anyhow::{bail, Result};
use service_prober::probe::{ProbeBody, ProbeResult, ServiceProber};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const SMOKE_TIMEOUT: Duration = Duration::from_secs(5);
const TEXT_PREVIEW_CHARS: usize = 200;

const DEFAULT_TARGETS: &[(&str, &str)] = &[
    ("go_service", "http://localhost:8083/ping"),
    ("php_api", "http://localhost:8080/users"),
    ("python_service", "http://localhost:8082/hello"),
    ("python_service_config", "http://localhost:8082/config"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
struct Target {
    name: String,
    url: String,
}

fn parse_targets<I>(args: I) -> Result<Vec<Target>>
where
    I: IntoIterator<Item = String>,
{
    let mut targets = Vec::new();
    for arg in args {
        let Some((name, url)) = arg.split_once('=') else {
            bail!("invalid target {arg:?}, expected NAME=URL");
        };
        if name.is_empty() || url.is_empty() {
            bail!("invalid target {arg:?}, expected NAME=URL");
        }
        targets.push(Target {
            name: name.to_string(),
            url: url.to_string(),
        });
    }

    if targets.is_empty() {
        targets = DEFAULT_TARGETS
            .iter()
            .map(|(name, url)| Target {
                name: name.to_string(),
                url: url.to_string(),
            })
            .collect();
    }
    Ok(targets)
}

fn render(result: &ProbeResult) -> String {
    if let Some(error) = result.error() {
        return format!("  FAILED: {error}");
    }

    let body = match result.response() {
        Some(ProbeBody::Json(value)) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        // Undeclared JSON still gets pretty-printed.
        Some(ProbeBody::Text(text)) => match serde_json::from_str::<serde_json::Value>(text) {
            Ok(value) if value.is_object() || value.is_array() => {
                serde_json::to_string_pretty(&value).unwrap_or_else(|_| preview(text))
            }
            _ => preview(text),
        },
        None => String::new(),
    };
    format!("  Status: {}\n  Response: {}", result.status_code(), body)
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(TEXT_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let targets = parse_targets(std::env::args().skip(1))?;
    let prober = ServiceProber::new(SMOKE_TIMEOUT)?;

    println!(
        "Testing {} endpoint(s), timeout {:?}",
        targets.len(),
        prober.timeout()
    );
    println!("{}", "=".repeat(50));

    let mut failures = 0;
    for target in &targets {
        println!("\n{}: {}", target.name, target.url);
        let result = prober.probe(&target.url).await;
        if result.is_failure() {
            failures += 1;
        }
        println!("{}", render(&result));
    }

    println!("\n{}", "=".repeat(50));
    println!("{} ok, {} failed", targets.len() - failures, failures);

    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}
