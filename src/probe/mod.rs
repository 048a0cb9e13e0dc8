// src/probe/mod.rs
mod prober;
mod result;
mod summary;

pub use prober::{is_json_content_type, ServiceProber};
pub use result::{ProbeBody, ProbeResult, FAILURE_STATUS};
pub use summary::{run_startup_probes, ProbeSummary};
