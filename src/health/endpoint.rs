// src/health/endpoint.rs
use serde::Serialize;

pub const HELLO_PATH: &str = "/hello";
pub const HELLO_MESSAGE: &str = "Hello from Python service";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelloResponse {
    pub message: &'static str,
}

/// Static liveness payload. Independent of probe outcomes.
pub fn hello() -> HelloResponse {
    HelloResponse {
        message: HELLO_MESSAGE,
    }
}
