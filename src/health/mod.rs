// src/health/mod.rs
mod endpoint;

pub use endpoint::{hello, HelloResponse, HELLO_MESSAGE, HELLO_PATH};
