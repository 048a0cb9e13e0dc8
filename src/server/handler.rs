// src/server/handler.rs
use hyper::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use hyper::{Body, Method, Request, Response, StatusCode};
use serde::Serialize;
use serde_json::json;
use tower::Service;

use crate::health::{self, HELLO_PATH};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Routes requests for the public HTTP surface. Holds no state.
#[derive(Clone, Debug, Default)]
pub struct RequestHandler;

impl RequestHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn route(&self, req: &Request<Body>) -> Result<Response<Body>, BoxError> {
        tracing::debug!(method = %req.method(), path = req.uri().path(), "request");

        match (req.method(), req.uri().path()) {
            (&Method::GET | &Method::HEAD, HELLO_PATH) => json_response(StatusCode::OK, &health::hello()),
            (_, HELLO_PATH) => {
                let mut response = json_response(
                    StatusCode::METHOD_NOT_ALLOWED,
                    &json!({"error": "method not allowed"}),
                )?;
                response
                    .headers_mut()
                    .insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
                Ok(response)
            }
            _ => json_response(StatusCode::NOT_FOUND, &json!({"error": "not found"})),
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, payload: &T) -> Result<Response<Body>, BoxError> {
    let body = serde_json::to_vec(payload)?;
    let response = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body))?;
    Ok(response)
}

impl Service<Request<Body>> for RequestHandler {
    type Response = Response<Body>;
    type Error = BoxError;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let result = self.route(&req).map_err(|e| {
            tracing::error!(%e, "failed to build response");
            e
        });
        Box::pin(async move { result })
    }
}
