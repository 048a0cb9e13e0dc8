// ────────────────────────────────
// src/server/builder.rs
// ────────────────────────────────
use crate::server::listener::bind_tcp;
use anyhow::{Context, Result};
use hyper::{server::conn::Http, Body, Request, Response};
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::Service;

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

enum Bind {
    Addr(SocketAddr),
    Listener(TcpListener),
}

/// Builder pattern so `main.rs` can inject its request handler.
pub struct ServerBuilder<H>
where
    H: Service<Request<Body>, Response = Response<Body>> + Send + Clone + 'static,
    H::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    H::Future: Send + 'static,
{
    bind: Bind,
    handler: Option<H>,
}

impl<H> ServerBuilder<H>
where
    H: Service<Request<Body>, Response = Response<Body>> + Send + Clone + 'static,
    H::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    H::Future: Send + 'static,
{
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            bind: Bind::Addr(addr),
            handler: None,
        }
    }

    /// Serve on a listener that is already bound.
    pub fn from_listener(listener: TcpListener) -> Self {
        Self {
            bind: Bind::Listener(listener),
            handler: None,
        }
    }

    pub fn with_handler(mut self, handler: H) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Consume the builder, boot the TCP listener, spawn Hyper tasks until
    /// `signal` resolves.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let handler = self
            .handler
            .context("handler must be set via with_handler()")?;

        let listener = match self.bind {
            Bind::Addr(addr) => bind_tcp(addr).await?,
            Bind::Listener(listener) => listener,
        };
        let local_addr = listener.local_addr()?;
        tracing::info!("HTTP server listening on {}", local_addr);

        tokio::pin!(signal);

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(err) => {
                            tracing::warn!(%err, "accept error");
                            if is_resource_exhausted(&err) {
                                tokio::time::sleep(ACCEPT_BACKOFF).await;
                            }
                            continue;
                        }
                    };
                    let svc = handler.clone();

                    // One Tokio task per connection.
                    tokio::spawn(async move {
                        let http = Http::new();
                        if let Err(err) = http.serve_connection(stream, svc).await {
                            tracing::warn!(%peer, %err, "connection error");
                        }
                    });
                }
                _ = &mut signal => {
                    tracing::info!("HTTP server on {} stopped accepting connections", local_addr);
                    break;
                }
            }
        }

        Ok(())
    }
}

// EMFILE / ENFILE / ENOBUFS / ENOMEM: retrying immediately would spin.
fn is_resource_exhausted(err: &std::io::Error) -> bool {
    matches!(err.raw_os_error(), Some(23) | Some(24) | Some(105) | Some(12))
}
