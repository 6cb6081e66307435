//! MockProviderServer - one listener bound for the life of a session.

use super::handler::handle_request;
use crate::error::SessionError;
use crate::service::MockService;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Pause after a failed `accept` so a persistent error (e.g. EMFILE) does not spin
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

pub struct MockProviderServer {
    addr: SocketAddr,
    shutdown_tx: broadcast::Sender<()>,
    /// Owns the `TcpListener`; the port is free once this task has ended
    accept_task: Option<JoinHandle<()>>,
}

impl MockProviderServer {
    /// Bind `host:port` and start serving `service` on a background task.
    /// Port 0 binds an OS-assigned port; `local_addr` reports the real one.
    pub async fn start(
        host: &str,
        port: u16,
        service: Arc<MockService>,
    ) -> Result<Self, SessionError> {
        let listener = TcpListener::bind((host, port))
            .await
            .map_err(|e| SessionError::Bind(format!("{host}:{port}"), e.to_string()))?;
        let addr = listener
            .local_addr()
            .map_err(|e| SessionError::Bind(format!("{host}:{port}"), e.to_string()))?;

        info!("Mock provider bound to {}", addr);

        let (shutdown_tx, _) = broadcast::channel(1);
        let mut shutdown_rx = shutdown_tx.subscribe();

        let accept_task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, peer)) => {
                                let service = Arc::clone(&service);
                                tokio::spawn(async move {
                                    let io = TokioIo::new(stream);
                                    let svc = service_fn(move |req| {
                                        let service = Arc::clone(&service);
                                        async move { handle_request(req, service).await }
                                    });
                                    if let Err(e) = http1::Builder::new()
                                        .serve_connection(io, svc)
                                        .await
                                    {
                                        debug!("Connection error from {}: {}", peer, e);
                                    }
                                });
                            }
                            Err(e) => {
                                error!("Accept error on {}: {}", addr, e);
                                tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                            }
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        info!("Mock provider on {} shutting down", addr);
                        break;
                    }
                }
            }
        });

        Ok(Self {
            addr,
            shutdown_tx,
            accept_task: Some(accept_task),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Signal the accept loop to stop without waiting for it.
    /// In-flight connections finish on their own.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Stop accepting connections and wait until the listener is closed,
    /// so the port can be bound again as soon as this returns.
    pub async fn stop(&mut self) {
        self.shutdown();
        if let Some(task) = self.accept_task.take() {
            if let Err(e) = task.await {
                error!("Accept loop on {} ended abnormally: {}", self.addr, e);
            }
        }
    }
}

impl Drop for MockProviderServer {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(task) = self.accept_task.take() {
            task.abort();
        }
    }
}
