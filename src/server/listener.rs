//! Quiz server listener
//!
//! Handles the TCP accept loop and spawns connection handlers.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::dispatch::EventDispatcher;
use crate::error::Result;
use crate::gateway::ConnectionGateway;
use crate::registry::{RegistryConfig, SessionRegistry};
use crate::server::config::ServerConfig;
use crate::server::connection::Connection;
use crate::stats::{ServerMetrics, ServerStats};

/// Quiz session server
pub struct QuizServer {
    config: ServerConfig,
    registry: Arc<SessionRegistry>,
    gateway: Arc<ConnectionGateway>,
    dispatcher: Arc<EventDispatcher>,
    metrics: Arc<ServerMetrics>,
    next_connection_id: AtomicU64,
    connection_semaphore: Option<Arc<Semaphore>>,
}

impl QuizServer {
    /// Create a new server with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        Self::with_registry_config(config, RegistryConfig::default())
    }

    /// Create a new server with custom registry configuration
    pub fn with_registry_config(config: ServerConfig, registry_config: RegistryConfig) -> Self {
        let connection_semaphore = if config.max_connections > 0 {
            Some(Arc::new(Semaphore::new(config.max_connections)))
        } else {
            None
        };

        let registry = Arc::new(SessionRegistry::with_config(registry_config));
        let gateway = Arc::new(ConnectionGateway::new());
        let dispatcher = Arc::new(EventDispatcher::new(
            Arc::clone(&registry),
            Arc::clone(&gateway),
        ));

        Self {
            config,
            registry,
            gateway,
            dispatcher,
            metrics: Arc::new(ServerMetrics::new()),
            next_connection_id: AtomicU64::new(1),
            connection_semaphore,
        }
    }

    /// Get a reference to the session registry
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Current server statistics
    pub async fn stats(&self) -> ServerStats {
        self.metrics
            .snapshot(self.registry.session_count().await as u64)
    }

    /// Run the server
    ///
    /// This method blocks until the server is shut down.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Quiz server listening");

        self.run_on(listener).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Quiz server listening");

        let sweep_handle = self.registry.spawn_sweep_task();

        let result = tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
            result = self.accept_loop(&listener) => result,
        };

        sweep_handle.abort();

        result
    }

    /// Run the server on an already-bound listener
    ///
    /// Useful for tests and embedders that bind to an ephemeral port first.
    pub async fn run_on(&self, listener: TcpListener) -> Result<()> {
        // Idle sessions are swept for as long as the server runs
        let _sweep_handle = self.registry.spawn_sweep_task();

        self.accept_loop(&listener).await
    }

    async fn accept_loop(&self, listener: &TcpListener) -> Result<()> {
        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    self.handle_connection(socket, peer_addr);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    fn handle_connection(&self, socket: TcpStream, peer_addr: SocketAddr) {
        // Check connection limit; the permit travels with the task so the
        // slot stays taken for the connection's lifetime
        let permit = if let Some(ref sem) = self.connection_semaphore {
            match sem.clone().try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    tracing::warn!(peer = %peer_addr, "Connection rejected: limit reached");
                    return;
                }
            }
        } else {
            None
        };

        let connection_id = self.next_connection_id.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(connection_id, peer = %peer_addr, "New connection");

        if self.config.tcp_nodelay {
            if let Err(e) = socket.set_nodelay(true) {
                tracing::error!(error = %e, "Failed to configure socket");
                return;
            }
        }

        self.metrics.connection_opened();

        let config = self.config.clone();
        let gateway = Arc::clone(&self.gateway);
        let dispatcher = Arc::clone(&self.dispatcher);
        let metrics = Arc::clone(&self.metrics);

        tokio::spawn(async move {
            let _permit = permit;
            let mut connection =
                Connection::new(connection_id, peer_addr, config, gateway, dispatcher);

            if let Err(e) = connection.run(socket).await {
                tracing::debug!(connection_id, error = %e, "Connection error");
            }

            metrics.connection_closed();
            tracing::debug!(connection_id, "Connection closed");
        });
    }

    /// Get the bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }
}
