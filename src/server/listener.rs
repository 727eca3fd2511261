//! Main tracker server implementation.

use std::net::SocketAddr;
use std::sync::Arc;
use crate::config::ServerConfig;
use crate::decoder::RecordDecoder;
use crate::event::{EventBus, EventCallback, ServerEvent};
use crate::server::error::*;
use crate::server::worker::{ControlMessage, ListenerLoop};

/// TCP server for GPS tracker reports.
///
/// Construct it, register event callbacks, then start it either in the
/// background or blocking the current task. Everything the server observes
/// is delivered through the callbacks as [`ServerEvent`]s.
pub struct TrackerServer {
    config: ServerConfig,
    decoder: Arc<RecordDecoder>,
    callbacks: Vec<EventCallback>,
    control_tx: Option<tokio::sync::mpsc::UnboundedSender<ControlMessage>>,
    worker_handle: Option<tokio::task::JoinHandle<ServerResult<()>>>,
    local_addr: Arc<tokio::sync::RwLock<Option<SocketAddr>>>,
}
impl TrackerServer {
    /// Create a new server recognizing the stock report dialect.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_decoder(config, RecordDecoder::new())
    }

    /// Create a new server with a custom decoder.
    pub fn with_decoder(config: ServerConfig, decoder: RecordDecoder) -> Self {
        Self {
            config,
            decoder: Arc::new(decoder),
            callbacks: Vec::new(),
            control_tx: None,
            worker_handle: None,
            local_addr: Arc::new(tokio::sync::RwLock::new(None)),
        }
    }

    /// Register an event callback.
    ///
    /// Every published event reaches every callback, in registration order.
    /// Callbacks registered after a start take effect on the next start.
    pub fn on_event<F>(&mut self, callback: F)
    where
        F: Fn(&ServerEvent) + Send + Sync + 'static,
    {
        self.callbacks.push(Arc::new(callback));
    }

    /// Start the listener in the background (spawns a worker task).
    pub async fn start_background(&mut self) -> ServerResult<()> {
        if self.worker_handle.is_some() {
            return Err(ServerError::AlreadyListening);
        }

        let (control_tx, control_rx) = tokio::sync::mpsc::unbounded_channel();
        self.control_tx = Some(control_tx);

        let worker_loop = self.build_worker();
        let worker_handle = tokio::spawn(async move { worker_loop.run(control_rx).await });

        self.worker_handle = Some(worker_handle);
        Ok(())
    }

    /// Start the listener and block until it stops.
    pub async fn start_blocking(&mut self) -> ServerResult<()> {
        let (control_tx, control_rx) = tokio::sync::mpsc::unbounded_channel();
        self.control_tx = Some(control_tx);

        let worker_loop = self.build_worker();

        // Run directly in this task (no spawn)
        worker_loop.run(control_rx).await
    }

    /// Stop the listener and worker. Live connections drain to their
    /// natural close.
    pub async fn stop_background(&mut self) -> ServerResult<()> {
        if let Some(tx) = &self.control_tx {
            let _ = tx.send(ControlMessage::Stop);
        }

        if let Some(handle) = self.worker_handle.take() {
            // Wait for worker to finish with timeout
            let _ = tokio::time::timeout(std::time::Duration::from_secs(5), handle).await;
        }

        self.control_tx = None;
        *self.local_addr.write().await = None;

        Ok(())
    }

    /// Address the server is currently bound to, if listening.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.read().await
    }

    /// Check if the server is currently listening.
    pub async fn is_listening(&self) -> bool {
        self.local_addr.read().await.is_some()
    }

    /// The configuration this server was built with.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Assemble the worker for a start call.
    fn build_worker(&self) -> ListenerLoop {
        ListenerLoop::new(
            self.config.clone(),
            Arc::clone(&self.decoder),
            Arc::new(EventBus::new(self.callbacks.clone())),
            Arc::clone(&self.local_addr),
        )
    }
}
impl Drop for TrackerServer {
    fn drop(&mut self) {
        // Send stop signal to worker if still running.
        if let Some(tx) = &self.control_tx {
            let _ = tx.send(ControlMessage::Stop);
        }
    }
}
impl std::fmt::Debug for TrackerServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerServer")
            .field("config", &self.config)
            .field("subscribers", &self.callbacks.len())
            .field("is_running", &self.worker_handle.is_some())
            .finish()
    }
}
