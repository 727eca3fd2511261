//! Listener accept loop and control handling.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use crate::config::ServerConfig;
use crate::decoder::RecordDecoder;
use crate::event::*;
use crate::server::connection::ConnectionHandler;
use crate::server::error::*;

/// Control messages for the listener loop
pub enum ControlMessage {
    Stop,
}

/// Accept loop: binds the configured address, enforces the concurrency
/// ceiling and spawns one connection task per accepted socket.
pub struct ListenerLoop {
    config: ServerConfig,
    decoder: Arc<RecordDecoder>,
    events: Arc<EventBus>,
    local_addr: Arc<tokio::sync::RwLock<Option<SocketAddr>>>,
}
impl ListenerLoop {
    /// Create a new listener loop.
    pub fn new(
        config: ServerConfig,
        decoder: Arc<RecordDecoder>,
        events: Arc<EventBus>,
        local_addr: Arc<tokio::sync::RwLock<Option<SocketAddr>>>,
    ) -> Self {
        Self {
            config,
            decoder,
            events,
            local_addr,
        }
    }

    /// Bind and serve until a stop message arrives.
    ///
    /// A bind failure is published as a normalized `error` event and also
    /// returned. Accept failures are published and the loop keeps serving.
    pub async fn run(
        self,
        mut control_rx: tokio::sync::mpsc::UnboundedReceiver<ControlMessage>,
    ) -> ServerResult<()> {
        let listener = match TcpListener::bind(self.config.bind_addr()).await {
            Ok(listener) => listener,
            Err(e) => {
                self.publish_bind_failure(&e);
                return Err(ServerError::Bind(e));
            }
        };
        let bound = match listener.local_addr() {
            Ok(bound) => bound,
            Err(e) => {
                self.publish_bind_failure(&e);
                return Err(ServerError::Bind(e));
            }
        };

        *self.local_addr.write().await = Some(bound);
        self.events.publish(ServerEvent::Listening(bound));
        log::debug!("Listening on {}", bound);

        // Slots are claimed before accepting, so excess connections wait in
        // the OS accept queue instead of reaching the application. Ceilings
        // beyond the permit bound would panic the constructor, so clamp.
        let permits = self.config.connections.min(Semaphore::MAX_PERMITS);
        let slots = Arc::new(Semaphore::new(permits));
        loop {
            let permit = tokio::select! {
                permit = Arc::clone(&slots).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
                Some(ControlMessage::Stop) = control_rx.recv() => {
                    log::debug!("Listener stopped while waiting for a free slot.");
                    break;
                }
            };

            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote)) => {
                        let handler = ConnectionHandler::new(
                            stream,
                            ConnectionInfo { local: bound, remote },
                            self.config.clone(),
                            Arc::clone(&self.decoder),
                            Arc::clone(&self.events),
                        );

                        tokio::spawn(async move {
                            let _permit = permit;
                            handler.run().await;
                        });
                    }
                    Err(e) => {
                        self.events.publish(ServerEvent::Error(ServerFault {
                            reason: "Server error".to_string(),
                            cause: e.to_string(),
                            connection: None,
                            settings: self.config.clone(),
                        }));
                    }
                },

                Some(ControlMessage::Stop) = control_rx.recv() => {
                    log::trace!("Received stop signal");
                    break;
                }
            }
        }

        *self.local_addr.write().await = None;
        log::debug!("Listener terminated");
        Ok(())
    }

    /// Publish a normalized bind failure.
    fn publish_bind_failure(&self, error: &std::io::Error) {
        self.events.publish(ServerEvent::Error(ServerFault {
            reason: bind_failure_reason(error).to_string(),
            cause: error.to_string(),
            connection: None,
            settings: self.config.clone(),
        }));
    }
}

/// Normalized reason string for a failed bind.
fn bind_failure_reason(error: &std::io::Error) -> &'static str {
    match error.kind() {
        std::io::ErrorKind::AddrInUse | std::io::ErrorKind::AddrNotAvailable => {
            "IP or port not available"
        }
        _ => "Server error",
    }
}
