//! Per-connection lifecycle handling.

use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use crate::config::ServerConfig;
use crate::decoder::RecordDecoder;
use crate::event::*;

/// Read buffer size for inbound report lines.
const READ_BUFFER: usize = 1024;

/// Drives one accepted socket from accept to close.
///
/// Each socket read is treated as one report: trimmed and offered to the
/// decoder as-is, without line reassembly across reads. Trackers send one
/// short report per write, which keeps delivery and read aligned in
/// practice.
pub struct ConnectionHandler {
    stream: TcpStream,
    info: ConnectionInfo,
    config: ServerConfig,
    decoder: Arc<RecordDecoder>,
    events: Arc<EventBus>,
}
impl ConnectionHandler {
    /// Create a handler for one accepted socket.
    pub fn new(
        stream: TcpStream,
        info: ConnectionInfo,
        config: ServerConfig,
        decoder: Arc<RecordDecoder>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            stream,
            info,
            config,
            decoder,
            events,
        }
    }

    /// Run the connection to completion.
    ///
    /// Publishes `connection` on entry and serves reads until the peer
    /// closes, the idle deadline passes or the transport fails. Always ends
    /// with exactly one `disconnect`, closing the socket on the way out.
    pub async fn run(mut self) {
        self.events.publish(ServerEvent::Connection(self.info));
        log::trace!("Serving connection from {}", self.info.remote);

        // One fixed deadline measured from accept, not reset by traffic.
        let deadline = tokio::time::sleep(self.config.timeout);
        tokio::pin!(deadline);
        let deadline_armed = !self.config.timeout.is_zero();

        let mut buffer = vec![0u8; READ_BUFFER];
        let had_error = loop {
            tokio::select! {
                read = self.stream.read(&mut buffer) => {
                    match read {
                        Ok(0) => break false,
                        Ok(count) => self.handle_data(&buffer[..count]),
                        Err(e) => {
                            self.events.publish(ServerEvent::Error(ServerFault {
                                reason: "Socket error".to_string(),
                                cause: e.to_string(),
                                connection: Some(self.info),
                                settings: self.config.clone(),
                            }));
                            break true;
                        }
                    }
                }

                _ = &mut deadline, if deadline_armed => {
                    self.events.publish(ServerEvent::Timeout(self.info));
                    break false;
                }
            }
        };

        self.events.publish(ServerEvent::Disconnect {
            connection: self.info,
            had_error,
        });
        log::trace!("Closed connection from {}", self.info.remote);
    }

    /// Treat one socket read as one report: announce it, then decode unless
    /// it trims to nothing.
    fn handle_data(&self, bytes: &[u8]) {
        let text = String::from_utf8_lossy(bytes);
        let trimmed = text.trim();

        self.events.publish(ServerEvent::Data(trimmed.to_string()));
        if trimmed.is_empty() {
            return;
        }

        match self.decoder.decode(trimmed) {
            Some(record) => self.events.publish(ServerEvent::Track(record)),
            None => self.events.publish(ServerEvent::Fail(DecodeFailure {
                reason: "Cannot parse GPS data from device".to_string(),
                input: trimmed.to_string(),
                connection: self.info,
            })),
        }
    }
}
