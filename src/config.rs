//! Tracker server configuration.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Listener configuration.
///
/// Defaults follow tracker-fleet conventions: bind every interface on an
/// OS-assigned port, serve up to 10 devices at once and close a connection
/// that stays silent for 10 seconds. The configuration is read once at
/// start; changing it afterwards has no effect on a running listener.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {

    /// Address to bind.
    pub ip: IpAddr,

    /// Port to bind. Zero asks the OS for an ephemeral port; the effective
    /// port is carried by the `listening` event.
    pub port: u16,

    /// Maximum simultaneously served connections. Further connections wait
    /// in the accept queue until a slot frees. Values beyond the runtime's
    /// permit bound are clamped to it.
    pub connections: usize,

    /// Per-connection idle deadline, armed once at accept time and not
    /// extended by traffic. Zero disables it.
    pub timeout: Duration,
}
impl ServerConfig {
    /// Create a configuration with default settings. Overriding a field
    /// leaves the other defaults in place.
    ///
    /// # Example
    /// ```
    /// use xt009_server::config::ServerConfig;
    ///
    /// let config = ServerConfig::new().with_port(1337);
    ///
    /// assert_eq!(config.port, 1337);
    /// assert_eq!(config.connections, 10);
    /// assert_eq!(config.timeout.as_secs(), 10);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind address.
    pub fn with_ip(mut self, ip: IpAddr) -> Self {
        self.ip = ip;
        self
    }

    /// Set the bind port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the maximum number of simultaneous connections.
    pub fn with_connections(mut self, connections: usize) -> Self {
        self.connections = connections;
        self
    }

    /// Set the idle deadline. `Duration::ZERO` disables it.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The socket address this configuration binds.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }
}
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 0,
            connections: 10,
            timeout: Duration::from_secs(10),
        }
    }
}
