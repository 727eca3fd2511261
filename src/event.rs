//! Typed event surface.
//!
//! Everything observable about the server funnels through an [`EventBus`]
//! built at start time from the registered callbacks. The subscriber list is
//! fixed once the server is running, so publishing needs no locking; every
//! event is additionally mirrored to the `log` facade.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use crate::config::ServerConfig;
use crate::types::TrackRecord;

/// Events published by the server.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", content = "data")]
pub enum ServerEvent {

    /// The listener bound and is accepting connections. Carries the
    /// effective address, including an OS-assigned port when the configured
    /// port was zero.
    #[serde(rename = "listening")]
    Listening(SocketAddr),

    /// A tracker connected.
    #[serde(rename = "connection")]
    Connection(ConnectionInfo),

    /// Raw payload received from a tracker, trimmed. Published for every
    /// delivery, including ones that later fail to decode.
    #[serde(rename = "data")]
    Data(String),

    /// A report decoded successfully.
    #[serde(rename = "track")]
    Track(TrackRecord),

    /// A non-empty payload no layout recognized.
    #[serde(rename = "fail")]
    Fail(DecodeFailure),

    /// A connection sat idle past its configured deadline and was closed.
    #[serde(rename = "timeout")]
    Timeout(ConnectionInfo),

    /// A connection closed.
    #[serde(rename = "disconnect")]
    Disconnect {

        /// The connection that closed.
        connection: ConnectionInfo,

        /// Whether the close followed a transport error.
        had_error: bool
    },

    /// A transport-level failure on the listener or one of its connections.
    #[serde(rename = "error")]
    Error(ServerFault)
}
impl ServerEvent {
    /// The wire name of this event, equal to its serialized `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Listening(_) => "listening",
            Self::Connection(_) => "connection",
            Self::Data(_) => "data",
            Self::Track(_) => "track",
            Self::Fail(_) => "fail",
            Self::Timeout(_) => "timeout",
            Self::Disconnect { .. } => "disconnect",
            Self::Error(_) => "error",
        }
    }
}

/// Addressing details for one accepted connection.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionInfo {

    /// Address the listener is bound to.
    pub local: SocketAddr,

    /// Remote peer address.
    pub remote: SocketAddr
}

/// Details attached to a payload that no layout recognized.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DecodeFailure {

    /// Failure description.
    pub reason: String,

    /// The offending payload, trimmed as received.
    pub input: String,

    /// The connection that delivered it.
    pub connection: ConnectionInfo
}

/// A transport-level failure report.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServerFault {

    /// Normalized human-readable reason.
    pub reason: String,

    /// Low-level cause as reported by the transport.
    pub cause: String,

    /// The connection the fault belongs to, absent for listener-level
    /// faults.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<ConnectionInfo>,

    /// The configuration the server was running with.
    pub settings: ServerConfig
}

/// A callback run for every published server event.
pub type EventCallback = std::sync::Arc<dyn Fn(&ServerEvent) + Send + Sync>;

/// Fan-out publisher for [`ServerEvent`]s.
pub struct EventBus {
    subscribers: Vec<EventCallback>,
}
impl EventBus {
    /// Build a bus over a fixed subscriber list.
    pub fn new(subscribers: Vec<EventCallback>) -> Self {
        Self { subscribers }
    }

    /// Publish one event to every subscriber in registration order.
    ///
    /// The event is mirrored to the `log` facade first: faults at error
    /// level, decode failures at warn, everything else at debug.
    pub fn publish(&self, event: ServerEvent) {
        match &event {
            ServerEvent::Error(fault) => log::error!("{}: {}", fault.reason, fault.cause),
            ServerEvent::Fail(failure) => log::warn!("{}: {:?}", failure.reason, failure.input),
            other => log::debug!("{} event", other.name()),
        }

        for subscriber in &self.subscribers {
            subscriber(&event);
        }
    }
}
impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn local_info() -> ConnectionInfo {
        ConnectionInfo {
            local: "127.0.0.1:9000".parse().unwrap(),
            remote: "127.0.0.1:40001".parse().unwrap(),
        }
    }

    #[test]
    fn events_serialize_under_their_wire_names() {
        let event = ServerEvent::Data("hello".to_string());
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["type"], "data");
        assert_eq!(value["data"], "hello");
        assert_eq!(value["type"], event.name());
    }

    #[test]
    fn disconnect_carries_the_error_flag() {
        let event = ServerEvent::Disconnect {
            connection: local_info(),
            had_error: true,
        };
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["type"], "disconnect");
        assert_eq!(value["data"]["had_error"], true);
    }

    #[test]
    fn listener_faults_omit_the_connection_member() {
        let fault = ServerFault {
            reason: "Server error".to_string(),
            cause: "broken".to_string(),
            connection: None,
            settings: ServerConfig::default(),
        };
        let value = serde_json::to_value(&ServerEvent::Error(fault)).unwrap();

        assert_eq!(value["type"], "error");
        assert!(!value["data"].as_object().unwrap().contains_key("connection"));
    }

    #[test]
    fn publish_fans_out_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));

        let mut subscribers: Vec<EventCallback> = Vec::new();
        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            subscribers.push(Arc::new(move |event: &ServerEvent| {
                seen.lock().unwrap().push(format!("{tag}:{}", event.name()));
            }));
        }

        let bus = EventBus::new(subscribers);
        bus.publish(ServerEvent::Data("x".to_string()));
        bus.publish(ServerEvent::Timeout(local_info()));

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec!["first:data", "second:data", "first:timeout", "second:timeout"]
        );
    }
}
