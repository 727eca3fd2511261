#![warn(missing_docs)]

//! TCP server library for XT009/TK102 GPS trackers.
//!
//! Binds a listener, accepts tracker connections, decodes the vendor GPRMC
//! report dialect and surfaces everything as typed [`event::ServerEvent`]s
//! delivered to registered callbacks. No logger is bundled; lifecycle
//! details are emitted through the `log` facade for whichever logger the
//! host application installs.
//!
//! # Example
//! ```no_run
//! use xt009_server::config::ServerConfig;
//! use xt009_server::event::ServerEvent;
//! use xt009_server::TrackerServer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut server = TrackerServer::new(ServerConfig::new().with_port(9000));
//!
//!     server.on_event(|event| {
//!         if let ServerEvent::Track(record) = event {
//!             println!(
//!                 "{} at {}, {}",
//!                 record.imei, record.geo.latitude, record.geo.longitude
//!             );
//!         }
//!     });
//!
//!     server.start_blocking().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod decoder;
pub mod event;
pub mod server;
pub mod types;

pub use config::ServerConfig;
pub use server::error::{ServerError, ServerResult};
pub use server::TrackerServer;
pub use types::TrackRecord;
