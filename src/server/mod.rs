//! TCP listener serving tracker connections.

pub mod error;

mod connection;
mod listener;
mod worker;

pub use listener::TrackerServer;
