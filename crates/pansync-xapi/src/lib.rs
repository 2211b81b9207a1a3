// pansync-xapi: Async Rust client for the PAN-OS XML configuration API

pub mod client;
pub mod envelope;
pub mod error;
pub mod transport;

pub use client::{Credentials, XapiClient};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
