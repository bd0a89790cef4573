pub mod client;
pub mod models;

pub use client::{ChatClient, ChatTransport, TransportError, FALLBACK_REPLY};
pub use models::HealthStatus;
