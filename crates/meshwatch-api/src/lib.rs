// meshwatch-api: Async Rust client for a home mesh-network controller API

pub mod access_points;
pub mod auth;
pub mod cache;
pub mod client;
pub mod devices;
pub mod error;
pub mod models;
pub mod transport;

pub use auth::{StaticTokens, TokenCache, TokenSource};
pub use cache::TtlCache;
pub use client::MeshClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
