//! Client library for the profile service.
//!
//! Provides [`ProfileClient`], which owns one gRPC connection and exposes the
//! service's lookup and create operations, plus the helpers to configure it
//! and pass it through a [`Context`](crate::Context).

pub mod config;
mod connection;
pub mod metadata;
mod profile_client;
mod propagation;
pub mod transport;

pub use config::ClientConfig;
pub use metadata::{CLIENT_HEADER_KEY, ClientHeader};
pub use profile_client::ProfileClient;
pub use propagation::{from_context, to_context};
pub use transport::{GrpcTransport, ProfileTransport};
