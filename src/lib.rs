//! profile-client - gRPC client for the profile service
//!
//! Retrieve and create profile records over one long-lived connection, with
//! per-call deadlines, cancellation through a request [`Context`], and a
//! client identification header on every call.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use profile_client::{ClientConfig, Context, ProfileClient, ProfileError};
//!
//! #[tokio::main]
//! async fn main() -> profile_client::Result<()> {
//!     let ctx = Context::background();
//!     let client = Arc::new(
//!         ProfileClient::connect(&ctx, ClientConfig::new("http://127.0.0.1:7005")).await?,
//!     );
//!
//!     let created = client
//!         .create_profile_by_contact_and_name(&ctx, "alice@example.com", "Alice")
//!         .await?;
//!     println!("created {}", created.id);
//!
//!     // Nested layers can pick the client up from the context.
//!     let ctx = profile_client::to_context(&ctx, &client);
//!     if let Some(client) = profile_client::from_context(&ctx) {
//!         match client.get_profile_by_contact(&ctx, "bob@example.com").await {
//!             Ok(profile) => println!("found {}", profile.id),
//!             Err(ProfileError::NotFound(_)) => println!("no profile"),
//!             Err(e) => return Err(e),
//!         }
//!     }
//!
//!     client.close();
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod context;
pub mod error;
pub mod proto;
pub mod telemetry;
pub mod version;

// Re-export main types at crate root
pub use client::{
    ClientConfig, ClientHeader, GrpcTransport, ProfileClient, ProfileTransport, from_context,
    to_context,
};
pub use context::Context;
pub use error::{ProfileError, Result};
pub use proto::{ContactObject, ContactType, ProfileObject, ProfileType};
pub use version::{PKG_VERSION, version_string};
