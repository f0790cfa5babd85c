//! Wire types and client stub for `profile.v1.ProfileService`.
//!
//! Generated at build time from `proto/profile/v1/profile.proto`.

tonic::include_proto!("profile.v1");

pub use profile_service_client::ProfileServiceClient;
