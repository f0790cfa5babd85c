//! Dialing the profile service.
//!
//! Builds a tonic [`Endpoint`] from [`ClientConfig`] and opens the single
//! long-lived [`Channel`] a client owns. There is no retry here: a failed
//! dial is reported to the caller as [`ProfileError::Connection`].
//!
//! tonic resolves no gRPC service config, so there is no service-config
//! negotiation to disable.

use std::time::Duration;

use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tracing::Instrument;

use super::config::ClientConfig;
use crate::telemetry::duration_to_u64_ms;
use crate::{Context, ProfileError, Result};

const TCP_KEEPALIVE: Duration = Duration::from_secs(30);
const HTTP2_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);
const KEEPALIVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Build a tonic `Endpoint` with timeouts, keepalive and TLS settings.
///
/// Configures:
/// - Connect timeout
/// - TCP keepalive (30 seconds)
/// - HTTP/2 keepalive interval (30 seconds), keepalive timeout (10 seconds),
///   kept alive while idle
/// - Optional user agent
/// - TLS with webpki roots for `https` endpoints
pub(crate) fn build_endpoint(cfg: &ClientConfig) -> Result<Endpoint> {
    let invalid = |e: tonic::transport::Error| {
        ProfileError::Configuration(format!("invalid endpoint {}: {e}", cfg.endpoint))
    };

    let mut endpoint = Endpoint::from_shared(cfg.endpoint.clone())
        .map_err(invalid)?
        .connect_timeout(cfg.connect_timeout)
        .tcp_keepalive(Some(TCP_KEEPALIVE))
        .http2_keep_alive_interval(HTTP2_KEEPALIVE_INTERVAL)
        .keep_alive_timeout(KEEPALIVE_TIMEOUT)
        .keep_alive_while_idle(true);

    if let Some(agent) = &cfg.user_agent {
        endpoint = endpoint.user_agent(agent.as_str()).map_err(invalid)?;
    }

    if endpoint.uri().scheme_str() == Some("https") {
        endpoint = endpoint
            .tls_config(ClientTlsConfig::new().with_webpki_roots())
            .map_err(invalid)?;
    }

    Ok(endpoint)
}

/// Open the channel described by `cfg`.
///
/// Eager dials honour `ctx`: cancellation or expiry while connecting
/// abandons the attempt. Lazy dials return immediately and connect on the
/// first call.
pub(crate) async fn dial(ctx: &Context, cfg: &ClientConfig) -> Result<Channel> {
    let span = tracing::debug_span!(
        "profile_connect",
        endpoint = %cfg.endpoint,
        lazy = cfg.lazy
    );

    async move {
        let endpoint = build_endpoint(cfg)?;

        if cfg.lazy {
            tracing::debug!("deferring connection until first call");
            return Ok(endpoint.connect_lazy());
        }

        let deadline = ctx.deadline();
        let connect = endpoint.connect();
        let result = tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(ProfileError::Cancelled),
            _ = sleep_until_deadline(deadline) => {
                Err(ProfileError::Timeout(format!("connecting to {}", cfg.endpoint)))
            }
            result = connect => result.map_err(|source| ProfileError::Connection {
                endpoint: cfg.endpoint.clone(),
                source,
            }),
        };

        match &result {
            Ok(_) => tracing::info!(
                connect_timeout_ms = duration_to_u64_ms(cfg.connect_timeout),
                "profile client connected"
            ),
            Err(e) => tracing::error!(error = %e, "profile client failed to connect"),
        }
        result
    }
    .instrument(span)
    .await
}

/// Sleep until `deadline`, or forever without one.
pub(crate) async fn sleep_until_deadline(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
