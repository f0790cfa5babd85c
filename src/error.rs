//! Profile client error types

/// Profile client error types
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    // Construction errors
    #[error("failed to connect to {endpoint}: {source}")]
    Connection {
        endpoint: String,
        #[source]
        source: tonic::transport::Error,
    },

    #[error("configuration error: {0}")]
    Configuration(String),

    // Call errors
    #[error("deadline exceeded: {0}")]
    Timeout(String),

    #[error("profile not found: {0}")]
    NotFound(String),

    #[error("operation cancelled")]
    Cancelled,

    /// Any other status returned by the transport. The status is kept as the
    /// error source so callers can inspect its code and details.
    #[error("transport error: {0}")]
    Transport(#[source] Box<tonic::Status>),

    #[error("client is closed")]
    Closed,
}

impl ProfileError {
    /// Short, stable label for this error, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            ProfileError::Connection { .. } => "connection",
            ProfileError::Configuration(_) => "configuration",
            ProfileError::Timeout(_) => "timeout",
            ProfileError::NotFound(_) => "not_found",
            ProfileError::Cancelled => "cancelled",
            ProfileError::Transport(_) => "transport",
            ProfileError::Closed => "closed",
        }
    }

    /// Whether a later attempt could plausibly succeed.
    ///
    /// The client never retries by itself; this is for callers that do.
    pub fn is_transient(&self) -> bool {
        match self {
            ProfileError::Connection { .. } | ProfileError::Timeout(_) => true,
            ProfileError::Transport(status) => matches!(
                status.code(),
                tonic::Code::Unavailable | tonic::Code::ResourceExhausted | tonic::Code::Aborted
            ),
            _ => false,
        }
    }

    /// The gRPC status behind a [`ProfileError::Transport`] error.
    pub fn status(&self) -> Option<&tonic::Status> {
        match self {
            ProfileError::Transport(status) => Some(status),
            _ => None,
        }
    }
}

impl From<tonic::Status> for ProfileError {
    fn from(status: tonic::Status) -> Self {
        match status.code() {
            tonic::Code::NotFound => ProfileError::NotFound(status.message().to_string()),
            tonic::Code::DeadlineExceeded => ProfileError::Timeout(status.message().to_string()),
            tonic::Code::Cancelled => ProfileError::Cancelled,
            _ => ProfileError::Transport(Box::new(status)),
        }
    }
}

impl From<toml::de::Error> for ProfileError {
    fn from(err: toml::de::Error) -> Self {
        ProfileError::Configuration(format!("invalid config file: {err}"))
    }
}

/// Result type alias for profile client operations
pub type Result<T> = std::result::Result<T, ProfileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_error_kinds() {
        let cases = [
            (tonic::Code::NotFound, "not_found"),
            (tonic::Code::DeadlineExceeded, "timeout"),
            (tonic::Code::Cancelled, "cancelled"),
            (tonic::Code::Unavailable, "transport"),
            (tonic::Code::Internal, "transport"),
            (tonic::Code::PermissionDenied, "transport"),
        ];
        for (code, kind) in cases {
            let err = ProfileError::from(tonic::Status::new(code, "boom"));
            assert_eq!(err.kind(), kind, "code {code:?}");
        }
    }

    #[test]
    fn transport_error_keeps_status() {
        let err = ProfileError::from(tonic::Status::internal("db down"));
        let status = err.status().expect("status");
        assert_eq!(status.code(), tonic::Code::Internal);
        assert_eq!(status.message(), "db down");
        assert!(std::error::Error::source(&err).is_some());
    }
}
