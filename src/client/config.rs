//! Client configuration.
//!
//! [`ClientConfig::default()`] carries the documented defaults; builder
//! methods override them. Configuration can also be read from a TOML file,
//! where any field left out keeps its default:
//!
//! ```toml
//! endpoint = "http://127.0.0.1:7005"
//! connect_timeout_secs = 5
//! read_timeout_secs = 15
//! create_timeout_secs = 30
//! lazy = false
//!
//! [client_info]
//! app = "billing"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::{ProfileError, Result};

/// Endpoint used when the caller does not supply one.
pub const DEFAULT_ENDPOINT: &str = "https://profile.api.antinvestor.com:443";

/// Default deadline for `get_profile_by_id` and `get_profile_by_contact`.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(15);

/// Default deadline for `create_profile_by_contact_and_name`.
pub const DEFAULT_CREATE_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for establishing the connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Largest inbound message accepted by default (`i32::MAX` bytes), so large
/// profiles are never truncated.
pub const DEFAULT_MAX_DECODING_MESSAGE_SIZE: usize = i32::MAX as usize;

/// Configuration for a [`ProfileClient`](crate::ProfileClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service address, e.g. `https://profile.example.com:443`.
    pub endpoint: String,
    /// Timeout for establishing the connection.
    pub connect_timeout: Duration,
    /// Deadline applied to lookups.
    pub read_timeout: Duration,
    /// Deadline applied to profile creation.
    pub create_timeout: Duration,
    /// Maximum size of a decoded response message.
    pub max_decoding_message_size: usize,
    /// Maximum size of an encoded request message (tonic's default when unset).
    pub max_encoding_message_size: Option<usize>,
    /// Defer connecting until the first call instead of dialing eagerly.
    pub lazy: bool,
    /// Custom `user-agent` sent on the connection.
    pub user_agent: Option<String>,
    /// Bearer token sent as `authorization` metadata on every call.
    pub bearer_token: Option<String>,
    /// Extra `key/value` pairs appended to the client identification header.
    pub client_info: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            create_timeout: DEFAULT_CREATE_TIMEOUT,
            max_decoding_message_size: DEFAULT_MAX_DECODING_MESSAGE_SIZE,
            max_encoding_message_size: None,
            lazy: false,
            user_agent: None,
            bearer_token: None,
            client_info: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// Defaults with a different endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Set the service endpoint.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the deadline for lookups.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the deadline for profile creation.
    pub fn create_timeout(mut self, timeout: Duration) -> Self {
        self.create_timeout = timeout;
        self
    }

    /// Limit the size of decoded responses.
    pub fn max_decoding_message_size(mut self, limit: usize) -> Self {
        self.max_decoding_message_size = limit;
        self
    }

    /// Limit the size of encoded requests.
    pub fn max_encoding_message_size(mut self, limit: usize) -> Self {
        self.max_encoding_message_size = Some(limit);
        self
    }

    /// Connect on first use rather than during construction.
    pub fn lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    /// Set the `user-agent` sent on the connection.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Authenticate every call with a bearer token.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Append a `key/value` pair to the client identification header.
    pub fn client_info(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.client_info.push((key.into(), value.into()));
        self
    }

    /// Parse a TOML document, applying it over the defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: FileConfig = toml::from_str(content)?;
        Ok(file.apply(Self::default()))
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ProfileError::Configuration(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }
}

/// On-disk representation; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    endpoint: Option<String>,
    connect_timeout_secs: Option<u64>,
    read_timeout_secs: Option<u64>,
    create_timeout_secs: Option<u64>,
    max_decoding_message_size: Option<usize>,
    max_encoding_message_size: Option<usize>,
    lazy: Option<bool>,
    user_agent: Option<String>,
    bearer_token: Option<String>,
    #[serde(default)]
    client_info: BTreeMap<String, String>,
}

impl FileConfig {
    fn apply(self, mut config: ClientConfig) -> ClientConfig {
        if let Some(endpoint) = self.endpoint {
            config.endpoint = endpoint;
        }
        if let Some(secs) = self.connect_timeout_secs {
            config.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.read_timeout_secs {
            config.read_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.create_timeout_secs {
            config.create_timeout = Duration::from_secs(secs);
        }
        if let Some(limit) = self.max_decoding_message_size {
            config.max_decoding_message_size = limit;
        }
        config.max_encoding_message_size =
            self.max_encoding_message_size.or(config.max_encoding_message_size);
        if let Some(lazy) = self.lazy {
            config.lazy = lazy;
        }
        config.user_agent = self.user_agent.or(config.user_agent);
        config.bearer_token = self.bearer_token.or(config.bearer_token);
        config.client_info.extend(self.client_info);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cfg.read_timeout, Duration::from_secs(15));
        assert_eq!(cfg.create_timeout, Duration::from_secs(30));
        assert_eq!(cfg.connect_timeout, Duration::from_secs(10));
        assert_eq!(cfg.max_decoding_message_size, 2_147_483_647);
        assert!(cfg.max_encoding_message_size.is_none());
        assert!(!cfg.lazy);
        assert!(cfg.client_info.is_empty());
    }

    #[test]
    fn builder_overrides_defaults() {
        let cfg = ClientConfig::new("http://127.0.0.1:7005")
            .read_timeout(Duration::from_secs(2))
            .create_timeout(Duration::from_secs(4))
            .max_decoding_message_size(1024)
            .lazy(true)
            .bearer_token("secret")
            .client_info("app", "billing")
            .client_info("env", "test");

        assert_eq!(cfg.endpoint, "http://127.0.0.1:7005");
        assert_eq!(cfg.read_timeout, Duration::from_secs(2));
        assert_eq!(cfg.create_timeout, Duration::from_secs(4));
        assert_eq!(cfg.max_decoding_message_size, 1024);
        assert!(cfg.lazy);
        assert_eq!(cfg.bearer_token.as_deref(), Some("secret"));
        assert_eq!(
            cfg.client_info,
            vec![
                ("app".to_string(), "billing".to_string()),
                ("env".to_string(), "test".to_string())
            ]
        );
    }

    #[test]
    fn empty_toml_keeps_defaults() {
        let cfg = ClientConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cfg.read_timeout, DEFAULT_READ_TIMEOUT);
    }

    #[test]
    fn toml_fields_apply() {
        let cfg = ClientConfig::from_toml_str(
            r#"
            endpoint = "http://localhost:7005"
            read_timeout_secs = 3
            create_timeout_secs = 6
            max_encoding_message_size = 4096
            lazy = true

            [client_info]
            app = "billing"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.endpoint, "http://localhost:7005");
        assert_eq!(cfg.read_timeout, Duration::from_secs(3));
        assert_eq!(cfg.create_timeout, Duration::from_secs(6));
        assert_eq!(cfg.max_encoding_message_size, Some(4096));
        assert!(cfg.lazy);
        assert_eq!(
            cfg.client_info,
            vec![("app".to_string(), "billing".to_string())]
        );
    }

    #[test]
    fn unknown_toml_keys_are_rejected() {
        let err = ClientConfig::from_toml_str("endpont = \"typo\"").unwrap_err();
        assert!(matches!(err, ProfileError::Configuration(_)));
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let err = ClientConfig::load(Path::new("/nonexistent/profile-client.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
