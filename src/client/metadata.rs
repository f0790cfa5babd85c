//! Outbound client identification header.
//!
//! Every call carries one `x-ai-api-client` header whose value lists the
//! client language, library version and transport version as `key/value`
//! tokens, followed by any caller-supplied pairs:
//!
//! ```text
//! gl-rust/1.93.0 profile/0.1.0 grpc/0.13 app/billing
//! ```

use tonic::metadata::{AsciiMetadataValue, MetadataMap};

use crate::version::{PKG_VERSION, RUSTC_SEMVER, TRANSPORT_VERSION};
use crate::{ProfileError, Result};

/// Metadata key the identification header is sent under.
pub const CLIENT_HEADER_KEY: &str = "x-ai-api-client";

/// Identification header computed once per client.
#[derive(Debug, Clone)]
pub struct ClientHeader {
    text: String,
    value: AsciiMetadataValue,
}

impl ClientHeader {
    /// Build the header from the static version tags plus `extra` pairs, in order.
    ///
    /// Keys and values must be non-empty printable ASCII without spaces or
    /// `/`, so that distinct pair lists never render to the same header.
    pub fn compute<K, V>(extra: &[(K, V)]) -> Result<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let fixed = [
            ("gl-rust", RUSTC_SEMVER),
            ("profile", PKG_VERSION),
            ("grpc", TRANSPORT_VERSION),
        ];
        let pairs: Vec<(&str, &str)> = fixed
            .iter()
            .map(|(k, v)| (*k, *v))
            .chain(extra.iter().map(|(k, v)| (k.as_ref(), v.as_ref())))
            .collect();
        for (key, value) in &pairs {
            if !is_token(key) || !is_token(value) {
                return Err(ProfileError::Configuration(format!(
                    "invalid client info pair {key:?}/{value:?}: \
                     expected printable ASCII without spaces or '/'"
                )));
            }
        }

        let text = pairs
            .iter()
            .map(|(k, v)| format!("{k}/{v}"))
            .collect::<Vec<_>>()
            .join(" ");
        let value = ascii_value(&text)?;
        Ok(Self { text, value })
    }

    pub fn key(&self) -> &'static str {
        CLIENT_HEADER_KEY
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Attach the header to outgoing metadata, replacing any previous value.
    pub(crate) fn apply(&self, metadata: &mut MetadataMap) {
        metadata.insert(CLIENT_HEADER_KEY, self.value.clone());
    }
}

impl PartialEq for ClientHeader {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for ClientHeader {}

fn is_token(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_graphic() && b != b'/')
}

/// Convert `text` to a metadata value, accepting printable ASCII and spaces only.
///
/// `AsciiMetadataValue` itself lets bytes above 0x7f and tabs through.
pub(crate) fn ascii_value(text: &str) -> Result<AsciiMetadataValue> {
    if !text.bytes().all(|b| b == b' ' || b.is_ascii_graphic()) {
        return Err(ProfileError::Configuration(format!(
            "metadata value {text:?} is not printable ASCII"
        )));
    }
    AsciiMetadataValue::try_from(text)
        .map_err(|e| ProfileError::Configuration(format!("invalid metadata value {text:?}: {e}")))
}
