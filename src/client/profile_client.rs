//! [`ProfileClient`]: the profile service operations over one shared connection.
//!
//! Every operation derives a per-call deadline from the caller's [`Context`]
//! (the tighter of the caller's deadline and the operation's timeout),
//! attaches the client identification header, and issues exactly one RPC.
//! Cancelling or expiring the caller's context abandons the call promptly.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::Instant;
use tonic::Request;
use tonic::metadata::AsciiMetadataValue;
use tracing::{debug, info, instrument, warn};

use super::config::ClientConfig;
use super::connection::{dial, sleep_until_deadline};
use super::metadata::{ClientHeader, ascii_value};
use super::transport::{GrpcTransport, ProfileTransport};
use crate::proto::{
    ProfileContactRequest, ProfileCreateRequest, ProfileIdRequest, ProfileObject, ProfileType,
};
use crate::{Context, ProfileError, Result, telemetry};

/// Client for the profile service.
///
/// Methods other than [`close`](Self::close) may be called concurrently from
/// any number of tasks. Share it behind an [`Arc`]; see
/// [`to_context`](crate::to_context) for handing it down a call chain.
pub struct ProfileClient {
    transport: Arc<dyn ProfileTransport>,
    header: ClientHeader,
    authorization: Option<AsciiMetadataValue>,
    read_timeout: Duration,
    create_timeout: Duration,
    closed: AtomicBool,
}

/// One outbound call, before metadata is attached.
enum Call {
    GetById(ProfileIdRequest),
    GetByContact(ProfileContactRequest),
    Create(ProfileCreateRequest),
}

impl Call {
    fn operation(&self) -> &'static str {
        match self {
            Call::GetById(_) => "get_by_id",
            Call::GetByContact(_) => "get_by_contact",
            Call::Create(_) => "create",
        }
    }
}

impl ProfileClient {
    /// Dial the configured endpoint and build a client.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let ctx = Context::background();
    /// let client = ProfileClient::connect(&ctx, ClientConfig::new("http://127.0.0.1:7005")).await?;
    /// let profile = client.get_profile_by_id(&ctx, "c2f4j7au6s7f91uqnokg").await?;
    /// client.close();
    /// ```
    pub async fn connect(ctx: &Context, config: ClientConfig) -> Result<Self> {
        let channel = dial(ctx, &config).await?;
        let transport = GrpcTransport::new(channel, &config);
        Self::with_transport(Arc::new(transport), &config)
    }

    /// Build a client over an already established transport.
    ///
    /// Only the timeouts, bearer token and client info of `config` apply;
    /// dial settings belong to whoever built `transport`.
    pub fn with_transport(
        transport: Arc<dyn ProfileTransport>,
        config: &ClientConfig,
    ) -> Result<Self> {
        let header = ClientHeader::compute(&config.client_info)?;
        let authorization = config
            .bearer_token
            .as_deref()
            .map(|token| ascii_value(&format!("Bearer {token}")))
            .transpose()
            .map_err(|_| {
                ProfileError::Configuration("bearer token is not valid ASCII metadata".into())
            })?;

        Ok(Self {
            transport,
            header,
            authorization,
            read_timeout: config.read_timeout,
            create_timeout: config.create_timeout,
            closed: AtomicBool::new(false),
        })
    }

    /// The identification header sent with every call.
    pub fn header(&self) -> &ClientHeader {
        &self.header
    }

    /// Release the connection. Later calls fail with [`ProfileError::Closed`].
    ///
    /// Calling it again is a no-op. Calls still in flight when the client is
    /// closed may fail or complete; avoid closing a client that is in use.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.transport.close();
        info!("profile client closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Fetch a profile by its identifier.
    #[instrument(skip(self, ctx, profile_id), fields(operation = "get_by_id"))]
    pub async fn get_profile_by_id(
        &self,
        ctx: &Context,
        profile_id: &str,
    ) -> Result<ProfileObject> {
        let call = Call::GetById(ProfileIdRequest {
            id: profile_id.to_string(),
        });
        self.invoke(ctx, call, self.read_timeout).await
    }

    /// Fetch the profile that owns a contact (phone number, email, ...).
    #[instrument(skip(self, ctx, contact), fields(operation = "get_by_contact"))]
    pub async fn get_profile_by_contact(
        &self,
        ctx: &Context,
        contact: &str,
    ) -> Result<ProfileObject> {
        let call = Call::GetByContact(ProfileContactRequest {
            contact: contact.to_string(),
        });
        self.invoke(ctx, call, self.read_timeout).await
    }

    /// Create a person profile for `contact` named `name`.
    ///
    /// Whether an existing profile for the contact is returned or rejected is
    /// up to the service; its answer is passed through unchanged.
    #[instrument(skip(self, ctx, contact, name), fields(operation = "create"))]
    pub async fn create_profile_by_contact_and_name(
        &self,
        ctx: &Context,
        contact: &str,
        name: &str,
    ) -> Result<ProfileObject> {
        let properties = HashMap::from([("name".to_string(), name.to_string())]);
        let call = Call::Create(ProfileCreateRequest {
            r#type: ProfileType::Person as i32,
            contact: contact.to_string(),
            properties,
        });
        self.invoke(ctx, call, self.create_timeout).await
    }

    async fn invoke(&self, ctx: &Context, call: Call, timeout: Duration) -> Result<ProfileObject> {
        let operation = call.operation();
        let started = Instant::now();
        let result = self.run(ctx, call, timeout).await;

        let status = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        metrics::counter!(telemetry::REQUESTS_TOTAL, "operation" => operation, "status" => status)
            .increment(1);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS, "operation" => operation)
            .record(started.elapsed().as_secs_f64());

        match &result {
            Ok(_) => debug!(
                elapsed_ms = telemetry::duration_to_u64_ms(started.elapsed()),
                "profile call succeeded"
            ),
            Err(ProfileError::NotFound(_)) => debug!("profile not found"),
            Err(e) => warn!(error = %e, kind = e.kind(), "profile call failed"),
        }
        result
    }

    async fn run(&self, ctx: &Context, call: Call, timeout: Duration) -> Result<ProfileObject> {
        if self.is_closed() {
            return Err(ProfileError::Closed);
        }
        // Dropped on every exit path, which detaches it from the caller's context.
        let call_ctx = ctx.with_timeout(timeout);
        if call_ctx.is_cancelled() {
            return Err(ProfileError::Cancelled);
        }
        let operation = call.operation();
        let remaining = call_ctx.remaining().unwrap_or(timeout);
        if remaining.is_zero() {
            return Err(ProfileError::Timeout(format!(
                "{operation}: deadline already passed"
            )));
        }

        tokio::select! {
            biased;
            _ = call_ctx.cancelled() => Err(ProfileError::Cancelled),
            _ = sleep_until_deadline(call_ctx.deadline()) => {
                Err(ProfileError::Timeout(format!("{operation} exceeded {remaining:?}")))
            }
            result = self.send(call, remaining) => result.map_err(ProfileError::from),
        }
    }

    async fn send(
        &self,
        call: Call,
        remaining: Duration,
    ) -> std::result::Result<ProfileObject, tonic::Status> {
        match call {
            Call::GetById(message) => {
                self.transport
                    .get_by_id(self.request(message, remaining))
                    .await
            }
            Call::GetByContact(message) => {
                self.transport
                    .get_by_contact(self.request(message, remaining))
                    .await
            }
            Call::Create(message) => {
                self.transport
                    .create(self.request(message, remaining))
                    .await
            }
        }
    }

    fn request<M>(&self, message: M, remaining: Duration) -> Request<M> {
        let mut request = Request::new(message);
        request.set_timeout(remaining);
        let metadata = request.metadata_mut();
        self.header.apply(metadata);
        if let Some(token) = &self.authorization {
            metadata.insert("authorization", token.clone());
        }
        request
    }
}

impl std::fmt::Debug for ProfileClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileClient")
            .field("header", &self.header.as_str())
            .field("read_timeout", &self.read_timeout)
            .field("create_timeout", &self.create_timeout)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
