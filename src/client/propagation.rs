//! Handing a [`ProfileClient`] down a call chain through a [`Context`].
//!
//! The context holds only a weak reference: it never keeps the client alive,
//! and whoever created the client stays responsible for closing it.

use std::sync::{Arc, Weak};

use super::ProfileClient;
use crate::Context;

const CLIENT_CONTEXT_KEY: &str = "profile_client::client";

/// Derive a context that carries `client`.
pub fn to_context(ctx: &Context, client: &Arc<ProfileClient>) -> Context {
    ctx.with_value(CLIENT_CONTEXT_KEY, Arc::downgrade(client))
}

/// The client previously stored with [`to_context`], if any.
///
/// Returns `None` when no client was attached, or the attached client has
/// already been dropped.
pub fn from_context(ctx: &Context) -> Option<Arc<ProfileClient>> {
    ctx.value::<Weak<ProfileClient>>(CLIENT_CONTEXT_KEY)?
        .upgrade()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_value_type_reads_as_absent() {
        let ctx = Context::background().with_value(CLIENT_CONTEXT_KEY, "not a client");
        assert!(from_context(&ctx).is_none());
    }

    #[test]
    fn empty_context_reads_as_absent() {
        assert!(from_context(&Context::background()).is_none());
    }
}
