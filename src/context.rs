//! Request-scoped [`Context`]: cancellation, deadline and typed values.
//!
//! A `Context` is passed explicitly down a call chain. Deriving a context
//! (`child`, `with_timeout`, `with_value`) never mutates the parent; it
//! returns a new value whose cancellation is linked to the parent's, so
//! cancelling an outer context unwinds everything derived from it.
//!
//! ```rust
//! use std::time::Duration;
//! use profile_client::Context;
//!
//! let ctx = Context::background().with_timeout(Duration::from_secs(5));
//! assert!(ctx.remaining().is_some());
//! ctx.cancel();
//! assert!(ctx.is_cancelled());
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

type Values = HashMap<&'static str, Arc<dyn Any + Send + Sync>>;

/// Request-scoped carrier of a cancellation signal, an optional deadline and
/// typed key/value associations.
#[derive(Clone)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
    values: Arc<Values>,
}

impl Context {
    /// A root context with no deadline and no values.
    pub fn background() -> Self {
        Self::from_token(CancellationToken::new())
    }

    /// A root context driven by an existing cancellation token.
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
            values: Arc::new(HashMap::new()),
        }
    }

    /// Derive a context that is cancelled when this one is, and can also be
    /// cancelled on its own without affecting this one.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
            values: Arc::clone(&self.values),
        }
    }

    /// Derive a child context that expires after `timeout`, or at this
    /// context's deadline if that comes first.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        // A timeout too large to represent adds no deadline of its own.
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.child(),
        }
    }

    /// Derive a child context that expires at `deadline`, or at this
    /// context's deadline if that comes first.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let mut child = self.child();
        child.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        child
    }

    /// Derive a context carrying `value` under `key`, shadowing any previous
    /// value stored under the same key.
    pub fn with_value<T>(&self, key: &'static str, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        let mut values = (*self.values).clone();
        values.insert(key, Arc::new(value));
        Self {
            token: self.token.clone(),
            deadline: self.deadline,
            values: Arc::new(values),
        }
    }

    /// Look up the value stored under `key`.
    ///
    /// Returns `None` if nothing is stored there or the stored value is not a `T`.
    pub fn value<T>(&self, key: &'static str) -> Option<&T>
    where
        T: Any + Send + Sync,
    {
        self.values.get(key)?.downcast_ref::<T>()
    }

    /// Cancel this context and every context derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once this context is cancelled.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the deadline, `Duration::ZERO` once it has passed,
    /// `None` without a deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_some_and(|left| left.is_zero())
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("cancelled", &self.is_cancelled())
            .field("deadline", &self.deadline)
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}
