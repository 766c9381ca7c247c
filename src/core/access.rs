//! Request-scoped authorization for mutating ledger operations.
//!
//! Every write takes an [`AccessContext`] built for the current request. There
//! is no process-wide admin flag; the shell decides per invocation whether
//! the caller has unlocked admin mode.

use crate::errors::{Error, Result};
use std::fmt;
use tracing::{info, warn};

/// Shared admin passcode. A UI convenience gate, not an authentication system.
#[derive(Clone, PartialEq, Eq)]
pub struct Passcode(String);

impl Passcode {
    /// Wraps a passcode value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Whether `attempt` equals the passcode, ignoring surrounding whitespace.
    #[must_use]
    pub fn matches(&self, attempt: &str) -> bool {
        attempt.trim() == self.0
    }
}

impl fmt::Debug for Passcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passcode(****)")
    }
}

/// Capability held by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    /// May read every collection
    ReadOnly,
    /// May also create, update and delete
    Admin,
}

/// Who is acting and with what capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessContext {
    actor: String,
    level: AccessLevel,
}

impl AccessContext {
    /// A context that can only read.
    pub fn read_only(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            level: AccessLevel::ReadOnly,
        }
    }

    /// A context with admin capability.
    pub fn admin(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            level: AccessLevel::Admin,
        }
    }

    /// Checks `attempt` against the passcode and returns the resulting context.
    pub fn unlock(actor: impl Into<String>, attempt: &str, passcode: &Passcode) -> Self {
        let actor = actor.into();
        if passcode.matches(attempt) {
            info!("Admin mode unlocked by {actor}");
            Self::admin(actor)
        } else {
            warn!("Rejected admin passcode attempt by {actor}");
            Self::read_only(actor)
        }
    }

    /// Whether this context may mutate the ledger.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.level == AccessLevel::Admin
    }

    /// The acting user.
    #[must_use]
    pub fn actor(&self) -> &str {
        &self.actor
    }

    /// Capability of this context.
    #[must_use]
    pub const fn level(&self) -> AccessLevel {
        self.level
    }

    /// Fails with [`Error::Unauthorized`] unless this context is admin.
    ///
    /// # Errors
    /// Returns [`Error::Unauthorized`] for read-only contexts.
    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::Unauthorized {
                actor: self.actor.clone(),
            })
        }
    }
}
