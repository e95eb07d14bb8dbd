//! Error types for the reconciliation engine.
//!
//! Errors are split into fatal and non-fatal categories: a fatal error
//! aborts the invocation before or during execution, while a rejection is
//! recorded in the report and execution continues with the remaining plan
//! actions.

use crate::types::GatewayOp;
use thiserror::Error;

/// Errors that can occur while planning or executing a reconciliation.
#[derive(Debug, Error)]
pub enum Error {
    /// Desired input does not match the resource schema or fails
    /// kind-specific validation. Raised before any gateway call.
    #[error("schema violation: {0}")]
    Schema(String),

    /// The device cannot be reached (connection/auth failure). No retry is
    /// performed by this engine.
    #[error("device unavailable: {0}")]
    Unavailable(String),

    /// The device returned state the normalizer cannot interpret.
    #[error("malformed device state for {identity}: {message}")]
    Malformed { identity: String, message: String },

    /// The device refused a mutating call. Recorded, not retried; execution
    /// continues with the rest of the plan.
    #[error("device rejected {operation} on {identity}: {message}")]
    Rejected {
        operation: GatewayOp,
        identity: String,
        message: String,
    },
}

impl Error {
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn malformed(identity: &str, message: impl Into<String>) -> Self {
        Self::Malformed {
            identity: identity.to_string(),
            message: message.into(),
        }
    }

    pub fn rejected(operation: GatewayOp, identity: &str, message: impl Into<String>) -> Self {
        Self::Rejected {
            operation,
            identity: identity.to_string(),
            message: message.into(),
        }
    }

    /// Whether this error aborts the invocation outright.
    ///
    /// Everything except a device rejection is fatal.
    pub fn is_fatal(&self) -> bool {
        !self.is_rejection()
    }

    /// Whether this error is a per-action device rejection that execution
    /// recovers from locally.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
