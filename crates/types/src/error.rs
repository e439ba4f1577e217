//! Unified error taxonomy for the remilk workspace.
//!
//! Every failure path in the gateway resolves to exactly one [`GatewayError`]
//! variant. Each variant carries a stable wire code (JSON-RPC style) so the
//! protocol layer can map it deterministically to an HTTP status and response
//! body without ever leaking an "unknown" error to the client.

use thiserror::Error;

/// Distinguishes authentication failures by cause so the client can give the
/// human actionable guidance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// The operation requires an authenticated session and none exists.
    Required,
    /// `authenticate` was called with no frob and no flow in progress.
    NoFlow,
    /// The backend rejected the frob (expired or never authorized).
    FrobRejected,
    /// The backend rejected the stored long-lived token.
    TokenRejected,
}

impl AuthErrorKind {
    /// Stable tag included in the error response's `data` field.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Required => "not_authenticated",
            Self::NoFlow => "no_auth_flow",
            Self::FrobRejected => "frob_rejected",
            Self::TokenRejected => "token_rejected",
        }
    }
}

/// Enumerates all error kinds that can occur across remilk crates.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request body could not be parsed at all.
    #[error("parse error: {0}")]
    Parse(String),

    /// The request was structurally valid but not a legal operation.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The named tool does not exist in the catalog.
    #[error("method not found: {0}")]
    MethodNotFound(String),

    /// A required argument is missing, blank, or malformed.
    #[error("invalid params: {message}")]
    InvalidParams {
        message: String,
        /// The offending argument, when one can be named.
        field: Option<String>,
    },

    /// Unexpected internal failure (including caught panics).
    #[error("internal error: {0}")]
    Internal(String),

    /// Authentication failure, distinguished by [`AuthErrorKind`].
    #[error("authentication error: {message}")]
    Auth {
        message: String,
        kind: AuthErrorKind,
    },

    /// The named resource does not exist in the catalog.
    #[error("resource not found: {0}")]
    Resource(String),

    /// The backend returned a failure envelope or the call failed in transit.
    ///
    /// `code` is the backend's own error code; `0` marks a transport-level
    /// failure (timeout, connection refused, unparseable envelope).
    #[error("backend error {code}: {msg}")]
    Backend { code: i32, msg: String },

    /// A tool handler failed for a reason that is neither validation nor
    /// a backend rejection.
    #[error("tool error: {0}")]
    Tool(String),

    /// Domain-level validation failure (well-formed argument, bad value).
    #[error("validation error: {0}")]
    Validation(String),
}

impl GatewayError {
    /// A missing or blank required argument, naming the field.
    #[must_use]
    pub fn missing_arg(field: &str) -> Self {
        Self::InvalidParams {
            message: format!("missing required argument: {field}"),
            field: Some(field.to_string()),
        }
    }

    /// An authentication failure with the given cause.
    #[must_use]
    pub fn auth(kind: AuthErrorKind, message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
            kind,
        }
    }

    /// Stable signed wire code for the error response envelope.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::Parse(_) => -32700,
            Self::InvalidRequest(_) => -32600,
            Self::MethodNotFound(_) => -32601,
            Self::InvalidParams { .. } => -32602,
            Self::Internal(_) => -32603,
            Self::Auth { .. } => -32001,
            Self::Resource(_) => -32002,
            Self::Backend { .. } => -32003,
            Self::Tool(_) => -32004,
            Self::Validation(_) => -32005,
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

/// Backend error codes the gateway gives special meaning to.
pub mod backend_codes {
    /// "Login failed / Invalid auth token".
    pub const LOGIN_FAILED: i32 = 98;
    /// "Invalid frob - did you authenticate?".
    pub const INVALID_FROB: i32 = 101;
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, GatewayError>;
