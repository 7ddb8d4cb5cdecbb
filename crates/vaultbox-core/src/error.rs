//! Unified application error types for Vaultbox.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Business-rule failures carry their
//! own [`ErrorKind`] so callers can tell them apart without string matching.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested resource was not found (or is not visible to the caller).
    NotFound,
    /// The identity token is missing or invalid.
    Authentication,
    /// The actor is not the owner of the resource.
    Unauthorized,
    /// The operation is structurally invalid (cycle, self-share, empty grant).
    InvalidOperation,
    /// A folder still has children and cascade was not requested.
    NotEmpty,
    /// The share link is password protected and no password was supplied.
    PasswordRequired,
    /// The supplied share link password does not match.
    InvalidPassword,
    /// No unique share token could be produced within the attempt budget.
    TokenGenerationExhausted,
    /// The database or the object store failed.
    ExternalStore,
    /// Input validation failed.
    Validation,
    /// A concurrent modification won the race.
    Conflict,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal server error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Authentication => write!(f, "AUTHENTICATION"),
            Self::Unauthorized => write!(f, "UNAUTHORIZED"),
            Self::InvalidOperation => write!(f, "INVALID_OPERATION"),
            Self::NotEmpty => write!(f, "NOT_EMPTY"),
            Self::PasswordRequired => write!(f, "PASSWORD_REQUIRED"),
            Self::InvalidPassword => write!(f, "INVALID_PASSWORD"),
            Self::TokenGenerationExhausted => write!(f, "TOKEN_GENERATION_EXHAUSTED"),
            Self::ExternalStore => write!(f, "EXTERNAL_STORE"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout Vaultbox.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    /// Create an ownership error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Create an invalid-operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidOperation, message)
    }

    /// Create a not-empty error.
    pub fn not_empty(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotEmpty, message)
    }

    /// Create a password-required error.
    pub fn password_required(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PasswordRequired, message)
    }

    /// Create an invalid-password error.
    pub fn invalid_password(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidPassword, message)
    }

    /// Create a token-exhaustion error.
    pub fn token_generation_exhausted(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenGenerationExhausted, message)
    }

    /// Create an external store error.
    pub fn external_store(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExternalStore, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Whether this error is the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::ExternalStore, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
