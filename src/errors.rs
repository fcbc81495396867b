//! Error types for clustering operations.
//!
//! Every fallible entry point returns [`Result`], backed by [`ClusterError`].
//! The taxonomy is intentionally small: input shape problems, unknown matrix
//! semantics, out-of-range parameters and misuse of the group mapper. The
//! remaining variants only occur in the plumbing layer (configuration files
//! and matrix input).
//!
//! A plateau threshold search that finds nothing is **not** an error; it is
//! reported as `None` by [`crate::threshold::find_threshold`].
//!
//! # Example
//!
//! ```rust
//! use taxoclust::errors::ClusterError;
//!
//! let err = ClusterError::shape_mismatch(5, 4);
//! assert!(err.is_user_fixable());
//! assert_eq!(err.category(), "Shape");
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for clustering operations
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Matrix is not square, or its size disagrees with the taxon count
    #[error("Shape mismatch: expected {expected} rows and columns, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    /// Unrecognized matrix semantics tag
    #[error("Invalid matrix semantics '{0}' (expected distances, similarities or weights)")]
    InvalidSemantics(String),

    /// Parameter outside its valid range
    #[error("Invalid parameter `{name}`: {message}")]
    InvalidParameter { name: String, message: String },

    /// A taxon belongs to several groups where exactly one is required
    #[error("Ambiguous membership: taxon '{taxon}' belongs to {count} clusters")]
    AmbiguousMembership { taxon: String, count: usize },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ClusterError {
    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: usize, found: usize) -> Self {
        Self::ShapeMismatch { expected, found }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error with optional path context
    pub fn config(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Config {
            message: message.into(),
            path,
        }
    }

    /// Get the error category name.
    pub fn category(&self) -> &'static str {
        match self {
            Self::ShapeMismatch { .. } => "Shape",
            Self::InvalidSemantics(_) => "Semantics",
            Self::InvalidParameter { .. } => "Parameter",
            Self::AmbiguousMembership { .. } => "Membership",
            Self::Config { .. } => "Config",
            Self::Io(_) => "I/O",
            Self::Json(_) => "Input",
        }
    }

    /// Whether the caller can fix the error by changing its input.
    ///
    /// Only I/O failures are outside the caller's control.
    pub fn is_user_fixable(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, ClusterError>;
