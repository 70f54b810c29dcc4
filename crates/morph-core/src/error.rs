//! Error types for the Morph core library
//!
//! Every failure the engine can report is a variant of [`Error`]. Errors are
//! plain values: nothing here is fatal to the process, and the first error hit
//! during a traversal is returned verbatim to the caller.

use crate::reflect::Kind;
use std::fmt;
use thiserror::Error;

/// Main error type for Morph operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The entry point received an untyped nil instead of a reference to a record
    #[error("the provided value is not a pointer")]
    NotAPointer,

    /// The entry point target is nil or not a record
    #[error("the provided value is not a struct")]
    NotAStruct,

    /// Blank annotation key or directive name
    #[error("invalid tag name")]
    InvalidTagName,

    /// Registration referenced a transformer that does not exist
    #[error("invalid transformer")]
    InvalidTransformer,

    /// Annotation names a directive that is neither registered nor a navigation directive
    #[error("unknown tag: '{tag}'")]
    UnknownTag { tag: String },

    /// `dive` applied to a value that is not a sequence or a map
    #[error("cannot dive into kind: {kind}")]
    InvalidDive { kind: Kind },

    /// Attempt to register a transformer under a navigation directive name
    #[error("cannot override reserved tag: '{tag}'")]
    ReservedTagOverride { tag: String },

    /// A directive was applied to a value of the wrong kind
    #[error("unexpected value: '{kind}' for tag: '{tag}'")]
    UnexpectedValue { kind: Kind, tag: String },

    /// The parameter string of a directive could not be parsed
    #[error("invalid parameters '{params}' for tag: '{tag}'")]
    InvalidParameters { params: String, tag: String },

    /// A parameterised directive ran without its compiled parameters
    #[error("missing parameters for tag: {tag}")]
    MissingParameters { tag: String },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Caller-correctable setup problems (entry point misuse, registration)
    Configuration,
    /// Malformed annotations, detected while compiling a chain
    Compile,
    /// A directive met a value or parameter it cannot work with
    Mutation,
}

impl Error {
    /// Create an unknown tag error
    pub fn unknown_tag(tag: impl Into<String>) -> Self {
        Self::UnknownTag { tag: tag.into() }
    }

    /// Create an unexpected value error for the given directive
    pub fn unexpected_value(kind: Kind, tag: impl Into<String>) -> Self {
        Self::UnexpectedValue {
            kind,
            tag: tag.into(),
        }
    }

    /// Create an invalid parameters error for the given directive
    pub fn invalid_parameters(params: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::InvalidParameters {
            params: params.into(),
            tag: tag.into(),
        }
    }

    /// Create a missing parameters error for the given directive
    pub fn missing_parameters(tag: impl Into<String>) -> Self {
        Self::MissingParameters { tag: tag.into() }
    }

    /// Which part of the pipeline produced this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotAPointer
            | Self::NotAStruct
            | Self::InvalidTagName
            | Self::InvalidTransformer => ErrorCategory::Configuration,
            Self::UnknownTag { .. } | Self::InvalidDive { .. } | Self::ReservedTagOverride { .. } => {
                ErrorCategory::Compile
            }
            Self::UnexpectedValue { .. }
            | Self::InvalidParameters { .. }
            | Self::MissingParameters { .. } => ErrorCategory::Mutation,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Compile => write!(f, "compile"),
            ErrorCategory::Mutation => write!(f, "mutation"),
        }
    }
}
