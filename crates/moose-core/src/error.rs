//! Error types for schema loading, instance parsing and tree mutation.

use thiserror::Error;

use crate::node::Flavor;

/// Errors raised by the MOOSE input engine.
///
/// Unresolvable hard paths are not errors; the resolver skips them.
#[derive(Debug, Error)]
pub enum MooseError {
    /// The YAML schema document is not a list of block maps, or a block is
    /// missing a required field.
    #[error("Malformed schema: {message}")]
    MalformedSchema { message: String },

    /// The GetPot instance text could not be parsed.
    #[error("Malformed instance at line {line}: {message}")]
    MalformedInstance { line: usize, message: String },

    /// A child or exemplar was added to a node of the wrong flavor.
    #[error("Node '{node}' is not a {expected:?} node")]
    FlavorMismatch { node: String, expected: Flavor },

    /// Directory listing or other byte-stream failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MooseError {
    pub(crate) fn schema(message: impl Into<String>) -> Self {
        Self::MalformedSchema {
            message: message.into(),
        }
    }

    pub(crate) fn instance(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedInstance {
            line,
            message: message.into(),
        }
    }

    /// Stable error code, mirroring the diagnostic codes used by callers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedSchema { .. } => "MALFORMED_SCHEMA",
            Self::MalformedInstance { .. } => "MALFORMED_INSTANCE",
            Self::FlavorMismatch { .. } => "FLAVOR_MISMATCH",
            Self::Io(_) => "IO_FAILURE",
        }
    }
}

pub type Result<T> = std::result::Result<T, MooseError>;
