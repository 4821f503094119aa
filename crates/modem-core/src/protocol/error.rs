//! Reply parsing errors.

use thiserror::Error;

/// Structured failure returned by every reply parser.
///
/// Parsers never retry; the caller driving the port decides what to do.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The text does not follow the reply grammar at all.
    #[error("Couldn't parse {command} response: '{reply}'")]
    MalformedReply {
        command: &'static str,
        reply: String,
    },

    /// A mandatory positional field is absent or not readable.
    #[error("Couldn't parse {field} in {command} response")]
    MissingField {
        command: &'static str,
        field: &'static str,
    },

    /// A field has the right shape but holds a value outside the known domain.
    #[error("Unsupported {field} in {command} response: '{value}'")]
    UnsupportedValue {
        command: &'static str,
        field: &'static str,
        value: String,
    },

    /// Fields are individually valid but contradict each other.
    #[error("Inconsistent {command} response: {reason}")]
    InconsistentValue {
        command: &'static str,
        reason: String,
    },
}

impl ParseError {
    pub(crate) fn malformed(command: &'static str, reply: &str) -> Self {
        Self::MalformedReply {
            command,
            reply: reply.trim_end().to_string(),
        }
    }

    pub(crate) fn missing(command: &'static str, field: &'static str) -> Self {
        Self::MissingField { command, field }
    }

    pub(crate) fn unsupported(
        command: &'static str,
        field: &'static str,
        value: impl ToString,
    ) -> Self {
        Self::UnsupportedValue {
            command,
            field,
            value: value.to_string(),
        }
    }

    /// Name of the offending field, when the error is about a single one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingField { field, .. } | Self::UnsupportedValue { field, .. } => Some(*field),
            _ => None,
        }
    }
}
