//! Error types for PackStream encoding and decoding.

use std::string::FromUtf8Error;

/// Errors that can occur while encoding a value to a sink.
///
/// Every variant is terminal for the encode call that produced it. The sink
/// may already hold a partial value and must not be reused as-is.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    #[error("integer too big: {value}, max integer supported: {max}")]
    IntegerOverflow { value: i128, max: i64 },

    #[error("{kind} too long to write: {len} exceeds maximum of {max}")]
    LengthOverflow {
        kind: &'static str,
        len: usize,
        max: usize,
    },

    #[error("sink write failed: {0}")]
    SinkWriteFailure(#[from] std::io::Error),

    #[error("nesting deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    #[error("{0}")]
    Custom(String),
}

impl EncodeError {
    /// Builds an `IntegerOverflow` for a value outside the `i64` range.
    pub fn integer_overflow(value: impl Into<i128>) -> Self {
        Self::IntegerOverflow {
            value: value.into(),
            max: i64::MAX,
        }
    }

    /// Returns `true` if the error came from the sink rather than the value.
    pub fn is_sink_failure(&self) -> bool {
        matches!(self, Self::SinkWriteFailure(_))
    }
}

impl serde::ser::Error for EncodeError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        Self::Custom(msg.to_string())
    }
}

/// Errors that can occur while decoding PackStream bytes.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("need {needed} bytes but only {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("unknown PackStream marker: 0x{0:02X}")]
    UnknownMarker(u8),

    #[error("invalid UTF-8 string: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),

    #[error("dict key must be a string, got: {0}")]
    NonStringKey(&'static str),

    #[error("duplicate dict key: \"{0}\"")]
    DuplicateKey(String),

    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_overflow_names_value_and_max() {
        let err = EncodeError::integer_overflow(u64::MAX);
        assert_eq!(
            err.to_string(),
            "integer too big: 18446744073709551615, max integer supported: 9223372036854775807"
        );
    }

    #[test]
    fn io_errors_convert_to_sink_failure() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let err: EncodeError = io.into();
        assert!(err.is_sink_failure());
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn decode_marker_is_hex_formatted() {
        assert_eq!(
            DecodeError::UnknownMarker(0xE3).to_string(),
            "unknown PackStream marker: 0xE3"
        );
    }
}
