//! Encoder configuration.

/// How the 16-bit and 32-bit size tiers write their length field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthEncoding {
    /// Marker followed by a 2-byte or 4-byte big-endian length.
    #[default]
    Standard,
    /// Marker followed by a single length byte holding the low 8 bits of the
    /// size, for byte-for-byte compatibility with legacy peers.
    ///
    /// Sizes above 255 are truncated on the wire and cannot be decoded.
    LegacyTruncated,
}

/// Byte order of a record's signature relative to its size header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordLayout {
    /// Size marker, then signature byte, then fields.
    #[default]
    HeaderFirst,
    /// Signature byte, then size marker, then fields (legacy order).
    SignatureFirst,
}

/// Settings for an [`Encoder`](crate::packstream::Encoder).
///
/// ```
/// use boltpack::{EncoderConfig, LengthEncoding};
///
/// let config = EncoderConfig::new()
///     .length_encoding(LengthEncoding::Standard)
///     .max_depth(64);
/// assert_eq!(config.depth_limit(), Some(64));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncoderConfig {
    length_encoding: LengthEncoding,
    record_layout: RecordLayout,
    max_depth: Option<usize>,
}

impl EncoderConfig {
    /// Standard PackStream encoding with no nesting limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reproduces the legacy driver's wire output: truncated length fields
    /// and signature-first records.
    pub fn legacy() -> Self {
        Self {
            length_encoding: LengthEncoding::LegacyTruncated,
            record_layout: RecordLayout::SignatureFirst,
            max_depth: None,
        }
    }

    /// Sets how multi-byte length fields are written.
    pub fn length_encoding(mut self, encoding: LengthEncoding) -> Self {
        self.length_encoding = encoding;
        self
    }

    /// Sets the record signature placement.
    pub fn record_layout(mut self, layout: RecordLayout) -> Self {
        self.record_layout = layout;
        self
    }

    /// Limits how deeply lists, dicts and structures may nest.
    pub fn max_depth(mut self, limit: usize) -> Self {
        self.max_depth = Some(limit);
        self
    }

    pub fn lengths(&self) -> LengthEncoding {
        self.length_encoding
    }

    pub fn layout(&self) -> RecordLayout {
        self.record_layout
    }

    pub fn depth_limit(&self) -> Option<usize> {
        self.max_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_standard() {
        let config = EncoderConfig::default();
        assert_eq!(config.lengths(), LengthEncoding::Standard);
        assert_eq!(config.layout(), RecordLayout::HeaderFirst);
        assert_eq!(config.depth_limit(), None);
    }

    #[test]
    fn legacy_selects_both_legacy_behaviours() {
        let config = EncoderConfig::legacy();
        assert_eq!(config.lengths(), LengthEncoding::LegacyTruncated);
        assert_eq!(config.layout(), RecordLayout::SignatureFirst);
    }

    #[test]
    fn setters_chain() {
        let config = EncoderConfig::legacy()
            .record_layout(RecordLayout::HeaderFirst)
            .max_depth(8);
        assert_eq!(config.lengths(), LengthEncoding::LegacyTruncated);
        assert_eq!(config.layout(), RecordLayout::HeaderFirst);
        assert_eq!(config.depth_limit(), Some(8));
    }
}
