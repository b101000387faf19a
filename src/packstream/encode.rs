//! PackStream encoding: `Value` → bytes.

use std::io::Write;

use bytes::{BufMut, Bytes, BytesMut};

use super::marker::{self, IntTier, SizeTier, SizedMarkers};
use crate::config::{EncoderConfig, LengthEncoding, RecordLayout};
use crate::error::EncodeError;
use crate::types::{Dict, Record, Value};

/// Writes PackStream-encoded values straight to a byte sink.
///
/// Every marker, length field and payload is handed to the sink as soon as it
/// is produced; nothing is buffered. If an encode call fails, the sink holds
/// whatever prefix was written before the failure and should be discarded.
///
/// ```
/// use boltpack::{Encoder, Value};
///
/// let mut out = Vec::new();
/// let mut encoder = Encoder::new(&mut out);
/// encoder.encode(&Value::from("hi")).unwrap();
/// assert_eq!(out, [0x82, b'h', b'i']);
/// ```
pub struct Encoder<W> {
    sink: W,
    config: EncoderConfig,
    depth: usize,
    written: u64,
}

impl<W: Write> Encoder<W> {
    /// Creates an encoder with the standard configuration.
    pub fn new(sink: W) -> Self {
        Self::with_config(sink, EncoderConfig::default())
    }

    pub fn with_config(sink: W, config: EncoderConfig) -> Self {
        Self {
            sink,
            config,
            depth: 0,
            written: 0,
        }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    /// Total bytes handed to the sink over this encoder's lifetime.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Encodes one value, recursing into lists, dicts and structures.
    pub fn encode(&mut self, value: &Value) -> Result<(), EncodeError> {
        let start = self.written;
        let result = self.encode_value(value);
        if let Err(e) = &result {
            tracing::debug!(
                kind = value.kind(),
                error = %e,
                emitted = self.written - start,
                "PackStream encode aborted"
            );
        }
        result
    }

    fn encode_value(&mut self, value: &Value) -> Result<(), EncodeError> {
        match value {
            Value::Null => self.encode_null(),
            Value::Boolean(b) => self.encode_bool(*b),
            Value::Integer(i) => self.encode_int(*i),
            Value::Float(f) => self.encode_float(*f),
            Value::String(s) => self.encode_string(s),
            Value::List(items) => self.encode_list(items),
            Value::Dict(dict) => self.encode_dict(dict),
            Value::Structure(s) => self.encode_record(s),
        }
    }

    pub fn encode_null(&mut self) -> Result<(), EncodeError> {
        self.write(&[marker::NULL])
    }

    pub fn encode_bool(&mut self, value: bool) -> Result<(), EncodeError> {
        self.write(&[if value { marker::TRUE } else { marker::FALSE }])
    }

    /// Encodes an integer using the smallest possible PackStream representation.
    pub fn encode_int(&mut self, value: i64) -> Result<(), EncodeError> {
        let tier = IntTier::for_value(value);
        let bytes = value.to_be_bytes();
        match tier.marker() {
            // TINY_INT: the low byte is both marker and value.
            None => self.write(&bytes[7..]),
            Some(m) => {
                self.write(&[m])?;
                self.write(&bytes[8 - tier.payload_width()..])
            }
        }
    }

    /// Encodes an unsigned integer, failing past `i64::MAX`.
    pub fn encode_uint(&mut self, value: u64) -> Result<(), EncodeError> {
        let signed = i64::try_from(value).map_err(|_| EncodeError::integer_overflow(value))?;
        self.encode_int(signed)
    }

    pub fn encode_float(&mut self, value: f64) -> Result<(), EncodeError> {
        self.write(&[marker::FLOAT_64])?;
        self.write(&value.to_be_bytes())
    }

    /// Encodes a string (size = byte length, not char count).
    pub fn encode_string(&mut self, value: &str) -> Result<(), EncodeError> {
        self.write_size_header(&marker::STRING, value.len())?;
        self.write(value.as_bytes())
    }

    pub fn encode_list(&mut self, items: &[Value]) -> Result<(), EncodeError> {
        self.write_size_header(&marker::LIST, items.len())?;
        self.nested(|enc| {
            for item in items {
                enc.encode_value(item)?;
            }
            Ok(())
        })
    }

    pub fn encode_dict(&mut self, dict: &Dict) -> Result<(), EncodeError> {
        self.write_size_header(&marker::DICT, dict.len())?;
        self.nested(|enc| {
            for (key, value) in dict {
                enc.encode_string(key)?;
                enc.encode_value(value)?;
            }
            Ok(())
        })
    }

    /// Encodes any [`Record`] as a structure: size marker, signature, fields.
    ///
    /// With [`RecordLayout::SignatureFirst`] the signature byte precedes the
    /// size marker instead.
    pub fn encode_record<R: Record + ?Sized>(&mut self, record: &R) -> Result<(), EncodeError> {
        let fields = record.fields();
        let signature = record.signature();
        match self.config.layout() {
            RecordLayout::HeaderFirst => {
                self.write_size_header(&marker::STRUCT, fields.len())?;
                self.write(&[signature])?;
            }
            RecordLayout::SignatureFirst => {
                self.write(&[signature])?;
                self.write_size_header(&marker::STRUCT, fields.len())?;
            }
        }
        self.nested(|enc| {
            for field in fields.iter() {
                enc.encode_value(field)?;
            }
            Ok(())
        })
    }

    /// Writes the marker and length field for a sized category.
    fn write_size_header(&mut self, markers: &SizedMarkers, len: usize) -> Result<(), EncodeError> {
        let overflow = || EncodeError::LengthOverflow {
            kind: markers.kind,
            len,
            max: markers.max_len(),
        };
        let tier = SizeTier::for_len(len).ok_or_else(overflow)?;
        let m = markers.marker(tier).ok_or_else(overflow)?;

        match (tier, self.config.lengths()) {
            (SizeTier::Tiny(_), _) => self.write(&[m]),
            (SizeTier::Size8, _) => self.write(&[m, len as u8]),
            (SizeTier::Size16 | SizeTier::Size32, LengthEncoding::LegacyTruncated) => {
                tracing::warn!(
                    kind = markers.kind,
                    len,
                    written = len as u8,
                    "legacy length encoding truncates size to one byte"
                );
                self.write(&[m, len as u8])
            }
            (SizeTier::Size16, LengthEncoding::Standard) => {
                let [hi, lo] = (len as u16).to_be_bytes();
                self.write(&[m, hi, lo])
            }
            (SizeTier::Size32, LengthEncoding::Standard) => {
                let [b0, b1, b2, b3] = (len as u32).to_be_bytes();
                self.write(&[m, b0, b1, b2, b3])
            }
        }
    }

    /// Runs `f` one nesting level deeper, enforcing the configured limit.
    fn nested<F>(&mut self, f: F) -> Result<(), EncodeError>
    where
        F: FnOnce(&mut Self) -> Result<(), EncodeError>,
    {
        if let Some(limit) = self.config.depth_limit() {
            if self.depth >= limit {
                return Err(EncodeError::NestingTooDeep { limit });
            }
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        self.sink.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }
}

/// Encodes a value into a fresh `Vec<u8>` with the standard configuration.
pub fn to_vec(value: &Value) -> Result<Vec<u8>, EncodeError> {
    to_vec_with(value, EncoderConfig::default())
}

/// Encodes a value into a fresh `Vec<u8>` with the given configuration.
pub fn to_vec_with(value: &Value, config: EncoderConfig) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::new();
    Encoder::with_config(&mut out, config).encode(value)?;
    Ok(out)
}

/// Encodes a value into a frozen `Bytes` buffer.
pub fn to_bytes(value: &Value, config: EncoderConfig) -> Result<Bytes, EncodeError> {
    let mut encoder = Encoder::with_config(BytesMut::new().writer(), config);
    encoder.encode(value)?;
    Ok(encoder.into_inner().into_inner().freeze())
}
