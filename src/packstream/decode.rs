//! PackStream decoding: bytes → `Value`.
//!
//! Interprets the same marker table as the encoder. Only the standard layout
//! is understood: output produced with legacy length truncation or
//! signature-first records is not self-delimiting and cannot be read back.

use bytes::Buf;

use super::marker::{self, IntTier, Marker, SizeTier};
use crate::error::DecodeError;
use crate::types::{Dict, Structure, Value};

/// Decodes a single `Value` from the buffer.
pub fn decode_value(buf: &mut impl Buf) -> Result<Value, DecodeError> {
    ensure_remaining(buf, 1)?;

    let m = buf.get_u8();
    match marker::classify(m) {
        Marker::Null => Ok(Value::Null),
        Marker::Boolean(b) => Ok(Value::Boolean(b)),
        Marker::Float => {
            ensure_remaining(buf, 8)?;
            Ok(Value::Float(buf.get_f64()))
        }
        Marker::TinyInt(i) => Ok(Value::Integer(i64::from(i))),
        Marker::Int(tier) => decode_int(buf, tier),
        Marker::String(tier) => {
            let len = read_size(buf, tier)?;
            decode_string_data(buf, len)
        }
        Marker::List(tier) => {
            let len = read_size(buf, tier)?;
            decode_list_data(buf, len)
        }
        Marker::Dict(tier) => {
            let len = read_size(buf, tier)?;
            decode_dict_data(buf, len)
        }
        Marker::Struct(tier) => {
            let len = read_size(buf, tier)?;
            ensure_remaining(buf, 1)?;
            let signature = buf.get_u8();
            decode_struct_data(buf, signature, len)
        }
        Marker::Reserved => {
            tracing::trace!(marker = m, "rejecting reserved PackStream marker");
            Err(DecodeError::UnknownMarker(m))
        }
    }
}

/// Decodes exactly one value from `bytes`, rejecting leftover input.
pub fn from_slice(bytes: &[u8]) -> Result<Value, DecodeError> {
    let mut cursor = bytes;
    let value = decode_value(&mut cursor)?;
    if cursor.has_remaining() {
        return Err(DecodeError::TrailingBytes(cursor.remaining()));
    }
    Ok(value)
}

fn ensure_remaining(buf: &impl Buf, needed: usize) -> Result<(), DecodeError> {
    if buf.remaining() < needed {
        Err(DecodeError::UnexpectedEof {
            needed,
            remaining: buf.remaining(),
        })
    } else {
        Ok(())
    }
}

fn decode_int(buf: &mut impl Buf, tier: IntTier) -> Result<Value, DecodeError> {
    ensure_remaining(buf, tier.payload_width())?;
    let i = match tier {
        IntTier::Tiny => unreachable!("tiny ints carry no marker"),
        IntTier::Int8 => i64::from(buf.get_i8()),
        IntTier::Int16 => i64::from(buf.get_i16()),
        IntTier::Int32 => i64::from(buf.get_i32()),
        IntTier::Int64 => buf.get_i64(),
    };
    Ok(Value::Integer(i))
}

fn read_size(buf: &mut impl Buf, tier: SizeTier) -> Result<usize, DecodeError> {
    ensure_remaining(buf, tier.prefix_width())?;
    Ok(match tier {
        SizeTier::Tiny(n) => usize::from(n),
        SizeTier::Size8 => usize::from(buf.get_u8()),
        SizeTier::Size16 => usize::from(buf.get_u16()),
        SizeTier::Size32 => buf.get_u32() as usize,
    })
}

fn decode_string_data(buf: &mut impl Buf, len: usize) -> Result<Value, DecodeError> {
    ensure_remaining(buf, len)?;
    let mut data = vec![0u8; len];
    buf.copy_to_slice(&mut data);
    Ok(Value::String(String::from_utf8(data)?))
}

fn decode_list_data(buf: &mut impl Buf, len: usize) -> Result<Value, DecodeError> {
    // Each item takes at least one byte; don't trust `len` for allocation.
    let mut items = Vec::with_capacity(len.min(buf.remaining()));
    for _ in 0..len {
        items.push(decode_value(buf)?);
    }
    Ok(Value::List(items))
}

fn decode_dict_data(buf: &mut impl Buf, len: usize) -> Result<Value, DecodeError> {
    let mut dict = Dict::new();
    for _ in 0..len {
        let key = match decode_value(buf)? {
            Value::String(s) => s,
            other => return Err(DecodeError::NonStringKey(other.kind())),
        };
        if dict.contains_key(&key) {
            return Err(DecodeError::DuplicateKey(key));
        }
        let value = decode_value(buf)?;
        dict.insert(key, value);
    }
    Ok(Value::Dict(dict))
}

fn decode_struct_data(
    buf: &mut impl Buf,
    signature: u8,
    field_count: usize,
) -> Result<Value, DecodeError> {
    let mut fields = Vec::with_capacity(field_count.min(buf.remaining()));
    for _ in 0..field_count {
        fields.push(decode_value(buf)?);
    }
    Ok(Value::Structure(Structure::new(signature, fields)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packstream::encode;

    /// Encode then decode a value and verify round-trip.
    fn round_trip(value: &Value) -> Value {
        let buf = encode::to_vec(value).expect("encode failed");
        from_slice(&buf).expect("decode failed")
    }

    #[test]
    fn round_trip_null() {
        assert_eq!(round_trip(&Value::Null), Value::Null);
    }

    #[test]
    fn round_trip_bool() {
        assert_eq!(round_trip(&Value::Boolean(true)), Value::Boolean(true));
        assert_eq!(round_trip(&Value::Boolean(false)), Value::Boolean(false));
    }

    #[test]
    fn round_trip_integers() {
        // TINY_INT boundaries
        for i in [-16, -1, 0, 1, 42, 127] {
            assert_eq!(round_trip(&Value::Integer(i)), Value::Integer(i), "failed for {i}");
        }
        // INT_8
        for i in [-128, -17] {
            assert_eq!(round_trip(&Value::Integer(i)), Value::Integer(i), "failed for {i}");
        }
        // INT_16
        for i in [-129, 128, -32768, 32767] {
            assert_eq!(round_trip(&Value::Integer(i)), Value::Integer(i), "failed for {i}");
        }
        // INT_32
        for i in [-32769, 32768, i64::from(i32::MIN), i64::from(i32::MAX)] {
            assert_eq!(round_trip(&Value::Integer(i)), Value::Integer(i), "failed for {i}");
        }
        // INT_64
        for i in [i64::from(i32::MAX) + 1, i64::from(i32::MIN) - 1, i64::MAX, i64::MIN] {
            assert_eq!(round_trip(&Value::Integer(i)), Value::Integer(i), "failed for {i}");
        }
    }

    #[test]
    fn round_trip_float() {
        let val = Value::Float(3.14159);
        assert_eq!(round_trip(&val), val);
    }

    #[test]
    fn round_trip_strings() {
        for len in [0, 5, 15, 16, 200, 255, 256, 300, 65_535, 65_536] {
            let s = "a".repeat(len);
            assert_eq!(
                round_trip(&Value::String(s.clone())),
                Value::String(s),
                "failed for length {len}"
            );
        }
    }

    #[test]
    fn string_of_300_keeps_full_length() {
        let s = "q".repeat(300);
        match round_trip(&Value::String(s)) {
            Value::String(back) => assert_eq!(back.len(), 300),
            other => panic!("expected string, got {other}"),
        }
    }

    #[test]
    fn round_trip_list() {
        let val = Value::List(vec![
            Value::Integer(1),
            Value::String("two".into()),
            Value::Boolean(true),
            Value::List(vec![Value::Null; 300]),
        ]);
        assert_eq!(round_trip(&val), val);
    }

    #[test]
    fn round_trip_dict() {
        let val = Value::Dict(Dict::from([
            ("name".to_string(), Value::String("Alice".into())),
            ("age".to_string(), Value::Integer(30)),
        ]));
        assert_eq!(round_trip(&val), val);
    }

    #[test]
    fn round_trip_wide_list_and_dict() {
        for len in [300, 65_536] {
            let list = Value::List((0..len).map(Value::from).collect());
            assert_eq!(round_trip(&list), list, "list of {len}");

            let dict = Value::Dict((0..len).map(|i| (format!("k{i}"), Value::from(i))).collect());
            assert_eq!(round_trip(&dict), dict, "dict of {len}");
        }
    }

    #[test]
    fn round_trip_structure() {
        let val = Value::Structure(Structure::new(
            0x4E,
            vec![
                Value::Integer(42),
                Value::List(vec![Value::from("Person")]),
                Value::Dict(Dict::from([("name".to_string(), Value::from("Alice"))])),
            ],
        ));
        assert_eq!(round_trip(&val), val);

        let wide = Value::Structure(Structure::new(0x01, vec![Value::Integer(7); 300]));
        assert_eq!(round_trip(&wide), wide);
    }

    #[test]
    fn reserved_marker_is_rejected() {
        let err = from_slice(&[0xCC, 0x00]).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownMarker(0xCC)));
    }

    #[test]
    fn truncated_input_is_rejected() {
        let err = from_slice(&[marker::INT_32, 0x00, 0x01]).unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedEof { needed: 4, remaining: 2 }));

        let err = from_slice(&[0x83, b'a']).unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedEof { needed: 3, remaining: 1 }));
    }

    #[test]
    fn non_string_dict_key_is_rejected() {
        let err = from_slice(&[0xA1, 0x01, 0x02]).unwrap_err();
        assert!(matches!(err, DecodeError::NonStringKey("integer")));
    }

    #[test]
    fn duplicate_dict_key_is_rejected() {
        let err = from_slice(&[0xA2, 0x81, b'a', 0x01, 0x81, b'a', 0x02]).unwrap_err();
        assert!(matches!(err, DecodeError::DuplicateKey(ref k) if k == "a"));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let err = from_slice(&[0x82, 0xC3, 0x28]).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidUtf8(_)));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let err = from_slice(&[0x01, 0x02]).unwrap_err();
        assert!(matches!(err, DecodeError::TrailingBytes(1)));
    }

    #[test]
    fn decode_value_leaves_following_values() {
        let mut cursor = &[0x01, 0x81, b'x'][..];
        assert_eq!(decode_value(&mut cursor).unwrap(), Value::Integer(1));
        assert_eq!(decode_value(&mut cursor).unwrap(), Value::from("x"));
        assert!(!cursor.has_remaining());
    }
}
