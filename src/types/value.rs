//! PackStream value types.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::EncodeError;

/// Type alias for PackStream dictionaries (maps with string keys).
///
/// Ordered so that equal dictionaries always encode to the same bytes.
pub type Dict = BTreeMap<String, Value>;

/// A value in the closed set of shapes PackStream can carry.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Dict(Dict),
    Structure(Structure),
}

impl Value {
    /// Name of the value's category, as used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Dict(_) => "dict",
            Self::Structure(_) => "structure",
        }
    }

    /// Returns the value as a string reference, if it is a `String` variant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an i64, if it is an `Integer` variant.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Anything that encodes as a PackStream structure.
///
/// A record exposes a one-byte signature identifying its kind and an ordered
/// list of fields, each of which is itself a [`Value`].
pub trait Record {
    fn signature(&self) -> u8;

    fn fields(&self) -> Cow<'_, [Value]>;
}

/// A tagged record held as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    pub signature: u8,
    pub fields: Vec<Value>,
}

impl Structure {
    pub fn new(signature: u8, fields: Vec<Value>) -> Self {
        Self { signature, fields }
    }

    /// Captures any [`Record`] as an owned `Structure`.
    pub fn from_record<R: Record + ?Sized>(record: &R) -> Self {
        Self {
            signature: record.signature(),
            fields: record.fields().into_owned(),
        }
    }
}

impl Record for Structure {
    fn signature(&self) -> u8 {
        self.signature
    }

    fn fields(&self) -> Cow<'_, [Value]> {
        Cow::Borrowed(&self.fields)
    }
}

// -- Convenience conversions --

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(i: $t) -> Self {
                    Self::Integer(i64::from(i))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl TryFrom<u64> for Value {
    type Error = EncodeError;

    fn try_from(u: u64) -> Result<Self, Self::Error> {
        i64::try_from(u)
            .map(Self::Integer)
            .map_err(|_| EncodeError::integer_overflow(u))
    }
}

impl TryFrom<usize> for Value {
    type Error = EncodeError;

    fn try_from(u: usize) -> Result<Self, Self::Error> {
        // usize is at most 64 bits on every supported target.
        Self::try_from(u as u64)
    }
}

impl TryFrom<i128> for Value {
    type Error = EncodeError;

    fn try_from(i: i128) -> Result<Self, Self::Error> {
        i64::try_from(i)
            .map(Self::Integer)
            .map_err(|_| EncodeError::integer_overflow(i))
    }
}

impl TryFrom<u128> for Value {
    type Error = EncodeError;

    fn try_from(u: u128) -> Result<Self, Self::Error> {
        match i64::try_from(u) {
            Ok(i) => Ok(Self::Integer(i)),
            // Anything this large is reported saturated to the i128 range.
            Err(_) => Err(EncodeError::integer_overflow(
                i128::try_from(u).unwrap_or(i128::MAX),
            )),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Self::Float(f64::from(f))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Self::String(c.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<Dict> for Value {
    fn from(d: Dict) -> Self {
        Self::Dict(d)
    }
}

impl From<Structure> for Value {
    fn from(s: Structure) -> Self {
        Self::Structure(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Dict(dict) => {
                write!(f, "{{")?;
                for (i, (k, v)) in dict.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            Self::Structure(s) => {
                write!(f, "struct<0x{:02X}>(", s.signature)?;
                for (i, field) in s.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{field}")?;
                }
                write!(f, ")")
            }
        }
    }
}
