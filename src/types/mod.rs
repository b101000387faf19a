//! PackStream value types and the record capability.

mod value;

pub use value::{Dict, Record, Structure, Value};
