//! BoltPack — a pure-Rust PackStream value encoder for the Bolt wire protocol.
//!
//! This crate turns a small closed set of value shapes (null, boolean,
//! integer, float, string, list, dict and tagged structure) into the compact,
//! self-describing byte stream that Neo4j and compatible graph databases read
//! off the wire. Bytes go straight to any [`std::io::Write`] sink.
//!
//! # Architecture
//!
//! - **`packstream`** — Marker table, encoder and reference decoder
//! - **`types`** — `Value`, `Structure` and the `Record` trait
//! - **`config`** — Length-field and record-layout options, nesting limit
//! - **`ser`** — Serde bridge from arbitrary Rust data to `Value`
//! - **`error`** — Encode and decode error types
//!
//! ```
//! use boltpack::{Value, packstream};
//!
//! let value = Value::List(vec![Value::Integer(1), Value::from("hi")]);
//! let bytes = packstream::to_vec(&value)?;
//! assert_eq!(bytes, [0x92, 0x01, 0x82, b'h', b'i']);
//! assert_eq!(packstream::from_slice(&bytes)?, value);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod error;
pub mod packstream;
pub mod ser;
pub mod types;

pub use config::{EncoderConfig, LengthEncoding, RecordLayout};
pub use error::{DecodeError, EncodeError};
pub use packstream::Encoder;
pub use types::{Dict, Record, Structure, Value};
