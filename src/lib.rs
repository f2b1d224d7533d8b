// ABOUTME: BONJSON (Binary Object Notation for JSON) core codec for Rust.
// ABOUTME: Event-driven encoder and decoder over a delimiter-terminated binary wire format.

//! # bonjson_core
//!
//! BONJSON is a compact binary encoding isomorphic to JSON: every JSON
//! document has exactly one canonical BONJSON byte sequence (up to
//! numeric-encoding choice), and every valid BONJSON document decodes to
//! exactly one JSON value tree.
//!
//! This crate is the core codec: an event-driven [`Encoder`] that writes
//! through a [`Sink`], and a single-pass [`decode`] function that walks a
//! byte buffer and dispatches typed events to a [`Visitor`]. Neither side
//! builds a value tree or validates string payloads as UTF-8 — both are
//! left to the caller.
//!
//! ## Quick start
//!
//! ```rust
//! use bonjson_core::{decode, Encoder, Visitor};
//! use std::convert::Infallible;
//!
//! let mut buf = Vec::new();
//! let mut enc = Encoder::new(&mut buf);
//! enc.begin_object().unwrap();
//! enc.add_string(b"answer").unwrap();
//! enc.add_signed_int(42).unwrap();
//! enc.end_container().unwrap();
//! let (_, result) = enc.end();
//! result.unwrap();
//!
//! struct Printer;
//! impl Visitor for Printer {
//!     type Error = Infallible;
//!     fn visit_null(&mut self) -> Result<(), Infallible> { Ok(()) }
//!     fn visit_bool(&mut self, _: bool) -> Result<(), Infallible> { Ok(()) }
//!     fn visit_i64(&mut self, _: i64) -> Result<(), Infallible> { Ok(()) }
//!     fn visit_u64(&mut self, _: u64) -> Result<(), Infallible> { Ok(()) }
//!     fn visit_f64(&mut self, _: f64) -> Result<(), Infallible> { Ok(()) }
//!     fn visit_big_number(&mut self, _: bonjson_core::BigNumber) -> Result<(), Infallible> { Ok(()) }
//!     fn visit_str(&mut self, _: &[u8]) -> Result<(), Infallible> { Ok(()) }
//!     fn visit_begin_array(&mut self) -> Result<(), Infallible> { Ok(()) }
//!     fn visit_begin_object(&mut self) -> Result<(), Infallible> { Ok(()) }
//!     fn visit_end_container(&mut self) -> Result<(), Infallible> { Ok(()) }
//!     fn visit_end_data(&mut self) -> Result<(), Infallible> { Ok(()) }
//! }
//!
//! let (consumed, result) = decode(&buf, &mut Printer);
//! assert_eq!(consumed, buf.len());
//! result.unwrap();
//! ```
//!
//! ## Resource limits
//!
//! Both sides carry no heap allocation: container nesting is bounded by
//! the compile-time [`MAX_DEPTH`] (default 200), enforced through a
//! fixed-size frame stack rather than a growable collection.

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod types;

pub use decoder::{decode, decode_with_config, DecoderConfig, Visitor};
pub use encoder::{encode_to_vec, Encoder, Sink};
pub use error::Error;
pub use types::{type_code, BigNumber, MAX_DEPTH};
