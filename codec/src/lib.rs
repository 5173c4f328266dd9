#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(docsrs, allow(unused_attributes))]

//! # lean-rpc-codec
//!
//! This crate provides the wire codec for [`lean-rpc`](https://docs.rs/lean-rpc).
//!
//! ## Integers
//!
//! A signed 64-bit integer is written as 1 to 9 bytes. The first byte carries the sign
//! bit (`0x80`) and a 2-bit mode (`0x60`):
//!
//! | mode | payload bits in byte 0 | extra bytes | magnitude |
//! |------|------------------------|-------------|-----------|
//! | `00` | 5                      | 0           | `0..=31`  |
//! | `01` | 5                      | 1           | `0..=8191`|
//! | `10` | 5                      | 2           | `0..=2097151` |
//! | `11` | 2 + 3-bit byte count   | 1..=8       | up to 63 bits |
//!
//! A negative value `v` is stored as the magnitude `-(v + 1)` with the sign bit set,
//! so `-1` and `0` share magnitude `0`.
//!
//! ## Blobs and strings
//!
//! A blob is an integer length followed by the raw bytes. A string is a blob of UTF-8 text.
//!
//! The output side is [RespBuf], which may be a real buffer or a discard sink. Writing
//! into a discard sink is a no-op, so handlers can encode unconditionally even when
//! nobody will read the result.
//!
//! Decoders take a byte slice and return the value with the remaining bytes, or `None`
//! when the input is truncated or malformed. A failed decode consumes nothing.

mod blob;
pub use blob::*;
mod buf;
pub use buf::RespBuf;
mod integer;
pub use integer::*;
