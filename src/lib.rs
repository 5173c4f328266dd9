#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(docsrs, allow(unused_attributes))]

//! # lean-rpc
//!
//! A minimal RPC substrate meant to sit under a transport. It decodes a request, routes it
//! to a registered service or to a built-in server function, and assembles the response.
//! In-flight service calls can be cancelled by a later request that names their id.
//!
//! ## Components
//!
//! - [`lean-rpc-codec`](https://docs.rs/lean-rpc-codec): The variable-length integer, blob and
//!   string codec, and the [RespBuf](crate::RespBuf) output buffer.
//! - [server::Dispatcher]: Owns the services and the cancellation registry.
//! - [CallContext](crate::context::CallContext): The cancellable context handed to every
//!   service call.
//!
//! ## Protocol
//!
//! A request is `integer(request_id) | integer(service_id) | integer(function_id) | payload`.
//!
//! A response is `integer(request_id) | integer(status) | body`, where status `1` means
//! success and `0` means failure (unknown service or function, bad payload, or cancelled).
//!
//! A request with `request_id <= 0` is one-way: it is executed, but never answered.
//!
//! Service id `0` addresses the server itself:
//!
//! - function `0`: list services, the body is the count followed by `(id, revision)` pairs.
//! - function `1`: cancel the in-flight call whose request id is in the payload.
//! - function `2`: echo, sleep for the number of milliseconds in the payload, then return
//!   the rest of the payload verbatim.
//!
//! ## Usage
//!
//! Implement [ServerService](crate::server::ServerService) for each service, create a
//! [Dispatcher](crate::server::Dispatcher), and feed it request bytes from the transport with
//! [process_request](crate::server::Dispatcher::process_request).

#[macro_use]
extern crate captains_log;

pub mod context;
pub mod error;
pub mod server;
// re-export so that service implementations only need one crate
pub use lean_rpc_codec::{self as codec, RespBuf};
