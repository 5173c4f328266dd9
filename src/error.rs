//! Error types of the dispatcher.
//!
//! Wire format errors are not here, the decoders in [lean_rpc_codec] report them as `None`.

use thiserror::Error;

/// Rejection of a service list when creating a [Dispatcher](crate::server::Dispatcher)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServerError {
    #[error("could not create server: service at index {index} has invalid id {id}")]
    InvalidServiceId { index: usize, id: i64 },
    #[error("could not create server: services at indices {first} and {second} have the same id {id}")]
    DuplicateServiceId { first: usize, second: usize, id: i64 },
}

/// Failure of a single call, answered with status `0` and no body.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallError {
    #[error("unknown service {0}")]
    UnknownService(i64),
    #[error("unknown function {0}")]
    UnknownFunction(i64),
    /// The payload could not be decoded
    #[error("bad request")]
    BadRequest,
    /// The call was cancelled before its result was delivered
    #[error("cancelled")]
    Cancelled,
}
