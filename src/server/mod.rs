//! This module contains the server-side dispatcher and the trait services implement.
//!

use crate::context::CallContext;
use crate::error::{CallError, ServerError};
use captains_log::filter::LogFilter;
use lean_rpc_codec::{RespBuf, decode_integer, encode_integer};
use std::sync::Arc;

mod builtin;
pub use builtin::*;

mod cancel;
pub use cancel::{CallSlot, CancelRegistry};

/// Response status of a successful call
pub const STATUS_OK: i64 = 1;
/// Response status of a failed, unknown or cancelled call
pub const STATUS_FAILED: i64 = 0;

/// A service registered on the [Dispatcher].
///
/// Usually implemented by generated stubs, which decode the arguments of `function_id` from
/// `req` and append the encoded result to `resp`, both with [lean_rpc_codec].
///
/// `resp` is a discard sink for one-way requests, writing into it is harmless.
#[async_trait::async_trait]
pub trait ServerService: Send + Sync {
    /// Must be constant and strictly positive.
    fn service_id(&self) -> i64;

    /// An opaque version tag of the service.
    fn revision(&self) -> &str;

    /// Handle one call.
    ///
    /// The implementation should return early when `ctx` is cancelled, though the result of
    /// a cancelled call is dropped either way. Return [CallError::UnknownFunction] for a
    /// function it does not have, and [CallError::BadRequest] when `req` cannot be decoded.
    async fn call_function(
        &self, ctx: &CallContext, function_id: i64, req: &[u8], resp: &mut RespBuf,
    ) -> Result<(), CallError>;
}

/// Routes decoded requests to the registered services and the built-in server functions.
///
/// The dispatcher is shared between all in-flight requests, wrap it in an `Arc` to process
/// requests on several tasks.
pub struct Dispatcher {
    services: Vec<Arc<dyn ServerService>>,
    canceller: Arc<CancelRegistry>,
    logger: Arc<LogFilter>,
}

impl Dispatcher {
    /// Create a dispatcher with its own log filter.
    ///
    /// Fails if any service has an id `<= 0`, or if two services share an id.
    pub fn new(services: Vec<Arc<dyn ServerService>>) -> Result<Self, ServerError> {
        Self::with_logger(services, Arc::new(LogFilter::new()))
    }

    /// Create a dispatcher logging through `logger`, which may be shared with a transport.
    pub fn with_logger(
        services: Vec<Arc<dyn ServerService>>, logger: Arc<LogFilter>,
    ) -> Result<Self, ServerError> {
        for (index, service) in services.iter().enumerate() {
            let id = service.service_id();
            if id <= 0 {
                return Err(ServerError::InvalidServiceId { index, id });
            }
            if let Some(first) = services[..index].iter().position(|s| s.service_id() == id) {
                return Err(ServerError::DuplicateServiceId { first, second: index, id });
            }
        }
        Ok(Self { services, canceller: Arc::new(CancelRegistry::new()), logger })
    }

    #[inline]
    pub fn services(&self) -> &[Arc<dyn ServerService>] {
        &self.services
    }

    /// Number of service calls that can currently be cancelled
    #[inline]
    pub fn in_flight(&self) -> usize {
        self.canceller.len()
    }

    #[inline]
    pub fn logger(&self) -> &Arc<LogFilter> {
        &self.logger
    }

    #[inline]
    pub fn set_log_level(&self, level: log::Level) {
        self.logger.set_level(level);
    }

    /// Process a request, and append the response to `resp`.
    ///
    /// Returns `None` when no response should be sent: the header is malformed, or the
    /// request is one-way (`request_id <= 0`). Otherwise returns `resp` followed by the
    /// request id, the status and, on success, the body.
    pub async fn process_request(
        &self, ctx: &CallContext, req: &[u8], mut resp: Vec<u8>,
    ) -> Option<Vec<u8>> {
        let Some((req_id, service_id, function_id, payload)) = parse_header(req) else {
            logger_warn!(self.logger, "drop request with malformed header ({} bytes)", req.len());
            return None;
        };
        logger_trace!(
            self.logger,
            "req(id={}, service={}, function={}, payload={} bytes)",
            req_id,
            service_id,
            function_id,
            payload.len()
        );

        let original_len = resp.len();
        let mut buf = if req_id > 0 {
            encode_integer(&mut resp, req_id);
            encode_integer(&mut resp, STATUS_OK);
            RespBuf::new(resp)
        } else {
            RespBuf::discard()
        };

        let res = self.handle_service(ctx, req_id, service_id, function_id, payload, &mut buf).await;
        if req_id <= 0 {
            return None;
        }
        let mut resp = buf.into_inner()?;
        if let Err(e) = res {
            logger_debug!(self.logger, "req(id={}) failed: {}", req_id, e);
            resp.truncate(original_len);
            encode_integer(&mut resp, req_id);
            encode_integer(&mut resp, STATUS_FAILED);
        }
        Some(resp)
    }

    async fn handle_service(
        &self, ctx: &CallContext, req_id: i64, service_id: i64, function_id: i64, req: &[u8],
        resp: &mut RespBuf,
    ) -> Result<(), CallError> {
        if service_id == SERVER_SERVICE_ID {
            return self.call_function_on_server(function_id, req, resp).await;
        }
        match self.services.iter().find(|s| s.service_id() == service_id) {
            Some(service) => {
                self.call_function_on_service(ctx, service.as_ref(), req_id, function_id, req, resp)
                    .await
            }
            None => Err(CallError::UnknownService(service_id)),
        }
    }

    async fn call_function_on_service(
        &self, ctx: &CallContext, service: &dyn ServerService, req_id: i64, function_id: i64,
        req: &[u8], resp: &mut RespBuf,
    ) -> Result<(), CallError> {
        let (call_ctx, slot) = self.canceller.enter(ctx, req_id);
        logger_debug!(
            self.logger,
            "req(id={}) call service {} function {}",
            req_id,
            service.service_id(),
            function_id
        );
        let res = service.call_function(&call_ctx, function_id, req, resp).await;
        if slot.finish() {
            logger_warn!(self.logger, "req(id={}) cancelled, result dropped", req_id);
            return Err(CallError::Cancelled);
        }
        res
    }
}

fn parse_header(req: &[u8]) -> Option<(i64, i64, i64, &[u8])> {
    let (req_id, req) = decode_integer(req)?;
    let (service_id, req) = decode_integer(req)?;
    let (function_id, req) = decode_integer(req)?;
    Some((req_id, service_id, function_id, req))
}
