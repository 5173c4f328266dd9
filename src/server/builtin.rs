use super::Dispatcher;
use crate::error::CallError;
use lean_rpc_codec::{RespBuf, decode_integer};
use std::time::Duration;

/// The service id addressing the server's own functions
pub const SERVER_SERVICE_ID: i64 = 0;

/// List the registered services: count, then `(id, revision)` in registration order
pub const FUNC_GET_SERVICES: i64 = 0;
/// Cancel the in-flight call of the request id in the payload
pub const FUNC_CANCEL: i64 = 1;
/// Sleep for the milliseconds in the payload, then return the rest of the payload
pub const FUNC_ECHO: i64 = 2;

impl Dispatcher {
    pub(super) async fn call_function_on_server(
        &self, function_id: i64, req: &[u8], resp: &mut RespBuf,
    ) -> Result<(), CallError> {
        match function_id {
            FUNC_GET_SERVICES => {
                self.handle_get_services(resp);
                Ok(())
            }
            FUNC_CANCEL => {
                self.handle_cancel(req);
                Ok(())
            }
            FUNC_ECHO => {
                handle_echo(req, resp).await;
                Ok(())
            }
            _ => Err(CallError::UnknownFunction(function_id)),
        }
    }

    fn handle_get_services(&self, resp: &mut RespBuf) {
        resp.put_integer(self.services.len() as i64);
        for service in self.services.iter() {
            resp.put_integer(service.service_id());
            resp.put_str(service.revision());
        }
    }

    fn handle_cancel(&self, req: &[u8]) {
        let Some((target, _)) = decode_integer(req) else {
            logger_debug!(self.logger, "cancel request without a target");
            return;
        };
        if self.canceller.cancel(target) {
            logger_debug!(self.logger, "req(id={}) cancelled", target);
        } else {
            logger_debug!(self.logger, "req(id={}) not in flight, nothing to cancel", target);
        }
    }
}

// Does not watch the call context, cancelling an echo has no effect.
async fn handle_echo(req: &[u8], resp: &mut RespBuf) {
    let (wait_ms, rest) = decode_integer(req).unwrap_or((0, &[][..]));
    if wait_ms > 0 {
        tokio::time::sleep(Duration::from_millis(wait_ms as u64)).await;
    }
    resp.extend_raw(rest);
}
