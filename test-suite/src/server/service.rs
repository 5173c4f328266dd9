use async_trait::async_trait;
use lean_rpc::context::CallContext;
use lean_rpc::error::CallError;
use lean_rpc::server::{Dispatcher, ServerService};
use lean_rpc_codec::{RespBuf, decode_integer, decode_str};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;

pub const FUNC_APPEND_STRING: i64 = 1;
pub const FUNC_ADD_NUMS: i64 = 2;
/// Sleeps 200ms without looking at its context
pub const FUNC_WAIT_A_LITTLE: i64 = 3;
/// Sleeps up to 5s, returns as soon as its context is cancelled
pub const FUNC_WAIT_CANCELLABLE: i64 = 4;
/// Sleeps 1s without looking at its context
pub const FUNC_WAIT_LONG: i64 = 5;

#[derive(Debug, Default)]
pub struct TestService {
    pub id: i64,
    pub revision: String,
    pub value: Mutex<String>,
    pub add_result: AtomicI64,
    pub saw_cancel: AtomicBool,
}

impl TestService {
    pub fn new(id: i64, revision: &str) -> Self {
        Self { id, revision: revision.to_string(), ..Default::default() }
    }

    pub fn with_value(id: i64, revision: &str, value: &str) -> Self {
        let s = Self::new(id, revision);
        *s.value.lock() = value.to_string();
        s
    }
}

#[async_trait]
impl ServerService for TestService {
    fn service_id(&self) -> i64 {
        self.id
    }

    fn revision(&self) -> &str {
        &self.revision
    }

    async fn call_function(
        &self, ctx: &CallContext, function_id: i64, req: &[u8], resp: &mut RespBuf,
    ) -> Result<(), CallError> {
        match function_id {
            FUNC_APPEND_STRING => {
                let (s, _) = decode_str(req).ok_or(CallError::BadRequest)?;
                let mut value = self.value.lock();
                value.push_str(s);
                resp.put_str(&value);
                Ok(())
            }
            FUNC_ADD_NUMS => {
                let (a, req) = decode_integer(req).ok_or(CallError::BadRequest)?;
                let (b, _) = decode_integer(req).ok_or(CallError::BadRequest)?;
                self.add_result.store(a + b, Ordering::SeqCst);
                resp.put_integer(a + b);
                Ok(())
            }
            FUNC_WAIT_A_LITTLE => {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(())
            }
            FUNC_WAIT_LONG => {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok(())
            }
            FUNC_WAIT_CANCELLABLE => {
                tokio::select! {
                    _ = ctx.cancelled() => {
                        self.saw_cancel.store(true, Ordering::SeqCst);
                        Err(CallError::Cancelled)
                    }
                    _ = tokio::time::sleep(Duration::from_secs(5)) => {
                        resp.put_integer(5000);
                        Ok(())
                    }
                }
            }
            _ => Err(CallError::UnknownFunction(function_id)),
        }
    }
}

/// Wait until `n` service calls are registered on `server`.
pub async fn wait_in_flight(server: &Dispatcher, n: usize) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while server.in_flight() != n {
        assert!(tokio::time::Instant::now() < deadline, "in_flight never reached {}", n);
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

pub fn new_dispatcher(services: &[Arc<TestService>]) -> Dispatcher {
    Dispatcher::new(services.iter().map(|s| s.clone() as Arc<dyn ServerService>).collect())
        .expect("create dispatcher")
}
