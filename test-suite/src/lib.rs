pub mod server;

extern crate captains_log;
extern crate log;
pub use captains_log::logfn;
use captains_log::*;
use rstest::*;
use std::fmt;
use std::future::Future;
use tokio::runtime::Runtime;

pub fn new_rt() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(
            std::thread::available_parallelism()
                .unwrap_or(std::num::NonZero::new(2).unwrap())
                .into(),
        )
        .enable_all()
        .build()
        .expect("runtime")
}

#[fixture]
pub fn runner() -> TestRunner {
    TestRunner::new()
}

impl fmt::Debug for TestRunner {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "")
    }
}

pub struct TestRunner {
    pub rt: Runtime,
}

impl TestRunner {
    pub fn new() -> Self {
        recipe::raw_file_logger("/tmp/lean_rpc_test.log", Level::Trace).test().build().expect("log");
        Self { rt: new_rt() }
    }

    pub fn block_on<F: Future<Output = ()>>(&self, f: F) {
        self.rt.block_on(f);
    }
}
