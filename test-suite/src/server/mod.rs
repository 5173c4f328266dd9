mod service;
pub use service::*;

#[cfg(test)]
mod test_cancel;
