pub mod logging;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod request_log;
