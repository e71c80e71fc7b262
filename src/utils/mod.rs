pub mod amount;
pub mod evm_client;
pub mod health_check;
pub mod logger;
pub mod proxy;

// Re-export commonly used items
pub use evm_client::{derive_address, EvmClient};
pub use health_check::{log_health_check, perform_health_check};
pub use logger::{LogLevel, Logger};
pub use proxy::build_http_client;
