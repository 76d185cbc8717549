pub mod logging;
pub mod retry;

pub use retry::with_retries;
