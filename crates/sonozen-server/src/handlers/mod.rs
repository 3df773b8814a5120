pub mod analyze;
pub mod health;

pub use analyze::{analyze_sleep_handler, ApiError};
pub use health::health_handler;
