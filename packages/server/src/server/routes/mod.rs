// HTTP routes
pub mod analyzer;
pub mod error;
pub mod health;

pub use analyzer::*;
pub use error::ApiError;
pub use health::*;
