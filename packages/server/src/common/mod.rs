// Common types shared across the application

pub mod ids;

pub use ids::SessionId;
