// Business domains
pub mod analyzer;
pub mod identity;
