// Presentation layer - HTTP surface over the read-only dashboard operations
pub mod app_state;
pub mod handlers;
