// Domain layer - value types shared by every other layer
pub mod errors;
pub mod layout;
pub mod metrics;
pub mod preset;
