// Domain layer - bounded viewer state and wire types
pub mod error;
pub mod log_buffer;
pub mod protocol;
pub mod sample;
pub mod series_buffer;
pub mod threshold;
