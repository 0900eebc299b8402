// Infrastructure layer - configuration and transport adapters
pub mod config;
pub mod websocket;
