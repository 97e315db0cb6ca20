// ABOUTME: Configuration and environment variable management for Flowcraft
// ABOUTME: Centralised variable names plus validated server and client settings

pub mod constants;
pub mod settings;

pub use settings::{ClientConfig, ConfigError, CorsPolicy, ServerConfig};
