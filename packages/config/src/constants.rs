// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used across Flowcraft

// Server Configuration
pub const FLOWCRAFT_API_PORT: &str = "FLOWCRAFT_API_PORT";
pub const FLOWCRAFT_API_HOST: &str = "FLOWCRAFT_API_HOST";
pub const FLOWCRAFT_DB_PATH: &str = "FLOWCRAFT_DB_PATH";

// CORS Configuration
pub const FLOWCRAFT_CORS_ORIGINS: &str = "FLOWCRAFT_CORS_ORIGINS";
pub const FLOWCRAFT_CORS_DEFAULT_ORIGIN: &str = "FLOWCRAFT_CORS_DEFAULT_ORIGIN";

// Client Configuration
pub const FLOWCRAFT_API_URL: &str = "FLOWCRAFT_API_URL";
pub const FLOWCRAFT_TOKEN: &str = "FLOWCRAFT_TOKEN";
pub const FLOWCRAFT_HTTP_TIMEOUT_SECS: &str = "FLOWCRAFT_HTTP_TIMEOUT_SECS";
pub const FLOWCRAFT_EVENTS_PATH: &str = "FLOWCRAFT_EVENTS_PATH";

// Defaults
pub const DEFAULT_API_PORT: u16 = 4001;
pub const DEFAULT_API_HOST: &str = "127.0.0.1";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:4001";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:5173", "http://127.0.0.1:5173"];
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
