// ABOUTME: Identity token module
// ABOUTME: Each token maps a bearer secret to the user it authenticates

pub mod storage;
pub mod types;

pub use storage::TokenStorage;
pub use types::{ApiToken, TokenGeneration};
