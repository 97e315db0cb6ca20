// ABOUTME: Bearer identity tokens for Flowcraft
// ABOUTME: Token minting, hashing, constant-time verification, and revocation

pub mod api_tokens;

pub use api_tokens::{ApiToken, TokenGeneration, TokenStorage};
