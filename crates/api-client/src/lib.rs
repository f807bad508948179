pub mod chat;
pub mod error;
pub mod market;

// --- Public API ---
pub use chat::{default_backends, default_base_url, ChatApi, ClientFactory, LlmClient, LlmClientFactory};
pub use error::ApiError;
pub use market::{MarketApi, MarketClient};
