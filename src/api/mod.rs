pub mod client;
pub mod models;
pub mod response;

pub use client::{normalize_endpoint, ChatModel, OpenAiCompatibleModel};
pub use models::{ModelResponse, RequestBody};
