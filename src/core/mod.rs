pub mod error;
pub mod llm;

pub use error::{ApiError, ConfigError};
pub use llm::{CompletionBackend, CompletionRequest, OpenAiClient};
