//! AI-based offer extraction for backends that only yield raw markup.

mod llm;
mod markup;

pub use llm::{AnthropicClient, CompletionRequest, LlmClient, LlmError};
pub use markup::{clean_markup, extract_offers, parse_extraction};
