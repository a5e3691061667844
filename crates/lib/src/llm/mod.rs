//! Language-model backend (OpenAI-compatible chat completions) and the model fallback chain
//! used for messages that match no intent.

mod chat_completions;
mod fallback;

pub use chat_completions::{
    ChatCompletionsClient, ChatMessage, Choice, ChoiceMessage, CompletionResponse,
    LanguageModelAdapter, SamplingParams,
};
pub use fallback::{FallbackChain, ALL_MODELS_FAILED_REPLY, NOT_CONNECTED_REPLY};
