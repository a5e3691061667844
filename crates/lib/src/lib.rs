//! linebot core library: LINE webhook gateway, intent dispatch, provider adapters, and the
//! language-model fallback chain, used by the CLI.

pub mod adapters;
pub mod channels;
pub mod config;
pub mod dispatcher;
pub mod gateway;
pub mod init;
pub mod intents;
pub mod llm;

#[cfg(test)]
mod fakes;
