// Interview engine: question generation, answer drafting and transcript feedback.
// All model calls go through llm_client; nothing here talks to Anthropic directly.

pub mod actions;
pub mod flows;
pub mod handlers;
pub mod prompts;
pub mod schemas;
pub mod template;
pub mod transcript;
