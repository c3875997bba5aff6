// CV-to-job matching: lexical full-text recall (stage 1) followed by a
// concurrent LLM re-rank (stage 2), blended into a single final score.
// All LLM calls go through llm_client — no direct Anthropic API calls here.

pub mod handlers;
pub mod matcher;
pub mod prompts;
pub mod query;
pub mod stores;
