//! External research capabilities: semantic extraction over the LLM and web search.

pub mod prompts;
pub mod search;
pub mod semantic;
