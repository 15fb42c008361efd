//! Summarization Module
//!
//! Minutes generation from a full transcript via a remote chat-completions
//! API.

mod openai;
mod prompt;

pub use openai::*;
pub use prompt::*;
