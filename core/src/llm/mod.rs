//! LLM module: generation backend, prompt templates, and the notice composer
//!
//! This module provides:
//! - `GenerationBackend` raw status/body contract and its `MistralBackend` implementation
//! - `build_notice_prompt` / `fallback_notice` templates
//! - `NoticeComposer` which turns a `DebtReport` into a `NoticeResult`, never failing

mod client;
mod composer;
mod prompt;

pub use client::{
    extract_text_from_chat_completions, GenerationBackend, GenerationError, GenerationReply,
    MistralBackend, ModelParams,
};
pub use composer::NoticeComposer;
pub use prompt::{build_notice_prompt, fallback_notice};
