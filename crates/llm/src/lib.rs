//! Chat-completion backend for quiz generation.
//!
//! Sends cleaned slide text to an OpenAI-compatible chat-completion API and
//! turns the single reply into question blocks and a summary.

pub mod client;

pub use client::{LlmConfig, QuizClient};
