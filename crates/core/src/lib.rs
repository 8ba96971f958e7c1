//! EdTech tutoring core: a curriculum-restricted AI tutor.
//!
//! Each student message is first checked against the supported curriculum
//! by the [`classifier`], then answered (or politely redirected) by the
//! [`responder`]. The [`tutor`] module wires the two together.

pub mod classifier;
pub mod conversation;
pub mod error;
pub mod llm_client;
pub mod prompts;
pub mod responder;
pub mod tutor;
