//! Generation backend seam.
//!
//! - [`backend`] -- the [`GenerationBackend`] trait implemented by every backend.
//! - [`openai`] -- OpenAI-compatible chat completions client.
//! - [`mock`] -- template backend for local development and tests.
//! - [`retry`] -- generic retry with fixed or multiplied backoff.
//! - [`budget`] -- token estimation and the pre-flight size guard.
//! - [`prompt`] -- builds a [`GenerationRequest`] from form data.
//! - [`parser`] -- turns raw backend text into typed sections.

pub mod backend;
pub mod budget;
pub mod error;
pub mod mock;
pub mod openai;
pub mod parser;
pub mod prompt;
pub mod retry;

pub use backend::{GenerationBackend, GenerationRequest, GenerationResponse};
pub use error::GenerationError;
