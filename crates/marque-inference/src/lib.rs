//! # marque-inference
//!
//! Chat-completion backend abstraction for marque.
//!
//! This crate provides:
//! - The [`OllamaBackend`] implementation of
//!   [`marque_core::GenerationBackend`] (Ollama `/api/chat`, non-streaming)
//! - A scripted [`mock::MockBackend`] for tests (feature `mock`)
//!
//! The pipeline's prompts request strict machine-parseable output; callers
//! treat any deviation as a failure rather than attempting a best-effort
//! parse.
//!
//! # Example
//!
//! ```rust,no_run
//! use marque_inference::OllamaBackend;
//! use marque_core::GenerationBackend;
//!
//! # async fn run() -> marque_core::Result<()> {
//! let backend = OllamaBackend::from_env()?;
//! let reply = backend.generate("Summarize: ...").await?;
//! # Ok(())
//! # }
//! ```

pub mod ollama;

// Mock generation backend for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use marque_core::*;

pub use ollama::OllamaBackend;
