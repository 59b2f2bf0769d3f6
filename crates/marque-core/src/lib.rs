//! # marque-core
//!
//! Core types, traits, and abstractions for the marque bookmark enrichment
//! pipeline.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the other marque crates depend on: the bookmark wire models, the
//! enrichment event log model, the job queue model, and the collaborator
//! traits (chat completion, web search, content extraction).

pub mod defaults;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod traits;
pub mod uuid_utils;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use events::{Event, EventAction, EventExtra};
pub use models::*;
pub use traits::*;
pub use uuid_utils::{is_v7, new_v7};
