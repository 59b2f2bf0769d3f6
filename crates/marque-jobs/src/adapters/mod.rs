//! External collaborator adapters.

pub mod brave_search;
pub mod readability_cli;

pub use brave_search::{BraveSearch, BRAVE_API_KEY_ENV};
pub use readability_cli::ReadabilityCli;
