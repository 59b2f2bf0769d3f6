//! # marque-client
//!
//! Typed HTTP client for linkding-compatible bookmark services.
//!
//! This crate provides:
//! - [`LinkdingClient`]: one operation per resource/verb (bookmarks, assets,
//!   tags, bundles, user profile), token auth, multipart asset upload
//! - Status-code classification into the marque error taxonomy
//! - [`PageWalker`]: lazy, forward-only walking of cursor-paginated listings
//!
//! ## Example
//!
//! ```rust,ignore
//! use marque_client::{ClientConfig, LinkdingClient, ListParams, PageWalker};
//! use marque_core::Bookmark;
//!
//! let client = LinkdingClient::new(ClientConfig::from_env())?;
//! let mut walker: PageWalker<Bookmark> =
//!     PageWalker::new(&client, "api/bookmarks/", ListParams::default());
//! while let Some(bookmark) = walker.try_next().await? {
//!     println!("{}", bookmark.url);
//! }
//! ```

pub mod client;
pub mod pagination;

// Re-export core types
pub use marque_core::*;

pub use client::{ClientConfig, LinkdingClient, ListParams, Page, API_KEY_ENV, HOST_ENV};
pub use pagination::PageWalker;
