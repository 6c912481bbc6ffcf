//! forge
//!
//! Abstraction over the repository host's content API.
//!
//! # Architecture
//!
//! The `ContentForge` trait is the only surface the sync engine talks to.
//! Callers construct a concrete forge once and hand it to the engine as
//! `Arc<dyn ContentForge>`.
//!
//! - Forge failures are typed (`ForgeError`) and never read as "not found"
//! - Credentials are passed per call and never stored by a forge
//!
//! # Modules
//!
//! - `traits`: `ContentForge` trait and `ForgeError`
//! - [`github`]: GitHub REST implementation
//! - [`mock`]: In-memory implementation for deterministic testing
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use leetpush::forge::github::{GitHubForge, RemoteConfig};
//! use leetpush::sync::SyncEngine;
//!
//! let forge = GitHubForge::new(RemoteConfig::default())?;
//! let engine = SyncEngine::new(Arc::new(forge));
//! ```

pub mod github;
pub mod mock;
mod traits;

pub use traits::*;
