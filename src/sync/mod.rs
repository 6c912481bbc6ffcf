//! sync
//!
//! Content synchronization: make one file in a remote repository hold the
//! given bytes, with as few writes as possible.
//!
//! # Modules
//!
//! - [`engine`] - The sync protocol and its phases
//! - [`error`] - `SyncError` and its machine-readable kinds
//!
//! # Outcomes
//!
//! A successful call yields a [`SyncOutcome`](crate::core::types::SyncOutcome):
//! `Unchanged`, `Created` or `Updated`. A failed call yields a [`SyncError`]
//! whose [`kind`](SyncError::kind) says what went wrong and whether a retry
//! could help.

pub mod engine;
pub mod error;

pub use engine::{content_matches, SyncEngine, SyncPhase};
pub use error::{SyncError, SyncErrorKind};
