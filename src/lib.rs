//! leetpush - push solved coding problems to GitHub and keep score
//!
//! leetpush commits a solution file to a GitHub repository through the
//! contents API, creating the repository on first use, and records each new
//! solution with its difficulty and points.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to push)
//! - [`push`] - Resolves identity and target, syncs, records the push log
//! - [`sync`] - The idempotent content-sync protocol
//! - [`forge`] - Abstraction over the repository host (GitHub, mock)
//! - [`core`] - Domain types, naming rules and configuration
//! - [`secrets`] - Token storage
//!
//! # Guarantees
//!
//! 1. A file whose remote content already matches is never rewritten
//! 2. At most one write per sync call
//! 3. Malformed input fails before any network call
//! 4. Every remote failure is a typed error, never a silent "not found"

pub mod cli;
pub mod core;
pub mod forge;
pub mod push;
pub mod secrets;
pub mod sync;
