//! core
//!
//! Core domain types, naming rules, and configuration.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Credential, RepositoryRef, FileTarget, etc.
//! - [`naming`] - Submission filename conventions
//! - [`config`] - Configuration schema and loading

pub mod config;
pub mod naming;
pub mod types;
