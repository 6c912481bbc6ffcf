//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Resolves what it needs from configuration (forge, stores, token)
//! 2. Calls into the library
//! 3. Formats and displays output
//!
//! # Async Commands
//!
//! Commands that talk to GitHub run on a tokio runtime created for the
//! duration of the command.

mod auth;
mod log_cmd;
mod push;

pub use auth::{login, logout, status};
pub use log_cmd::log;
pub use push::push;

use std::sync::Arc;

use anyhow::{anyhow, Context as _, Result};
use tokio::runtime::Runtime;

use super::args::{AuthAction, Command};
use super::Context;
use crate::core::types::Credential;
use crate::forge::github::GitHubForge;
use crate::secrets::{self, FileSecretStore, SecretStore, TokenOrigin, TOKEN_ENV};
use crate::sync::{SyncEngine, SyncError};

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Auth(AuthAction::Login { token_stdin }) => login(ctx, token_stdin),
        Command::Auth(AuthAction::Status) => status(ctx),
        Command::Auth(AuthAction::Logout) => logout(ctx),
        Command::Push { file, repo, path } => push(ctx, &file, repo, path),
        Command::Log { user } => log(ctx, user.as_deref()),
    }
}

/// The configured secret store.
fn secret_store(ctx: &Context) -> Result<FileSecretStore> {
    let path = ctx
        .config
        .secrets_path()
        .context("Failed to locate secret store")?;
    Ok(FileSecretStore::with_path(path))
}

/// The token to use, from `$LEETPUSH_TOKEN` or the secret store.
fn credential(store: &dyn SecretStore) -> Result<(Credential, TokenOrigin)> {
    secrets::resolve_token(std::env::var(TOKEN_ENV).ok(), store)
        .context("Failed to read stored token")?
        .ok_or_else(|| {
            anyhow!(
                "Not authenticated. Run 'leetpush auth login' or set ${}.",
                TOKEN_ENV
            )
        })
}

/// A sync engine over the configured GitHub API.
fn sync_engine(ctx: &Context) -> Result<SyncEngine> {
    let forge = GitHubForge::new(ctx.config.remote_config())
        .context("Failed to set up the GitHub client")?;
    Ok(SyncEngine::new(Arc::new(forge)))
}

fn runtime() -> Result<Runtime> {
    Runtime::new().context("Failed to start async runtime")
}

/// Turn a sync failure into a user-facing error, with a hint when trying
/// again could help.
fn explain(err: SyncError) -> anyhow::Error {
    if err.is_retryable() {
        anyhow!("{} (this may be temporary; try again)", err)
    } else {
        anyhow!(err)
    }
}
