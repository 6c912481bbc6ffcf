//! cli::commands::auth
//!
//! Store, inspect and remove the GitHub token.
//!
//! The token is verified against GitHub before it is stored, and is never
//! printed.
//!
//! # Example
//!
//! ```bash
//! # Prompt for the token (input hidden)
//! leetpush auth login
//!
//! # Non-interactive
//! echo "$GH_TOKEN" | leetpush auth login --token-stdin
//!
//! leetpush auth status
//! leetpush auth logout
//! ```

use std::io::{self, Read};

use anyhow::{bail, Context as _, Result};

use super::{credential, explain, runtime, secret_store, sync_engine};
use crate::cli::Context;
use crate::core::types::Credential;
use crate::secrets::{SecretStore, GITHUB_TOKEN_KEY, TOKEN_ENV};

/// Verify a token and store it.
pub fn login(ctx: &Context, token_stdin: bool) -> Result<()> {
    let token = read_token(ctx, token_stdin)?;
    validate_token(&token)?;

    let engine = sync_engine(ctx)?;
    let (identity, _) = runtime()?
        .block_on(engine.authenticate(&Credential::new(token.as_str())))
        .map_err(explain)?;

    let store = secret_store(ctx)?;
    store
        .set(GITHUB_TOKEN_KEY, &token)
        .context("Failed to store token")?;

    if ctx.quiet {
        println!("{}", identity.login);
    } else {
        println!(
            "Logged in as {} (authorization scheme: {}).",
            identity.login, identity.scheme
        );
    }
    Ok(())
}

/// Show who the current token authenticates as.
pub fn status(ctx: &Context) -> Result<()> {
    let store = secret_store(ctx)?;
    let (credential, origin) = match credential(&store) {
        Ok(found) => found,
        Err(_) => {
            if ctx.quiet {
                println!("not_authenticated");
            } else {
                println!("Not authenticated.");
                println!("Run 'leetpush auth login' or set ${}.", TOKEN_ENV);
            }
            return Ok(());
        }
    };

    let engine = sync_engine(ctx)?;
    let (identity, _) = runtime()?
        .block_on(engine.authenticate(&credential))
        .map_err(explain)?;

    if ctx.quiet {
        println!("{}", identity.login);
    } else {
        println!(
            "Authenticated as {} using the {} scheme (token from {}).",
            identity.login, identity.scheme, origin
        );
    }
    Ok(())
}

/// Remove the stored token.
pub fn logout(ctx: &Context) -> Result<()> {
    let store = secret_store(ctx)?;
    store
        .delete(GITHUB_TOKEN_KEY)
        .context("Failed to remove stored token")?;

    if !ctx.quiet {
        println!("Logged out.");
        if std::env::var_os(TOKEN_ENV).is_some() {
            println!("Note: ${} is still set and will be used.", TOKEN_ENV);
        }
    }
    Ok(())
}

fn read_token(ctx: &Context, token_stdin: bool) -> Result<String> {
    if token_stdin {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read token from stdin")?;
        return Ok(input.trim().to_string());
    }

    if ctx.quiet {
        bail!("Token required. Use --token-stdin when running non-interactively.");
    }

    let token = rpassword::prompt_password("GitHub token: ").context("Failed to read token")?;
    Ok(token.trim().to_string())
}

/// Reject obvious paste mistakes before going to the network.
fn validate_token(token: &str) -> Result<()> {
    if token.is_empty() {
        bail!("Token cannot be empty.");
    }
    if token.chars().any(char::is_whitespace) {
        bail!("Token should not contain whitespace.");
    }
    if token.chars().any(|c| c.is_control()) {
        bail!("Token should not contain control characters.");
    }
    Ok(())
}
