//! cli::commands::push
//!
//! Push a local solution file.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context as _, Result};
use tracing::debug;

use super::{credential, explain, runtime, secret_store, sync_engine};
use crate::cli::Context;
use crate::core::config::Config;
use crate::core::types::SyncOutcome;
use crate::push::catalog::LeetCodeCatalog;
use crate::push::log::FilePushLog;
use crate::push::{PushError, PushReceipt, PushRequest, PushService};

/// Push `file`, optionally to an explicit repository and path.
pub fn push(ctx: &Context, file: &Path, repo: Option<String>, path: Option<String>) -> Result<()> {
    let content =
        fs::read(file).with_context(|| format!("Failed to read '{}'", file.display()))?;
    let filename = match path {
        Some(path) => path,
        None => file_name(file)?,
    };

    let store = secret_store(ctx)?;
    let (credential, origin) = credential(&store)?;
    debug!(%origin, "using token");

    let service = push_service(ctx)?;
    let request = PushRequest {
        filename,
        content,
        repo,
    };

    let receipt = runtime()?
        .block_on(service.push(&credential, request))
        .map_err(|e| match e {
            PushError::Sync(e) => explain(e),
            other => anyhow!(other),
        })?;

    println!("{}", render(&receipt, ctx.quiet));
    Ok(())
}

fn file_name(file: &Path) -> Result<String> {
    file.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            anyhow!(
                "Cannot use '{}' as a repository path; pass --path",
                file.display()
            )
        })
}

fn push_service(ctx: &Context) -> Result<PushService> {
    let config: &Config = &ctx.config;
    let log = FilePushLog::new(config.log_path().context("Failed to locate push log")?);

    let mut service = PushService::new(sync_engine(ctx)?, Arc::new(log))
        .with_default_repo_name(config.default_repo_name());

    if config.catalog_enabled() {
        let catalog =
            LeetCodeCatalog::new(config.catalog_endpoint(), config.user_agent(), config.timeout())
                .context("Failed to set up the problem catalog client")?;
        service = service.with_catalog(Arc::new(catalog));
    }
    Ok(service)
}

fn render(receipt: &PushReceipt, quiet: bool) -> String {
    if quiet {
        return receipt.outcome.to_string();
    }

    let mut lines = Vec::new();
    match receipt.outcome {
        SyncOutcome::Unchanged => lines.push(format!(
            "No change: {} already holds this solution.",
            receipt.repository
        )),
        SyncOutcome::Created => lines.push(format!("Added solution to {}.", receipt.repository)),
        SyncOutcome::Updated => lines.push(format!("Updated solution in {}.", receipt.repository)),
    }

    if let Some(difficulty) = receipt.difficulty {
        let number = receipt.number.as_deref().unwrap_or("????");
        lines.push(format!(
            "Problem {} {} ({}): +{} points",
            number, receipt.slug, difficulty, receipt.points
        ));
    }
    if receipt.logged {
        lines.push("Recorded in push log.".to_string());
    }
    lines.join("\n")
}
