use std::path::Path;

use anyhow::{Context, Result};
use kpimport::{Archive, Importer};
use serde::Serialize;
use tracing::info;

pub const PASSWORD_MASK: &str = "********";

/// Load and convert a KeePass XML export from disk.
pub async fn load_archive(path: &Path) -> Result<Archive> {
    info!(path = %path.display(), "loading KeePass export");
    let importer = Importer::load_from_file(path)
        .await
        .with_context(|| format!("load {}", path.display()))?;
    importer
        .export_archive()
        .with_context(|| format!("convert {}", path.display()))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialise JSON output")?;
    println!("{text}");
    Ok(())
}

/// Hide a secret unless it is empty or the caller asked to reveal it.
pub fn mask_secret(secret: &str, reveal: bool) -> &str {
    if reveal || secret.is_empty() {
        secret
    } else {
        PASSWORD_MASK
    }
}
