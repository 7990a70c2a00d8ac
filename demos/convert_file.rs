//! Import a KeePass 2.x XML export and print its group tree.
//!
//! Run with: cargo run --example convert_file -- path/to/export.xml

use std::env;

use kpimport::{GroupContainer, Importer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = env::args()
        .nth(1)
        .ok_or("usage: convert_file <export.xml>")?;
    let importer = Importer::load_from_file(&path).await?;
    let archive = importer.export_archive()?;

    for (depth, group) in archive.walk() {
        println!(
            "{}{} ({} entries)",
            "  ".repeat(depth),
            group.name(),
            group.entries().len()
        );
    }
    info!(
        top_level = archive.groups().len(),
        groups = archive.group_count(),
        entries = archive.entry_count(),
        "imported {path}"
    );
    Ok(())
}
