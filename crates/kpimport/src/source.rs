//! Where raw export content comes from.

use std::io;

use async_trait::async_trait;
use tracing::debug;

/// Loads raw document bytes by identifier (a path, a key, a URL).
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn read_content(&self, identifier: &str) -> io::Result<Vec<u8>>;
}

/// Reads identifiers as filesystem paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSource;

#[async_trait]
impl ContentSource for FileSource {
    async fn read_content(&self, identifier: &str) -> io::Result<Vec<u8>> {
        let bytes = tokio::fs::read(identifier).await?;
        debug!(path = identifier, len = bytes.len(), "read export file");
        Ok(bytes)
    }
}
