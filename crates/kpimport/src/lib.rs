#![cfg_attr(docsrs, feature(doc_cfg))]
//! KeePass 2.x XML importer that re-exports the workspace crates and ties
//! loading, parsing and tree conversion together.
//!
//! ```rust,no_run
//! use kpimport::{Importer, ImportError};
//!
//! # async fn run() -> Result<(), ImportError> {
//! let importer = Importer::load_from_file("export.xml").await?;
//! let archive = importer.export_archive()?;
//! println!(
//!     "imported {} groups, {} entries",
//!     archive.group_count(),
//!     archive.entry_count()
//! );
//! # Ok(())
//! # }
//! ```

pub use kpxml;
pub use vault_core as vault;

pub mod convert;
pub mod source;

use std::io;
use std::path::Path;

use kpxml::XmlError;
use thiserror::Error;
use tracing::{error, info};

pub use convert::{convert_document, ROOT_PATH};
pub use source::{ContentSource, FileSource};
pub use vault_core::{Archive, Entry, Group, GroupContainer, PrimaryField};

/// Error type produced by the importer.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The export could not be loaded from its source.
    #[error("failed to read {identifier}: {source}")]
    Read {
        identifier: String,
        #[source]
        source: io::Error,
    },
    /// The content is not well-formed XML.
    #[error("failed to parse KeePass XML: {0}")]
    Parse(#[from] XmlError),
}

/// Importer bound to the raw content of one KeePass XML export.
#[derive(Debug, Clone)]
pub struct Importer {
    content: Vec<u8>,
}

impl Importer {
    /// Wrap content that is already in memory.
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Load the export named by `identifier` from `source`.
    pub async fn load_from_source<S>(source: &S, identifier: &str) -> Result<Self, ImportError>
    where
        S: ContentSource + ?Sized,
    {
        let content = source
            .read_content(identifier)
            .await
            .map_err(|source| ImportError::Read {
                identifier: identifier.to_string(),
                source,
            })?;
        Ok(Self::new(content))
    }

    /// Load an export from the filesystem.
    pub async fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ImportError> {
        let path = path.as_ref().to_string_lossy();
        Self::load_from_source(&FileSource, &path).await
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Parse the content and convert it into a fresh [`Archive`].
    ///
    /// Only a parse failure is an error. A document that parses but lacks the
    /// expected structure produces a partial or empty archive.
    pub fn export_archive(&self) -> Result<Archive, ImportError> {
        let document = kpxml::parse_bytes(&self.content).map_err(|err| {
            error!(error = %err, "failed parsing KeePass XML export");
            ImportError::from(err)
        })?;
        let archive = convert_document(&document);
        info!(
            groups = archive.group_count(),
            entries = archive.entry_count(),
            "converted KeePass export"
        );
        Ok(archive)
    }
}
