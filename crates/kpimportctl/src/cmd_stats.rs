use std::path::Path;

use anyhow::Result;
use kpimport::Archive;
use serde::Serialize;

use crate::common;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ArchiveStats {
    pub groups: usize,
    pub entries: usize,
    pub max_depth: usize,
    pub meta_fields: usize,
}

impl ArchiveStats {
    pub fn collect(archive: &Archive) -> Self {
        let mut max_depth = 0;
        let mut meta_fields = 0;
        for (depth, group) in archive.walk() {
            max_depth = max_depth.max(depth + 1);
            meta_fields += group
                .entries()
                .iter()
                .map(|entry| entry.meta().len())
                .sum::<usize>();
        }
        Self {
            groups: archive.group_count(),
            entries: archive.entry_count(),
            max_depth,
            meta_fields,
        }
    }
}

pub async fn run(file: &Path, json: bool) -> Result<()> {
    let archive = common::load_archive(file).await?;
    let stats = ArchiveStats::collect(&archive);

    if json {
        common::print_json(&stats)?;
    } else {
        println!("groups:      {}", stats.groups);
        println!("entries:     {}", stats.entries);
        println!("max depth:   {}", stats.max_depth);
        println!("meta fields: {}", stats.meta_fields);
    }
    Ok(())
}
