use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use anyhow::Result;
use kpimport::{Archive, Entry, Group, GroupContainer};
use serde::Serialize;
use tracing::debug;

use crate::common;

#[derive(Serialize)]
struct ArchiveView<'a> {
    groups: Vec<GroupView<'a>>,
}

#[derive(Serialize)]
struct GroupView<'a> {
    name: &'a str,
    groups: Vec<GroupView<'a>>,
    entries: Vec<EntryView<'a>>,
}

#[derive(Serialize)]
struct EntryView<'a> {
    title: &'a str,
    username: &'a str,
    password: &'a str,
    meta: &'a BTreeMap<String, String>,
}

impl<'a> GroupView<'a> {
    fn new(group: &'a Group) -> Self {
        Self {
            name: group.name(),
            groups: group.groups().iter().map(GroupView::new).collect(),
            entries: group.entries().iter().map(EntryView::masked).collect(),
        }
    }
}

impl<'a> EntryView<'a> {
    fn masked(entry: &'a Entry) -> Self {
        Self {
            title: entry.title(),
            username: entry.username(),
            password: common::mask_secret(entry.password(), false),
            meta: entry.meta(),
        }
    }
}

pub async fn run(file: &Path, show_passwords: bool, json: bool) -> Result<()> {
    let archive = common::load_archive(file).await?;
    debug!(show_passwords, json, "rendering archive");

    if json {
        if show_passwords {
            common::print_json(&archive)?;
        } else {
            let view = ArchiveView {
                groups: archive.groups().iter().map(GroupView::new).collect(),
            };
            common::print_json(&view)?;
        }
        return Ok(());
    }

    if archive.is_empty() {
        println!("Archive is empty.");
        return Ok(());
    }
    print!("{}", TreeView::new(&archive, show_passwords));
    Ok(())
}

/// Indented text rendering: one line per group, entries and their metadata
/// below it.
pub struct TreeView<'a> {
    archive: &'a Archive,
    show_passwords: bool,
}

impl<'a> TreeView<'a> {
    pub fn new(archive: &'a Archive, show_passwords: bool) -> Self {
        Self {
            archive,
            show_passwords,
        }
    }
}

impl fmt::Display for TreeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (depth, group) in self.archive.walk() {
            let indent = "  ".repeat(depth);
            writeln!(f, "{indent}{}/", group.name())?;
            for entry in group.entries() {
                writeln!(
                    f,
                    "{indent}  - {} user={} password={}",
                    entry.title(),
                    entry.username(),
                    common::mask_secret(entry.password(), self.show_passwords)
                )?;
                for (key, value) in entry.meta() {
                    writeln!(f, "{indent}      {key}: {value}")?;
                }
            }
        }
        Ok(())
    }
}
