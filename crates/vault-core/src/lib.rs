//! Credential archive model: a tree of named groups holding entries.
//!
//! The tree is strictly owned. An [`Archive`] owns its top-level groups, each
//! [`Group`] owns its sub-groups and entries, and nothing is shared, so the
//! structure is acyclic by construction.

mod entry;
mod group;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

pub use entry::{Entry, PrimaryField};
pub use group::Group;

/// Error type produced by archive operations.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The name does not designate one of the primary entry fields.
    #[error("unknown primary field: {0}")]
    UnknownField(String),
    /// No group exists at the requested path.
    #[error("group not found: {0}")]
    GroupNotFound(String),
}

/// Anything that can hold child groups: the archive root or a group.
pub trait GroupContainer {
    /// Direct child groups in creation order.
    fn groups(&self) -> &[Group];
    /// Append a new, empty child group and return it for population.
    fn create_group(&mut self, name: impl Into<String>) -> &mut Group;
}

/// Top-level owner of the group tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Archive {
    groups: Vec<Group>,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of groups at any depth.
    pub fn group_count(&self) -> usize {
        self.groups
            .iter()
            .map(|group| 1 + group.group_count())
            .sum()
    }

    /// Total number of entries at any depth.
    pub fn entry_count(&self) -> usize {
        self.groups.iter().map(Group::entry_count).sum()
    }

    /// Resolve a slash separated path of group names such as `Root/Email`.
    ///
    /// When siblings share a name the first one wins.
    pub fn find_group(&self, path: &str) -> Result<&Group, ArchiveError> {
        let mut segments = path.split('/').filter(|segment| !segment.is_empty());
        let first = segments
            .next()
            .ok_or_else(|| ArchiveError::GroupNotFound(path.to_string()))?;
        let start = self
            .groups
            .iter()
            .find(|group| group.name() == first)
            .ok_or_else(|| ArchiveError::GroupNotFound(path.to_string()))?;
        segments.try_fold(start, |group, segment| {
            group
                .child(segment)
                .ok_or_else(|| ArchiveError::GroupNotFound(path.to_string()))
        })
    }

    /// Depth-first, pre-order walk over every group with its depth
    /// (top-level groups are at depth 0).
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: self.groups.iter().rev().map(|group| (0, group)).collect(),
        }
    }
}

impl GroupContainer for Archive {
    fn groups(&self) -> &[Group] {
        &self.groups
    }

    fn create_group(&mut self, name: impl Into<String>) -> &mut Group {
        let group = Group::new(name);
        trace!(group = %group.name(), "create top-level group");
        self.groups.push(group);
        let index = self.groups.len() - 1;
        &mut self.groups[index]
    }
}

/// Iterator returned by [`Archive::walk`].
#[derive(Debug)]
pub struct Walk<'a> {
    stack: Vec<(usize, &'a Group)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a Group);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, group) = self.stack.pop()?;
        self.stack
            .extend(group.groups().iter().rev().map(|child| (depth + 1, child)));
        Some((depth, group))
    }
}
