//! Named groups owning sub-groups and entries.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{Entry, GroupContainer};

/// A named container in the archive tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Group {
    name: String,
    groups: Vec<Group>,
    entries: Vec<Entry>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Append an empty entry and return it for population.
    pub fn create_entry(&mut self) -> &mut Entry {
        self.entries.push(Entry::new());
        let index = self.entries.len() - 1;
        &mut self.entries[index]
    }

    /// Number of groups below this one, at any depth.
    pub fn group_count(&self) -> usize {
        self.groups
            .iter()
            .map(|group| 1 + group.group_count())
            .sum()
    }

    /// Number of entries in this group and all of its descendants.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
            + self
                .groups
                .iter()
                .map(Group::entry_count)
                .sum::<usize>()
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|group| group.name == name)
    }
}

impl GroupContainer for Group {
    fn groups(&self) -> &[Group] {
        &self.groups
    }

    fn create_group(&mut self, name: impl Into<String>) -> &mut Group {
        let group = Group::new(name);
        trace!(parent = %self.name, group = %group.name, "create group");
        self.groups.push(group);
        let index = self.groups.len() - 1;
        &mut self.groups[index]
    }
}
