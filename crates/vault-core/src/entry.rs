//! Credential entries and the primary field set.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ArchiveError;

/// One of the distinguished entry attributes, recognised by name regardless
/// of case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PrimaryField {
    Title,
    Username,
    Password,
}

impl PrimaryField {
    pub const ALL: [PrimaryField; 3] = [
        PrimaryField::Title,
        PrimaryField::Username,
        PrimaryField::Password,
    ];

    /// Canonical lower-case name under which the field is stored.
    pub fn as_str(self) -> &'static str {
        match self {
            PrimaryField::Title => "title",
            PrimaryField::Username => "username",
            PrimaryField::Password => "password",
        }
    }

    /// Classify an arbitrary key. `UserName`, `USERNAME` and `username` all
    /// map to [`PrimaryField::Username`].
    pub fn from_key(key: &str) -> Option<Self> {
        let friendly = key.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == friendly)
    }
}

impl fmt::Display for PrimaryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrimaryField {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| ArchiveError::UnknownField(s.to_string()))
    }
}

/// A single credential record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Entry {
    title: String,
    username: String,
    password: String,
    /// Every key that is not a primary field, with its original casing.
    meta: BTreeMap<String, String>,
}

impl Entry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property(&self, field: PrimaryField) -> &str {
        match field {
            PrimaryField::Title => &self.title,
            PrimaryField::Username => &self.username,
            PrimaryField::Password => &self.password,
        }
    }

    /// Overwrite a primary field.
    pub fn set_property(&mut self, field: PrimaryField, value: impl Into<String>) {
        let slot = match field {
            PrimaryField::Title => &mut self.title,
            PrimaryField::Username => &mut self.username,
            PrimaryField::Password => &mut self.password,
        };
        *slot = value.into();
    }

    /// Overwrite a primary field addressed by name.
    pub fn set_property_by_name(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), ArchiveError> {
        let field: PrimaryField = name.parse()?;
        self.set_property(field, value);
        Ok(())
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn meta(&self) -> &BTreeMap<String, String> {
        &self.meta
    }

    pub fn meta_value(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }

    /// Insert or replace a metadata value. Keys are case sensitive.
    pub fn set_meta(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.meta.insert(key.into(), value.into());
    }
}
