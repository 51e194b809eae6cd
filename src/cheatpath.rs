// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Cheatpath management.
//!
//! A __cheatpath__ is a named, tagged directory from which cheatsheets are
//! loaded. Cheatpaths are ordered. The order encodes precedence, such that the
//! cheatpath listed last is the most "local" one. More local cheatpaths win
//! title conflicts, and are preferred as the default target for newly created
//! cheatsheets.
//!
//! # Local Cheatpaths
//!
//! A directory named `.cheat` in the current working directory, or in any of
//! its ancestors, is picked up automatically as a cheatpath named "cwd". This
//! allows projects to carry their own cheatsheets that override global ones
//! while working inside of them.

use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// Name given to the cheatpath discovered through a `.cheat` directory.
pub const LOCAL_CHEATPATH_NAME: &str = "cwd";

/// Name of directory that marks a local cheatpath.
pub const LOCAL_CHEATPATH_DIR: &str = ".cheat";

/// Directory of cheatsheets.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct Cheatpath {
    /// Unique name of the cheatpath.
    #[serde(default)]
    pub name: String,

    /// Root directory of the cheatpath.
    #[serde(default)]
    pub path: PathBuf,

    /// Refuse to create or remove cheatsheets in this cheatpath.
    #[serde(default, rename = "readonly")]
    pub read_only: bool,

    /// Tags applied to every cheatsheet in this cheatpath.
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl Cheatpath {
    /// Construct new cheatpath.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, read_only: bool) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            read_only,
            tags: BTreeSet::new(),
        }
    }

    /// Attach tags to cheatpath.
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Check that cheatpath is fully specified.
    ///
    /// # Errors
    ///
    /// - Return [`CheatpathError::MissingName`] if name is empty.
    /// - Return [`CheatpathError::MissingPath`] if path is empty.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CheatpathError::MissingName);
        }

        if self.path.as_os_str().is_empty() {
            return Err(CheatpathError::MissingPath {
                name: self.name.clone(),
            });
        }

        Ok(())
    }
}

/// Select the most local writable cheatpath.
///
/// Scans from the last cheatpath backwards, because the most local cheatpath
/// is listed last.
///
/// # Errors
///
/// - Return [`CheatpathError::NoWriteable`] if every cheatpath is read-only.
pub fn writeable(cheatpaths: &[Cheatpath]) -> Result<&Cheatpath> {
    cheatpaths
        .iter()
        .rev()
        .find(|cheatpath| !cheatpath.read_only)
        .ok_or(CheatpathError::NoWriteable)
}

/// Restrict cheatpaths to the one named `name`.
///
/// # Errors
///
/// - Return [`CheatpathError::NotFound`] if no cheatpath has that name.
pub fn filter_by_name(cheatpaths: &[Cheatpath], name: &str) -> Result<Vec<Cheatpath>> {
    cheatpaths
        .iter()
        .find(|cheatpath| cheatpath.name == name)
        .map(|cheatpath| vec![cheatpath.clone()])
        .ok_or_else(|| CheatpathError::NotFound { name: name.into() })
}

/// Locate nearest `.cheat` directory from `cwd` upwards.
///
/// Checks `cwd` itself first, then each ancestor until the file system root.
/// Only a directory counts; a regular file named `.cheat` is passed over.
#[instrument(level = "debug")]
pub fn find_local_cheat_dir(cwd: &Path) -> Option<PathBuf> {
    cwd.ancestors()
        .map(|dir| dir.join(LOCAL_CHEATPATH_DIR))
        .find(|candidate| candidate.is_dir())
        .inspect(|found| debug!("found local cheatpath at {}", found.display()))
}

/// Synthesize local cheatpath from nearest `.cheat` directory, if any.
///
/// The resulting cheatpath is writable, untagged, and is meant to be appended
/// as the most local entry of the cheatpath listing.
pub fn discover_local_cheatpath(cwd: &Path) -> Option<Cheatpath> {
    find_local_cheat_dir(cwd).map(|dir| Cheatpath::new(LOCAL_CHEATPATH_NAME, dir, false))
}

/// Cheatpath error types.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CheatpathError {
    /// No cheatpath permits writes.
    #[error("no writeable cheatpaths found")]
    NoWriteable,

    /// Requested cheatpath does not exist.
    #[error("cheatpath does not exist: {name}")]
    NotFound { name: String },

    /// Cheatpath lacks a name.
    #[error("cheatpath name is missing")]
    MissingName,

    /// Cheatpath lacks a path.
    #[error("cheatpath {name:?} has no path")]
    MissingPath { name: String },
}

/// Friendly result alias :3
type Result<T, E = CheatpathError> = std::result::Result<T, E>;
