// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Cheatsheet catalog.
//!
//! Load every cheatsheet available on an ordered listing of cheatpaths, and
//! query the result. The catalog is rebuilt from disk on every invocation,
//! and comes in two shapes:
//!
//! 1. Per-cheatpath: one [`SheetMap`] per cheatpath, in cheatpath order. Used
//!    for listing, searching, and tag queries.
//! 2. Consolidated: a single [`SheetMap`] where more local cheatpaths override
//!    less local ones. Used to resolve exactly one cheatsheet by title.
//!
//! # Loading Rules
//!
//! Every regular file below a cheatpath root is a cheatsheet, except:
//!
//! - Files whose title starts with `.`, e.g., a `.cheat` directory inside of
//!   a cheatpath, or dotfiles at the top-level.
//! - Files inside of `.git` directories. See [`gitdir`] for the details.
//!
//! A single malformed cheatsheet fails the entire load. Quietly hiding broken
//! cheatsheets is considered worse than refusing to run.

pub mod gitdir;

use crate::{
    catalog::gitdir::GitDirCheck,
    cheatpath::Cheatpath,
    sheet::{Sheet, SheetError},
};

use ignore::WalkBuilder;
use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Component, Path, PathBuf},
};
use tracing::{debug, instrument, trace};

/// Mapping of cheatsheet titles to cheatsheets.
pub type SheetMap = BTreeMap<String, Sheet>;

/// Load cheatsheets of each cheatpath.
///
/// Produces one [`SheetMap`] per cheatpath in the same order as the given
/// cheatpaths. Walks each cheatpath depth-first in file name order.
///
/// # Errors
///
/// - Return [`CatalogError::Walk`] if a cheatpath cannot be traversed.
/// - Return [`CatalogError::GitDir`] if a `.git` entry cannot be inspected.
/// - Return [`CatalogError::Sheet`] if any cheatsheet fails to load.
#[instrument(skip(cheatpaths), level = "debug")]
pub fn load(cheatpaths: &[Cheatpath]) -> Result<Vec<SheetMap>> {
    cheatpaths.iter().map(load_cheatpath).collect()
}

fn load_cheatpath(cheatpath: &Cheatpath) -> Result<SheetMap> {
    debug!("load cheatpath {:?} at {}", cheatpath.name, cheatpath.path.display());
    let mut sheets = SheetMap::new();

    for entry in walk(&cheatpath.path) {
        let entry = entry.map_err(|err| CatalogError::Walk {
            source: err,
            cheatpath: cheatpath.name.clone(),
        })?;

        let path = entry.path();
        if !is_sheet_file(&entry) {
            continue;
        }

        let Some(title) = sheet_title(&cheatpath.path, path) else {
            continue;
        };

        // INVARIANT: Hidden top-level segments are never cheatsheets.
        if title.starts_with('.') {
            trace!("skip hidden {title:?}");
            continue;
        }

        match gitdir::classify(path) {
            GitDirCheck::Included => {}
            GitDirCheck::ExcludedGitInternal => {
                trace!("skip git metadata {}", path.display());
                continue;
            }
            GitDirCheck::StatFailed { path, source } => {
                return Err(CatalogError::GitDir { source, path });
            }
        }

        let sheet = Sheet::load(title.clone(), path, cheatpath)?;
        sheets.insert(title, sheet);
    }

    Ok(sheets)
}

// Depth-first walk in file name order that never descends into `.git`
// directories below the root.
//
// INVARIANT: Pruning only skips files that gitdir::classify would exclude.
fn walk(root: &Path) -> ignore::Walk {
    WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| !is_git_metadata_dir(entry))
        .build()
}

fn is_git_metadata_dir(entry: &ignore::DirEntry) -> bool {
    let pruned = entry.depth() > 0
        && entry.file_name() == gitdir::GIT_DIR_NAME
        && entry.file_type().is_some_and(|file_type| file_type.is_dir());
    if pruned {
        trace!("prune git metadata {}", entry.path().display());
    }

    pruned
}

// Regular files, and symlinks that resolve to regular files.
fn is_sheet_file(entry: &ignore::DirEntry) -> bool {
    match entry.file_type() {
        Some(file_type) if file_type.is_file() => true,
        Some(file_type) if file_type.is_symlink() => entry.path().is_file(),
        _ => false,
    }
}

// Path relative to root joined with `/` regardless of host separator.
fn sheet_title(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let segments = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>();

    if segments.is_empty() {
        return None;
    }

    Some(segments.join("/"))
}

/// Fold per-cheatpath cheatsheets into one mapping.
///
/// Later cheatpaths override earlier ones on title conflicts, i.e., the most
/// local cheatsheet wins.
pub fn consolidate(cheatpaths: &[SheetMap]) -> SheetMap {
    let mut consolidated = SheetMap::new();
    for sheets in cheatpaths {
        consolidated.extend(
            sheets
                .iter()
                .map(|(title, sheet)| (title.clone(), sheet.clone())),
        );
    }

    consolidated
}

/// Retain cheatsheets that carry every given tag.
///
/// Filtering happens per cheatpath, so the shape of the input is preserved.
/// Tags are trimmed before comparison. Comparison is exact and case
/// sensitive. No tags means no filtering.
pub fn filter(cheatpaths: &[SheetMap], tags: &[impl AsRef<str>]) -> Vec<SheetMap> {
    let wanted = tags
        .iter()
        .map(|tag| tag.as_ref().trim())
        .collect::<Vec<_>>();

    cheatpaths
        .iter()
        .map(|sheets| {
            sheets
                .iter()
                .filter(|(_, sheet)| wanted.iter().all(|tag| sheet.tagged(tag)))
                .map(|(title, sheet)| (title.clone(), sheet.clone()))
                .collect()
        })
        .collect()
}

/// List every tag in use, deduplicated and sorted.
///
/// Tags that were decoded from malformed text are dropped.
pub fn tags(cheatpaths: &[SheetMap]) -> Vec<String> {
    cheatpaths
        .iter()
        .flat_map(|sheets| sheets.values())
        .flat_map(|sheet| sheet.tags.iter())
        .filter(|tag| !tag.contains(char::REPLACEMENT_CHARACTER))
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Order cheatsheets by title.
pub fn sort(sheets: &SheetMap) -> Vec<Sheet> {
    let mut sorted = sheets.values().cloned().collect::<Vec<_>>();
    sorted.sort_by(|a, b| a.title.cmp(&b.title));
    sorted
}

/// Flatten per-cheatpath cheatsheets into one listing without overrides.
///
/// Cheatsheets sharing a title on different cheatpaths all remain present.
pub fn flatten(cheatpaths: &[SheetMap]) -> Vec<Sheet> {
    let mut flattened = cheatpaths
        .iter()
        .flat_map(|sheets| sheets.values().cloned())
        .collect::<Vec<_>>();
    flattened.sort_by(|a, b| a.title.cmp(&b.title));
    flattened
}

/// Catalog error types.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Cheatpath directory cannot be walked.
    #[error("failed to walk cheatpath {cheatpath:?}")]
    Walk {
        #[source]
        source: ignore::Error,
        cheatpath: String,
    },

    /// A `.git` entry cannot be inspected.
    #[error("failed to identify .git directory at {:?}", path.display())]
    GitDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// A cheatsheet cannot be loaded.
    #[error(transparent)]
    Sheet(#[from] SheetError),
}

/// Friendly result alias :3
pub type Result<T, E = CatalogError> = std::result::Result<T, E>;
