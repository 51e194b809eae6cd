// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Git metadata exclusion.
//!
//! Cheatpaths are frequently Git repositories, so the loader must avoid
//! treating the contents of `.git` directories as cheatsheets. Getting this
//! right has to account for the following layouts:
//!
//! 1. A cheatpath that is not a repository at all.
//! 2. A cheatpath that is a repository, i.e., has a `.git` directory.
//! 3. A repository that contains `.gitignore`, `.gitattributes`, etc.
//! 4. A cheatpath that is a submodule, i.e., `.git` is a file.
//! 5. A cheatpath that lives in a hidden directory like `~/.config/cheat`.
//! 6. A cheatpath inside a directory whose name ends with `.git`, e.g.,
//!    `personal.git/`, possibly holding a real repository further down.
//!
//! Only a `.git` component bounded by separators on both sides counts. A
//! path without one is included without touching the file system. A path
//! with one is excluded only if that `.git` entry is a directory.

use std::{
    fs, io,
    path::{Component, Path, PathBuf},
};

pub(crate) const GIT_DIR_NAME: &str = ".git";

/// Outcome of classifying a candidate cheatsheet path.
#[derive(Debug)]
pub enum GitDirCheck {
    /// Path does not live inside Git metadata.
    Included,

    /// Path lives inside a `.git` directory.
    ExcludedGitInternal,

    /// The `.git` entry on the path could not be inspected.
    StatFailed { path: PathBuf, source: io::Error },
}

impl GitDirCheck {
    /// Check if path was classified as Git metadata.
    pub fn is_excluded(&self) -> bool {
        matches!(self, Self::ExcludedGitInternal)
    }
}

/// Classify path as Git metadata or regular content.
pub fn classify(path: &Path) -> GitDirCheck {
    let Some(git_entry) = bounded_git_component(path) else {
        return GitDirCheck::Included;
    };

    match fs::metadata(&git_entry) {
        Ok(metadata) if metadata.is_dir() => GitDirCheck::ExcludedGitInternal,
        Ok(_) => GitDirCheck::Included,
        Err(source) => GitDirCheck::StatFailed {
            path: git_entry,
            source,
        },
    }
}

// Truncate path through first `.git` component that has a component on both
// sides of it.
fn bounded_git_component(path: &Path) -> Option<PathBuf> {
    let components = path.components().collect::<Vec<_>>();
    let last = components.len().checked_sub(1)?;

    (1..last)
        .find(|&index| {
            matches!(components[index], Component::Normal(name) if name == GIT_DIR_NAME)
        })
        .map(|index| components[..=index].iter().collect::<PathBuf>())
}
