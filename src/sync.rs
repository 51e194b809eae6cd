// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Cheatpath synchronization through Git.
//!
//! Cheatpaths that are Git repositories can be brought up to date with their
//! `origin` remote. Updates are strictly fast-forward. A cheatpath that is not
//! a repository, or that has local modifications of any kind, is skipped
//! without being touched.

pub mod auth;
pub mod transfer;

use crate::cheatpath::Cheatpath;
use auth::AuthMethod;

use git2::{build::CheckoutBuilder, BranchType, ErrorCode, Oid, Repository, StatusOptions};
use indicatif::ProgressBar;
use std::{
    fmt,
    io::{self, Write},
    path::Path,
};
use tracing::{debug, info, instrument};

const REMOTE_NAME: &str = "origin";

/// Outcome of synchronizing a single cheatpath.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullStatus {
    /// New commits were fast-forwarded into the working tree.
    Pulled,

    /// Working tree already matched upstream.
    UpToDate,

    /// Cheatpath is not a Git repository.
    SkippedNotRepo,

    /// Cheatpath has modified or untracked files.
    SkippedDirty,
}

impl PullStatus {
    /// Check if cheatpath was left alone.
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::SkippedNotRepo | Self::SkippedDirty)
    }
}

impl fmt::Display for PullStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pulled | Self::UpToDate => write!(f, "ok"),
            Self::SkippedNotRepo => write!(f, "skipped (not a git repository)"),
            Self::SkippedDirty => write!(f, "skipped (dirty worktree)"),
        }
    }
}

/// Fast-forward repository at path to its upstream.
///
/// Same as [`pull_with_progress`] without visible progress.
///
/// # Errors
///
/// See [`pull_with_progress`].
pub fn pull(path: impl AsRef<Path>) -> Result<PullStatus> {
    pull_with_progress(path, ProgressBar::hidden())
}

/// Fast-forward repository at path to its upstream, reporting fetch progress.
///
/// Only the repository at exactly `path` is considered. Parent directories
/// are never searched for one.
///
/// # Errors
///
/// - Return [`SyncError::Git2`] if repository cannot be inspected, or the
///   fetch fails, e.g., remote unreachable or authentication refused.
/// - Return [`SyncError::DetachedHead`] if HEAD does not point to a branch.
/// - Return [`SyncError::NoUpstream`] if current branch has nothing to track.
/// - Return [`SyncError::NonFastForward`] if local history diverged.
#[instrument(skip(path, bar), fields(path = %path.as_ref().display()), level = "debug")]
pub fn pull_with_progress(path: impl AsRef<Path>, bar: ProgressBar) -> Result<PullStatus> {
    let repo = match Repository::open(path.as_ref()) {
        Ok(repo) => repo,
        Err(err) if err.code() == ErrorCode::NotFound => {
            debug!("not a repository");
            return Ok(PullStatus::SkippedNotRepo);
        }
        Err(err) => return Err(err.into()),
    };

    if is_dirty(&repo)? {
        debug!("working tree is dirty");
        return Ok(PullStatus::SkippedDirty);
    }

    fetch(&repo, &bar)?;

    let head = repo.head()?;
    if !head.is_branch() {
        return Err(SyncError::DetachedHead);
    }
    let refname = head.name().ok_or(SyncError::NonUtf8Ref)?.to_owned();
    let branch = head.shorthand().ok_or(SyncError::NonUtf8Ref)?.to_owned();

    let upstream = upstream_target(&repo, &branch)?;
    let fetched = repo.find_annotated_commit(upstream)?;
    let (analysis, _) = repo.merge_analysis(&[&fetched])?;

    if analysis.is_up_to_date() {
        debug!("{branch} is up to date");
        return Ok(PullStatus::UpToDate);
    }

    if !analysis.is_fast_forward() {
        return Err(SyncError::NonFastForward { branch });
    }

    let mut reference = repo.find_reference(&refname)?;
    reference.set_target(upstream, &format!("pull: fast-forward {branch} to {upstream}"))?;
    repo.set_head(&refname)?;
    repo.checkout_head(Some(CheckoutBuilder::default().force()))?;
    info!("fast-forward {branch} to {upstream}");

    Ok(PullStatus::Pulled)
}

// INVARIANT: Untracked files count as dirt, ignored files do not.
fn is_dirty(repo: &Repository) -> Result<bool> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false);
    let statuses = repo.statuses(Some(&mut opts))?;

    Ok(!statuses.is_empty())
}

fn fetch(repo: &Repository, bar: &ProgressBar) -> Result<()> {
    let mut remote = repo.find_remote(REMOTE_NAME)?;
    let url = remote.url().unwrap_or_default().to_owned();
    let ssh_dir = crate::path::ssh_dir().ok();
    let method = AuthMethod::decide(&url, ssh_dir.as_deref(), auth::ssh_agent_available());
    debug!("fetch {url} with {method:?}");

    let authenticator = method.authenticator();
    let config = repo.config()?;
    let mut opts = transfer::fetch_options(&authenticator, &config, bar);
    remote.fetch(&[] as &[&str], Some(&mut opts), None)?;

    Ok(())
}

fn upstream_target(repo: &Repository, branch: &str) -> Result<Oid> {
    let tracked = match repo.find_branch(branch, BranchType::Local)?.upstream() {
        Ok(upstream) => upstream.into_reference(),
        Err(err) if err.code() == ErrorCode::NotFound => repo
            .find_reference(&format!("refs/remotes/{REMOTE_NAME}/{branch}"))
            .map_err(|_| SyncError::NoUpstream {
                branch: branch.into(),
            })?,
        Err(err) => return Err(err.into()),
    };

    tracked.target().ok_or_else(|| SyncError::NoUpstream {
        branch: branch.into(),
    })
}

/// Outcome of synchronizing a list of cheatpaths.
#[derive(Debug, Default)]
pub struct UpdateReport {
    /// Cheatpath names with their outcomes, in cheatpath order.
    pub outcomes: Vec<(String, Result<PullStatus>)>,
}

impl UpdateReport {
    /// Check if any cheatpath failed to synchronize.
    ///
    /// Skipped cheatpaths are not failures.
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|(_, outcome)| outcome.is_err())
    }

    /// Process exit status for this report.
    pub fn exit_code(&self) -> i32 {
        i32::from(self.has_failures())
    }

    /// Print one line per cheatpath.
    ///
    /// Successes and skips go to `out`, failures go to `err`.
    ///
    /// # Errors
    ///
    /// Return [`io::Error`] if either output cannot be written.
    pub fn write_to(&self, out: &mut impl Write, err: &mut impl Write) -> io::Result<()> {
        for (name, outcome) in &self.outcomes {
            match outcome {
                Ok(status) => writeln!(out, "{name}: {status}")?,
                Err(error) => writeln!(err, "{name}: error ({error})")?,
            }
        }

        Ok(())
    }
}

/// Synchronize every cheatpath in order.
///
/// A failing cheatpath never stops the ones after it. `progress` hands out the
/// progress bar used for each cheatpath, which is cleared once that cheatpath
/// is done.
#[instrument(skip(cheatpaths, progress), level = "debug")]
pub fn pull_all(
    cheatpaths: &[Cheatpath],
    mut progress: impl FnMut(&Cheatpath) -> ProgressBar,
) -> UpdateReport {
    let outcomes = cheatpaths
        .iter()
        .map(|cheatpath| {
            let bar = progress(cheatpath);
            let outcome = pull_with_progress(&cheatpath.path, bar.clone());
            bar.finish_and_clear();

            match &outcome {
                Ok(status) if status.is_skipped() => {
                    info!("{} was left untouched", cheatpath.name)
                }
                Ok(_) => {}
                Err(error) => debug!("{} failed to synchronize: {error:?}", cheatpath.name),
            }

            (cheatpath.name.clone(), outcome)
        })
        .collect();

    UpdateReport { outcomes }
}

/// Synchronization error types.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Git2(#[from] git2::Error),

    #[error("HEAD is detached, refusing to update")]
    DetachedHead,

    #[error("reference name is not valid UTF-8")]
    NonUtf8Ref,

    #[error("branch {branch:?} has no upstream to pull from")]
    NoUpstream { branch: String },

    #[error("branch {branch:?} has diverged from upstream, refusing non-fast-forward update")]
    NonFastForward { branch: String },
}

/// Friendly result alias :3
pub type Result<T, E = SyncError> = std::result::Result<T, E>;
