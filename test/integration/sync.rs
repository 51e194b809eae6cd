// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{RepoFixture, RepoKind};

use anyhow::Result;
use cheat::{
    cheatpath::Cheatpath,
    sync::{self, PullStatus, SyncError},
};
use indicatif::ProgressBar;
use pretty_assertions::assert_eq;
use sealed_test::prelude::*;
use std::{env::current_dir, fs};

fn upstream_and_clone() -> Result<(RepoFixture, RepoFixture)> {
    let root = current_dir()?;
    let upstream = RepoFixture::new(root.join("upstream.git"), RepoKind::Bare)?;
    upstream.stage_and_commit("tar", "tar -xf archive.tar\n")?;
    let local = RepoFixture::clone_from(&upstream, root.join("local"))?;

    Ok((upstream, local))
}

#[sealed_test]
fn not_a_repository_is_skipped() -> Result<()> {
    let root = current_dir()?.join("plain");
    fs::create_dir_all(&root)?;
    fs::write(root.join("tar"), "tar -xf archive.tar\n")?;

    assert_eq!(sync::pull(&root)?, PullStatus::SkippedNotRepo);
    assert_eq!(fs::read_to_string(root.join("tar"))?, "tar -xf archive.tar\n");

    Ok(())
}

#[sealed_test]
fn clean_clone_is_up_to_date() -> Result<()> {
    let (upstream, local) = upstream_and_clone()?;

    assert_eq!(sync::pull(local.workdir())?, PullStatus::UpToDate);
    assert_eq!(local.head_id()?, upstream.head_id()?);

    Ok(())
}

#[sealed_test]
fn clean_clone_is_fast_forwarded() -> Result<()> {
    let (upstream, local) = upstream_and_clone()?;
    upstream.stage_and_commit("ls", "ls -la\n")?;

    assert_eq!(sync::pull(local.workdir())?, PullStatus::Pulled);
    assert_eq!(local.head_id()?, upstream.head_id()?);
    assert_eq!(fs::read_to_string(local.workdir().join("ls"))?, "ls -la\n");

    assert_eq!(sync::pull(local.workdir())?, PullStatus::UpToDate);

    Ok(())
}

#[sealed_test]
fn tracked_modification_is_dirty() -> Result<()> {
    let (upstream, local) = upstream_and_clone()?;
    upstream.stage_and_commit("ls", "ls -la\n")?;
    let before = local.head_id()?;
    fs::write(local.workdir().join("tar"), "local edit\n")?;

    assert_eq!(sync::pull(local.workdir())?, PullStatus::SkippedDirty);
    assert_eq!(local.head_id()?, before);
    assert_eq!(fs::read_to_string(local.workdir().join("tar"))?, "local edit\n");
    assert!(!local.workdir().join("ls").exists());

    Ok(())
}

#[sealed_test]
fn untracked_file_is_dirty() -> Result<()> {
    let (upstream, local) = upstream_and_clone()?;
    upstream.stage_and_commit("ls", "ls -la\n")?;
    let before = local.head_id()?;
    fs::create_dir_all(local.workdir().join("new"))?;
    fs::write(local.workdir().join("new").join("sheet"), "draft\n")?;

    assert_eq!(sync::pull(local.workdir())?, PullStatus::SkippedDirty);
    assert_eq!(local.head_id()?, before);
    assert_eq!(fs::read_to_string(local.workdir().join("new").join("sheet"))?, "draft\n");
    assert!(!local.workdir().join("ls").exists());

    Ok(())
}

#[sealed_test]
fn diverged_history_is_an_error() -> Result<()> {
    let (upstream, local) = upstream_and_clone()?;
    upstream.stage_and_commit("ls", "ls -la\n")?;
    local.write_and_commit("mine", "local only\n")?;
    let before = local.head_id()?;

    let result = sync::pull(local.workdir());
    assert!(matches!(result, Err(SyncError::NonFastForward { .. })));
    assert_eq!(local.head_id()?, before);

    Ok(())
}

#[sealed_test]
fn missing_origin_is_an_error() -> Result<()> {
    let root = current_dir()?.join("lonely");
    let fixture = RepoFixture::new(&root, RepoKind::Normal)?;
    fixture.write_and_commit("tar", "tar -xf archive.tar\n")?;

    let result = sync::pull(&root);
    assert!(matches!(result, Err(SyncError::Git2(..))));

    Ok(())
}

#[sealed_test]
fn one_failure_does_not_stop_the_rest() -> Result<()> {
    let root = current_dir()?;
    let (upstream, local) = upstream_and_clone()?;
    upstream.stage_and_commit("ls", "ls -la\n")?;
    let broken = RepoFixture::new(root.join("broken"), RepoKind::Normal)?;
    broken.write_and_commit("tar", "tar\n")?;
    fs::create_dir_all(root.join("plain"))?;

    let cheatpaths = [
        Cheatpath::new("broken", root.join("broken"), false),
        Cheatpath::new("plain", root.join("plain"), false),
        Cheatpath::new("local", local.workdir(), false),
    ];
    let report = sync::pull_all(&cheatpaths, |_| ProgressBar::hidden());

    let names = report
        .outcomes
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["broken", "plain", "local"]);
    assert!(report.outcomes[0].1.is_err());
    assert!(matches!(report.outcomes[1].1, Ok(PullStatus::SkippedNotRepo)));
    assert!(matches!(report.outcomes[2].1, Ok(PullStatus::Pulled)));
    assert!(report.has_failures());
    assert_eq!(report.exit_code(), 1);
    assert_eq!(local.head_id()?, upstream.head_id()?);

    let (mut out, mut err) = (Vec::new(), Vec::new());
    report.write_to(&mut out, &mut err)?;
    assert_eq!(
        String::from_utf8(out)?,
        "plain: skipped (not a git repository)\nlocal: ok\n"
    );
    let err = String::from_utf8(err)?;
    assert!(err.starts_with("broken: error ("));
    assert_eq!(err.lines().count(), 1);

    Ok(())
}

#[sealed_test]
fn skips_are_not_failures() -> Result<()> {
    let root = current_dir()?;
    let (_upstream, local) = upstream_and_clone()?;
    fs::create_dir_all(root.join("plain"))?;
    fs::write(local.workdir().join("draft"), "untracked\n")?;

    let cheatpaths = [
        Cheatpath::new("plain", root.join("plain"), false),
        Cheatpath::new("local", local.workdir(), false),
    ];
    let report = sync::pull_all(&cheatpaths, |_| ProgressBar::hidden());

    assert!(!report.has_failures());
    assert_eq!(report.exit_code(), 0);

    let (mut out, mut err) = (Vec::new(), Vec::new());
    report.write_to(&mut out, &mut err)?;
    assert_eq!(
        String::from_utf8(out)?,
        "plain: skipped (not a git repository)\nlocal: skipped (dirty worktree)\n"
    );
    assert!(err.is_empty());

    Ok(())
}
