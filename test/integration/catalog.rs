// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{RepoFixture, RepoKind};

use anyhow::Result;
use cheat::{
    catalog::{self, CatalogError},
    cheatpath::{self, Cheatpath},
    sheet::SheetError,
};
use pretty_assertions::assert_eq;
use sealed_test::prelude::*;
use std::{env::current_dir, fs, path::Path};

fn write(path: impl AsRef<Path>, contents: &str) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

fn titles(cheatpath: &Cheatpath) -> Result<Vec<String>> {
    let sheets = catalog::load(std::slice::from_ref(cheatpath))?;
    Ok(sheets[0].keys().cloned().collect())
}

#[sealed_test]
fn git_metadata_exclusion_matrix() -> Result<()> {
    let root = current_dir()?.join("cheats");
    write(root.join(".git").join("HEAD"), "ref: refs/heads/main\n")?;
    write(root.join(".git").join("objects").join("ab").join("cdef"), "blob")?;
    write(root.join("sheet"), "sibling of repository metadata\n")?;
    write(root.join("personal.git").join("sheet"), "suffix is not metadata\n")?;
    write(
        root.join("personal.git").join("repo").join(".git").join("HEAD"),
        "ref: refs/heads/main\n",
    )?;
    write(root.join("personal.git").join("repo").join("nested"), "nested sheet\n")?;
    write(root.join("submodule").join(".git"), "gitdir: ../.git/modules/submodule\n")?;
    write(root.join("submodule").join("sheet"), "submodule sheet\n")?;
    write(root.join("repo").join(".gitignore"), "*.swp\n")?;
    write(root.join("repo").join(".gitattributes"), "* text=auto\n")?;
    write(root.join(".hidden"), "top-level dotfile\n")?;

    let cheatpath = Cheatpath::new("personal", &root, false);
    let expect = vec![
        "personal.git/repo/nested",
        "personal.git/sheet",
        "repo/.gitattributes",
        "repo/.gitignore",
        "sheet",
        "submodule/.git",
        "submodule/sheet",
    ];
    assert_eq!(titles(&cheatpath)?, expect);

    Ok(())
}

#[sealed_test]
fn real_repository_cheatpath() -> Result<()> {
    let root = current_dir()?.join("community");
    let fixture = RepoFixture::new(&root, RepoKind::Normal)?;
    fixture.write_and_commit("tar", "# Extract\ntar -xf archive.tar\n")?;
    fixture.write_and_commit("docker/run", "docker run --rm -it alpine\n")?;

    let cheatpath = Cheatpath::new("community", &root, true).with_tags(["community"]);
    let sheets = catalog::load(&[cheatpath])?;
    let titles = sheets[0].keys().map(String::as_str).collect::<Vec<_>>();
    assert_eq!(titles, vec!["docker/run", "tar"]);

    let tar = &sheets[0]["tar"];
    assert_eq!(tar.cheatpath, "community");
    assert!(tar.read_only);
    assert!(tar.tagged("community"));

    Ok(())
}

#[sealed_test]
fn local_cheatpath_is_loaded_as_its_own_cheatpath() -> Result<()> {
    let project = current_dir()?.join("project");
    write(project.join(".cheat").join("build"), "cargo build --release\n")?;
    write(project.join("notes"), "not in a cheatpath\n")?;
    fs::create_dir_all(project.join("src").join("deep"))?;

    let local = cheatpath::discover_local_cheatpath(&project.join("src").join("deep"))
        .ok_or_else(|| anyhow::anyhow!("local cheatpath not found"))?;
    assert_eq!(local.name, "cwd");
    assert!(!local.read_only);

    // INVARIANT: Parent of the marker directory never lists the marker itself.
    let parent = Cheatpath::new("project", &project, false);
    assert_eq!(titles(&parent)?, vec!["notes"]);
    assert_eq!(titles(&local)?, vec!["build"]);

    Ok(())
}

#[sealed_test]
fn local_cheatpath_overrides_global_cheatpaths() -> Result<()> {
    let root = current_dir()?;
    write(root.join("community").join("tar"), "community tar\n")?;
    write(root.join("community").join("ls"), "community ls\n")?;
    write(root.join("personal").join("tar"), "personal tar\n")?;
    write(root.join("project").join(".cheat").join("tar"), "project tar\n")?;

    let mut cheatpaths = vec![
        Cheatpath::new("community", root.join("community"), true),
        Cheatpath::new("personal", root.join("personal"), false),
    ];
    cheatpaths.extend(cheatpath::discover_local_cheatpath(&root.join("project")));

    let sheets = catalog::load(&cheatpaths)?;
    let consolidated = catalog::consolidate(&sheets);
    assert_eq!(consolidated["tar"].text, "project tar\n");
    assert_eq!(consolidated["tar"].cheatpath, "cwd");
    assert_eq!(consolidated["ls"].text, "community ls\n");

    let writeable = cheatpath::writeable(&cheatpaths)?;
    assert_eq!(writeable.name, "cwd");

    Ok(())
}

#[sealed_test]
fn tags_and_filters_across_cheatpaths() -> Result<()> {
    let root = current_dir()?;
    write(
        root.join("community").join("ssh"),
        "---\ntags: [ networking, remote ]\n---\nssh user@host\n",
    )?;
    write(root.join("community").join("tar"), "tar -xf archive.tar\n")?;
    write(
        root.join("personal").join("scp"),
        "---\r\ntags: [ networking ]\r\nsyntax: sh\r\n---\r\nscp a b\r\n",
    )?;

    let cheatpaths = vec![
        Cheatpath::new("community", root.join("community"), true).with_tags(["community"]),
        Cheatpath::new("personal", root.join("personal"), false),
    ];
    let sheets = catalog::load(&cheatpaths)?;

    assert_eq!(
        catalog::tags(&sheets),
        vec!["community", "networking", "remote"]
    );

    let filtered = catalog::filter(&sheets, &[" networking "]);
    let titles = catalog::flatten(&filtered)
        .into_iter()
        .map(|sheet| sheet.title)
        .collect::<Vec<_>>();
    assert_eq!(titles, vec!["scp", "ssh"]);

    let scp = &sheets[1]["scp"];
    assert_eq!(scp.syntax, "sh");
    assert_eq!(scp.text, "scp a b\n");

    Ok(())
}

#[sealed_test]
fn malformed_frontmatter_fails_entire_load() -> Result<()> {
    let root = current_dir()?;
    write(root.join("good"), "fine\n")?;
    write(root.join("bad"), "---\ntags: [ oops\n---\nbody\n")?;

    let result = catalog::load(&[Cheatpath::new("personal", &root, false)]);
    assert!(matches!(
        result,
        Err(CatalogError::Sheet(SheetError::Frontmatter { .. }))
    ));

    Ok(())
}

#[sealed_test]
fn missing_cheatpath_root_fails_load() -> Result<()> {
    let root = current_dir()?.join("missing");
    let result = catalog::load(&[Cheatpath::new("personal", &root, false)]);
    assert!(matches!(result, Err(CatalogError::Walk { .. })));

    Ok(())
}

#[sealed_test]
fn invalid_encoding_tags_are_dropped() -> Result<()> {
    let root = current_dir()?;
    let mut raw = b"---\ntags: [ good, \"bad".to_vec();
    raw.extend([0xff, 0xfe]);
    raw.extend(b"\" ]\n---\nbody\n");
    fs::write(root.join("sheet"), raw)?;

    let sheets = catalog::load(&[Cheatpath::new("personal", &root, false)])?;
    assert_eq!(catalog::tags(&sheets), vec!["good"]);

    Ok(())
}
