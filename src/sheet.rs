// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Cheatsheet representation.
//!
//! A __cheatsheet__ is a short plain text document stored on a cheatpath. Its
//! title is its file path relative to the cheatpath root, so `cheat foo/bar`
//! refers to the file `foo/bar` in some cheatpath. A cheatsheet may carry
//! YAML frontmatter with extra tags and a syntax hint. See [`frontmatter`] for
//! the exact layout.

pub mod frontmatter;
pub mod validate;

use crate::cheatpath::Cheatpath;

use regex::Regex;
use std::{
    collections::BTreeSet,
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// A single cheatsheet.
#[derive(Default, Debug, PartialEq, Eq, Clone)]
pub struct Sheet {
    /// Path relative to cheatpath root, `/` separated.
    pub title: String,

    /// Name of cheatpath that owns this cheatsheet.
    pub cheatpath: String,

    /// Absolute path to cheatsheet file.
    pub path: PathBuf,

    /// Body of cheatsheet without frontmatter.
    pub text: String,

    /// Union of cheatpath tags and frontmatter tags.
    pub tags: BTreeSet<String>,

    /// Syntax hint for highlighting, may be empty.
    pub syntax: String,

    /// Inherited from owning cheatpath.
    pub read_only: bool,
}

impl Sheet {
    /// Load cheatsheet from file owned by given cheatpath.
    ///
    /// The body has its trailing line breaks collapsed into a single newline.
    /// Invalid UTF-8 is decoded lossily.
    ///
    /// # Errors
    ///
    /// - Return [`SheetError::Read`] if file cannot be read.
    /// - Return [`SheetError::Frontmatter`] if frontmatter is malformed.
    #[instrument(skip(title, cheatpath), level = "debug")]
    pub fn load(title: impl Into<String>, path: &Path, cheatpath: &Cheatpath) -> Result<Self> {
        let title = title.into();
        let raw = fs::read(path).map_err(|err| SheetError::Read {
            source: err,
            path: path.into(),
        })?;

        // INVARIANT: Malformed encoding never fails a load, it surfaces as
        // replacement characters instead.
        let markdown = String::from_utf8_lossy(&raw);

        let (body, frontmatter) =
            frontmatter::parse(&markdown).map_err(|err| SheetError::Frontmatter {
                source: err,
                path: path.into(),
            })?;

        let mut tags = cheatpath.tags.clone();
        tags.extend(frontmatter.tags);

        debug!("loaded {title:?} from cheatpath {:?}", cheatpath.name);
        Ok(Self {
            title,
            cheatpath: cheatpath.name.clone(),
            path: path.into(),
            text: normalize_trailing_newline(body),
            tags,
            syntax: frontmatter.syntax,
            read_only: cheatpath.read_only,
        })
    }

    /// Check if cheatsheet carries `tag` exactly.
    pub fn tagged(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Search cheatsheet text for paragraphs that match `pattern`.
    ///
    /// Paragraphs are separated by blank lines. Matching paragraphs are joined
    /// back together with a blank line. Returns an empty string if nothing
    /// matched.
    pub fn search(&self, pattern: &Regex) -> String {
        self.text
            .split("\n\n")
            .map(|paragraph| paragraph.trim_matches('\n'))
            .filter(|paragraph| !paragraph.is_empty() && pattern.is_match(paragraph))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Copy raw cheatsheet file to new destination.
    ///
    /// The raw file is read again so that frontmatter is preserved. Creates
    /// any missing parent directories. A partially written destination is
    /// removed on failure.
    ///
    /// # Errors
    ///
    /// - Return [`SheetError::Read`] if source file cannot be opened.
    /// - Return [`SheetError::CreateDir`] if parent directories of destination
    ///   cannot be created.
    /// - Return [`SheetError::Copy`] if copying fails.
    #[instrument(skip(self), level = "debug")]
    pub fn copy_to(&self, dest: &Path) -> Result<()> {
        let mut infile = File::open(&self.path).map_err(|err| SheetError::Read {
            source: err,
            path: self.path.clone(),
        })?;

        if let Some(parent) = dest.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            mkdirp::mkdirp(parent).map_err(|err| SheetError::CreateDir {
                source: err,
                path: parent.into(),
            })?;
        }

        let copied = File::create(dest).and_then(|mut outfile| io::copy(&mut infile, &mut outfile));
        if let Err(err) = copied {
            let _ = fs::remove_file(dest);
            return Err(SheetError::Copy {
                source: err,
                from: self.path.clone(),
                to: dest.into(),
            });
        }

        Ok(())
    }
}

// INVARIANT: Body ends in exactly one newline, unless it is empty.
fn normalize_trailing_newline(body: &str) -> String {
    let trimmed = body.trim_end_matches(['\r', '\n']);
    if trimmed.is_empty() {
        return String::new();
    }

    let mut text = trimmed.to_owned();
    text.push('\n');
    text
}

/// Cheatsheet error types.
#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    /// Cheatsheet file cannot be read.
    #[error("failed to read cheatsheet {:?}", path.display())]
    Read {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Cheatsheet frontmatter is malformed.
    #[error("failed to parse frontmatter of {:?}", path.display())]
    Frontmatter {
        #[source]
        source: frontmatter::FrontmatterError,
        path: PathBuf,
    },

    /// Directory cannot be created for copy destination.
    #[error("failed to create directory {:?}", path.display())]
    CreateDir {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Cheatsheet cannot be copied.
    #[error("failed to copy cheatsheet from {:?} to {:?}", from.display(), to.display())]
    Copy {
        #[source]
        source: io::Error,
        from: PathBuf,
        to: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = SheetError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::env::current_dir;

    fn sheet_with_text(text: &str) -> Sheet {
        Sheet {
            title: "foo".into(),
            text: text.into(),
            ..Default::default()
        }
    }

    #[sealed_test]
    fn load_merges_tags_and_strips_frontmatter() -> anyhow::Result<()> {
        let path = current_dir()?.join("foo");
        fs::write(
            &path,
            indoc! {r#"
                ---
                syntax: sh
                tags: [ foo, bar, baz ]
                ---
                # To foo the bar:
                  foo bar


            "#},
        )?;
        let cheatpath =
            Cheatpath::new("personal", current_dir()?, false).with_tags(["alpha", "bravo"]);

        let result = Sheet::load("foo", &path, &cheatpath)?;
        let expect = Sheet {
            title: "foo".into(),
            cheatpath: "personal".into(),
            path: path.clone(),
            text: "# To foo the bar:\n  foo bar\n".into(),
            tags: ["alpha", "bar", "baz", "bravo", "foo"]
                .into_iter()
                .map(String::from)
                .collect(),
            syntax: "sh".into(),
            read_only: false,
        };
        assert_eq!(result, expect);

        Ok(())
    }

    #[sealed_test]
    fn load_adds_missing_trailing_newline() -> anyhow::Result<()> {
        let path = current_dir()?.join("bar");
        fs::write(&path, "no newline")?;
        let cheatpath = Cheatpath::new("community", current_dir()?, true);

        let result = Sheet::load("bar", &path, &cheatpath)?;
        assert_eq!(result.text, "no newline\n");
        assert!(result.tags.is_empty());
        assert!(result.read_only);

        Ok(())
    }

    #[sealed_test]
    fn load_fails_on_missing_file() -> anyhow::Result<()> {
        let cheatpath = Cheatpath::new("personal", current_dir()?, false);
        let result = Sheet::load("nope", &current_dir()?.join("nope"), &cheatpath);
        assert!(matches!(result, Err(SheetError::Read { .. })));

        Ok(())
    }

    #[sealed_test]
    fn load_fails_on_malformed_frontmatter() -> anyhow::Result<()> {
        let path = current_dir()?.join("bad");
        fs::write(&path, "---\ntags: [ oops\n---\nbody\n")?;
        let cheatpath = Cheatpath::new("personal", current_dir()?, false);

        let result = Sheet::load("bad", &path, &cheatpath);
        assert!(matches!(result, Err(SheetError::Frontmatter { .. })));

        Ok(())
    }

    #[test]
    fn tagged_matches_exactly() {
        let mut sheet = sheet_with_text("");
        sheet.tags = ["foo", "Bar"].into_iter().map(String::from).collect();

        assert!(sheet.tagged("foo"));
        assert!(sheet.tagged("Bar"));
        assert!(!sheet.tagged("bar"));
        assert!(!sheet.tagged("fo"));
    }

    #[test]
    fn search_returns_matching_paragraphs() -> anyhow::Result<()> {
        let sheet = sheet_with_text(indoc! {r#"
            # list files
            ls -la

            # find files
            find . -name foo

            # remove files
            rm -rf foo
        "#});

        let result = sheet.search(&Regex::new("(?i)FOO")?);
        let expect = indoc! {r#"
            # find files
            find . -name foo

            # remove files
            rm -rf foo"#};
        assert_eq!(result, expect);

        let result = sheet.search(&Regex::new("nothing")?);
        assert_eq!(result, "");

        Ok(())
    }

    #[sealed_test]
    fn copy_preserves_raw_content() -> anyhow::Result<()> {
        let root = current_dir()?;
        let raw = "---\ntags: [ a ]\n---\nbody\n";
        fs::write(root.join("src"), raw)?;
        let sheet = Sheet {
            path: root.join("src"),
            ..Default::default()
        };

        let dest = root.join("deep").join("nested").join("dest");
        sheet.copy_to(&dest)?;
        assert_eq!(fs::read_to_string(dest)?, raw);

        Ok(())
    }

    #[sealed_test]
    fn copy_fails_on_missing_source() -> anyhow::Result<()> {
        let root = current_dir()?;
        let sheet = Sheet {
            path: root.join("missing"),
            ..Default::default()
        };

        let result = sheet.copy_to(&root.join("dest"));
        assert!(matches!(result, Err(SheetError::Read { .. })));
        assert!(!root.join("dest").exists());

        Ok(())
    }
}
