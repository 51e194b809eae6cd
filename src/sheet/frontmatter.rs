// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Cheatsheet frontmatter parsing.
//!
//! A cheatsheet may begin with a YAML block delimited by lines consisting
//! solely of `---`. The line ending of the opening delimiter, LF or CRLF,
//! decides the line ending used to locate the closing delimiter.
//!
//! ```text
//! ---
//! syntax: bash
//! tags: [ networking, ssh ]
//! ---
//! # Connect to remote server
//! ssh user@hostname
//! ```

use serde::Deserialize;

/// Metadata attached to a cheatsheet.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize)]
pub struct Frontmatter {
    /// Tags specific to the cheatsheet.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Syntax hint for highlighting.
    #[serde(default)]
    pub syntax: String,
}

/// Split raw cheatsheet text into its body and frontmatter.
///
/// Text without a leading delimiter line is passed through unmodified with
/// empty frontmatter.
///
/// # Errors
///
/// - Return [`FrontmatterError::Unterminated`] if the closing delimiter is
///   missing.
/// - Return [`FrontmatterError::Deserialize`] if the YAML block is malformed.
pub fn parse(markdown: &str) -> Result<(&str, Frontmatter)> {
    let linebreak = if markdown.starts_with("---\r\n") {
        "\r\n"
    } else if markdown.starts_with("---\n") {
        "\n"
    } else {
        return Ok((markdown, Frontmatter::default()));
    };

    let rest = &markdown[3 + linebreak.len()..];
    let (yaml, body) = split_at_delimiter(rest, linebreak).ok_or(FrontmatterError::Unterminated)?;

    // INVARIANT: An empty block is valid frontmatter with no data.
    let frontmatter = if yaml.trim().is_empty() {
        Frontmatter::default()
    } else {
        serde_yaml::from_str::<Option<Frontmatter>>(yaml)?.unwrap_or_default()
    };

    Ok((body, frontmatter))
}

// Locate the closing `---` line, returning the YAML before it and the body
// after it.
fn split_at_delimiter<'a>(rest: &'a str, linebreak: &str) -> Option<(&'a str, &'a str)> {
    let mut offset = 0;
    loop {
        let line_end = rest[offset..].find(linebreak).map(|pos| offset + pos);
        let line = match line_end {
            Some(end) => &rest[offset..end],
            None => &rest[offset..],
        };

        if line == "---" {
            let body = match line_end {
                Some(end) => &rest[end + linebreak.len()..],
                None => "",
            };
            return Some((&rest[..offset], body));
        }

        offset = line_end? + linebreak.len();
    }
}

/// Frontmatter parsing error types.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    /// Opening delimiter has no matching closing delimiter.
    #[error("failed to delimit frontmatter")]
    Unterminated,

    /// Frontmatter is not valid YAML.
    #[error("failed to unmarshal frontmatter: {0}")]
    Deserialize(#[from] serde_yaml::Error),
}

/// Friendly result alias :3
type Result<T, E = FrontmatterError> = std::result::Result<T, E>;
