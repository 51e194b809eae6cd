// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Cheatsheet name validation.
//!
//! Names given on the command-line end up joined onto a cheatpath root to
//! create, edit, or remove files. Any name must pass [`validate_name`] before
//! it is used to construct such a path.
//!
//! # Known Boundary
//!
//! Validation is purely textual. It rejects the literal `..` sequence, but it
//! does not decode percent-encoded separators like `%2e%2e`, does not
//! normalize alternate platform separators, and does not resolve symbolic
//! links. Callers needing stronger guarantees must canonicalize on their own.

use std::path::Path;

/// Check that a cheatsheet name is safe to write to.
///
/// Never touches the file system.
///
/// # Errors
///
/// - Return [`NameError::Empty`] if name is empty.
/// - Return [`NameError::Traversal`] if name contains `..` anywhere.
/// - Return [`NameError::Absolute`] if name is an absolute path.
/// - Return [`NameError::HomeReference`] if name starts with `~`.
/// - Return [`NameError::Hidden`] if any `/` separated segment starts with `.`,
///   except for the segment `.` itself.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }

    if name.contains("..") {
        return Err(NameError::Traversal);
    }

    if Path::new(name).is_absolute() || name.starts_with('/') {
        return Err(NameError::Absolute);
    }

    if name.starts_with('~') {
        return Err(NameError::HomeReference);
    }

    if let Some(segment) = name
        .split('/')
        .find(|segment| segment.starts_with('.') && *segment != ".")
    {
        return Err(NameError::Hidden {
            segment: segment.into(),
        });
    }

    Ok(())
}

/// Cheatsheet name rejection reasons.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("cheatsheet name cannot be empty")]
    Empty,

    #[error("cheatsheet name cannot contain '..'")]
    Traversal,

    #[error("cheatsheet name cannot be an absolute path")]
    Absolute,

    #[error("cheatsheet name cannot start with '~'")]
    HomeReference,

    #[error("cheatsheet name cannot contain hidden segment {segment:?} (hidden files are not supported)")]
    Hidden { segment: String },
}

/// Friendly result alias :3
type Result<T, E = NameError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case("docker"; "plain name")]
    #[test_case("a/b/c"; "nested name")]
    #[test_case("./local"; "current directory segment")]
    #[test_case("foo.bar"; "inner dot")]
    #[test_case("foo/bar.baz"; "nested inner dot")]
    #[test_case("%2e%2e/etc"; "percent encoded traversal is not decoded")]
    #[test]
    fn accepts(name: &str) {
        assert_eq!(validate_name(name), Ok(()));
    }

    #[test_case("", NameError::Empty; "empty")]
    #[test_case("..", NameError::Traversal; "parent")]
    #[test_case("../x", NameError::Traversal; "leading traversal")]
    #[test_case("a/../../x", NameError::Traversal; "inner traversal")]
    #[test_case("foo..bar", NameError::Traversal; "double dot anywhere")]
    #[test_case("/etc/passwd", NameError::Absolute; "absolute")]
    #[test_case("~/x", NameError::HomeReference; "home")]
    #[test_case("~root", NameError::HomeReference; "home of other user")]
    #[test]
    fn rejects(name: &str, expect: NameError) {
        assert_eq!(validate_name(name), Err(expect));
    }

    #[test_case(".hidden", ".hidden"; "hidden file")]
    #[test_case("a/.hidden", ".hidden"; "nested hidden file")]
    #[test_case(".git/config", ".git"; "hidden directory")]
    #[test_case("a/./.b", ".b"; "hidden after current directory")]
    #[test]
    fn rejects_hidden(name: &str, segment: &str) {
        assert_eq!(
            validate_name(name),
            Err(NameError::Hidden {
                segment: segment.into()
            })
        );
    }

    #[test]
    fn never_panics_on_odd_input() {
        let lossy = String::from_utf8_lossy(&[0xff, 0xfe, b'/', b'x']).into_owned();
        let inputs = [lossy.as_str(), "\0", "a\\..\\b", "///", "\u{202e}txt"];
        for input in inputs {
            let _ = validate_name(input);
        }
    }
}
