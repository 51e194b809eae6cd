// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine relevent path information for external files that need to be
//! interacted with, e.g., the configuration file, or the user's SSH key
//! directory.

use std::{env, path::PathBuf};

/// Environment variable that overrides configuration file discovery.
pub const CONFIG_PATH_ENV: &str = "CHEAT_CONFIG_PATH";

const CONFIG_FOLDER: &str = "cheat";
const CONFIG_FILE_NAME: &str = "conf.yml";

/// Determine absolute path to user's home directory.
///
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`PathError::NoWayHome`] if home directory path cannot be
///   determined.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(PathError::NoWayHome)
}

/// Determine absolute path to user's SSH key directory.
///
/// # Errors
///
/// - Return [`PathError::NoWayHome`] if home directory path cannot be
///   determined.
pub fn ssh_dir() -> Result<PathBuf> {
    home_dir().map(|home| home.join(".ssh"))
}

/// List candidate configuration file paths in order of preference.
///
/// If `CHEAT_CONFIG_PATH` is set, then it is the only candidate. Otherwise,
/// uses the XDG Base Directory path `$XDG_CONFIG_HOME/cheat/conf.yml`, followed
/// by the home directory fallbacks. Does not check if any of the paths
/// returned actually exist.
///
/// # Errors
///
/// - Return [`PathError::NoWayHome`] if home directory path cannot be
///   determined.
/// - Return [`PathError::ShellExpansion`] if `CHEAT_CONFIG_PATH` cannot be
///   expanded.
///
/// # See Also
///
/// - [XDG Base Directory](https://wiki.archlinux.org/title/XDG_Base_Directory)
pub fn config_file_candidates() -> Result<Vec<PathBuf>> {
    if let Some(path) = env::var_os(CONFIG_PATH_ENV).filter(|path| !path.is_empty()) {
        let expanded = shellexpand::full(path.to_string_lossy().as_ref())?.into_owned();
        return Ok(vec![PathBuf::from(expanded)]);
    }

    let home = home_dir()?;
    let mut candidates = Vec::new();
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join(CONFIG_FOLDER).join(CONFIG_FILE_NAME));
    }

    let fallbacks = [
        home.join(".config").join(CONFIG_FOLDER).join(CONFIG_FILE_NAME),
        home.join(format!(".{CONFIG_FOLDER}")).join(CONFIG_FILE_NAME),
        PathBuf::from("/etc").join(CONFIG_FOLDER).join(CONFIG_FILE_NAME),
    ];

    // INVARIANT: No duplicate candidates, e.g., when XDG_CONFIG_HOME is unset.
    for fallback in fallbacks {
        if !candidates.contains(&fallback) {
            candidates.push(fallback);
        }
    }

    Ok(candidates)
}

/// Locate the first configuration file that exists.
///
/// # Errors
///
/// - Return [`PathError::NoConfigFile`] if no candidate exists.
pub fn locate_config_file(candidates: &[PathBuf]) -> Result<PathBuf> {
    candidates
        .iter()
        .find(|path| path.is_file())
        .cloned()
        .ok_or(PathError::NoConfigFile)
}

/// Path resolution error types.
#[derive(Clone, Debug, thiserror::Error)]
pub enum PathError {
    /// No way to determine user's home directory.
    ///
    /// # See Also
    ///
    /// - [`dirs::home_dir`](https://docs.rs/dirs/latest/dirs/fn.home_dir.html)
    #[error("cannot determine absolute path to user's home directory")]
    NoWayHome,

    /// No configuration file exists at any candidate path.
    #[error("could not locate config file")]
    NoConfigFile,

    /// Failed to perform shell expansion on path.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

/// Friendly result alias :3
pub type Result<T, E = PathError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[sealed_test(env = [("CHEAT_CONFIG_PATH", "$BLAH/conf.yml"), ("BLAH", "/home/blah")])]
    fn config_path_env_override() -> anyhow::Result<()> {
        let result = config_file_candidates()?;
        let expect = vec![PathBuf::from("/home/blah/conf.yml")];
        assert_eq!(result, expect);

        Ok(())
    }

    #[sealed_test(env = [("CHEAT_CONFIG_PATH", ""), ("HOME", "/home/blah"), ("XDG_CONFIG_HOME", "/home/blah/.config")])]
    fn config_path_defaults_without_duplicates() -> anyhow::Result<()> {
        let result = config_file_candidates()?;
        let expect = vec![
            PathBuf::from("/home/blah/.config/cheat/conf.yml"),
            PathBuf::from("/home/blah/.cheat/conf.yml"),
            PathBuf::from("/etc/cheat/conf.yml"),
        ];
        assert_eq!(result, expect);

        Ok(())
    }

    #[sealed_test]
    fn locate_first_existing_config() -> anyhow::Result<()> {
        let cwd = std::env::current_dir()?;
        std::fs::write(cwd.join("second.yml"), "---\n")?;
        let candidates = vec![cwd.join("first.yml"), cwd.join("second.yml")];
        assert_eq!(locate_config_file(&candidates)?, cwd.join("second.yml"));
        assert!(matches!(
            locate_config_file(&candidates[..1]),
            Err(PathError::NoConfigFile)
        ));

        Ok(())
    }
}
