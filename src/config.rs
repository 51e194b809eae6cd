// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! The configuration file is a YAML document, usually `conf.yml`, that lists
//! the cheatpaths to load cheatsheets from along with a few presentation
//! settings. [`Config::load`] turns it into a ready-to-use configuration:
//! cheatpath roots are expanded and resolved, the local `.cheat` directory is
//! appended, and missing settings receive their defaults.

use crate::cheatpath::{self, Cheatpath, CheatpathError};

use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    env,
    fs,
    io::{self, IsTerminal},
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, instrument, warn};

/// Syntax highlighting style used when none is configured.
pub const DEFAULT_STYLE: &str = "bw";

/// Syntax highlighting formatter used when none is configured.
pub const DEFAULT_FORMATTER: &str = "terminal";

/// Formatters that can be configured.
pub const FORMATTERS: [&str; 3] = ["terminal", "terminal256", "terminal16m"];

const FALLBACK_EDITORS: [&str; 3] = ["editor", "nano", "vim"];
const FALLBACK_PAGERS: [&str; 3] = ["pager", "less", "more"];

/// Configuration file layout.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Command used to edit cheatsheets.
    #[serde(default)]
    pub editor: String,

    /// Always decorate output.
    #[serde(default)]
    pub colorize: bool,

    /// Syntax highlighting style.
    #[serde(default)]
    pub style: String,

    /// Syntax highlighting formatter.
    #[serde(default)]
    pub formatter: String,

    /// Command that output is piped through.
    #[serde(default)]
    pub pager: String,

    /// Cheatpaths ordered from most global to most local.
    #[serde(default)]
    pub cheatpaths: Vec<Cheatpath>,

    /// Path configuration was loaded from.
    #[serde(skip)]
    pub path: PathBuf,
}

impl Config {
    /// Load configuration file at `path`, with `cwd` as the working directory.
    ///
    /// The local cheatpath found from `cwd` is appended as the most local
    /// cheatpath. Every cheatpath root has `~` and environment variables
    /// expanded, and symbolic links resolved. Cheatpaths whose root does not
    /// exist are skipped with a warning.
    ///
    /// The editor is taken from `VISUAL`, then `EDITOR`, then the file itself,
    /// and finally whatever common editor can be found on `PATH`.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Read`] if file cannot be read.
    /// - Return [`ConfigError::Deserialize`] if file is not valid YAML.
    /// - Return [`ConfigError::ShellExpansion`] if a cheatpath root cannot be
    ///   expanded.
    /// - Return [`ConfigError::Resolve`] if a cheatpath root exists but cannot
    ///   be resolved.
    #[instrument(skip(path, cwd), level = "debug")]
    pub fn load(path: impl AsRef<Path>, cwd: impl AsRef<Path>) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref()).map_err(|err| ConfigError::Read {
            source: err,
            path: path.as_ref().into(),
        })?;

        let mut config: Config = data.parse()?;
        config.path = path.as_ref().into();

        if let Some(local) = cheatpath::discover_local_cheatpath(cwd.as_ref()) {
            config.cheatpaths.push(local);
        }

        let mut resolved = Vec::with_capacity(config.cheatpaths.len());
        for mut cheatpath in config.cheatpaths {
            let expanded = PathBuf::from(
                shellexpand::full(cheatpath.path.to_string_lossy().as_ref())?.into_owned(),
            );

            match fs::canonicalize(&expanded) {
                Ok(path) => cheatpath.path = path,
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    warn!(
                        "cheatpath {:?} does not exist, skipping",
                        expanded.display()
                    );
                    continue;
                }
                Err(err) => {
                    return Err(ConfigError::Resolve {
                        source: err,
                        path: expanded,
                    })
                }
            }

            debug!("cheatpath {:?} at {}", cheatpath.name, cheatpath.path.display());
            resolved.push(cheatpath);
        }
        config.cheatpaths = resolved;

        config.editor = resolve_editor(&config.editor).unwrap_or_default();
        config.pager = config.pager.trim().to_owned();

        if config.style.is_empty() {
            config.style = DEFAULT_STYLE.into();
        }

        if config.formatter.is_empty() {
            config.formatter = DEFAULT_FORMATTER.into();
        }

        Ok(config)
    }

    /// Check that configuration is usable.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::NoEditor`] if no editor is set.
    /// - Return [`ConfigError::NoCheatpaths`] if there are no cheatpaths.
    /// - Return [`ConfigError::Cheatpath`] if a cheatpath is not fully
    ///   specified.
    /// - Return [`ConfigError::DuplicateName`] or
    ///   [`ConfigError::DuplicatePath`] if cheatpaths are not unique.
    /// - Return [`ConfigError::InvalidFormatter`] for unknown formatters.
    pub fn validate(&self) -> Result<()> {
        if self.editor.trim().is_empty() {
            return Err(ConfigError::NoEditor);
        }

        if self.cheatpaths.is_empty() {
            return Err(ConfigError::NoCheatpaths);
        }

        let mut names = HashSet::new();
        let mut paths = HashSet::new();
        for cheatpath in &self.cheatpaths {
            cheatpath.validate()?;

            if !names.insert(cheatpath.name.as_str()) {
                return Err(ConfigError::DuplicateName {
                    name: cheatpath.name.clone(),
                });
            }

            if !paths.insert(cheatpath.path.as_path()) {
                return Err(ConfigError::DuplicatePath {
                    path: cheatpath.path.clone(),
                });
            }
        }

        if !FORMATTERS.contains(&self.formatter.as_str()) {
            return Err(ConfigError::InvalidFormatter {
                formatter: self.formatter.clone(),
            });
        }

        Ok(())
    }

    /// Determine if output should be decorated.
    ///
    /// Decoration is only applied when standard output is a terminal, unless
    /// `force` is set.
    pub fn should_colorize(&self, force: bool) -> bool {
        force || (self.colorize && io::stdout().is_terminal())
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        // INVARIANT: An empty document is an empty configuration.
        let config: Option<Config> = serde_yaml::from_str(data)?;
        Ok(config.unwrap_or_default())
    }
}

/// Determine editor command.
///
/// Prefers `VISUAL`, then `EDITOR`, then `configured`, and finally the first
/// of `editor`, `nano`, or `vim` that exists on `PATH`.
pub fn resolve_editor(configured: &str) -> Option<String> {
    ["VISUAL", "EDITOR"]
        .into_iter()
        .filter_map(|key| env::var(key).ok())
        .chain([configured.to_owned()])
        .map(|editor| editor.trim().to_owned())
        .find(|editor| !editor.is_empty())
        .or_else(|| {
            FALLBACK_EDITORS
                .into_iter()
                .find_map(find_program)
                .map(|path| path.to_string_lossy().into_owned())
        })
}

/// Determine default pager command.
///
/// Prefers `PAGER`, then the first of `pager`, `less`, or `more` that exists
/// on `PATH`. Returns an empty string if none can be found.
pub fn default_pager() -> String {
    env::var("PAGER")
        .ok()
        .filter(|pager| !pager.trim().is_empty())
        .or_else(|| {
            FALLBACK_PAGERS
                .into_iter()
                .find_map(find_program)
                .map(|path| path.to_string_lossy().into_owned())
        })
        .unwrap_or_default()
}

/// Locate executable program by name in directories listed by `PATH`.
pub fn find_program(name: &str) -> Option<PathBuf> {
    which::which(name)
        .inspect_err(|err| debug!("{name} not found on PATH: {err}"))
        .ok()
}

/// Default configuration file contents.
///
/// Rendered into a new configuration file on first run, or printed for the
/// user to redirect wherever they like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigTemplate {
    pub editor: String,
    pub pager: String,
    pub community: PathBuf,
    pub personal: PathBuf,
}

impl ConfigTemplate {
    /// Construct template with cheatpaths under `config_dir`.
    ///
    /// Community cheatsheets live in `config_dir/cheatsheets/community`, and
    /// personal ones in `config_dir/cheatsheets/personal`.
    pub fn new(config_dir: impl AsRef<Path>) -> Self {
        let cheatsheets = config_dir.as_ref().join("cheatsheets");
        Self {
            editor: resolve_editor("").unwrap_or_else(|| "vim".into()),
            pager: default_pager(),
            community: cheatsheets.join("community"),
            personal: cheatsheets.join("personal"),
        }
    }

    /// Render template as YAML.
    pub fn render(&self) -> String {
        format!(
            r#"---
# Command used by 'cheat -e <sheet>'. VISUAL and EDITOR take precedence.
editor: {editor}

# Decorate output even when it is not going to a terminal.
colorize: false

# Highlighting style and formatter.
# Formatter is one of "terminal", "terminal256", or "terminal16m".
style: monokai
formatter: terminal256

# Command that output is piped through. Leave empty to print directly.
pager: {pager}

# Cheatpaths are directories of cheatsheets. They are listed from the most
# global to the most local. When two cheatpaths hold a cheatsheet with the
# same title, the more local one wins. Use 'cheat -p <name>' to look at one
# cheatpath only.
#
# Read-only cheatpaths are never written to. Editing a cheatsheet found in
# one copies it to the most local writable cheatpath first.
#
# Tags listed for a cheatpath are applied to every cheatsheet inside of it.
#
# A '.cheat' directory in the current directory, or in any parent of it, is
# appended automatically as a writable cheatpath named "cwd".
cheatpaths:
  - name: community
    path: {community}
    tags: [ community ]
    readonly: true

  - name: personal
    path: {personal}
    tags: [ personal ]
    readonly: false
"#,
            editor = self.editor,
            pager = self.pager,
            community = self.community.display(),
            personal = self.personal.display(),
        )
    }

    /// Write rendered template to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Write`] if file or its parents cannot be
    ///   created.
    #[instrument(skip(self, path), level = "debug")]
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let written = match path.parent() {
            Some(parent) => mkdirp::mkdirp(parent).map(|_| ()),
            None => Ok(()),
        }
        .and_then(|_| fs::write(path, self.render()));

        written.map_err(|err| ConfigError::Write {
            source: err,
            path: path.into(),
        })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {:?}", path.display())]
    Read {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    #[error("failed to write configuration file {:?}", path.display())]
    Write {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    #[error("failed to parse configuration")]
    Deserialize(#[from] serde_yaml::Error),

    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<env::VarError>),

    #[error("failed to resolve cheatpath {:?}", path.display())]
    Resolve {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    #[error("no editor set")]
    NoEditor,

    #[error("no cheatpaths specified")]
    NoCheatpaths,

    #[error(transparent)]
    Cheatpath(#[from] CheatpathError),

    #[error("cheatpath name is not unique: {name}")]
    DuplicateName { name: String },

    #[error("cheatpath path is not unique: {:?}", path.display())]
    DuplicatePath { path: PathBuf },

    #[error("formatter is not supported: {formatter}")]
    InvalidFormatter { formatter: String },
}

/// Friendly result alias :3
pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
