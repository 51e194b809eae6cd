// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! First-run installation.
//!
//! When no configuration file exists, the user is offered to have one
//! created. The new configuration lists a read-only community cheatpath and a
//! writable personal cheatpath next to the configuration file. The community
//! cheatsheets can be cloned into place at the same time.

use crate::{
    config::{ConfigError, ConfigTemplate},
    sync::transfer::{self, BarPrompter},
};

use auth_git2::GitAuthenticator;
use git2::{build::RepoBuilder, Config};
use indicatif::{ProgressBar, ProgressStyle};
use inquire::Confirm;
use std::{
    io,
    path::{Path, PathBuf},
    time,
};
use tracing::{info, instrument};

/// Upstream repository of community cheatsheets.
pub const COMMUNITY_URL: &str = "https://github.com/cheat/cheatsheets.git";

/// Installation plan for a new configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installer {
    config_path: PathBuf,
    template: ConfigTemplate,
}

impl Installer {
    /// Plan installation of configuration file at `config_path`.
    ///
    /// Cheatpaths are placed under the directory of `config_path`.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        let config_path = config_path.into();
        let config_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let template = ConfigTemplate::new(config_dir);

        Self {
            config_path,
            template,
        }
    }

    /// Path configuration file will be written to.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Configuration that will be written.
    pub fn template(&self) -> &ConfigTemplate {
        &self.template
    }

    /// Ask the user before installing anything.
    ///
    /// Returns false if the user declined to create a configuration file.
    ///
    /// # Errors
    ///
    /// - Return [`InstallError::Prompt`] if the user cannot be asked.
    /// - See [`Installer::install`] for the rest.
    pub fn run_interactive(&self) -> Result<bool> {
        let create = Confirm::new("A config file was not found. Would you like to create one now?")
            .with_default(true)
            .prompt()?;
        if !create {
            return Ok(false);
        }

        let download = Confirm::new("Would you like to download the community cheatsheets?")
            .with_default(true)
            .prompt()?;
        let community = download.then_some(COMMUNITY_URL);
        self.install(community, ProgressBar::new(0))?;

        Ok(true)
    }

    /// Create configuration file, optionally cloning community cheatsheets
    /// from `community_url` first.
    ///
    /// The personal cheatpath directory is always created, so that the new
    /// configuration has at least one cheatpath that exists.
    ///
    /// # Errors
    ///
    /// - Return [`InstallError::Git2`] if community cheatsheets cannot be
    ///   cloned.
    /// - Return [`InstallError::CreateDir`] if personal cheatpath cannot be
    ///   created.
    /// - Return [`InstallError::Config`] if configuration file cannot be
    ///   written.
    #[instrument(skip(self, bar), level = "debug")]
    pub fn install(&self, community_url: Option<&str>, bar: ProgressBar) -> Result<()> {
        if let Some(url) = community_url {
            info!(
                "cloning community cheatsheets to {}",
                self.template.community.display()
            );
            clone_repository(url, &self.template.community, bar)?;
        }

        let personal = &self.template.personal;
        mkdirp::mkdirp(personal).map_err(|err| InstallError::CreateDir {
            source: err,
            path: personal.clone(),
        })?;

        self.template.write(&self.config_path)?;
        info!("created config file {}", self.config_path.display());

        Ok(())
    }
}

/// Clone repository at `url` into `path`, reporting progress through `bar`.
///
/// # Errors
///
/// - Return [`InstallError::Git2`] if clone fails.
/// - Return [`InstallError::Template`] if progress style is invalid.
#[instrument(skip(bar), level = "debug")]
pub fn clone_repository(url: &str, path: &Path, bar: ProgressBar) -> Result<()> {
    let style =
        ProgressStyle::with_template("{elapsed_precise:.green}  {msg:<50}  [{wide_bar:.yellow/blue}]")?
            .progress_chars("-Cco.");
    bar.set_style(style);
    bar.set_message(url.to_string());
    bar.enable_steady_tick(time::Duration::from_millis(100));

    // INVARIANT: Only the installer ever prompts for credentials.
    let authenticator = GitAuthenticator::default().set_prompter(BarPrompter::new(bar.clone()));
    let config = Config::open_default()?;
    let opts = transfer::fetch_options(&authenticator, &config, &bar);
    let cloned = RepoBuilder::new().fetch_options(opts).clone(url, path);
    bar.finish_and_clear();
    cloned?;

    Ok(())
}

/// Installation error types.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error(transparent)]
    Git2(#[from] git2::Error),

    #[error(transparent)]
    Template(#[from] indicatif::style::TemplateError),

    #[error(transparent)]
    Prompt(#[from] inquire::InquireError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to create directory {:?}", path.display())]
    CreateDir {
        #[source]
        source: io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = InstallError> = std::result::Result<T, E>;
