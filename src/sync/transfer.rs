// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Network transfer plumbing shared by clones and fetches.

use auth_git2::{GitAuthenticator, Prompter};
use git2::{FetchOptions, Progress, RemoteCallbacks};
use indicatif::ProgressBar;
use inquire::{InquireError, Password, Text};
use std::path::Path;
use tracing::{debug, info, trace};

/// Build fetch options that authenticate through `authenticator` and report
/// received objects on `bar`.
///
/// Used for both clones and fetches.
pub fn fetch_options<'a>(
    authenticator: &'a GitAuthenticator,
    config: &'a git2::Config,
    bar: &'a ProgressBar,
) -> FetchOptions<'a> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(authenticator.credentials(config));
    callbacks.transfer_progress(move |progress| {
        report_progress(bar, &progress);
        true
    });
    callbacks.sideband_progress(|text| {
        trace!("remote: {}", String::from_utf8_lossy(text).trim_end());
        true
    });

    let mut opts = FetchOptions::new();
    opts.remote_callbacks(callbacks);
    opts
}

// INVARIANT: Bar length tracks total objects, position tracks received ones.
//   - The bar rate-limits its own redraws.
fn report_progress(bar: &ProgressBar, progress: &Progress<'_>) {
    bar.set_length(progress.total_objects() as u64);
    bar.set_position(progress.received_objects() as u64);
}

/// Credential prompter that hides the progress bar while asking.
///
/// A prompt the user aborts, or one that cannot be shown at all, counts as no
/// answer. The transfer then fails with an authentication error.
#[derive(Debug, Clone)]
pub struct BarPrompter {
    bar: ProgressBar,
}

impl BarPrompter {
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }

    fn ask(&self, ask: impl FnOnce() -> Result<String, InquireError>) -> Option<String> {
        self.bar
            .suspend(ask)
            .inspect_err(|err| debug!("credential prompt not answered: {err}"))
            .ok()
    }

    fn ask_secret(&self, label: &str) -> Option<String> {
        self.ask(|| Password::new(label).without_confirmation().prompt())
    }
}

impl Prompter for BarPrompter {
    fn prompt_username_password(
        &mut self,
        url: &str,
        config: &git2::Config,
    ) -> Option<(String, String)> {
        info!("{url} requires a username and password");
        let known = config.get_string("credential.username").ok();
        let username = self.ask(|| {
            let prompt = Text::new("username:");
            match known.as_deref() {
                Some(known) => prompt.with_default(known).prompt(),
                None => prompt.prompt(),
            }
        })?;
        let password = self.ask_secret("password:")?;

        Some((username, password))
    }

    fn prompt_password(
        &mut self,
        username: &str,
        url: &str,
        _config: &git2::Config,
    ) -> Option<String> {
        info!("{url} requires a password for {username}");
        self.ask_secret(&format!("password for {username}:"))
    }

    fn prompt_ssh_key_passphrase(
        &mut self,
        ssh_key_path: &Path,
        _config: &git2::Config,
    ) -> Option<String> {
        info!("ssh key {} is encrypted", ssh_key_path.display());
        self.ask_secret(&format!("passphrase for {}:", ssh_key_path.display()))
    }
}
