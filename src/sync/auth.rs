// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Authentication negotiation for cheatpath remotes.
//!
//! SSH remotes get explicit credentials. The default OpenSSH key files in the
//! user's SSH directory are tried first, in the same order OpenSSH itself
//! uses. Only an unencrypted private key qualifies, because nobody is around
//! to type a passphrase in the middle of an update. If no key qualifies, then
//! a running SSH agent is used. Failing that, the transport is left to figure
//! things out on its own.
//!
//! Any other remote gets no explicit credentials. Nothing here ever prompts,
//! so an update never blocks waiting on the user.

use auth_git2::GitAuthenticator;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// Default private key file names in order of preference.
pub const DEFAULT_KEY_FILES: [&str; 6] = [
    "id_rsa",
    "id_ecdsa",
    "id_ecdsa_sk",
    "id_ed25519",
    "id_ed25519_sk",
    "id_dsa",
];

/// User name offered to SSH remotes whose URL names no user.
pub const DEFAULT_SSH_USER: &str = "git";

const OPENSSH_MAGIC: &[u8] = b"openssh-key-v1\0";

/// Authentication strategy for a remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// Use unencrypted SSH private key at path.
    KeyFile(PathBuf),

    /// Use keys held by running SSH agent.
    Agent,

    /// Attach no explicit credentials.
    TransportDefault,
}

impl AuthMethod {
    /// Decide authentication strategy for remote URL.
    ///
    /// Pass `None` for `ssh_dir` when no SSH directory can be determined.
    #[instrument(level = "debug")]
    pub fn decide(url: &str, ssh_dir: Option<&Path>, agent_available: bool) -> Self {
        if !is_ssh_url(url) {
            return Self::TransportDefault;
        }

        if let Some(key) = ssh_dir.and_then(find_key_file) {
            debug!("use ssh key {}", key.display());
            return Self::KeyFile(key);
        }

        if agent_available {
            debug!("use ssh agent");
            return Self::Agent;
        }

        Self::TransportDefault
    }

    /// Build credential negotiator for this strategy.
    ///
    /// SSH strategies fall back to [`DEFAULT_SSH_USER`] when the URL names no
    /// user. The transport default only consults configured Git credential
    /// helpers.
    pub fn authenticator(&self) -> GitAuthenticator {
        match self {
            Self::KeyFile(key) => GitAuthenticator::new_empty()
                .add_username("*", DEFAULT_SSH_USER)
                .add_ssh_key_from_file(key, None),
            Self::Agent => GitAuthenticator::new_empty()
                .add_username("*", DEFAULT_SSH_USER)
                .try_ssh_agent(true),
            Self::TransportDefault => GitAuthenticator::new_empty().try_cred_helper(true),
        }
    }
}

/// Check if remote URL uses the SSH transport.
///
/// Recognizes explicit `ssh://` style URLs, and scp-like `[user@]host:path`
/// shorthand.
pub fn is_ssh_url(url: &str) -> bool {
    let url = url.trim();
    if let Some((scheme, _)) = url.split_once("://") {
        return matches!(scheme, "ssh" | "git+ssh" | "ssh+git");
    }

    let Some((authority, path)) = url.split_once(':') else {
        return false;
    };

    let host = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host);

    // INVARIANT: Single letter hosts are Windows drive letters, e.g., "C:\repo".
    !path.is_empty()
        && host.len() > 1
        && !host.contains(['/', '\\'])
        && !host.chars().any(char::is_whitespace)
}

/// Locate first usable private key in SSH directory.
///
/// Tries [`DEFAULT_KEY_FILES`] in order, and skips files that are missing,
/// unreadable, encrypted, or not private keys at all.
pub fn find_key_file(ssh_dir: &Path) -> Option<PathBuf> {
    DEFAULT_KEY_FILES
        .iter()
        .map(|name| ssh_dir.join(name))
        .find(|path| {
            fs::read_to_string(path)
                .map(|contents| is_unencrypted_private_key(&contents))
                .unwrap_or(false)
        })
}

/// Check if SSH agent is reachable through `SSH_AUTH_SOCK`.
pub fn ssh_agent_available() -> bool {
    env::var_os("SSH_AUTH_SOCK")
        .filter(|sock| !sock.is_empty())
        .is_some_and(|sock| Path::new(&sock).exists())
}

/// Check if text holds a private key that needs no passphrase.
///
/// Understands the OpenSSH container format, and the PEM formats used by
/// older OpenSSH releases.
pub fn is_unencrypted_private_key(contents: &str) -> bool {
    let Some((label, headers, body)) = pem_block(contents) else {
        return false;
    };

    if !label.ends_with("PRIVATE KEY") || label.contains("ENCRYPTED") {
        return false;
    }

    if headers.iter().any(|header| header.contains("ENCRYPTED")) {
        return false;
    }

    let Ok(der) = STANDARD.decode(body) else {
        return false;
    };

    if label == "OPENSSH PRIVATE KEY" {
        return openssh_cipher(&der).is_some_and(|cipher| cipher == b"none");
    }

    !der.is_empty()
}

// Split first PEM block into its label, headers, and base64 body.
fn pem_block(contents: &str) -> Option<(&str, Vec<&str>, String)> {
    let mut lines = contents.lines().map(str::trim);
    let label = lines
        .find_map(|line| line.strip_prefix("-----BEGIN "))?
        .strip_suffix("-----")?;
    let end = format!("-----END {label}-----");

    let mut headers = Vec::new();
    let mut body = String::new();
    for line in lines.by_ref() {
        if line == end {
            return Some((label, headers, body));
        }

        if line.contains(':') {
            headers.push(line);
        } else {
            body.push_str(line);
        }
    }

    None
}

// Extract cipher name from OpenSSH key container.
fn openssh_cipher(der: &[u8]) -> Option<&[u8]> {
    let rest = der.strip_prefix(OPENSSH_MAGIC)?;
    let len = u32::from_be_bytes(rest.get(..4)?.try_into().ok()?) as usize;
    rest.get(4..4 + len)
}
