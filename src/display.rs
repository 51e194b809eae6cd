// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Output presentation.
//!
//! Everything meant for the user is rendered into a string first, then handed
//! to [`write`] which either prints it, or pipes it through the configured
//! pager.

use console::style;
use std::{
    io::{self, Write},
    process::{Child, Command, ExitStatus, Stdio},
};
use tracing::{debug, instrument};

/// Write output to standard output, or through `pager` if one is set.
///
/// The pager command is split on whitespace into program and arguments.
///
/// # Errors
///
/// - Return [`DisplayError::Stdout`] if standard output cannot be written.
/// - Return [`DisplayError::Spawn`] if pager cannot be started.
/// - Return [`DisplayError::Status`] if pager exits unsuccessfully.
#[instrument(skip(out), level = "debug")]
pub fn write(out: &str, pager: &str) -> Result<()> {
    if pager.trim().is_empty() {
        let mut stdout = io::stdout().lock();
        return stdout
            .write_all(out.as_bytes())
            .and_then(|_| stdout.flush())
            .map_err(DisplayError::Stdout);
    }

    let child = spawn_pager(out, pager, Stdio::inherit())?;
    wait_pager(child, pager).map(|_| ())
}

fn spawn_pager(out: &str, pager: &str, stdout: Stdio) -> Result<Child> {
    let mut parts = pager.split_whitespace();
    let program = parts.next().unwrap_or_default();
    let mut child = Command::new(program)
        .args(parts)
        .stdin(Stdio::piped())
        .stdout(stdout)
        .spawn()
        .map_err(|err| DisplayError::Spawn {
            source: err,
            command: pager.into(),
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        // INVARIANT: Quitting the pager early is not an error.
        if let Err(err) = stdin.write_all(out.as_bytes()) {
            if err.kind() != io::ErrorKind::BrokenPipe {
                return Err(DisplayError::Pipe {
                    source: err,
                    command: pager.into(),
                });
            }
            debug!("pager closed its input early");
        }
    }

    Ok(child)
}

fn wait_pager(child: Child, pager: &str) -> Result<Vec<u8>> {
    let output = child.wait_with_output().map_err(|err| DisplayError::Pipe {
        source: err,
        command: pager.into(),
    })?;

    if !output.status.success() {
        return Err(DisplayError::Status {
            command: pager.into(),
            status: output.status,
        });
    }

    Ok(output.stdout)
}

/// Dim text when decorating.
///
/// Decoration is decided by `colorize` alone, not by whether standard output
/// happens to be a terminal.
pub fn faint(text: &str, colorize: bool) -> String {
    style(text).dim().force_styling(colorize).to_string()
}

/// Underline text when decorating.
pub fn underline(text: &str, colorize: bool) -> String {
    style(text).underlined().force_styling(colorize).to_string()
}

/// Prefix every line of text with a tab.
pub fn indent(text: &str) -> String {
    text.split('\n')
        .map(|line| format!("\t{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Align rows of cells into columns.
///
/// Every column but the last is padded to its widest cell plus one space.
/// Each row ends with a newline.
pub fn columnize<S: AsRef<str>>(rows: &[Vec<S>]) -> String {
    let mut widths: Vec<usize> = Vec::new();
    for row in rows {
        for (index, cell) in row.iter().enumerate().take(row.len().saturating_sub(1)) {
            let width = cell.as_ref().chars().count();
            match widths.get_mut(index) {
                Some(max) => *max = (*max).max(width),
                None => widths.push(width),
            }
        }
    }

    let mut out = String::new();
    for row in rows {
        let last = row.len().saturating_sub(1);
        for (index, cell) in row.iter().enumerate() {
            let cell = cell.as_ref();
            if index == last {
                out.push_str(cell);
            } else {
                let pad = widths[index] + 1 - cell.chars().count();
                out.push_str(cell);
                out.extend(std::iter::repeat(' ').take(pad));
            }
        }
        out.push('\n');
    }

    out
}

/// Presentation error types.
#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("failed to write to standard output")]
    Stdout(#[source] io::Error),

    #[error("failed to start pager {command:?}")]
    Spawn {
        #[source]
        source: io::Error,
        command: String,
    },

    #[error("failed to write to pager {command:?}")]
    Pipe {
        #[source]
        source: io::Error,
        command: String,
    },

    #[error("pager {command:?} failed with {status}")]
    Status { command: String, status: ExitStatus },
}

/// Friendly result alias :3
pub type Result<T, E = DisplayError> = std::result::Result<T, E>;
