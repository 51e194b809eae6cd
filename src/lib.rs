// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Create and view interactive cheatsheets on the command-line.
//!
//! A __cheatsheet__ is a short plain text file describing how to use some
//! command. Cheatsheets are stored in __cheatpaths__, which are ordinary
//! directories listed in a configuration file. Cheatpaths are layered, so a
//! personal cheatsheet can override a community cheatsheet of the same title
//! without touching it. Cheatpaths that are Git repositories can be kept up to
//! date with their upstream.
//!
//! # Layout
//!
//! - [`config`] and [`path`] locate and load the configuration file.
//! - [`cheatpath`] models cheatpaths and their precedence.
//! - [`sheet`] models single cheatsheets, and validates cheatsheet names.
//! - [`catalog`] loads every cheatpath and queries the result.
//! - [`sync`] fast-forwards cheatpath repositories.
//! - [`install`] creates a configuration file on first run.
//! - [`display`] renders output to the terminal.

pub mod catalog;
pub mod cheatpath;
pub mod config;
pub mod display;
pub mod install;
pub mod path;
pub mod sheet;
pub mod sync;
