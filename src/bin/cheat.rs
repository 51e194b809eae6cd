// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use cheat::{
    catalog::{self, SheetMap},
    cheatpath,
    config::{Config, ConfigTemplate},
    display,
    install::Installer,
    path::{config_file_candidates, locate_config_file},
    sheet::validate::validate_name,
    sync,
};

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, ValueEnum};
use clap_complete::{generate, shells};
use indicatif::ProgressBar;
use regex::Regex;
use std::{
    env, fs,
    io::{self, Write},
    path::Path,
    process::{exit, Command},
};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit status when requested cheatsheet does not exist.
const EXIT_NOT_FOUND: i32 = 2;

const EXAMPLES: &str = "\
Examples:
  To view the tar cheatsheet:
    cheat tar

  To edit (or create) the foo/bar cheatsheet on the \"work\" cheatpath:
    cheat -p work -e foo/bar

  To briefly list all cheatsheets whose titles match \"apt\":
    cheat -b apt

  To list available cheatsheets that are tagged as \"personal\":
    cheat -l -t personal

  To search (by regex) for cheatsheets that contain an IP address:
    cheat -r -s '(?:[0-9]{1,3}\\.){3}[0-9]{1,3}'

  To update cheatpaths that are git repositories:
    cheat -u

  To generate shell completions (bash, zsh, fish, powershell):
    cheat --completion bash";

/// Create and view interactive cheatsheets on the command-line.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cheat",
    about,
    override_usage = "\n  cheat [options] [cheatsheet]",
    after_help = EXAMPLES
)]
struct Cli {
    /// Cheatsheet to view, or title pattern when listing.
    #[arg(value_name = "cheatsheet")]
    pub cheatsheet: Option<String>,

    /// Show cheatsheet from every cheatpath that has it.
    #[arg(short, long)]
    pub all: bool,

    /// List cheatsheets without file paths.
    #[arg(short, long)]
    pub brief: bool,

    /// Decorate output.
    #[arg(short, long)]
    pub colorize: bool,

    /// List cheatsheet directories.
    #[arg(short, long)]
    pub directories: bool,

    /// Write a default config file to stdout.
    #[arg(long)]
    pub init: bool,

    /// List cheatsheets.
    #[arg(short, long)]
    pub list: bool,

    /// Treat search phrase as a regex.
    #[arg(short, long)]
    pub regex: bool,

    /// List all tags in use.
    #[arg(short = 'T', long)]
    pub tags: bool,

    /// Print the version number.
    #[arg(short, long)]
    pub version: bool,

    /// Display the config file path.
    #[arg(long)]
    pub conf: bool,

    /// Update cheatpaths that are git repositories.
    #[arg(short, long)]
    pub update: bool,

    /// Edit cheatsheet.
    #[arg(short, long, value_name = "cheatsheet")]
    pub edit: Option<String>,

    /// Return only sheets found on cheatpath name.
    #[arg(short, long, value_name = "name")]
    pub path: Option<String>,

    /// Search cheatsheets for phrase.
    #[arg(short, long, value_name = "phrase")]
    pub search: Option<String>,

    /// Return only sheets matching tags, comma separated.
    #[arg(short, long, value_name = "tag")]
    pub tag: Option<String>,

    /// Remove (delete) cheatsheet.
    #[arg(long, value_name = "cheatsheet")]
    pub rm: Option<String>,

    /// Generate shell completion script.
    #[arg(long, value_enum, value_name = "shell")]
    pub completion: Option<Shell>,
}

/// Shells that completion scripts can be generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}

impl Cli {
    fn run(self) -> Result<i32> {
        if let Some(shell) = self.completion {
            write_completion(shell, &mut io::stdout().lock());
            return Ok(0);
        }

        if self.init {
            return run_init();
        }

        if self.version {
            println!("{}", env!("CARGO_PKG_VERSION"));
            return Ok(0);
        }

        let candidates = config_file_candidates()?;
        let config_path = match locate_config_file(&candidates) {
            Ok(path) => path,
            Err(_) => return run_installer(&candidates),
        };

        let cwd = env::current_dir().context("failed to determine current directory")?;
        let mut config = Config::load(&config_path, cwd).context("failed to load config")?;
        config.validate().context("failed to load config")?;

        if let Some(name) = &self.path {
            config.cheatpaths = cheatpath::filter_by_name(&config.cheatpaths, name)
                .context("invalid option --path")?;
        }

        if self.conf {
            println!("{}", config.path.display());
            Ok(0)
        } else if self.directories {
            run_directories(&config)
        } else if self.update {
            run_update(&config)
        } else if let Some(name) = &self.edit {
            run_edit(&self, &config, name)
        } else if self.list || self.brief {
            run_list(&self, &config)
        } else if self.tags {
            run_tags(&config)
        } else if let Some(phrase) = &self.search {
            run_search(&self, &config, phrase)
        } else if let Some(name) = &self.rm {
            run_remove(&self, &config, name)
        } else if let Some(name) = &self.cheatsheet {
            run_view(&self, &config, name)
        } else if self.tag.is_some() {
            run_list(&self, &config)
        } else {
            Cli::command().print_help()?;
            Ok(0)
        }
    }

    fn tag_filter(&self) -> Vec<String> {
        self.tag
            .as_deref()
            .map(|tags| tags.split(',').map(String::from).collect())
            .unwrap_or_default()
    }

    fn load_sheets(&self, config: &Config) -> Result<Vec<SheetMap>> {
        let sheets = catalog::load(&config.cheatpaths).context("failed to list cheatsheets")?;
        match self.tag {
            Some(_) => Ok(catalog::filter(&sheets, self.tag_filter().as_slice())),
            None => Ok(sheets),
        }
    }
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    match Cli::parse().run() {
        Ok(code) => exit(code),
        Err(error) => {
            error!("{error:?}");
            exit(1);
        }
    }
}

fn write_completion(shell: Shell, out: &mut impl Write) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    match shell {
        Shell::Bash => generate(shells::Bash, &mut cmd, name, out),
        Shell::Zsh => generate(shells::Zsh, &mut cmd, name, out),
        Shell::Fish => generate(shells::Fish, &mut cmd, name, out),
        Shell::PowerShell => generate(shells::PowerShell, &mut cmd, name, out),
    }
}

fn run_init() -> Result<i32> {
    let candidates = config_file_candidates()?;
    let config_path = candidates
        .first()
        .ok_or_else(|| anyhow!("no configuration file candidates"))?;
    let config_dir = config_path.parent().unwrap_or(Path::new(""));
    println!("{}", ConfigTemplate::new(config_dir).render());

    Ok(0)
}

fn run_installer(candidates: &[std::path::PathBuf]) -> Result<i32> {
    let config_path = candidates
        .first()
        .ok_or_else(|| anyhow!("no configuration file candidates"))?;
    let installer = Installer::new(config_path);
    if !installer
        .run_interactive()
        .context("failed to run installer")?
    {
        return Ok(0);
    }

    println!("Created config file: {}", config_path.display());
    println!("Please read this file for advanced configuration information.");
    Ok(0)
}

fn run_directories(config: &Config) -> Result<i32> {
    let rows = config
        .cheatpaths
        .iter()
        .map(|cheatpath| {
            vec![
                format!("{}:", cheatpath.name),
                cheatpath.path.display().to_string(),
            ]
        })
        .collect::<Vec<_>>();
    display::write(&display::columnize(&rows), &config.pager)?;

    Ok(0)
}

fn run_update(config: &Config) -> Result<i32> {
    let report = sync::pull_all(&config.cheatpaths, |cheatpath| {
        let bar = ProgressBar::new(0);
        bar.set_message(cheatpath.name.clone());
        bar
    });
    report
        .write_to(&mut io::stdout().lock(), &mut io::stderr().lock())
        .context("failed to report update results")?;

    Ok(report.exit_code())
}

fn run_edit(cli: &Cli, config: &Config, name: &str) -> Result<i32> {
    validate_name(name).context("invalid cheatsheet name")?;

    let sheets = cli.load_sheets(config)?;
    let consolidated = catalog::consolidate(&sheets);

    let edit_path = match consolidated.get(name) {
        Some(sheet) if !sheet.read_only => sheet.path.clone(),
        found => {
            let writeable = cheatpath::writeable(&config.cheatpaths)
                .context("failed to get writeable path")?;
            let title = found.map_or(name, |sheet| sheet.title.as_str());
            let edit_path = writeable.path.join(title);

            match found {
                Some(sheet) => sheet
                    .copy_to(&edit_path)
                    .context("failed to copy cheatsheet")?,
                None => {
                    if let Some(parent) = edit_path.parent() {
                        mkdirp::mkdirp(parent).with_context(|| {
                            format!("failed to create directory {}", parent.display())
                        })?;
                    }
                }
            }

            edit_path
        }
    };

    let mut parts = config.editor.split_whitespace();
    let editor = parts.next().ok_or_else(|| anyhow!("no editor set"))?;
    let status = Command::new(editor)
        .args(parts)
        .arg(&edit_path)
        .status()
        .with_context(|| format!("failed to start editor {editor:?}"))?;
    if !status.success() {
        return Err(anyhow!("failed to edit cheatsheet: editor {status}"));
    }

    Ok(0)
}

fn run_list(cli: &Cli, config: &Config) -> Result<i32> {
    let sheets = cli.load_sheets(config)?;
    let mut flattened = catalog::flatten(&sheets);

    if let Some(pattern) = &cli.cheatsheet {
        let pattern = format!("(?i){pattern}");
        let regex = Regex::new(&pattern)
            .with_context(|| format!("failed to compile regexp: {pattern}"))?;
        flattened.retain(|sheet| regex.is_match(&sheet.title));
    }

    if flattened.is_empty() {
        return Ok(0);
    }

    let rows = if cli.brief {
        std::iter::once(vec!["title:".to_string(), "tags:".to_string()])
            .chain(flattened.iter().map(|sheet| {
                vec![sheet.title.clone(), join_tags(&sheet.tags)]
            }))
            .collect::<Vec<_>>()
    } else {
        std::iter::once(vec![
            "title:".to_string(),
            "file:".to_string(),
            "tags:".to_string(),
        ])
        .chain(flattened.iter().map(|sheet| {
            vec![
                sheet.title.clone(),
                sheet.path.display().to_string(),
                join_tags(&sheet.tags),
            ]
        }))
        .collect::<Vec<_>>()
    };
    display::write(&display::columnize(&rows), &config.pager)?;

    Ok(0)
}

fn run_tags(config: &Config) -> Result<i32> {
    let sheets = catalog::load(&config.cheatpaths).context("failed to list cheatsheets")?;
    let out = catalog::tags(&sheets)
        .into_iter()
        .map(|tag| format!("{tag}\n"))
        .collect::<String>();
    display::write(&out, &config.pager)?;

    Ok(0)
}

fn run_search(cli: &Cli, config: &Config, phrase: &str) -> Result<i32> {
    let sheets = cli.load_sheets(config)?;
    let mut consolidated = catalog::consolidate(&sheets);

    if let Some(name) = &cli.cheatsheet {
        match consolidated.remove(name) {
            Some(sheet) => consolidated = SheetMap::from([(name.clone(), sheet)]),
            None => {
                println!("No cheatsheet found for '{name}'.");
                return Ok(EXIT_NOT_FOUND);
            }
        }
    }

    let pattern = if cli.regex {
        phrase.to_string()
    } else {
        format!("(?i){phrase}")
    };
    let regex =
        Regex::new(&pattern).with_context(|| format!("failed to compile regexp: {pattern}"))?;

    let mut out = String::new();
    for sheet in catalog::sort(&consolidated) {
        let matches = sheet.search(&regex);
        if matches.is_empty() {
            continue;
        }

        out.push_str(&format!("{}:\n", sheet.title));
        for line in matches.split('\n') {
            out.push_str(&format!("  {line}\n"));
        }
    }
    display::write(&out, &config.pager)?;

    Ok(0)
}

fn run_remove(cli: &Cli, config: &Config, name: &str) -> Result<i32> {
    validate_name(name).context("invalid cheatsheet name")?;

    let sheets = cli.load_sheets(config)?;
    let consolidated = catalog::consolidate(&sheets);

    let Some(sheet) = consolidated.get(name) else {
        eprintln!("No cheatsheet found for '{name}'.");
        return Ok(EXIT_NOT_FOUND);
    };

    if sheet.read_only {
        return Err(anyhow!("cheatsheet '{name}' is read-only"));
    }

    fs::remove_file(&sheet.path)
        .with_context(|| format!("failed to delete sheet: {}", sheet.title))?;

    Ok(0)
}

fn run_view(cli: &Cli, config: &Config, name: &str) -> Result<i32> {
    let sheets = cli.load_sheets(config)?;
    let colorize = config.should_colorize(cli.colorize);

    if cli.all {
        let mut out = String::new();
        for sheet in sheets.iter().filter_map(|sheets| sheets.get(name)) {
            out.push_str(&format!(
                "{} {}\n",
                display::underline(&sheet.title, colorize),
                display::faint(&format!("({})", sheet.cheatpath), colorize),
            ));
            out.push_str(&display::indent(&sheet.text));
            out.push('\n');
        }

        if out.is_empty() {
            println!("No cheatsheet found for '{name}'.");
            return Ok(EXIT_NOT_FOUND);
        }

        display::write(&out, &config.pager)?;
        return Ok(0);
    }

    let consolidated = catalog::consolidate(&sheets);
    if let Some(sheet) = consolidated.get(name) {
        display::write(&sheet.text, &config.pager)?;
        return Ok(0);
    }

    // INVARIANT: Retry "tag/title" as title filtered by tag only once.
    if cli.tag.is_none() {
        if let Some((tag, title)) = name.split_once('/').filter(|(tag, title)| {
            !tag.is_empty() && !title.is_empty()
        }) {
            let retry = Cli {
                tag: Some(tag.to_string()),
                cheatsheet: Some(title.to_string()),
                ..cli.clone()
            };
            return run_view(&retry, config, title);
        }
    }

    println!("No cheatsheet found for '{name}'.");
    Ok(EXIT_NOT_FOUND)
}

fn join_tags(tags: &std::collections::BTreeSet<String>) -> String {
    tags.iter().map(String::as_str).collect::<Vec<_>>().join(",")
}
