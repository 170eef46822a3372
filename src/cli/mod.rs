//! Command-line interface for on-save-hook.
//!
//! The `on-save` binary runs in one of three modes, chosen once at startup:
//! - paths on the command line: check each one
//! - no paths, interactive terminal: check the whole project
//! - no paths, piped stdin: act as the agent's post-edit hook

mod commands;
pub mod logging;

use crate::config::Config;
use crate::core::detector::PackageManager;
use crate::core::error::{Error, Result};
use crate::protocol::HookResponse;
use clap::error::ErrorKind;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

/// Save-time type checking and linting for AI coding agents.
#[derive(Debug, Parser)]
#[command(
    name = "on-save",
    author,
    version,
    about = "Save-time type checking and linting for AI coding agents",
    long_about = r#"
on-save checks TypeScript, JavaScript and Svelte files right after an AI
coding agent edits them, and blocks the agent until the errors are fixed.

Modes:
  on-save src/app.ts lib/    # check each path, one JSON document per path
  on-save                    # in a terminal: check the whole project
  <payload> | on-save        # hook mode: read the agent's JSON payload

Exit codes:
  0  continue
  1  failure (missing tools, bad input, failing checks outside hook mode)
  2  block: the agent must fix the reported issues

Environment variables:
  ON_SAVE_PACKAGE_MANAGER=bun|npm|pnpm|yarn   Force a package manager
  ON_SAVE_LOG_DIR=<dir>                       Directory for daily log files
  ON_SAVE_LOG=<filter>                        Tracing filter for stderr
"#
)]
pub struct Cli {
    /// Files or directories to check.
    #[arg(value_name = "PATH")]
    pub paths: Vec<String>,

    /// Package manager used to run the tools.
    #[arg(long, value_enum, env = "ON_SAVE_PACKAGE_MANAGER")]
    pub package_manager: Option<PackageManager>,

    /// Directory for the daily log files.
    #[arg(long, value_name = "DIR", env = "ON_SAVE_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Trace to stderr.
    #[arg(short, long)]
    pub verbose: bool,

    /// Use color in the stderr summary.
    #[arg(long, value_enum, default_value = "auto")]
    pub color: ColorChoice,

    /// Print the default on-save.toml and exit.
    #[arg(long)]
    pub print_default_config: bool,
}

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Always use color.
    Always,
    /// Auto-detect color support.
    #[default]
    Auto,
    /// Never use color.
    Never,
}

/// Execution mode, chosen once per process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Check each path given on the command line.
    Cli(Vec<String>),
    /// Check the whole project in the working directory.
    Interactive,
    /// Read a hook payload from stdin.
    Hook,
}

impl Mode {
    /// Paths win; otherwise a terminal on stdin means a person is waiting.
    #[must_use]
    pub fn select(paths: Vec<String>, stdin_is_terminal: bool) -> Self {
        if !paths.is_empty() {
            Self::Cli(paths)
        } else if stdin_is_terminal {
            Self::Interactive
        } else {
            Self::Hook
        }
    }

    /// Pretty JSON for people, compact for the host agent.
    #[must_use]
    pub const fn pretty_output(&self) -> bool {
        !matches!(self, Self::Hook)
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Cli(_) => "cli",
            Self::Interactive => "interactive",
            Self::Hook => "hook",
        }
    }
}

/// Runs the CLI.
pub async fn run() -> Result<ExitCode> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return Ok(argument_error(&e)),
    };

    if cli.print_default_config {
        print!("{}", Config::default_toml());
        return Ok(ExitCode::SUCCESS);
    }

    setup_color(cli.color);

    let loaded = Config::load_or_default();
    let log_dir = logging::log_dir(
        cli.log_dir.as_deref(),
        loaded.as_ref().ok().and_then(|c| c.log_dir.as_deref()),
    );
    logging::init(&log_dir, cli.verbose);

    let mode = Mode::select(cli.paths, std::io::stdin().is_terminal());

    tracing::info!("{}", "=".repeat(60));
    tracing::info!(mode = mode.name(), version = env!("CARGO_PKG_VERSION"), "on-save started");

    let pretty = mode.pretty_output();
    let code = match mode {
        // Non-editing tool calls must pass even when the config is broken.
        Mode::Hook => commands::hook(loaded, cli.package_manager).await?,
        Mode::Cli(targets) => match loaded {
            Ok(config) => {
                let session = commands::Session::new(config, cli.package_manager);
                commands::check_paths(&session, &targets).await?
            },
            Err(e) => config_error(&e, pretty)?,
        },
        Mode::Interactive => match loaded {
            Ok(config) => {
                let session = commands::Session::new(config, cli.package_manager);
                commands::check_project(&session).await?
            },
            Err(e) => config_error(&e, pretty)?,
        },
    };

    tracing::info!("on-save finished");
    tracing::info!("{}", "=".repeat(60));

    Ok(code)
}

fn config_error(error: &Error, pretty: bool) -> Result<ExitCode> {
    tracing::error!(error = %error, "Failed to load configuration");
    commands::emit_error(error, pretty)
}

/// Help and version print as usual; anything else becomes an error record.
fn argument_error(error: &clap::Error) -> ExitCode {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            if let Err(e) = error.print() {
                eprintln!("{e}");
            }
            ExitCode::SUCCESS
        },
        _ => {
            let rendered = error.to_string();
            let message = rendered
                .lines()
                .next()
                .unwrap_or("invalid arguments")
                .trim_start_matches("error: ");
            println!("{}", HookResponse::error(message).to_json(false));
            ExitCode::FAILURE
        },
    }
}

/// Sets up color output.
fn setup_color(choice: ColorChoice) {
    match choice {
        ColorChoice::Always => {
            console::set_colors_enabled(true);
            console::set_colors_enabled_stderr(true);
        },
        ColorChoice::Never => {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        },
        ColorChoice::Auto => {
            // Let console crate auto-detect
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_help() {
        let err = Cli::try_parse_from(["on-save", "--help"]).expect_err("help exits early");
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version() {
        let err = Cli::try_parse_from(["on-save", "--version"]).expect_err("version exits early");
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    }

    // =========================================================================
    // Argument parsing tests
    // =========================================================================

    #[test]
    fn test_parse_no_arguments() {
        let cli = Cli::try_parse_from(["on-save"]).expect("parse");
        assert!(cli.paths.is_empty());
        assert!(!cli.verbose);
        assert!(!cli.print_default_config);
        assert_eq!(cli.color, ColorChoice::Auto);
    }

    #[test]
    fn test_parse_paths_in_order() {
        let cli = Cli::try_parse_from(["on-save", "b.ts", "a.svelte", "src"]).expect("parse");
        assert_eq!(cli.paths, vec!["b.ts", "a.svelte", "src"]);
    }

    #[test]
    fn test_parse_package_manager() {
        let cli =
            Cli::try_parse_from(["on-save", "--package-manager", "pnpm", "a.ts"]).expect("parse");
        assert_eq!(cli.package_manager, Some(PackageManager::Pnpm));
    }

    #[test]
    fn test_parse_invalid_package_manager() {
        let result = Cli::try_parse_from(["on-save", "--package-manager", "deno"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_log_dir() {
        let cli = Cli::try_parse_from(["on-save", "--log-dir", "/tmp/logs"]).expect("parse");
        assert_eq!(cli.log_dir, Some(PathBuf::from("/tmp/logs")));
    }

    #[test]
    fn test_parse_short_verbose() {
        let cli = Cli::try_parse_from(["on-save", "-v", "a.ts"]).expect("parse");
        assert!(cli.verbose);
    }

    #[test]
    fn test_parse_color_never() {
        let cli = Cli::try_parse_from(["on-save", "--color", "never"]).expect("parse");
        assert_eq!(cli.color, ColorChoice::Never);
    }

    #[test]
    fn test_unknown_flag_is_error() {
        let err = Cli::try_parse_from(["on-save", "--frobnicate"]).expect_err("unknown flag");
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    // =========================================================================
    // Mode selection tests
    // =========================================================================

    #[test]
    fn test_paths_select_cli_mode() {
        let mode = Mode::select(vec!["a.ts".into()], true);
        assert_eq!(mode, Mode::Cli(vec!["a.ts".into()]));

        let mode = Mode::select(vec!["a.ts".into()], false);
        assert!(matches!(mode, Mode::Cli(_)));
    }

    #[test]
    fn test_terminal_selects_interactive_mode() {
        assert_eq!(Mode::select(Vec::new(), true), Mode::Interactive);
    }

    #[test]
    fn test_piped_stdin_selects_hook_mode() {
        assert_eq!(Mode::select(Vec::new(), false), Mode::Hook);
    }

    #[test]
    fn test_only_hook_mode_is_compact() {
        assert!(Mode::Cli(Vec::new()).pretty_output());
        assert!(Mode::Interactive.pretty_output());
        assert!(!Mode::Hook.pretty_output());
    }

    #[test]
    fn test_color_choice_default() {
        assert_eq!(ColorChoice::default(), ColorChoice::Auto);
    }
}
