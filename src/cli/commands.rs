//! Mode implementations.

use crate::checks::Toolchain;
use crate::config::Config;
use crate::core::detector::{Detector, PackageManager};
use crate::core::error::{Error, Result};
use crate::core::executor::Executor;
use crate::core::preflight::DependencyCache;
use crate::core::runner::Runner;
use crate::protocol::{render_cli, render_hook, Diagnostic, ExitStatus, HookRequest, Rendered};
use console::style;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::io::AsyncReadExt;

/// How much of the hook payload goes into the log.
const PAYLOAD_LOG_CHARS: usize = 500;

/// Settings shared by every mode.
#[derive(Debug)]
pub struct Session {
    config: Config,
    package_manager: Option<PackageManager>,
}

impl Session {
    /// Creates a session; `package_manager` overrides detection.
    pub const fn new(config: Config, package_manager: Option<PackageManager>) -> Self {
        Self {
            config,
            package_manager,
        }
    }

    fn runner(&self, root: &Path) -> Runner<Executor> {
        let detection = Detector::new(&self.config)
            .with_override(self.package_manager)
            .detect(root);
        tracing::info!(
            manager = %detection.manager,
            reason = %detection.reason,
            root = %root.display(),
            "Package manager selected"
        );

        Runner::new(
            Executor::new(),
            Toolchain::new(detection.manager, root, self.config.lint.enabled),
        )
    }
}

/// Checks each target in order, one pretty document per target.
pub async fn check_paths(session: &Session, targets: &[String]) -> Result<ExitCode> {
    let root = current_dir()?;
    let runner = session.runner(&root);
    let mut cache = DependencyCache::new(session.config.cache_ttl());
    let mut status = ExitStatus::Continue;

    for target in targets {
        tracing::info!(target_path = %target, "Processing target");
        let rendered = render_cli(runner.check(target, &mut cache).await);
        emit(&rendered, true)?;
        status = status.max(rendered.status);
    }

    Ok(status.into())
}

/// Checks the whole project in the working directory.
pub async fn check_project(session: &Session) -> Result<ExitCode> {
    tracing::info!("No paths given, checking the current directory");
    check_paths(session, &[".".to_string()]).await
}

/// Handles one hook payload from stdin.
///
/// `loaded` is the configuration found from the process working directory.
/// It is only consulted once an editing tool needs checking, so a broken
/// config file never turns other tool calls into failures.
pub async fn hook(
    loaded: Result<Config>,
    package_manager: Option<PackageManager>,
) -> Result<ExitCode> {
    let mut input = String::new();
    if let Err(e) = tokio::io::stdin().read_to_string(&mut input).await {
        let error = Error::invalid_input(format!("Failed to read stdin: {e}"));
        tracing::error!(error = %error, "Unreadable hook input");
        return emit_error(&error, false);
    }

    let preview: String = input.chars().take(PAYLOAD_LOG_CHARS).collect();
    tracing::debug!(payload = %preview, "Received hook input");

    let request = match HookRequest::parse(&input) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected hook input");
            return emit_error(&e, false);
        },
    };

    if !request.is_edit_tool() {
        tracing::debug!(tool = %request.tool_name, "Ignoring tool");
        return finish(&Rendered::non_edit_tool(&request.tool_name), false);
    }

    let Some(file_path) = request.file_path() else {
        tracing::warn!(tool = %request.tool_name, "No file_path in tool input");
        return emit_error(&Error::invalid_input("No file_path found in tool input"), false);
    };

    let root = match request.cwd {
        Some(ref cwd) => cwd.clone(),
        None => current_dir()?,
    };

    // The payload's cwd may sit under a different on-save.toml.
    let config = match request.cwd {
        Some(ref cwd) => Config::load_or_default_from(cwd),
        None => loaded,
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            return emit_error(&e, false);
        },
    };

    tracing::info!(tool = %request.tool_name, file = file_path, "Processing edit");

    let session = Session::new(config, package_manager);
    let runner = session.runner(&root);
    let mut cache = DependencyCache::new(session.config.cache_ttl());
    let report = runner.check(file_path, &mut cache).await;

    finish(&render_hook(&request.tool_name, report), false)
}

/// Writes an error record and returns exit 1.
pub fn emit_error(error: &Error, pretty: bool) -> Result<ExitCode> {
    finish(&Rendered::error(error), pretty)
}

fn finish(rendered: &Rendered, pretty: bool) -> Result<ExitCode> {
    emit(rendered, pretty)?;
    Ok(rendered.status.into())
}

/// Writes the response to stdout and any diagnostic to stderr.
fn emit(rendered: &Rendered, pretty: bool) -> Result<()> {
    let json = rendered.response.to_json(pretty);
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}").map_err(|e| Error::io("write response", e))?;
    stdout.flush().map_err(|e| Error::io("flush response", e))?;

    if let Some(ref diagnostic) = rendered.diagnostic {
        print_diagnostic(diagnostic);
    }

    Ok(())
}

fn print_diagnostic(diagnostic: &Diagnostic) {
    match diagnostic {
        Diagnostic::Message(message) => {
            eprintln!("{} {}", style("✗").red(), style(message).red());
        },
        Diagnostic::Findings(findings) => {
            for finding in findings {
                eprintln!("{} {}", style("✗").red(), style(&finding.heading).red().bold());
                if let Some(ref excerpt) = finding.excerpt {
                    eprintln!("{excerpt}");
                }
            }
        },
    }
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| Error::io("get current dir", e))
}
