//! The external analysis tools and how to read their output.
//!
//! Each tool's reporter is reduced to error/warning counts and an excerpt
//! through the [`OutputParser`] trait, so swapping a tool to a structured
//! output format only touches its parser.

pub mod eslint;
pub mod excerpt;
pub mod typecheck;

use crate::core::detector::PackageManager;
use crate::core::executor::Invocation;
use crate::core::target::Shape;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Counts and excerpt extracted from one tool's output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOutput {
    /// Lines recognized as errors.
    pub error_count: usize,
    /// Lines recognized as warnings.
    pub warning_count: usize,
    /// Context around the first error lines.
    pub excerpt: Option<String>,
}

/// Turns a tool's human-readable output into counts.
///
/// Detection is line based and best effort: a reporter format change yields
/// zero counts, never an error.
pub trait OutputParser {
    /// Returns true if `line` reports an error.
    fn is_error(&self, line: &str) -> bool;

    /// Returns true if `line` reports a warning.
    fn is_warning(&self, line: &str) -> bool;

    /// Parses the whole output.
    fn parse(&self, raw: &str) -> ParsedOutput {
        let lines: Vec<&str> = raw.lines().collect();
        let mut error_lines = Vec::new();
        let mut warning_count = 0;

        for (idx, line) in lines.iter().enumerate() {
            if self.is_error(line) {
                error_lines.push(idx);
            } else if self.is_warning(line) {
                warning_count += 1;
            }
        }

        ParsedOutput {
            error_count: error_lines.len(),
            warning_count,
            excerpt: excerpt::windows(&lines, &error_lines),
        }
    }
}

/// An external analysis tool. Serializes as its binary name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tool {
    /// The TypeScript compiler, for single source files.
    Tsc,
    /// `svelte-check`, for components and whole projects.
    SvelteCheck,
    /// ESLint, for single files.
    Eslint,
}

impl Tool {
    /// Binary name, also used as the tool label in reports.
    #[must_use]
    pub const fn binary(&self) -> &'static str {
        match self {
            Self::Tsc => "tsc",
            Self::SvelteCheck => "svelte-check",
            Self::Eslint => "eslint",
        }
    }

    /// npm package that provides the binary.
    #[must_use]
    pub const fn package(&self) -> &'static str {
        match self {
            Self::Tsc => "typescript",
            Self::SvelteCheck => "svelte-check",
            Self::Eslint => "eslint",
        }
    }

    /// What the tool does, for report headings.
    #[must_use]
    pub const fn purpose(&self) -> &'static str {
        match self {
            Self::Tsc | Self::SvelteCheck => "Type checking",
            Self::Eslint => "Linting",
        }
    }

    /// The parser for this tool's reporter.
    #[must_use]
    pub fn parser(&self) -> &'static dyn OutputParser {
        match self {
            Self::Tsc | Self::SvelteCheck => &typecheck::TypeCheckParser,
            Self::Eslint => &eslint::EslintParser,
        }
    }

    fn command_args(&self) -> &'static [&'static str] {
        match self {
            Self::Tsc => &["--noEmit", "--pretty", "false"],
            Self::SvelteCheck => &["--output", "human"],
            Self::Eslint => &[],
        }
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.binary())
    }
}

/// One probe of the dependency preflight.
#[derive(Debug, Clone)]
pub struct Requirement {
    /// Name reported when the probe fails.
    pub name: String,
    /// Command that exits zero when the dependency is present.
    pub probe: Invocation,
    /// What to run to fix it.
    pub remedy: String,
}

/// A tool run the invoker has to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRun {
    /// Which tool.
    pub tool: Tool,
    /// The process to spawn.
    pub invocation: Invocation,
}

/// Builds tool command lines for one project.
#[derive(Debug, Clone)]
pub struct Toolchain {
    manager: PackageManager,
    root: PathBuf,
    lint: bool,
}

impl Toolchain {
    /// Creates a toolchain running tools through `manager` in `root`.
    #[must_use]
    pub fn new(manager: PackageManager, root: impl Into<PathBuf>, lint: bool) -> Self {
        Self {
            manager,
            root: root.into(),
            lint,
        }
    }

    /// The package manager in use.
    #[must_use]
    pub const fn manager(&self) -> PackageManager {
        self.manager
    }

    /// The project root, working directory of every tool.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Dependencies to verify before running anything, in probe order.
    #[must_use]
    pub fn requirements(&self) -> Vec<Requirement> {
        let mut requirements = vec![Requirement {
            name: self.manager.name().to_string(),
            probe: Invocation::new(self.manager.program())
                .arg("--version")
                .cwd(&self.root),
            remedy: format!("Install it from {}", self.manager.install_url()),
        }];

        let mut tools = vec![Tool::Tsc, Tool::SvelteCheck];
        if self.lint {
            tools.push(Tool::Eslint);
        }

        requirements.extend(tools.into_iter().map(|tool| Requirement {
            name: format!("{} ({})", tool.package(), tool.binary()),
            probe: self.exec(tool).arg("--version"),
            remedy: format!("Install it with: {}", self.manager.install_hint(tool.package())),
        }));

        requirements
    }

    /// Tool runs for a target, in execution order.
    #[must_use]
    pub fn plan(&self, shape: &Shape) -> Vec<PlannedRun> {
        let mut runs = Vec::with_capacity(2);

        match shape {
            Shape::SourceFile(file) => {
                runs.push(self.run(Tool::Tsc, |inv| inv.arg(path_arg(file))));
            },
            Shape::ComponentFile(file) => {
                let dir = file
                    .parent()
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .unwrap_or(self.root.as_path());
                runs.push(self.run(Tool::SvelteCheck, |inv| {
                    inv.arg("--workspace").arg(path_arg(dir))
                }));
            },
            Shape::Project(root) => {
                runs.push(self.run(Tool::SvelteCheck, |inv| {
                    inv.arg("--workspace").arg(path_arg(root))
                }));
            },
        }

        if self.lint {
            if let Shape::SourceFile(file) | Shape::ComponentFile(file) = shape {
                runs.push(self.run(Tool::Eslint, |inv| inv.arg(path_arg(file))));
            }
        }

        runs
    }

    fn run(&self, tool: Tool, finish: impl FnOnce(Invocation) -> Invocation) -> PlannedRun {
        PlannedRun {
            tool,
            invocation: finish(self.exec(tool).args(tool.command_args().iter().copied())),
        }
    }

    /// `<runner> <tool>` in the project root.
    fn exec(&self, tool: Tool) -> Invocation {
        let (program, prefix) = self.manager.exec_prefix();
        Invocation::new(program)
            .args(prefix.iter().copied())
            .arg(tool.binary())
            .cwd(&self.root)
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
