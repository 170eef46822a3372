//! Package manager detection.
//!
//! The analysis tools are never invoked directly; they run through the
//! project's package manager so the project-local versions are used. The
//! detector decides which package manager that is.

use crate::config::Config;
use crate::core::executor::Executor;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A JavaScript package manager able to run project-local binaries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    /// Bun (`bun x <tool>`).
    #[default]
    Bun,
    /// npm (`npx --no-install <tool>`).
    Npm,
    /// pnpm (`pnpm exec <tool>`).
    Pnpm,
    /// Yarn (`yarn run <tool>`).
    Yarn,
}

impl PackageManager {
    /// All package managers, in `PATH` lookup priority order.
    pub const ALL: [Self; 4] = [Self::Bun, Self::Pnpm, Self::Npm, Self::Yarn];

    /// Returns the name used in configuration and log output.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Bun => "bun",
            Self::Npm => "npm",
            Self::Pnpm => "pnpm",
            Self::Yarn => "yarn",
        }
    }

    /// Program whose presence proves the package manager is installed.
    #[must_use]
    pub const fn program(&self) -> &'static str {
        self.name()
    }

    /// Program and leading arguments that run a project-local binary.
    #[must_use]
    pub const fn exec_prefix(&self) -> (&'static str, &'static [&'static str]) {
        match self {
            Self::Bun => ("bun", &["x"]),
            Self::Npm => ("npx", &["--no-install"]),
            Self::Pnpm => ("pnpm", &["exec"]),
            Self::Yarn => ("yarn", &["run"]),
        }
    }

    /// Command that adds `package` as a development dependency.
    #[must_use]
    pub fn install_hint(&self, package: &str) -> String {
        match self {
            Self::Bun => format!("bun add -d {package}"),
            Self::Npm => format!("npm install --save-dev {package}"),
            Self::Pnpm => format!("pnpm add -D {package}"),
            Self::Yarn => format!("yarn add -D {package}"),
        }
    }

    /// Where to get the package manager itself.
    #[must_use]
    pub const fn install_url(&self) -> &'static str {
        match self {
            Self::Bun => "https://bun.sh",
            Self::Npm => "https://nodejs.org",
            Self::Pnpm => "https://pnpm.io/installation",
            Self::Yarn => "https://yarnpkg.com/getting-started/install",
        }
    }
}

/// Lockfiles that identify a project's package manager. The first one
/// present in the project root wins.
pub const LOCKFILES: [(&str, PackageManager); 5] = [
    ("bun.lockb", PackageManager::Bun),
    ("bun.lock", PackageManager::Bun),
    ("pnpm-lock.yaml", PackageManager::Pnpm),
    ("yarn.lock", PackageManager::Yarn),
    ("package-lock.json", PackageManager::Npm),
];

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Reason for the detection - logged for debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionReason {
    /// Set with `--package-manager` or `ON_SAVE_PACKAGE_MANAGER`.
    Explicit,
    /// Set in the configuration file.
    Config,
    /// Lockfile found in the project root.
    Lockfile(&'static str),
    /// Found on `PATH`.
    OnPath,
    /// Nothing matched.
    Default,
}

impl std::fmt::Display for DetectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Explicit => write!(f, "explicit override"),
            Self::Config => write!(f, "configuration file"),
            Self::Lockfile(name) => write!(f, "lockfile {name}"),
            Self::OnPath => write!(f, "found on PATH"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Result of package manager detection.
#[derive(Debug, Clone)]
pub struct Detection {
    /// The detected package manager.
    pub manager: PackageManager,
    /// Reason for the detection.
    pub reason: DetectionReason,
}

/// Detector for the project's package manager.
#[derive(Debug)]
pub struct Detector<'a> {
    config: &'a Config,
    explicit: Option<PackageManager>,
}

impl<'a> Detector<'a> {
    /// Creates a new detector with the given configuration.
    #[must_use]
    pub const fn new(config: &'a Config) -> Self {
        Self {
            config,
            explicit: None,
        }
    }

    /// Sets an explicit override that wins over everything else.
    #[must_use]
    pub const fn with_override(mut self, manager: Option<PackageManager>) -> Self {
        self.explicit = manager;
        self
    }

    /// Detects the package manager for the project rooted at `root`.
    #[must_use]
    pub fn detect(&self, root: &Path) -> Detection {
        // Priority 1: command line / environment
        if let Some(manager) = self.explicit {
            return Detection {
                manager,
                reason: DetectionReason::Explicit,
            };
        }

        // Priority 2: configuration file
        if let Some(manager) = self.config.package_manager {
            return Detection {
                manager,
                reason: DetectionReason::Config,
            };
        }

        // Priority 3: lockfiles
        if let Some(detection) = Self::check_lockfiles(root) {
            return detection;
        }

        // Priority 4: whatever is installed
        if let Some(manager) = PackageManager::ALL
            .into_iter()
            .find(|m| Executor::command_exists(m.program()))
        {
            return Detection {
                manager,
                reason: DetectionReason::OnPath,
            };
        }

        Detection {
            manager: PackageManager::default(),
            reason: DetectionReason::Default,
        }
    }

    fn check_lockfiles(root: &Path) -> Option<Detection> {
        LOCKFILES
            .into_iter()
            .find(|(name, _)| root.join(name).is_file())
            .map(|(name, manager)| Detection {
                manager,
                reason: DetectionReason::Lockfile(name),
            })
    }
}
