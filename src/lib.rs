//! # on-save-hook
//!
//! Save-time verification for AI coding agents.
//!
//! After an agent writes or edits a TypeScript, JavaScript or Svelte file,
//! `on-save` runs the project's type checker and linter on it and tells the
//! agent whether the edit stands. Failing checks produce a block decision
//! (exit code 2) carrying the errors the agent has to fix.
//!
//! ## Features
//!
//! - **Three modes**: paths on the command line, a whole-project check from
//!   a terminal, or a hook reading the agent's JSON payload from stdin
//! - **Dependency preflight**: missing tools are reported with the install
//!   command, cached for a configurable time-to-live
//! - **Package manager aware**: tools run through `bun x`, `npx`, `pnpm exec`
//!   or `yarn run`, detected from lockfiles
//! - **Bounded excerpts**: only the context around the first errors is sent
//!   back to the agent
//!
//! ## Example
//!
//! ```rust,no_run
//! use on_save_hook::checks::Toolchain;
//! use on_save_hook::core::executor::Executor;
//! use on_save_hook::core::preflight::DependencyCache;
//! use on_save_hook::protocol::render_cli;
//! use on_save_hook::{Config, Detector, Runner};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> on_save_hook::Result<()> {
//!     let config = Config::load_or_default()?;
//!     let root = std::env::current_dir().expect("working directory");
//!
//!     // Pick the package manager and build the pipeline
//!     let detection = Detector::new(&config).detect(&root);
//!     let toolchain = Toolchain::new(detection.manager, &root, config.lint.enabled);
//!     let runner = Runner::new(Executor::new(), toolchain);
//!
//!     // Check one file
//!     let mut cache = DependencyCache::new(config.cache_ttl());
//!     let report = runner.check("src/app.ts", &mut cache).await;
//!
//!     let rendered = render_cli(report);
//!     println!("{}", rendered.response.to_json(true));
//!     std::process::exit(i32::from(rendered.status.code()));
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/on-save-hook/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod checks;
pub mod cli;
pub mod config;
pub mod core;
pub mod protocol;

// Re-export main types for convenience
pub use config::Config;
pub use core::detector::{Detector, PackageManager};
pub use core::error::{Error, Result};
pub use core::runner::{CheckOutcome, Report, Runner, ToolRunResult};
pub use protocol::{ExitStatus, HookRequest, HookResponse};
