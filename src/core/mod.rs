//! Core functionality for on-save-hook.
//!
//! This module contains the main components:
//! - [`target`]: Target classification
//! - [`preflight`]: Dependency checks with a time-boxed cache
//! - [`executor`]: Process execution
//! - [`runner`]: The check pipeline
//! - [`detector`]: Package manager detection
//! - [`error`]: Error types and result handling

pub mod detector;
pub mod error;
pub mod executor;
pub mod preflight;
pub mod runner;
pub mod target;
