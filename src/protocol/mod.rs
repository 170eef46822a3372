//! The hook protocol spoken with the host agent.
//!
//! - [`request`]: the JSON payload read from stdin
//! - [`response`]: the records written to stdout and the exit status
//! - [`render`]: pipeline reports to responses

pub mod render;
pub mod request;
pub mod response;

pub use render::{render_cli, render_hook, Diagnostic, Finding, Rendered};
pub use request::HookRequest;
pub use response::{Decision, ExitStatus, HookResponse};
