//! Main entry point for the `on-save` CLI.

use on_save_hook::{cli, HookResponse};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            println!("{}", HookResponse::error(e.to_string()).to_json(false));
            ExitCode::FAILURE
        },
    }
}
