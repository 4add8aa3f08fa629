//! mark-down command-line entry point.

use anyhow::Result;
use clap::Parser;
use mark_down::cli;
use mark_down::core::error::user_friendly_error;
use mark_down::manifest::DuplicateSlugs;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let exit_code = if e.chain().any(|cause| cause.is::<DuplicateSlugs>()) {
                2
            } else {
                1
            };
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(exit_code);
        }
    }
}
