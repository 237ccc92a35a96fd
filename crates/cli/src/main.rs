//! `stackforge` - lowers project configurations into IR documents

use clap::Parser;
use colored::Colorize;
use stackforge_cli::{Cli, ExitCode, execute, init_tracing};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match execute(cli).await {
        Ok(code) => {
            if code != ExitCode::SUCCESS {
                std::process::exit(code.0);
            }
        }
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            std::process::exit(ExitCode::IO_ERROR.0);
        }
    }
}
