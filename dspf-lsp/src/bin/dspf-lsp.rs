use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use dspf_lsp::cli::{definition_json, index_json, Cli, Command};
use dspf_lsp::error::CliError;
use dspf_lsp::DspfLanguageServer;
use tokio::io::{stdin, stdout};
use tower_lsp::{LspService, Server};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "DSPF_LSP_LOG";

fn init_tracing() {
    // stdout carries the protocol, so logs go to stderr
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        None | Some(Command::Serve) => {
            tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting dspf-lsp");
            let (service, socket) = LspService::new(DspfLanguageServer::new);
            Server::new(stdin(), stdout(), socket).serve(service).await;
            ExitCode::SUCCESS
        }
        Some(Command::Definition { file, line, column }) => {
            print_result(definition_json(&file, line, column), &file)
        }
        Some(Command::Index { file }) => print_result(index_json(&file), &file),
    }
}

fn print_result(result: Result<String, CliError>, file: &Path) -> ExitCode {
    match result {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(file = %file.display(), "{err}");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
