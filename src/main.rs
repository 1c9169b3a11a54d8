use clap::Parser;
use issuehub::StructuredError;
use issuehub::cli::Cli;
use issuehub::cli::commands;
use issuehub::logging::init_logging;
use std::io::{self, IsTerminal};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet) {
        eprintln!("Failed to initialize logging: {e}");
    }

    if let Err(err) = commands::execute(&cli) {
        handle_error(&err, cli.json);
    }
}

/// Print the error and exit with its category code.
///
/// JSON on stderr with `--json` or when stdout is not a terminal, otherwise
/// a human-readable message.
fn handle_error(err: &StructuredError, json_mode: bool) -> ! {
    let exit_code = err.code.exit_code();

    if json_mode || !io::stdout().is_terminal() {
        let json = err.to_json();
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
        );
    } else {
        eprintln!("{}", err.to_human(io::stderr().is_terminal()));
    }

    std::process::exit(exit_code);
}
