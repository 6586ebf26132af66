//! `hypeq` binary.
//!
//! Builds a distance oracle over a hypergraph file and prints its summary or
//! the requested distance profiles on stdout. Failures are logged with their
//! stable codes and mapped to distinct exit statuses: input files
//! ([`hypeq_cli::cli::EXIT_INPUT`]), configuration
//! ([`hypeq_cli::cli::EXIT_CONFIG`]) and unknown query elements
//! ([`hypeq_cli::cli::EXIT_QUERY`]).

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use hypeq_cli::{
    cli::{Cli, CliError, render_summary, run_cli},
    logging::{self, LoggingError},
};
use tracing::{debug, error, field};

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.name();
    let path = cli.command.path().display().to_string();
    let summary = run_cli(cli).with_context(|| format!("`hypeq {command} {path}` failed"))?;
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    render_summary(&summary, &mut writer).context("failed to write the summary")?;
    writer.flush().context("failed to flush stdout")?;
    Ok(())
}

fn main() -> ExitCode {
    match logging::init_logging() {
        Ok(settings) => debug!(?settings, "logging initialised"),
        Err(err) => {
            report_logging_init_error(&err);
            return ExitCode::FAILURE;
        }
    }

    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_failure(&err),
    }
}

fn report_failure(err: &anyhow::Error) -> ExitCode {
    let Some(cli_error) = err.downcast_ref::<CliError>() else {
        error!(error = %format!("{err:#}"), "command execution failed");
        return ExitCode::FAILURE;
    };
    let exit_code = cli_error.exit_code();
    error!(
        error = %format!("{err:#}"),
        code = cli_error.core_code().map(|code| field::display(code.as_str())),
        hypergraph_code = cli_error
            .hypergraph_code()
            .map(|code| field::display(code.as_str())),
        path = cli_error.path().map(|path| field::display(path.display())),
        exit_code,
        "command execution failed"
    );
    ExitCode::from(exit_code)
}

#[expect(
    clippy::print_stderr,
    reason = "Emit one-off diagnostic before tracing is initialized"
)]
fn report_logging_init_error(err: &LoggingError) {
    eprintln!("failed to initialize logging: {err}");
}
