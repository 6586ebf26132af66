//! Command-line interface orchestration for hypeq.
//!
//! `build` loads a hypergraph file and reports the size of the oracle built
//! over it; `query` additionally answers distance profiles for hyperedge or
//! vertex pairs.

mod commands;
mod loader;

pub use commands::{
    BuildCommand, Cli, CliError, Command, EXIT_CONFIG, EXIT_INPUT, EXIT_QUERY, ExecutionSummary,
    OracleArgs, OracleSummary, Population, QueryCommand, parse_pair, render_summary, run_cli,
};
pub use loader::{load_hypergraph, parse_hypergraph};

#[cfg(test)]
mod test_helpers;
#[cfg(test)]
mod tests;
