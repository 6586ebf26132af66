//! Plain-text hypergraph ingestion.
//!
//! One hyperedge per line as whitespace-separated vertex ids. Blank lines
//! and lines starting with `#` are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use hypeq_core::{HypeqError, Hypergraph};
use tracing::{Span, debug, field, instrument};

use super::commands::CliError;

/// Opens `path` and parses the hypergraph it holds.
///
/// # Errors
/// Returns [`CliError::Io`] when the file cannot be read, and the errors of
/// [`parse_hypergraph`] otherwise.
#[instrument(name = "cli.load_hypergraph", err, fields(path = field::Empty, edges = field::Empty))]
pub fn load_hypergraph(path: &Path) -> Result<Hypergraph, CliError> {
    let span = Span::current();
    span.record("path", field::display(path.display()));
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let graph = parse_hypergraph(BufReader::new(file), path)?;
    span.record("edges", graph.num_edges());
    Ok(graph)
}

/// Parses one hyperedge per line from `reader`. `path` only labels errors.
///
/// # Errors
/// Returns [`CliError::Parse`] with the 1-based line number of the first
/// malformed vertex id, and [`CliError::EmptyInput`] when no hyperedge is
/// found.
///
/// # Examples
/// ```
/// # use std::path::Path;
/// use hypeq_cli::cli::parse_hypergraph;
///
/// let text = "# chain\n1 2 3\n\n3 4 5\n";
/// let graph = parse_hypergraph(text.as_bytes(), Path::new("chain.txt"))?;
/// assert_eq!(graph.num_edges(), 2);
/// assert_eq!(graph.num_vertices(), 5);
/// # Ok::<(), hypeq_cli::cli::CliError>(())
/// ```
pub fn parse_hypergraph(reader: impl BufRead, path: &Path) -> Result<Hypergraph, CliError> {
    let mut edges: Vec<Vec<u32>> = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let edge = trimmed
            .split_whitespace()
            .map(|token| {
                token.parse::<u32>().map_err(|_| CliError::Parse {
                    path: path.to_path_buf(),
                    line: index + 1,
                    token: token.to_owned(),
                })
            })
            .collect::<Result<Vec<u32>, _>>()?;
        edges.push(edge);
    }
    if edges.is_empty() {
        return Err(CliError::EmptyInput {
            path: path.to_path_buf(),
        });
    }
    debug!(edges = edges.len(), "hyperedges parsed");
    Hypergraph::from_edges(edges).map_err(|error| CliError::Core(HypeqError::from(error)))
}
