//! Small helpers shared across CLI tests.
//!
//! The CLI unit tests build temporary hypergraph files and assert error
//! handling behaviour. These helpers keep the test cases concise.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use tempfile::TempDir;

use super::{Cli, CliError, OracleArgs, run_cli};

pub(super) const CHAIN: &str = "# three hyperedges, one shared vertex each\n1 2 3\n3 4 5\n\n5 6 7\n";

pub(super) fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

pub(super) fn create_text_file(dir: &TempDir, name: &str, contents: &str) -> io::Result<PathBuf> {
    let path = dir.path().join(name);
    let mut file = File::create(&path)?;
    file.write_all(contents.as_bytes())?;
    Ok(path)
}

/// Arguments labelling every hyperedge of a small chain at threshold one.
pub(super) fn chain_args(path: PathBuf) -> OracleArgs {
    OracleArgs {
        path,
        max_s: Some(2),
        lb: Some(2),
        num_landmarks: Some(30),
        ..OracleArgs::default()
    }
}

pub(super) fn run_cli_expecting_error(cli: Cli, panic_msg: &str) -> CliError {
    match run_cli(cli) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}
