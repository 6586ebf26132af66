//! Unit tests for the CLI commands and hypergraph ingestion.

use super::commands::run_build;
use super::test_helpers::{CHAIN, chain_args, create_text_file, run_cli_expecting_error, temp_dir};
use super::{
    BuildCommand, Cli, CliError, Command, EXIT_CONFIG, EXIT_INPUT, EXIT_QUERY, ExecutionSummary,
    OracleArgs, Population, QueryCommand, parse_hypergraph, parse_pair, render_summary, run_cli,
};

use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use hypeq_core::{
    HypeqError, HypeqErrorCode, HypergraphErrorCode, LandmarkSelection, QueryKind,
};
use rstest::rstest;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

use hypeq_test_support::tracing::RecordingLayer;

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[test]
fn parse_hypergraph_skips_comments_and_blank_lines() -> TestResult {
    let graph = parse_hypergraph(CHAIN.as_bytes(), Path::new("chain.txt"))?;
    assert_eq!(graph.num_edges(), 3);
    assert_eq!(graph.num_vertices(), 7);
    assert_eq!(graph.dimension(), 3);
    Ok(())
}

#[test]
fn parse_hypergraph_deduplicates_vertices() -> TestResult {
    let graph = parse_hypergraph("4 4 2\n".as_bytes(), Path::new("dup.txt"))?;
    assert_eq!(graph.size_of(0), 2);
    Ok(())
}

#[rstest]
#[case::word("1 2 3\n3 x 5\n", 2, "x")]
#[case::negative("# header\n\n-1 2\n", 3, "-1")]
#[case::overflow("99999999999 1\n", 1, "99999999999")]
fn parse_hypergraph_reports_the_offending_line(
    #[case] input: &str,
    #[case] expected_line: usize,
    #[case] expected_token: &str,
) {
    let err = parse_hypergraph(input.as_bytes(), Path::new("bad.txt"))
        .expect_err("malformed input must fail");
    match err {
        CliError::Parse { path, line, token } => {
            assert_eq!(path, Path::new("bad.txt"));
            assert_eq!(line, expected_line);
            assert_eq!(token, expected_token);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[rstest]
#[case::empty("")]
#[case::comments_only("# nothing here\n\n   \n")]
fn parse_hypergraph_rejects_inputs_without_edges(#[case] input: &str) {
    let err = parse_hypergraph(input.as_bytes(), Path::new("empty.txt"))
        .expect_err("empty input must fail");
    assert!(matches!(err, CliError::EmptyInput { .. }));
    assert_eq!(err.to_string(), "`empty.txt` contains no hyperedges");
}

#[rstest]
#[case::plain("0,2", (0, 2))]
#[case::spaced(" 4 , 7 ", (4, 7))]
fn parse_pair_accepts_ids(#[case] raw: &str, #[case] expected: (usize, usize)) {
    assert_eq!(parse_pair(raw), Ok(expected));
}

#[rstest]
#[case::single("3")]
#[case::word("a,1")]
#[case::negative("1,-2")]
#[case::triple("1,2,3")]
fn parse_pair_rejects_malformed_input(#[case] raw: &str) {
    assert!(parse_pair(raw).is_err());
}

#[test]
fn clap_maps_flags_onto_the_configuration() -> TestResult {
    let cli = Cli::try_parse_from([
        "hypeq",
        "query",
        "graph.txt",
        "--pair",
        "0,2",
        "--pair",
        "1,2",
        "--max-s",
        "3",
        "--selection",
        "BestCover",
        "--kind",
        "vertex",
        "--seed",
        "11",
        "--precompute-neighbours",
        "--population",
        "per-level",
    ])?;
    let Command::Query(query) = cli.command else {
        panic!("expected the query command");
    };
    assert_eq!(query.pairs, vec![(0, 2), (1, 2)]);
    assert_eq!(query.oracle.population, Population::PerLevel);

    let config = query.oracle.config()?;
    assert_eq!(config.max_s(), 3);
    assert_eq!(config.landmark_selection(), LandmarkSelection::BestCover);
    assert_eq!(config.kind(), QueryKind::Vertex);
    assert_eq!(config.seed(), 11);
    assert!(config.precompute_neighbours());
    assert_eq!(config.lb(), 4);
    Ok(())
}

#[rstest]
#[case::unknown_selection(&["hypeq", "build", "g.txt", "--selection", "closest"])]
#[case::unknown_kind(&["hypeq", "build", "g.txt", "--kind", "triangle"])]
#[case::missing_pair(&["hypeq", "query", "g.txt"])]
#[case::bad_pair(&["hypeq", "query", "g.txt", "--pair", "1"])]
fn clap_rejects_invalid_arguments(#[case] args: &[&str]) {
    assert!(Cli::try_parse_from(args).is_err());
}

#[test]
fn alpha_alone_keeps_the_default_beta() -> TestResult {
    let args = OracleArgs {
        alpha: Some(0.3),
        ..OracleArgs::default()
    };
    let config = args.config()?;
    assert_eq!(config.alpha(), 0.3);
    assert_eq!(config.beta(), 0.6);
    Ok(())
}

#[test]
fn build_reports_oracle_sizes() -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "chain.txt", CHAIN)?;
    let cli = Cli {
        command: Command::Build(BuildCommand {
            oracle: chain_args(path),
        }),
    };
    let ExecutionSummary::Build(summary) = run_cli(cli)? else {
        panic!("build must return a build summary");
    };
    assert_eq!(summary.edges, 3);
    assert_eq!(summary.vertices, 7);
    assert_eq!(summary.dimension, 3);
    assert_eq!(summary.landmarks, 3);
    assert!(summary.oracle_size > 0);
    Ok(())
}

#[rstest]
#[case::per_level(Population::PerLevel)]
#[case::baseline(Population::Baseline)]
fn alternative_populations_label_the_chain(#[case] population: Population) -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "chain.txt", CHAIN)?;
    let args = OracleArgs {
        population,
        ..chain_args(path)
    };
    let summary = run_build(&args)?;
    assert!(summary.landmarks > 0);
    Ok(())
}

#[test]
fn query_prints_one_line_per_known_level() -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "chain.txt", CHAIN)?;
    let cli = Cli {
        command: Command::Query(QueryCommand {
            oracle: chain_args(path),
            pairs: vec![(0, 2), (1, 1)],
        }),
    };
    let summary = run_cli(cli)?;
    let mut buffer = Vec::new();
    render_summary(&summary, &mut buffer)?;
    let text = String::from_utf8(buffer)?;

    let profile_lines: Vec<&str> = text.lines().skip(6).collect();
    assert_eq!(profile_lines, ["0\t2\t1\t2\t2\t2", "1\t1\t1\t0\t0\t0", "1\t1\t2\t0\t0\t0"]);
    assert!(text.starts_with("edges: 3\nvertices: 7\ndimension: 3\nlandmarks: 3\n"));
    Ok(())
}

#[test]
fn query_rejects_unknown_hyperedges() -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "chain.txt", CHAIN)?;
    let cli = Cli {
        command: Command::Query(QueryCommand {
            oracle: chain_args(path),
            pairs: vec![(0, 9)],
        }),
    };
    let err = run_cli_expecting_error(cli, "unknown hyperedge must fail");
    match err {
        CliError::Core(core) => {
            assert_eq!(core.code(), HypeqErrorCode::HypergraphFailure);
            assert_eq!(core.hypergraph_code(), Some(HypergraphErrorCode::UnknownEdge));
        }
        other => panic!("expected a core error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn invalid_configuration_fails_before_loading() {
    let args = OracleArgs {
        path: Path::new("does-not-exist.txt").to_path_buf(),
        max_s: Some(0),
        ..OracleArgs::default()
    };
    let cli = Cli {
        command: Command::Build(BuildCommand { oracle: args }),
    };
    let err = run_cli_expecting_error(cli, "zero max_s must fail");
    assert!(matches!(err, CliError::Core(HypeqError::InvalidMaxS { got: 0 })));
}

#[test]
fn missing_file_reports_its_path() {
    let dir = temp_dir();
    let missing = dir.path().join("missing.txt");
    let cli = Cli {
        command: Command::Build(BuildCommand {
            oracle: chain_args(missing),
        }),
    };
    let err = run_cli_expecting_error(cli, "missing file must fail");
    match err {
        CliError::Io { path, .. } => assert!(path.ends_with("missing.txt")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn build_emits_tracing_fields() -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "chain.txt", CHAIN)?;
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());

    let args = chain_args(path);
    let summary = tracing::subscriber::with_default(subscriber, || run_build(&args))?;
    assert_eq!(summary.edges, 3);

    let build = layer.span("cli.build").expect("cli.build span must exist");
    assert!(build.field("path").is_some_and(|value| value.ends_with("chain.txt")));
    assert_eq!(build.field("population"), Some("hierarchical"));

    let load = layer
        .span("cli.load_hypergraph")
        .expect("loader span must exist");
    assert_eq!(load.field("edges"), Some("3"));
    assert!(layer.span("core.oracle.populate").is_some());

    let completed = layer.events_with_message(Level::INFO, "command completed");
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].field("landmarks"), Some("3"));
    Ok(())
}

#[rstest]
#[case::unreadable(
    CliError::Io {
        path: PathBuf::from("g.txt"),
        source: io::Error::from(io::ErrorKind::NotFound),
    },
    EXIT_INPUT,
    Some("g.txt"),
)]
#[case::malformed(
    CliError::Parse { path: PathBuf::from("g.txt"), line: 3, token: "x".to_owned() },
    EXIT_INPUT,
    Some("g.txt"),
)]
#[case::config(CliError::Core(HypeqError::InvalidMaxS { got: 0 }), EXIT_CONFIG, None)]
fn errors_map_to_exit_statuses(
    #[case] err: CliError,
    #[case] expected: u8,
    #[case] path: Option<&str>,
) {
    assert_eq!(err.exit_code(), expected);
    assert_eq!(err.path(), path.map(Path::new));
}

#[test]
fn unknown_query_elements_exit_with_the_query_status() -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "chain.txt", CHAIN)?;
    let cli = Cli {
        command: Command::Query(QueryCommand {
            oracle: chain_args(path),
            pairs: vec![(5, 0)],
        }),
    };
    let err = run_cli_expecting_error(cli, "unknown hyperedge must fail");
    assert_eq!(err.exit_code(), EXIT_QUERY);
    assert_eq!(err.core_code(), Some(HypeqErrorCode::HypergraphFailure));
    assert_eq!(err.hypergraph_code(), Some(HypergraphErrorCode::UnknownEdge));
    assert_eq!(err.path(), None);
    Ok(())
}

#[test]
fn commands_report_their_name_and_input() -> TestResult {
    let build = Cli::try_parse_from(["hypeq", "build", "graphs/a.txt"])?;
    assert_eq!(build.command.name(), "build");
    assert_eq!(build.command.path(), Path::new("graphs/a.txt"));

    let query = Cli::try_parse_from(["hypeq", "query", "b.txt", "--pair", "0,1"])?;
    assert_eq!(query.command.name(), "query");
    assert_eq!(query.command.path(), Path::new("b.txt"));
    Ok(())
}
