//! Command implementations and argument parsing for the hypeq CLI.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use hypeq_core::{
    DistanceOracle, DistanceProfile, HypeqError, HypeqErrorCode, Hypergraph, HypergraphErrorCode,
    LandmarkAssignment, LandmarkSelection, OracleConfig, OracleConfigBuilder, QueryKind,
};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

use super::loader::load_hypergraph;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "hypeq", about = "Approximate s-distance queries over hypergraphs.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Build an oracle and report its size.
    Build(BuildCommand),
    /// Build an oracle and print distance profiles for the given pairs.
    Query(QueryCommand),
}

impl Command {
    /// Subcommand name as typed on the command line.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Build(_) => "build",
            Self::Query(_) => "query",
        }
    }

    /// Hypergraph file the command reads.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Build(build) => &build.oracle.path,
            Self::Query(query) => &query.oracle.path,
        }
    }
}

/// Options accepted by the `build` command.
#[derive(Debug, Args, Clone)]
pub struct BuildCommand {
    /// Oracle input and configuration.
    #[command(flatten)]
    pub oracle: OracleArgs,
}

/// Options accepted by the `query` command.
#[derive(Debug, Args, Clone)]
pub struct QueryCommand {
    /// Oracle input and configuration.
    #[command(flatten)]
    pub oracle: OracleArgs,

    /// Pair to query as `first,second`. With `--kind both` the first id is
    /// a vertex and the second a hyperedge.
    #[arg(long = "pair", value_parser = parse_pair, required = true)]
    pub pairs: Vec<(usize, usize)>,
}

/// Input file and oracle configuration shared by every command. Unset
/// options keep the library defaults.
#[derive(Debug, Args, Clone, Default)]
pub struct OracleArgs {
    /// Hypergraph file, one hyperedge of whitespace-separated vertex ids per
    /// line.
    pub path: PathBuf,

    /// Largest overlap threshold to index.
    #[arg(long = "max-s")]
    pub max_s: Option<usize>,

    /// Components with at most this many hyperedges get no landmarks.
    #[arg(long)]
    pub lb: Option<usize>,

    /// Label budget per hyperedge.
    #[arg(long = "num-landmarks")]
    pub num_landmarks: Option<usize>,

    /// Landmark selection strategy: random, degree, farthest, bestcover or
    /// between.
    #[arg(long)]
    pub selection: Option<LandmarkSelection>,

    /// Landmark assignment policy: prob or ranking.
    #[arg(long)]
    pub assignment: Option<LandmarkAssignment>,

    /// Importance of component size.
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Importance of the overlap threshold.
    #[arg(long)]
    pub beta: Option<f64>,

    /// Share of component members sampled by path-based strategies.
    #[arg(long = "sample-percentage")]
    pub sample_percentage: Option<f64>,

    /// Seed for every random draw.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Granularity of query pairs: edge, vertex or both.
    #[arg(long)]
    pub kind: Option<QueryKind>,

    /// Compute the full overlap index before the component search.
    #[arg(long = "precompute-neighbours")]
    pub precompute_neighbours: bool,

    /// How the per-level oracles are populated.
    #[arg(long, value_enum, default_value_t = Population::Hierarchical)]
    pub population: Population,
}

/// Oracle population strategies exposed on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Population {
    /// Nested component search with a shared budget.
    #[default]
    Hierarchical,
    /// Independent component search and budget share for every level.
    PerLevel,
    /// Global landmark rounds without any component structure.
    Baseline,
}

impl Population {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Hierarchical => "hierarchical",
            Self::PerLevel => "per-level",
            Self::Baseline => "baseline",
        }
    }
}

impl OracleArgs {
    /// Maps every supplied flag onto the configuration builder.
    ///
    /// # Errors
    /// Returns [`HypeqError`] when the resulting configuration is invalid.
    pub fn config(&self) -> Result<OracleConfig, HypeqError> {
        let mut builder =
            OracleConfigBuilder::new().with_precomputed_neighbours(self.precompute_neighbours);
        if let Some(max_s) = self.max_s {
            builder = builder.with_max_s(max_s);
        }
        if let Some(lb) = self.lb {
            builder = builder.with_lb(lb);
        }
        if let Some(num_landmarks) = self.num_landmarks {
            builder = builder.with_num_landmarks(num_landmarks);
        }
        if let Some(selection) = self.selection {
            builder = builder.with_landmark_selection(selection);
        }
        if let Some(assignment) = self.assignment {
            builder = builder.with_landmark_assignment(assignment);
        }
        if self.alpha.is_some() || self.beta.is_some() {
            let defaults = OracleConfig::default();
            builder = builder.with_importance(
                self.alpha.unwrap_or(defaults.alpha()),
                self.beta.unwrap_or(defaults.beta()),
            );
        }
        if let Some(percentage) = self.sample_percentage {
            builder = builder.with_sample_percentage(percentage);
        }
        if let Some(seed) = self.seed {
            builder = builder.with_seed(seed);
        }
        if let Some(kind) = self.kind {
            builder = builder.with_kind(kind);
        }
        builder.build()
    }
}

/// Parses a `first,second` pair of element ids.
///
/// # Errors
/// Returns a message naming the malformed input.
///
/// # Examples
/// ```
/// use hypeq_cli::cli::parse_pair;
///
/// assert_eq!(parse_pair("3, 7"), Ok((3, 7)));
/// assert!(parse_pair("3").is_err());
/// ```
pub fn parse_pair(raw: &str) -> Result<(usize, usize), String> {
    let (first, second) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected `first,second`, got `{raw}`"))?;
    let id = |part: &str| {
        part.trim()
            .parse::<usize>()
            .map_err(|err| format!("invalid element id `{}`: {err}", part.trim()))
    };
    Ok((id(first)?, id(second)?))
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failed while loading the hypergraph.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// A line held something other than vertex ids.
    #[error("{path}:{line}: invalid vertex id `{token}`")]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Offending token.
        token: String,
    },
    /// The file held no hyperedges.
    #[error("`{path}` contains no hyperedges")]
    EmptyInput {
        /// File being parsed.
        path: PathBuf,
    },
    /// Configuration, construction or query failed in the core.
    #[error(transparent)]
    Core(#[from] HypeqError),
}

/// Process exit status for unreadable or malformed input files.
pub const EXIT_INPUT: u8 = 2;
/// Process exit status for rejected configuration values.
pub const EXIT_CONFIG: u8 = 3;
/// Process exit status for queries naming elements outside the hypergraph.
pub const EXIT_QUERY: u8 = 4;

impl CliError {
    /// Exit status reported by the binary for this error.
    ///
    /// # Examples
    /// ```
    /// use std::path::PathBuf;
    /// use hypeq_cli::cli::{CliError, EXIT_INPUT};
    ///
    /// let err = CliError::EmptyInput { path: PathBuf::from("g.txt") };
    /// assert_eq!(err.exit_code(), EXIT_INPUT);
    /// ```
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Io { .. } | Self::Parse { .. } | Self::EmptyInput { .. } => EXIT_INPUT,
            Self::Core(core) if core.hypergraph_code().is_some() => EXIT_QUERY,
            Self::Core(_) => EXIT_CONFIG,
        }
    }

    /// Stable code of a core failure.
    #[must_use]
    pub const fn core_code(&self) -> Option<HypeqErrorCode> {
        match self {
            Self::Core(core) => Some(core.code()),
            _ => None,
        }
    }

    /// Code of the hypergraph failure nested in a core failure.
    #[must_use]
    pub const fn hypergraph_code(&self) -> Option<HypergraphErrorCode> {
        match self {
            Self::Core(core) => core.hypergraph_code(),
            _ => None,
        }
    }

    /// Input file the failure refers to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Io { path, .. } | Self::Parse { path, .. } | Self::EmptyInput { path } => {
                Some(path.as_path())
            }
            Self::Core(_) => None,
        }
    }
}

/// Sizes of a populated oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OracleSummary {
    /// Hyperedges in the input.
    pub edges: usize,
    /// Distinct vertices in the input.
    pub vertices: usize,
    /// Size of the largest hyperedge.
    pub dimension: usize,
    /// Landmarks over every level.
    pub landmarks: usize,
    /// Stored label entries over every level.
    pub oracle_size: usize,
    /// Entries of the component structure.
    pub component_struct_size: usize,
}

impl OracleSummary {
    fn new(graph: &Hypergraph, oracle: &DistanceOracle) -> Self {
        Self {
            edges: graph.num_edges(),
            vertices: graph.num_vertices(),
            dimension: graph.dimension(),
            landmarks: oracle.num_landmarks(),
            oracle_size: oracle.oracle_size(),
            component_struct_size: oracle.component_struct_size(),
        }
    }
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub enum ExecutionSummary {
    /// Result of `build`.
    Build(OracleSummary),
    /// Result of `query`.
    Query {
        /// Sizes of the oracle that answered the queries.
        oracle: OracleSummary,
        /// One profile per requested pair, in request order.
        profiles: Vec<DistanceProfile>,
    },
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading, configuration or a query fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use hypeq_cli::cli::{BuildCommand, Cli, Command, ExecutionSummary, OracleArgs, run_cli};
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(file.path(), "1 2 3\n3 4 5\n5 6 7\n")?;
/// let cli = Cli {
///     command: Command::Build(BuildCommand {
///         oracle: OracleArgs {
///             path: file.path().to_path_buf(),
///             max_s: Some(2),
///             ..OracleArgs::default()
///         },
///     }),
/// };
/// let ExecutionSummary::Build(summary) = run_cli(cli)? else {
///     unreachable!("build returns a build summary");
/// };
/// assert_eq!(summary.edges, 3);
/// assert_eq!(summary.vertices, 7);
/// # Ok(())
/// # }
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Build(build) => {
            Span::current().record("command", field::display("build"));
            run_build(&build.oracle).map(ExecutionSummary::Build)
        }
        Command::Query(query) => {
            Span::current().record("command", field::display("query"));
            run_query(query)
        }
    }
}

#[instrument(
    name = "cli.build",
    err,
    skip(args),
    fields(path = field::Empty, population = args.population.as_str()),
)]
pub(super) fn run_build(args: &OracleArgs) -> Result<OracleSummary, CliError> {
    Span::current().record("path", field::display(args.path.display()));
    let (graph, oracle) = build_oracle(args)?;
    let summary = OracleSummary::new(&graph, &oracle);
    info!(
        edges = summary.edges,
        landmarks = summary.landmarks,
        oracle_size = summary.oracle_size,
        "command completed"
    );
    Ok(summary)
}

#[instrument(
    name = "cli.query",
    err,
    skip(command),
    fields(pairs = command.pairs.len(), kind = field::Empty),
)]
pub(super) fn run_query(command: QueryCommand) -> Result<ExecutionSummary, CliError> {
    let (graph, oracle) = build_oracle(&command.oracle)?;
    let kind = command.oracle.config()?.kind();
    Span::current().record("kind", field::display(kind));
    let profiles = oracle.distance_profiles(&graph, &command.pairs, kind)?;
    info!(
        pairs = profiles.len(),
        answered = profiles.iter().filter(|p| !p.is_empty()).count(),
        "command completed"
    );
    Ok(ExecutionSummary::Query {
        oracle: OracleSummary::new(&graph, &oracle),
        profiles,
    })
}

fn build_oracle(args: &OracleArgs) -> Result<(Hypergraph, DistanceOracle), CliError> {
    let config = args.config()?;
    let mut graph = load_hypergraph(&args.path)?;
    let oracle = match args.population {
        Population::Hierarchical => DistanceOracle::populate(&mut graph, &config),
        Population::PerLevel => DistanceOracle::populate_per_level(&mut graph, &config)?,
        Population::Baseline => DistanceOracle::populate_baseline(&mut graph, &config),
    };
    Ok((graph, oracle))
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// Query profiles print one tab-separated `first second s lower upper
/// estimate` line per level with known bounds.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use std::io::Cursor;
/// # use hypeq_cli::cli::{ExecutionSummary, OracleSummary, render_summary};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let summary = ExecutionSummary::Build(OracleSummary {
///     edges: 3,
///     vertices: 7,
///     dimension: 3,
///     landmarks: 3,
///     oracle_size: 9,
///     component_struct_size: 6,
/// });
/// let mut buffer = Cursor::new(Vec::new());
/// render_summary(&summary, &mut buffer)?;
/// let text = String::from_utf8(buffer.into_inner())?;
/// assert!(text.starts_with("edges: 3\n"));
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    match summary {
        ExecutionSummary::Build(oracle) => render_oracle(oracle, &mut writer),
        ExecutionSummary::Query { oracle, profiles } => {
            render_oracle(oracle, &mut writer)?;
            for profile in profiles {
                for (s, bounds) in profile.iter() {
                    writeln!(
                        writer,
                        "{}\t{}\t{s}\t{}\t{}\t{}",
                        profile.first(),
                        profile.second(),
                        bounds.lower,
                        bounds.upper,
                        bounds.estimate,
                    )?;
                }
            }
            Ok(())
        }
    }
}

fn render_oracle(summary: &OracleSummary, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer, "edges: {}", summary.edges)?;
    writeln!(writer, "vertices: {}", summary.vertices)?;
    writeln!(writer, "dimension: {}", summary.dimension)?;
    writeln!(writer, "landmarks: {}", summary.landmarks)?;
    writeln!(writer, "oracle size: {}", summary.oracle_size)?;
    writeln!(writer, "component struct size: {}", summary.component_struct_size)
}
