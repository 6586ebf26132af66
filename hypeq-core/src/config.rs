//! Configuration for oracle construction and querying.
//!
//! [`OracleConfig`] is an immutable value validated by
//! [`OracleConfigBuilder::build`] and passed by reference into every entry
//! point.

use std::{fmt, str::FromStr, sync::Arc};

use crate::{Result, error::HypeqError};

/// Strategy used to pick concrete landmarks inside a component.
///
/// # Examples
/// ```
/// use hypeq_core::LandmarkSelection;
///
/// let strategy: LandmarkSelection = "bestcover".parse().expect("known strategy");
/// assert_eq!(strategy, LandmarkSelection::BestCover);
/// assert_eq!(strategy.to_string(), "bestcover");
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LandmarkSelection {
    /// Uniform sampling without replacement.
    Random,
    /// Highest s-degree first.
    Degree,
    /// Farthest-first traversal.
    Farthest,
    /// Greedy cover of sampled shortest paths.
    BestCover,
    /// Approximate betweenness over sampled shortest paths.
    Betweenness,
}

impl LandmarkSelection {
    /// Whether the strategy samples shortest paths between candidates.
    #[must_use]
    pub const fn uses_path_samples(self) -> bool {
        matches!(self, Self::BestCover | Self::Betweenness)
    }
}

impl FromStr for LandmarkSelection {
    type Err = HypeqError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "degree" => Ok(Self::Degree),
            "farthest" => Ok(Self::Farthest),
            "bestcover" => Ok(Self::BestCover),
            "between" | "betweenness" => Ok(Self::Betweenness),
            _ => Err(HypeqError::UnsupportedSelection {
                name: Arc::from(raw),
            }),
        }
    }
}

impl fmt::Display for LandmarkSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Random => "random",
            Self::Degree => "degree",
            Self::Farthest => "farthest",
            Self::BestCover => "bestcover",
            Self::Betweenness => "between",
        })
    }
}

/// Policy deciding how many landmarks each component receives.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LandmarkAssignment {
    /// Weighted random draws without replacement.
    Probability,
    /// Greedy allocation driven by a median ranking of the components.
    Ranking,
}

impl FromStr for LandmarkAssignment {
    type Err = HypeqError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "prob" | "probability" => Ok(Self::Probability),
            "ranking" => Ok(Self::Ranking),
            _ => Err(HypeqError::UnsupportedAssignment {
                name: Arc::from(raw),
            }),
        }
    }
}

impl fmt::Display for LandmarkAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Probability => "prob",
            Self::Ranking => "ranking",
        })
    }
}

/// Granularity of the elements being queried.
///
/// # Examples
/// ```
/// use hypeq_core::QueryKind;
///
/// assert_eq!("VERTEX".parse::<QueryKind>().expect("known kind"), QueryKind::Vertex);
/// assert!("hyper".parse::<QueryKind>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum QueryKind {
    /// Hyperedge to hyperedge.
    Edge,
    /// Vertex to vertex.
    Vertex,
    /// Vertex to hyperedge.
    Both,
}

impl FromStr for QueryKind {
    type Err = HypeqError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "edge" => Ok(Self::Edge),
            "vertex" => Ok(Self::Vertex),
            "both" => Ok(Self::Both),
            _ => Err(HypeqError::UnsupportedKind {
                kind: Arc::from(raw),
            }),
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Edge => "edge",
            Self::Vertex => "vertex",
            Self::Both => "both",
        })
    }
}

/// Validated configuration for building a [`crate::DistanceOracle`].
///
/// # Examples
/// ```
/// use hypeq_core::{LandmarkSelection, OracleConfigBuilder};
///
/// let config = OracleConfigBuilder::new()
///     .with_max_s(3)
///     .with_landmark_selection(LandmarkSelection::Farthest)
///     .build()
///     .expect("configuration is valid");
/// assert_eq!(config.max_s(), 3);
/// assert_eq!(config.budget(10), 300);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct OracleConfig {
    max_s: usize,
    lb: usize,
    num_landmarks: usize,
    landmark_selection: LandmarkSelection,
    landmark_assignment: LandmarkAssignment,
    alpha: f64,
    beta: f64,
    sample_percentage: f64,
    seed: u64,
    kind: QueryKind,
    precompute_neighbours: bool,
}

impl OracleConfig {
    /// Maximum overlap threshold.
    #[must_use]
    #[rustfmt::skip]
    pub const fn max_s(&self) -> usize { self.max_s }

    /// Components with at most this many hyperedges receive no landmark.
    #[must_use]
    #[rustfmt::skip]
    pub const fn lb(&self) -> usize { self.lb }

    /// Budget multiplier: the oracle may hold about `num_landmarks × |E|`
    /// label entries.
    #[must_use]
    #[rustfmt::skip]
    pub const fn num_landmarks(&self) -> usize { self.num_landmarks }

    /// Landmark selection strategy.
    #[must_use]
    #[rustfmt::skip]
    pub const fn landmark_selection(&self) -> LandmarkSelection { self.landmark_selection }

    /// Landmark assignment policy.
    #[must_use]
    #[rustfmt::skip]
    pub const fn landmark_assignment(&self) -> LandmarkAssignment { self.landmark_assignment }

    /// Importance of the component size.
    #[must_use]
    #[rustfmt::skip]
    pub const fn alpha(&self) -> f64 { self.alpha }

    /// Importance of the overlap threshold.
    #[must_use]
    #[rustfmt::skip]
    pub const fn beta(&self) -> f64 { self.beta }

    /// Fraction of candidates sampled by path-based strategies.
    #[must_use]
    #[rustfmt::skip]
    pub const fn sample_percentage(&self) -> f64 { self.sample_percentage }

    /// Seed for every random draw.
    #[must_use]
    #[rustfmt::skip]
    pub const fn seed(&self) -> u64 { self.seed }

    /// Query granularity.
    #[must_use]
    #[rustfmt::skip]
    pub const fn kind(&self) -> QueryKind { self.kind }

    /// Whether the full overlap index is computed before component search.
    #[must_use]
    #[rustfmt::skip]
    pub const fn precompute_neighbours(&self) -> bool { self.precompute_neighbours }

    /// Total label budget for a hypergraph with `num_edges` hyperedges.
    #[must_use]
    pub fn budget(&self, num_edges: usize) -> u64 {
        let edges = u64::try_from(num_edges).unwrap_or(u64::MAX);
        let multiplier = u64::try_from(self.num_landmarks).unwrap_or(u64::MAX);
        edges.saturating_mul(multiplier)
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            max_s: 10,
            lb: 4,
            num_landmarks: 30,
            landmark_selection: LandmarkSelection::Degree,
            landmark_assignment: LandmarkAssignment::Probability,
            alpha: 0.2,
            beta: 0.6,
            sample_percentage: 0.4,
            seed: 4,
            kind: QueryKind::Edge,
            precompute_neighbours: false,
        }
    }
}

/// Configures and validates [`OracleConfig`] values.
///
/// # Examples
/// ```
/// use hypeq_core::{HypeqError, OracleConfigBuilder};
///
/// let err = OracleConfigBuilder::new()
///     .with_importance(0.7, 0.6)
///     .build()
///     .expect_err("weights above one are rejected");
/// assert!(matches!(err, HypeqError::InvalidImportance { .. }));
/// ```
#[derive(Clone, Debug, Default)]
pub struct OracleConfigBuilder {
    config: OracleConfig,
}

impl OracleConfigBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use hypeq_core::OracleConfigBuilder;
    ///
    /// let builder = OracleConfigBuilder::new();
    /// assert_eq!(builder.max_s(), 10);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the maximum overlap threshold.
    #[must_use]
    pub const fn with_max_s(mut self, max_s: usize) -> Self {
        self.config.max_s = max_s;
        self
    }

    /// Returns the configured maximum overlap threshold.
    #[must_use]
    pub const fn max_s(&self) -> usize {
        self.config.max_s
    }

    /// Overrides the small-component cutoff.
    #[must_use]
    pub const fn with_lb(mut self, lb: usize) -> Self {
        self.config.lb = lb;
        self
    }

    /// Overrides the landmark budget multiplier.
    #[must_use]
    pub const fn with_num_landmarks(mut self, num_landmarks: usize) -> Self {
        self.config.num_landmarks = num_landmarks;
        self
    }

    /// Overrides the landmark selection strategy.
    #[must_use]
    pub const fn with_landmark_selection(mut self, strategy: LandmarkSelection) -> Self {
        self.config.landmark_selection = strategy;
        self
    }

    /// Overrides the landmark assignment policy.
    #[must_use]
    pub const fn with_landmark_assignment(mut self, policy: LandmarkAssignment) -> Self {
        self.config.landmark_assignment = policy;
        self
    }

    /// Overrides both importance weights.
    #[must_use]
    pub const fn with_importance(mut self, alpha: f64, beta: f64) -> Self {
        self.config.alpha = alpha;
        self.config.beta = beta;
        self
    }

    /// Overrides the fraction of candidates sampled by path-based strategies.
    #[must_use]
    pub const fn with_sample_percentage(mut self, percentage: f64) -> Self {
        self.config.sample_percentage = percentage;
        self
    }

    /// Overrides the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Overrides the query granularity.
    #[must_use]
    pub const fn with_kind(mut self, kind: QueryKind) -> Self {
        self.config.kind = kind;
        self
    }

    /// Computes the full overlap index eagerly instead of resolving it from
    /// component-search candidates.
    #[must_use]
    pub const fn with_precomputed_neighbours(mut self, enabled: bool) -> Self {
        self.config.precompute_neighbours = enabled;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns [`HypeqError::InvalidMaxS`] or
    /// [`HypeqError::InvalidLandmarkBudget`] for zero values,
    /// [`HypeqError::InvalidImportance`] for negative weights or, under the
    /// probability policy, weights summing above one, and
    /// [`HypeqError::InvalidSamplePercentage`] outside `(0, 1]`.
    pub fn build(self) -> Result<OracleConfig> {
        let config = self.config;
        if config.max_s == 0 {
            return Err(HypeqError::InvalidMaxS { got: config.max_s });
        }
        if config.num_landmarks == 0 {
            return Err(HypeqError::InvalidLandmarkBudget {
                got: config.num_landmarks,
            });
        }
        validate_importance(config.alpha, config.beta, config.landmark_assignment)?;
        let pct = config.sample_percentage;
        if !(pct.is_finite() && pct > 0.0 && pct <= 1.0) {
            return Err(HypeqError::InvalidSamplePercentage { got: pct });
        }
        Ok(config)
    }
}

pub(crate) fn validate_importance(
    alpha: f64,
    beta: f64,
    policy: LandmarkAssignment,
) -> Result<()> {
    let finite = alpha.is_finite() && beta.is_finite();
    let non_negative = alpha >= 0.0 && beta >= 0.0;
    let bounded = policy == LandmarkAssignment::Ranking || alpha + beta <= 1.0;
    if finite && non_negative && bounded {
        Ok(())
    } else {
        Err(HypeqError::InvalidImportance { alpha, beta })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_match_reference_settings() {
        let config = OracleConfigBuilder::new().build().expect("defaults are valid");
        assert_eq!(config.max_s(), 10);
        assert_eq!(config.lb(), 4);
        assert_eq!(config.num_landmarks(), 30);
        assert_eq!(config.landmark_selection(), LandmarkSelection::Degree);
        assert_eq!(config.landmark_assignment(), LandmarkAssignment::Probability);
        assert_eq!(config.seed(), 4);
        assert_eq!(config.kind(), QueryKind::Edge);
        assert!(!config.precompute_neighbours());
    }

    #[rstest]
    #[case::zero_max_s(OracleConfigBuilder::new().with_max_s(0), "HYPEQ_INVALID_MAX_S")]
    #[case::zero_budget(
        OracleConfigBuilder::new().with_num_landmarks(0),
        "HYPEQ_INVALID_LANDMARK_BUDGET"
    )]
    #[case::weights_above_one(
        OracleConfigBuilder::new().with_importance(0.5, 0.6),
        "HYPEQ_INVALID_IMPORTANCE"
    )]
    #[case::negative_weight(
        OracleConfigBuilder::new().with_importance(-0.1, 0.2),
        "HYPEQ_INVALID_IMPORTANCE"
    )]
    #[case::zero_sample(
        OracleConfigBuilder::new().with_sample_percentage(0.0),
        "HYPEQ_INVALID_SAMPLE_PERCENTAGE"
    )]
    #[case::nan_sample(
        OracleConfigBuilder::new().with_sample_percentage(f64::NAN),
        "HYPEQ_INVALID_SAMPLE_PERCENTAGE"
    )]
    fn build_rejects_invalid_values(#[case] builder: OracleConfigBuilder, #[case] code: &str) {
        let err = builder.build().expect_err("configuration must be rejected");
        assert_eq!(err.code().as_str(), code);
    }

    #[test]
    fn ranking_policy_accepts_unbounded_weights() {
        let config = OracleConfigBuilder::new()
            .with_landmark_assignment(LandmarkAssignment::Ranking)
            .with_importance(0.8, 0.9)
            .build()
            .expect("ranking weights are importance factors");
        assert_eq!(config.alpha(), 0.8);
    }

    #[rstest]
    #[case("random", LandmarkSelection::Random)]
    #[case("Degree", LandmarkSelection::Degree)]
    #[case("farthest", LandmarkSelection::Farthest)]
    #[case("bestcover", LandmarkSelection::BestCover)]
    #[case("between", LandmarkSelection::Betweenness)]
    fn selection_names_parse(#[case] raw: &str, #[case] expected: LandmarkSelection) {
        assert_eq!(raw.parse::<LandmarkSelection>(), Ok(expected));
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert!(matches!(
            "closest".parse::<LandmarkSelection>(),
            Err(HypeqError::UnsupportedSelection { .. })
        ));
        assert!(matches!(
            "greedy".parse::<LandmarkAssignment>(),
            Err(HypeqError::UnsupportedAssignment { .. })
        ));
    }

    #[test]
    fn budget_saturates() {
        let config = OracleConfigBuilder::new()
            .with_num_landmarks(usize::MAX)
            .build()
            .expect("large budgets are valid");
        assert_eq!(config.budget(usize::MAX), u64::MAX);
    }
}
