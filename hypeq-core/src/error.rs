//! Error types for the hypeq core library.
//!
//! Defines the error enums exposed by the public API, their stable codes, and
//! a convenient result alias.

use std::{fmt, sync::Arc};

use thiserror::Error;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced while constructing a [`crate::Hypergraph`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum HypergraphError {
    /// A hyperedge contained no vertices.
    #[error("hyperedge {edge} contains no vertices")]
    EmptyHyperedge {
        /// Position of the offending hyperedge in the input.
        edge: usize,
    },
    /// A hyperedge identifier was outside the hypergraph.
    #[error("hyperedge {edge} is out of bounds (hypergraph has {edges} hyperedges)")]
    UnknownEdge {
        /// The requested hyperedge.
        edge: usize,
        /// Number of hyperedges in the hypergraph.
        edges: usize,
    },
    /// A vertex identifier does not belong to any hyperedge.
    #[error("vertex {vertex} does not belong to any hyperedge")]
    UnknownVertex {
        /// The requested vertex.
        vertex: u32,
    },
}

define_error_codes! {
    /// Stable codes describing [`HypergraphError`] variants.
    enum HypergraphErrorCode for HypergraphError {
        /// A hyperedge contained no vertices.
        EmptyHyperedge => EmptyHyperedge { .. } => "HYPERGRAPH_EMPTY_HYPEREDGE",
        /// A hyperedge identifier was outside the hypergraph.
        UnknownEdge => UnknownEdge { .. } => "HYPERGRAPH_UNKNOWN_EDGE",
        /// A vertex identifier does not belong to any hyperedge.
        UnknownVertex => UnknownVertex { .. } => "HYPERGRAPH_UNKNOWN_VERTEX",
    }
}

/// Error type produced when configuring, building, or querying a
/// [`crate::DistanceOracle`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum HypeqError {
    /// The maximum overlap threshold must be at least 1.
    #[error("max_s must be at least 1 (got {got})")]
    InvalidMaxS {
        /// The invalid threshold supplied by the caller.
        got: usize,
    },
    /// The landmark budget multiplier must be at least 1.
    #[error("num_landmarks must be at least 1 (got {got})")]
    InvalidLandmarkBudget {
        /// The invalid multiplier supplied by the caller.
        got: usize,
    },
    /// Importance weights must be non-negative and, for the probability
    /// policy, sum to at most one.
    #[error("importance weights alpha={alpha} and beta={beta} must be non-negative with alpha + beta <= 1")]
    InvalidImportance {
        /// Weight of the component size.
        alpha: f64,
        /// Weight of the overlap threshold.
        beta: f64,
    },
    /// The sample percentage must lie in `(0, 1]`.
    #[error("sample_percentage must lie in (0, 1] (got {got})")]
    InvalidSamplePercentage {
        /// The invalid percentage supplied by the caller.
        got: f64,
    },
    /// The query granularity is not recognised.
    #[error("kind `{kind}` not supported")]
    UnsupportedKind {
        /// The unrecognised kind.
        kind: Arc<str>,
    },
    /// The landmark selection strategy is not recognised.
    #[error("landmark selection strategy `{name}` not supported")]
    UnsupportedSelection {
        /// The unrecognised strategy name.
        name: Arc<str>,
    },
    /// The landmark assignment policy is not recognised.
    #[error("landmark assignment policy `{name}` not supported")]
    UnsupportedAssignment {
        /// The unrecognised policy name.
        name: Arc<str>,
    },
    /// The hypergraph rejected an operation.
    #[error("hypergraph error: {error}")]
    Hypergraph {
        #[source]
        /// Underlying hypergraph error.
        error: HypergraphError,
    },
}

define_error_codes! {
    /// Stable codes describing [`HypeqError`] variants.
    enum HypeqErrorCode for HypeqError {
        /// The maximum overlap threshold must be at least 1.
        InvalidMaxS => InvalidMaxS { .. } => "HYPEQ_INVALID_MAX_S",
        /// The landmark budget multiplier must be at least 1.
        InvalidLandmarkBudget => InvalidLandmarkBudget { .. } => "HYPEQ_INVALID_LANDMARK_BUDGET",
        /// Importance weights are out of range.
        InvalidImportance => InvalidImportance { .. } => "HYPEQ_INVALID_IMPORTANCE",
        /// The sample percentage is out of range.
        InvalidSamplePercentage => InvalidSamplePercentage { .. } => "HYPEQ_INVALID_SAMPLE_PERCENTAGE",
        /// The query granularity is not recognised.
        UnsupportedKind => UnsupportedKind { .. } => "HYPEQ_UNSUPPORTED_KIND",
        /// The landmark selection strategy is not recognised.
        UnsupportedSelection => UnsupportedSelection { .. } => "HYPEQ_UNSUPPORTED_SELECTION",
        /// The landmark assignment policy is not recognised.
        UnsupportedAssignment => UnsupportedAssignment { .. } => "HYPEQ_UNSUPPORTED_ASSIGNMENT",
        /// The hypergraph rejected an operation.
        HypergraphFailure => Hypergraph { .. } => "HYPEQ_HYPERGRAPH_FAILURE",
    }
}

impl HypeqError {
    /// Retrieve the inner [`HypergraphErrorCode`] when the error originated in
    /// the hypergraph model.
    pub const fn hypergraph_code(&self) -> Option<HypergraphErrorCode> {
        match self {
            Self::Hypergraph { error } => Some(error.code()),
            _ => None,
        }
    }
}

impl From<HypergraphError> for HypeqError {
    fn from(error: HypergraphError) -> Self {
        Self::Hypergraph { error }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, HypeqError>;
