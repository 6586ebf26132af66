//! Query-result types: per-level distance bounds and reachable sets.

use std::collections::{BTreeMap, HashMap, HashSet};

/// Lower bound, upper bound and point estimate of an s-distance.
///
/// Exact distances have all three values equal. [`DistanceBounds::UNKNOWN`]
/// carries the `-1` triple used by external writers when no bound exists.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistanceBounds {
    /// Largest provable lower bound.
    pub lower: f64,
    /// Smallest provable upper bound.
    pub upper: f64,
    /// Point estimate inside `[lower, upper]`.
    pub estimate: f64,
}

impl DistanceBounds {
    /// Sentinel for pairs without any bound.
    pub const UNKNOWN: Self = Self {
        lower: -1.0,
        upper: -1.0,
        estimate: -1.0,
    };

    /// Creates bounds from their three components.
    #[must_use]
    pub const fn new(lower: f64, upper: f64, estimate: f64) -> Self {
        Self {
            lower,
            upper,
            estimate,
        }
    }

    /// Bounds for a known distance.
    #[must_use]
    pub const fn exact(distance: f64) -> Self {
        Self::new(distance, distance, distance)
    }

    /// Bounds with the estimate at the midpoint.
    #[must_use]
    pub fn midpoint(lower: f64, upper: f64) -> Self {
        Self::new(lower, upper, lower + (upper - lower) / 2.0)
    }

    /// Whether these bounds carry information.
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.lower >= 0.0
    }

    /// Whether lower and upper bound coincide.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.is_known() && self.lower.total_cmp(&self.upper).is_eq()
    }

    /// Whether `distance` lies within the bounds.
    #[must_use]
    pub fn contains(&self, distance: f64) -> bool {
        self.is_known() && self.lower <= distance && distance <= self.upper
    }

    /// The `(lower, upper, estimate)` triple.
    #[must_use]
    pub const fn as_triple(&self) -> (f64, f64, f64) {
        (self.lower, self.upper, self.estimate)
    }
}

impl Default for DistanceBounds {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

/// Distances between two elements for every overlap threshold.
///
/// The elements are two hyperedges, two vertices, or a vertex and a
/// hyperedge, depending on how the profile was produced. Missing levels read
/// back as `-1`.
///
/// # Examples
/// ```
/// use hypeq_core::{DistanceBounds, DistanceProfile};
///
/// let mut profile = DistanceProfile::new(0, 2);
/// profile.insert(1, DistanceBounds::new(1.0, 4.0, 2.5));
/// profile.insert_exact(2, 3.0);
/// assert_eq!(profile.distance(1), 2.5);
/// assert_eq!(profile.upper(3), -1.0);
///
/// profile.refine();
/// assert_eq!(profile.bounds(1).map(|b| b.upper), Some(3.0));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DistanceProfile {
    first: usize,
    second: usize,
    levels: BTreeMap<usize, DistanceBounds>,
}

impl DistanceProfile {
    /// Creates an empty profile between `first` and `second`.
    #[must_use]
    pub const fn new(first: usize, second: usize) -> Self {
        Self {
            first,
            second,
            levels: BTreeMap::new(),
        }
    }

    /// First element of the pair.
    #[must_use]
    #[rustfmt::skip]
    pub const fn first(&self) -> usize { self.first }

    /// Second element of the pair.
    #[must_use]
    #[rustfmt::skip]
    pub const fn second(&self) -> usize { self.second }

    /// Records bounds for threshold `s`, replacing earlier ones.
    pub fn insert(&mut self, s: usize, bounds: DistanceBounds) {
        self.levels.insert(s, bounds);
    }

    /// Records an exact distance for threshold `s`.
    pub fn insert_exact(&mut self, s: usize, distance: f64) {
        self.insert(s, DistanceBounds::exact(distance));
    }

    /// Bounds recorded for threshold `s`.
    #[must_use]
    pub fn bounds(&self, s: usize) -> Option<DistanceBounds> {
        self.levels.get(&s).copied()
    }

    /// Point estimate at `s`, or `-1`.
    #[must_use]
    pub fn distance(&self, s: usize) -> f64 {
        self.bounds(s).map_or(-1.0, |b| b.estimate)
    }

    /// Lower bound at `s`, or `-1`.
    #[must_use]
    pub fn lower(&self, s: usize) -> f64 {
        self.bounds(s).map_or(-1.0, |b| b.lower)
    }

    /// Upper bound at `s`, or `-1`.
    #[must_use]
    pub fn upper(&self, s: usize) -> f64 {
        self.bounds(s).map_or(-1.0, |b| b.upper)
    }

    /// Recorded levels in ascending `s`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, DistanceBounds)> + '_ {
        self.levels.iter().map(|(&s, &b)| (s, b))
    }

    /// Number of recorded levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether no level has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Tightens known bounds using the monotonicity of s-distances in `s`.
    ///
    /// A path of hyperedges overlapping in `s + 1` vertices is also an
    /// s-path, so `d_s <= d_{s+1}`. Upper bounds therefore propagate down
    /// and lower bounds propagate up between consecutive known levels.
    /// Estimates are clamped into the tightened interval. A level whose
    /// tightened interval would be empty keeps its original bounds.
    pub fn refine(&mut self) {
        let mut tightened: Vec<(usize, DistanceBounds)> =
            self.iter().filter(|(_, b)| b.is_known()).collect();

        for i in 1..tightened.len() {
            let (low, below) = tightened[i - 1];
            let (high, above) = &mut tightened[i];
            if *high == low + 1 {
                above.lower = above.lower.max(below.lower);
            }
        }
        for i in (1..tightened.len()).rev() {
            let (high, above) = tightened[i];
            let (low, below) = &mut tightened[i - 1];
            if high == *low + 1 {
                below.upper = below.upper.min(above.upper);
            }
        }
        for (s, mut bounds) in tightened {
            if bounds.lower > bounds.upper {
                continue;
            }
            bounds.estimate = bounds.estimate.clamp(bounds.lower, bounds.upper);
            self.levels.insert(s, bounds);
        }
    }
}

/// One element reached from a profile source at threshold `s`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReachableEntry {
    /// Overlap threshold.
    pub s: usize,
    /// Reached hyperedge or vertex.
    pub element: usize,
    /// Bounds on the s-distance from the source.
    pub bounds: DistanceBounds,
}

/// Elements s-reachable from a source, across every threshold.
///
/// # Examples
/// ```
/// use std::collections::HashMap;
/// use hypeq_core::{DistanceBounds, ReachableProfile};
///
/// let mut profile = ReachableProfile::new(7).with_label("red");
/// profile.push(1, 3, DistanceBounds::exact(2.0));
/// profile.push(1, 4, DistanceBounds::exact(1.0));
/// profile.push(2, 4, DistanceBounds::exact(3.0));
/// let labels = HashMap::from([(3, "red".to_owned()), (4, "blue".to_owned())]);
/// let top = profile.top_k_at(5, 1, Some(&labels));
/// assert_eq!(top.len(), 1);
/// assert_eq!(top[0].element, 3);
/// assert_eq!(profile.size(1), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReachableProfile {
    source: usize,
    label: Option<String>,
    entries: Vec<ReachableEntry>,
}

impl ReachableProfile {
    /// Creates an empty profile for `source`.
    #[must_use]
    pub const fn new(source: usize) -> Self {
        Self {
            source,
            label: None,
            entries: Vec::new(),
        }
    }

    /// Tags the source with `label` for label-filtered rankings.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Element the distances are measured from.
    #[must_use]
    #[rustfmt::skip]
    pub const fn source(&self) -> usize { self.source }

    /// Label of the source, if any.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Every recorded entry in insertion order.
    #[must_use]
    #[rustfmt::skip]
    pub fn entries(&self) -> &[ReachableEntry] { &self.entries }

    /// Records that `element` is reachable at threshold `s`.
    pub fn push(&mut self, s: usize, element: usize, bounds: DistanceBounds) {
        self.entries.push(ReachableEntry { s, element, bounds });
    }

    /// Highest threshold with at least one entry.
    #[must_use]
    pub fn max_s(&self) -> usize {
        self.entries.iter().map(|e| e.s).max().unwrap_or(0)
    }

    /// Distinct elements reachable at any threshold up to `s`.
    #[must_use]
    pub fn size(&self, s: usize) -> usize {
        self.entries
            .iter()
            .filter(|e| e.s <= s)
            .map(|e| e.element)
            .collect::<HashSet<_>>()
            .len()
    }

    /// The `k` closest entries at threshold `s` by estimate, then element.
    ///
    /// With `labels`, only elements whose label matches the source label
    /// (case-insensitively, unlabelled matching unlabelled) are ranked.
    #[must_use]
    pub fn top_k_at(
        &self,
        k: usize,
        s: usize,
        labels: Option<&HashMap<usize, String>>,
    ) -> Vec<ReachableEntry> {
        let mut ranked: Vec<ReachableEntry> = self
            .entries
            .iter()
            .filter(|e| e.s == s && self.matches(e.element, labels))
            .copied()
            .collect();
        ranked.sort_by(|a, b| {
            a.bounds
                .estimate
                .total_cmp(&b.bounds.estimate)
                .then(a.element.cmp(&b.element))
        });
        ranked.truncate(k);
        ranked
    }

    /// [`Self::top_k_at`] for every threshold from 1 to [`Self::max_s`].
    #[must_use]
    pub fn top_k(&self, k: usize, labels: Option<&HashMap<usize, String>>) -> Vec<ReachableEntry> {
        (1..=self.max_s())
            .flat_map(|s| self.top_k_at(k, s, labels))
            .collect()
    }

    fn matches(&self, element: usize, labels: Option<&HashMap<usize, String>>) -> bool {
        let Some(labels) = labels else {
            return true;
        };
        match (labels.get(&element), self.label.as_deref()) {
            (Some(theirs), Some(ours)) => theirs.eq_ignore_ascii_case(ours),
            (None, None) => true,
            _ => false,
        }
    }
}
