#![deny(warnings)]

//! City governor: finds the citizen assignment that best meets a target.
//!
//! The search enumerates tile layouts per worker count, keeps only layouts
//! that are not dominated on (food, shield, trade), and tries every
//! specialist split of each survivor. Almost all of the work goes into not
//! calling the economy oracle:
//! - [`CombinationStore`] is built once per city and reused across queries
//! - [`ResultCache`] memoizes evaluated splits per layout
//! - [`SecondaryStatsCache`] rebuilds gold/luxury/science and happiness
//!   from earlier oracle answers

mod combination;
mod fitness;
mod governor;
mod secondary;
mod tiles;
mod trial;

pub use combination::{Combination, CombinationStore, ResultCache};
pub use fitness::{fitness, FitnessEvaluator};
pub use governor::{CacheStats, Governor, QueryStats};
pub use secondary::{Conflict, HappyState, SecondaryStat, SecondaryStatsCache};
pub use tiles::TileYieldTable;
pub use trial::ScopedTrial;

use gov_core::ValidationError;
use gov_econ::EconError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default bound on layouts kept per worker count.
pub const DEFAULT_MAX_COMBINATIONS: usize = 150;

/// Errors produced by a governor query. Finding no valid assignment is not
/// an error; see [`Governor::query`].
#[derive(Debug, Error, PartialEq)]
pub enum GovernorError {
    /// The city failed validation before the search started.
    #[error("invalid city: {0}")]
    InvalidCity(#[from] ValidationError),
    /// The economy's configuration breaks the monotonicity the search
    /// prunes on.
    #[error("invalid economy: {0}")]
    InvalidEconomy(#[from] EconError),
    /// More non-dominated layouts than the store can hold.
    #[error("more than {capacity} combinations use {workers} workers; raise max_combinations")]
    CapacityExceeded { workers: u32, capacity: usize },
    /// The oracle contradicted an earlier answer for the same cache key.
    #[error("cache invariant violated: {0}")]
    InvariantViolation(String),
}

/// Governor tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernorConfig {
    /// Layouts kept per worker count before the store overflows.
    pub max_combinations: usize,
    /// Fail the query on a cache inconsistency instead of logging it and
    /// dropping the caches.
    pub strict_invariants: bool,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            max_combinations: DEFAULT_MAX_COMBINATIONS,
            strict_invariants: cfg!(debug_assertions),
        }
    }
}
