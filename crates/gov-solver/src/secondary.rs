use gov_core::{CmResult, Specialist, Stat};
use std::fmt;
use tracing::{debug, trace};

/// Production and surplus of one secondary stat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SecondaryStat {
    pub production: i32,
    pub surplus: i32,
}

/// Happiness outcome for a (luxury, workers) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HappyState {
    pub disorder: bool,
    pub happy: bool,
}

/// An oracle answer that contradicts an earlier answer for the same key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Conflict {
    Secondary {
        trade: i32,
        count: u32,
        role: Specialist,
        cached: SecondaryStat,
        fresh: SecondaryStat,
    },
    Happiness {
        luxury: i32,
        workers: u32,
        cached: HappyState,
        fresh: HappyState,
    },
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conflict::Secondary {
                trade,
                count,
                role,
                cached,
                fresh,
            } => write!(
                f,
                "trade={trade} {role}s={count}: cached {cached:?}, oracle {fresh:?}",
                role = role.name()
            ),
            Conflict::Happiness {
                luxury,
                workers,
                cached,
                fresh,
            } => write!(
                f,
                "luxury={luxury} workers={workers}: cached {cached:?}, oracle {fresh:?}"
            ),
        }
    }
}

pub(crate) fn role_stat(role: Specialist) -> Stat {
    match role {
        Specialist::Entertainer => Stat::Luxury,
        Specialist::Scientist => Stat::Science,
        Specialist::Taxman => Stat::Gold,
    }
}

fn role_slot(role: Specialist) -> usize {
    match role {
        Specialist::Entertainer => 0,
        Specialist::Scientist => 1,
        Specialist::Taxman => 2,
    }
}

/// Maps (trade, count of a role) to that role's stat and (luxury, workers)
/// to the happiness state.
///
/// Dimensions come from conservative upper bounds computed when a city's
/// combinations are built; keys outside them are never cached.
#[derive(Debug, Default)]
pub struct SecondaryStatsCache {
    trade_dim: usize,
    size_dim: usize,
    luxury_dim: usize,
    stats: Vec<Option<SecondaryStat>>,
    status: Vec<Option<HappyState>>,
}

impl SecondaryStatsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties the cache and grows it to cover trade in `0..=max_trade`,
    /// counts in `0..=size` and luxury in `0..=max_luxury`.
    pub fn reset(&mut self, max_trade: i32, size: u32, max_luxury: i32) {
        let trade_dim = usize::try_from(max_trade).unwrap_or(0) + 1;
        let size_dim = size as usize + 1;
        let luxury_dim = usize::try_from(max_luxury).unwrap_or(0) + 1;
        if trade_dim > self.trade_dim || size_dim > self.size_dim || luxury_dim > self.luxury_dim {
            self.trade_dim = self.trade_dim.max(trade_dim);
            self.size_dim = self.size_dim.max(size_dim);
            self.luxury_dim = self.luxury_dim.max(luxury_dim);
            debug!(
                trade = self.trade_dim,
                size = self.size_dim,
                luxury = self.luxury_dim,
                "growing secondary stats cache"
            );
        }
        self.stats.clear();
        self.stats
            .resize(self.trade_dim * self.size_dim * Specialist::ALL.len(), None);
        self.status.clear();
        self.status.resize(self.luxury_dim * self.size_dim, None);
    }

    fn stat_index(&self, trade: i32, count: u32, role: Specialist) -> Option<usize> {
        let trade = usize::try_from(trade).ok()?;
        let count = count as usize;
        if trade >= self.trade_dim || count >= self.size_dim {
            return None;
        }
        Some((trade * self.size_dim + count) * Specialist::ALL.len() + role_slot(role))
    }

    fn status_index(&self, luxury: i32, workers: u32) -> Option<usize> {
        let luxury = usize::try_from(luxury).ok()?;
        let workers = workers as usize;
        if luxury >= self.luxury_dim || workers >= self.size_dim {
            return None;
        }
        Some(luxury * self.size_dim + workers)
    }

    pub fn stat(&self, trade: i32, count: u32, role: Specialist) -> Option<SecondaryStat> {
        self.stat_index(trade, count, role)
            .and_then(|i| self.stats[i])
    }

    pub fn happy_state(&self, luxury: i32, workers: u32) -> Option<HappyState> {
        self.status_index(luxury, workers)
            .and_then(|i| self.status[i])
    }

    /// Records the secondary stats and happiness of a freshly computed
    /// result, checking them against anything already cached.
    ///
    /// Gold and science are only recorded outside disorder, since disorder
    /// may suppress them. Luxury is always recorded but only checked
    /// outside disorder.
    pub fn record(&mut self, result: &CmResult) -> Result<(), Conflict> {
        let trade = result.production[Stat::Trade];
        for role in Specialist::ALL {
            let stored_in_disorder = role == Specialist::Entertainer;
            if result.disorder && !stored_in_disorder {
                continue;
            }
            let stat = role_stat(role);
            let fresh = SecondaryStat {
                production: result.production[stat],
                surplus: result.surplus[stat],
            };
            let count = result.specialists.get(role);
            let Some(i) = self.stat_index(trade, count, role) else {
                trace!(trade, count, role = role.name(), "secondary key out of range");
                continue;
            };
            match self.stats[i] {
                None => self.stats[i] = Some(fresh),
                Some(cached) if cached != fresh && !result.disorder => {
                    return Err(Conflict::Secondary {
                        trade,
                        count,
                        role,
                        cached,
                        fresh,
                    });
                }
                Some(_) => {}
            }
        }

        let luxury = result.production[Stat::Luxury];
        let workers = result.worker_count();
        let fresh = HappyState {
            disorder: result.disorder,
            happy: result.happy,
        };
        if let Some(i) = self.status_index(luxury, workers) {
            match self.status[i] {
                None => self.status[i] = Some(fresh),
                Some(cached) if cached != fresh => {
                    return Err(Conflict::Happiness {
                        luxury,
                        workers,
                        cached,
                        fresh,
                    });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gov_core::{Specialists, StatVec, TileSet};

    fn result(trade: i32, sp: Specialists, science: i32, luxury: i32) -> CmResult {
        let mut production = StatVec::default();
        production[Stat::Trade] = trade;
        production[Stat::Science] = science;
        production[Stat::Luxury] = luxury;
        production[Stat::Gold] = 1;
        CmResult {
            workers: TileSet::from_iter([0, 1]),
            specialists: sp,
            production,
            surplus: production,
            disorder: false,
            happy: false,
        }
    }

    #[test]
    fn records_and_looks_up() {
        let mut cache = SecondaryStatsCache::new();
        cache.reset(10, 4, 20);
        assert!(cache.stat(5, 1, Specialist::Scientist).is_none());
        cache
            .record(&result(5, Specialists::new(1, 1, 0), 7, 2))
            .unwrap();
        assert_eq!(
            cache.stat(5, 1, Specialist::Scientist),
            Some(SecondaryStat {
                production: 7,
                surplus: 7
            })
        );
        assert_eq!(cache.stat(5, 1, Specialist::Entertainer).unwrap().production, 2);
        assert_eq!(cache.stat(5, 0, Specialist::Taxman).unwrap().production, 1);
        assert_eq!(
            cache.happy_state(2, 2),
            Some(HappyState {
                disorder: false,
                happy: false
            })
        );
    }

    #[test]
    fn contradicting_answer_is_a_conflict() {
        let mut cache = SecondaryStatsCache::new();
        cache.reset(10, 4, 20);
        cache
            .record(&result(5, Specialists::new(1, 1, 0), 7, 2))
            .unwrap();
        let err = cache
            .record(&result(5, Specialists::new(0, 1, 1), 8, 0))
            .unwrap_err();
        assert!(matches!(
            err,
            Conflict::Secondary {
                role: Specialist::Scientist,
                ..
            }
        ));
        assert!(err.to_string().contains("scientists=1"));
    }

    #[test]
    fn disorder_skips_gold_and_science() {
        let mut cache = SecondaryStatsCache::new();
        cache.reset(10, 4, 20);
        let mut r = result(5, Specialists::new(1, 1, 0), 0, 2);
        r.disorder = true;
        cache.record(&r).unwrap();
        assert!(cache.stat(5, 1, Specialist::Scientist).is_none());
        assert!(cache.stat(5, 1, Specialist::Entertainer).is_some());
    }

    #[test]
    fn out_of_range_keys_are_not_cached() {
        let mut cache = SecondaryStatsCache::new();
        cache.reset(3, 2, 3);
        cache
            .record(&result(9, Specialists::new(0, 0, 0), 1, 9))
            .unwrap();
        assert!(cache.stat(9, 0, Specialist::Scientist).is_none());
        assert!(cache.happy_state(9, 2).is_none());
        assert!(cache.stat(-1, 0, Specialist::Taxman).is_none());
    }

    #[test]
    fn reset_clears_entries() {
        let mut cache = SecondaryStatsCache::new();
        cache.reset(10, 4, 20);
        cache
            .record(&result(5, Specialists::new(1, 1, 0), 7, 2))
            .unwrap();
        cache.reset(2, 2, 2);
        assert!(cache.stat(5, 1, Specialist::Scientist).is_none());
    }
}
