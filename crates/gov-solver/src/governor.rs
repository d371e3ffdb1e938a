use crate::combination::{Combination, CombinationStore};
use crate::fitness::FitnessEvaluator;
use crate::secondary::{role_stat, SecondaryStatsCache};
use crate::tiles::TileYieldTable;
use crate::trial::ScopedTrial;
use crate::{GovernorConfig, GovernorError};
use gov_core::{
    validate_city, City, CityId, CmResult, Fitness, Parameter, Specialist, Specialists, Stat,
};
use gov_econ::Economy;
use tracing::{debug, error, info, trace};

/// Hit and miss counts of one cache layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    fn hit(&mut self) {
        self.hits += 1;
    }

    fn miss(&mut self) {
        self.misses += 1;
    }

    /// Share of lookups that hit, in percent. Zero before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 * 100.0 / total as f64
        }
    }
}

/// Counters accumulated over the lifetime of a [`Governor`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueryStats {
    pub queries: u64,
    /// Full economy recomputations.
    pub oracle_calls: u64,
    /// Per-layout split lookups.
    pub results: CacheStats,
    /// Splits rebuilt from secondary stats.
    pub secondary: CacheStats,
    /// Combination store reuse per query.
    pub combinations: CacheStats,
}

impl QueryStats {
    fn report(&self) {
        debug!(
            queries = self.queries,
            oracle_calls = self.oracle_calls,
            "results: {:.1}% of {} | secondary: {:.1}% of {} | combinations: {:.1}% of {}",
            self.results.hit_rate(),
            self.results.hits + self.results.misses,
            self.secondary.hit_rate(),
            self.secondary.hits + self.secondary.misses,
            self.combinations.hit_rate(),
            self.combinations.hits + self.combinations.misses,
        );
    }
}

/// Caller-owned optimizer state for one city at a time.
///
/// The combination store and secondary stats cache are kept between
/// queries for the same city and dropped when another city is queried,
/// when the city's size changes or on [`Governor::invalidate`].
#[derive(Debug, Default)]
pub struct Governor {
    config: GovernorConfig,
    store: Option<CombinationStore>,
    secondary: SecondaryStatsCache,
    stats: QueryStats,
    /// Inconsistencies seen during the current query in lenient mode.
    conflicts: usize,
}

impl Governor {
    pub fn new(config: GovernorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &GovernorConfig {
        &self.config
    }

    pub fn stats(&self) -> QueryStats {
        self.stats
    }

    /// The cached layouts, if a store is currently built.
    pub fn store(&self) -> Option<&CombinationStore> {
        self.store.as_ref()
    }

    /// Forget everything cached for `city`. Other cities are unaffected.
    pub fn invalidate(&mut self, city: CityId) {
        if self.store.as_ref().is_some_and(|s| s.city() == city) {
            debug!(city = %city, "invalidating governor cache");
            self.store = None;
        }
    }

    /// Forget everything cached.
    pub fn clear(&mut self) {
        self.store = None;
    }

    /// Best assignment of `city`'s citizens under `parameter`.
    ///
    /// Returns `Ok(None)` when no assignment satisfies the parameter. The
    /// city is borrowed mutably for trial evaluations and is left exactly
    /// as it was passed in.
    ///
    /// Tile yields are read once, when the combination store is built, and
    /// reused with every result cached in it until the store is rebuilt.
    /// Call [`Governor::invalidate`] whenever tile output changes, for
    /// example when a celebration starts or ends. Until then queries answer
    /// from the stale results, and in strict mode any split evaluated fresh
    /// against them fails with [`GovernorError::InvariantViolation`].
    pub fn query<E: Economy>(
        &mut self,
        economy: &E,
        city: &mut City,
        parameter: &Parameter,
    ) -> Result<Option<CmResult>, GovernorError> {
        validate_city(city)?;
        economy.validate()?;
        self.stats.queries += 1;
        self.conflicts = 0;

        let mut store = self.take_store(economy, city)?;
        let outcome = self.search(economy, city, parameter, &mut store);
        if outcome.is_ok() && self.conflicts == 0 {
            self.store = Some(store);
        } else {
            debug!(city = %city.id, conflicts = self.conflicts, "dropping governor caches");
        }
        self.stats.report();

        let best = outcome?;
        match &best {
            Some(result) => info!(city = %city.id, "best assignment: {}", result),
            None => info!(city = %city.id, "no valid assignment"),
        }
        Ok(best)
    }

    /// Reuses the cached store when it belongs to `city`, otherwise builds a
    /// fresh one and resets the secondary cache around it.
    fn take_store<E: Economy>(
        &mut self,
        economy: &E,
        city: &City,
    ) -> Result<CombinationStore, GovernorError> {
        match self.store.take() {
            Some(store) if store.city() == city.id && store.size() == city.size => {
                self.stats.combinations.hit();
                return Ok(store);
            }
            Some(store) => debug!(
                cached = %store.city(),
                requested = %city.id,
                "rebuilding combinations"
            ),
            None => {}
        }
        self.stats.combinations.miss();

        let table = TileYieldTable::snapshot(economy, city);
        let store =
            CombinationStore::build(city.id, city.size, &table, self.config.max_combinations)?;
        let max_trade = economy.max_trade(city, table.usable_trade());
        let max_luxury = economy.luxury_upper_bound(city, max_trade);
        self.secondary.reset(max_trade, city.size, max_luxury);
        info!(
            city = %city.id,
            combinations = store.len(),
            usable_tiles = store.usable_tiles(),
            "built combination store"
        );
        Ok(store)
    }

    fn search<E: Economy>(
        &mut self,
        economy: &E,
        city: &mut City,
        parameter: &Parameter,
        store: &mut CombinationStore,
    ) -> Result<Option<CmResult>, GovernorError> {
        let evaluator = FitnessEvaluator::new(parameter, city.size, store.usable_tiles());
        let can_scientist = economy.can_use_specialist(city, Specialist::Scientist);
        let can_taxman = economy.can_use_specialist(city, Specialist::Taxman);

        let mut best: Option<(Fitness, CmResult)> = None;
        let (mut not_enough_primary, mut not_enough_secondary) = (0u32, 0u32);

        for workers in 0..=store.max_workers() {
            let spare = city.size - workers;
            let max_scientists = if can_scientist { spare } else { 0 };
            let max_taxmen = if can_taxman { spare } else { 0 };

            for combination in store.level_mut(workers).iter_mut() {
                let base = self.fill(economy, city, combination, 0, 0)?;
                self.check_naive(city.id, combination, &base)?;

                // Secondary stats are not known yet; assume exactly the
                // minimum so only primary shortfalls reject the layout.
                let mut optimistic = base;
                for stat in Stat::SECONDARY {
                    optimistic.surplus[stat] = parameter.minimal_surplus[stat];
                }
                if !evaluator.is_valid(&optimistic) {
                    trace!(workers = ?combination.workers, "not enough primary");
                    not_enough_primary += 1;
                    continue;
                }

                combination.results.ensure_table(max_scientists, max_taxmen);
                let mut found = false;
                for scientists in 0..=max_scientists {
                    for taxmen in 0..=max_taxmen.min(spare - scientists) {
                        let result = self.fill(economy, city, combination, scientists, taxmen)?;
                        let Some(score) = evaluator.score(&result) else {
                            continue;
                        };
                        found = true;
                        if best.as_ref().map_or(true, |(b, _)| score > *b) {
                            trace!(?score, "new best: {}", result);
                            best = Some((score, result));
                        }
                    }
                }
                if !found {
                    not_enough_secondary += 1;
                }
            }
        }

        debug!(
            city = %city.id,
            not_enough_primary,
            not_enough_secondary,
            "search finished"
        );
        Ok(best.map(|(_, result)| result))
    }

    /// Result of one specialist split of `combination`, from the cheapest
    /// source that has it.
    fn fill<E: Economy>(
        &mut self,
        economy: &E,
        city: &mut City,
        combination: &mut Combination,
        scientists: u32,
        taxmen: u32,
    ) -> Result<CmResult, GovernorError> {
        if let Some(cached) = combination.results.get(scientists, taxmen) {
            self.stats.results.hit();
            return Ok(*cached);
        }
        self.stats.results.miss();

        let entertainers = city.size - combination.worker_count - scientists - taxmen;
        let specialists = Specialists::new(entertainers, scientists, taxmen);

        let synthesized = combination
            .results
            .all_entertainers()
            .and_then(|base| self.synthesize(base, combination, specialists));
        if let Some(result) = synthesized {
            self.stats.secondary.hit();
            combination.results.store(scientists, taxmen, result);
            return Ok(result);
        }
        self.stats.secondary.miss();

        self.stats.oracle_calls += 1;
        let result = ScopedTrial::begin(city, combination.workers, specialists).evaluate(economy);
        trace!(?specialists, "oracle: {}", result);

        if let Some(base) = combination.results.all_entertainers() {
            if let Some(stat) = Stat::PRIMARY
                .into_iter()
                .find(|&s| base.production[s] != result.production[s])
            {
                self.violation(
                    city.id,
                    format!(
                        "{stat} production {} differs from {} with all entertainers",
                        result.production[stat], base.production[stat]
                    ),
                )?;
            }
        }
        if let Err(conflict) = self.secondary.record(&result) {
            self.violation(city.id, conflict.to_string())?;
        }
        combination.results.store(scientists, taxmen, result);
        Ok(result)
    }

    /// Builds a split entirely from cached secondary stats, taking primary
    /// stats from the all-entertainers result of the same layout.
    fn synthesize(
        &self,
        base: &CmResult,
        combination: &Combination,
        specialists: Specialists,
    ) -> Option<CmResult> {
        let trade = base.production[Stat::Trade];
        let mut result = CmResult {
            workers: combination.workers,
            specialists,
            ..*base
        };
        for role in Specialist::ALL {
            let stat = role_stat(role);
            let cached = self.secondary.stat(trade, specialists.get(role), role)?;
            result.production[stat] = cached.production;
            result.surplus[stat] = cached.surplus;
        }
        let state = self
            .secondary
            .happy_state(result.production[Stat::Luxury], combination.worker_count)?;
        // Gold and science are never cached for disorder, so such a split
        // has to come from the oracle.
        if state.disorder {
            return None;
        }
        result.disorder = state.disorder;
        result.happy = state.happy;
        Some(result)
    }

    /// Primary production must never fall below the plain tile sum the
    /// layout was pruned on.
    fn check_naive(
        &mut self,
        city: CityId,
        combination: &Combination,
        base: &CmResult,
    ) -> Result<(), GovernorError> {
        for stat in Stat::PRIMARY {
            let expected = combination.naive.get(stat);
            if base.production[stat] < expected {
                self.violation(
                    city,
                    format!(
                        "{stat} production {} is below the tile sum {expected}",
                        base.production[stat]
                    ),
                )?;
            }
        }
        Ok(())
    }

    fn violation(&mut self, city: CityId, detail: String) -> Result<(), GovernorError> {
        if self.config.strict_invariants {
            return Err(GovernorError::InvariantViolation(detail));
        }
        error!(city = %city, "economy broke a cache invariant: {}", detail);
        self.conflicts += 1;
        Ok(())
    }
}
