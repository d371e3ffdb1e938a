use crate::tiles::TileYieldTable;
use crate::GovernorError;
use gov_core::{CityId, CmResult, TileSet, TileYield};
use tracing::{debug, warn};

/// Evaluated specialist splits of one combination.
///
/// The all-entertainers result is kept apart because it is needed before
/// the split table exists and supplies the primary stats of every other
/// split.
#[derive(Clone, Debug, Default)]
pub struct ResultCache {
    all_entertainers: Option<CmResult>,
    splits: Option<SplitTable>,
}

#[derive(Clone, Debug)]
struct SplitTable {
    max_scientists: u32,
    max_taxmen: u32,
    slots: Vec<Option<CmResult>>,
}

impl SplitTable {
    fn index(&self, scientists: u32, taxmen: u32) -> Option<usize> {
        if scientists > self.max_scientists || taxmen > self.max_taxmen {
            return None;
        }
        Some(scientists as usize * (self.max_taxmen as usize + 1) + taxmen as usize)
    }
}

impl ResultCache {
    pub fn all_entertainers(&self) -> Option<&CmResult> {
        self.all_entertainers.as_ref()
    }

    /// Allocates the split table on first use. Later calls keep the
    /// existing table.
    pub fn ensure_table(&mut self, max_scientists: u32, max_taxmen: u32) {
        if self.splits.is_none() {
            let items = (max_scientists as usize + 1) * (max_taxmen as usize + 1);
            self.splits = Some(SplitTable {
                max_scientists,
                max_taxmen,
                slots: vec![None; items],
            });
        }
    }

    pub fn get(&self, scientists: u32, taxmen: u32) -> Option<&CmResult> {
        if scientists == 0 && taxmen == 0 {
            return self.all_entertainers.as_ref();
        }
        let table = self.splits.as_ref()?;
        table
            .index(scientists, taxmen)
            .and_then(|i| table.slots[i].as_ref())
    }

    /// Stores a result. Splits outside the allocated table are dropped.
    pub fn store(&mut self, scientists: u32, taxmen: u32, result: CmResult) {
        if scientists == 0 && taxmen == 0 {
            self.all_entertainers = Some(result);
            return;
        }
        if let Some(table) = self.splits.as_mut() {
            if let Some(i) = table.index(scientists, taxmen) {
                table.slots[i] = Some(result);
            }
        }
    }

    /// Every result cached so far, all-entertainers first.
    pub fn iter(&self) -> impl Iterator<Item = &CmResult> {
        self.all_entertainers.iter().chain(
            self.splits
                .iter()
                .flat_map(|t| t.slots.iter().flatten()),
        )
    }
}

/// A tile layout with a fixed number of workers.
#[derive(Clone, Debug)]
pub struct Combination {
    pub workers: TileSet,
    pub worker_count: u32,
    /// Center output plus the plain sum of the worked tiles.
    pub naive: TileYield,
    pub results: ResultCache,
}

impl Combination {
    fn root(center: TileYield) -> Self {
        Self {
            workers: TileSet::empty(),
            worker_count: 0,
            naive: center,
            results: ResultCache::default(),
        }
    }

    fn extend(&self, index: usize, output: TileYield) -> Self {
        Self {
            workers: self.workers.with(index),
            worker_count: self.worker_count + 1,
            naive: self.naive + output,
            results: ResultCache::default(),
        }
    }
}

/// Non-dominated tile layouts of one city, grouped by worker count.
#[derive(Debug)]
pub struct CombinationStore {
    city: CityId,
    size: u32,
    usable_tiles: usize,
    capacity: usize,
    peak_usage: usize,
    levels: Vec<Vec<Combination>>,
}

impl CombinationStore {
    /// Builds every level from 0 workers up to
    /// `min(usable tiles, city size)`.
    pub fn build(
        city: CityId,
        size: u32,
        table: &TileYieldTable,
        capacity: usize,
    ) -> Result<Self, GovernorError> {
        let mut store = Self {
            city,
            size,
            usable_tiles: table.usable_count(),
            capacity,
            peak_usage: 0,
            levels: vec![Vec::new()],
        };
        store.insert(0, Combination::root(table.center()))?;

        let max_workers = store.max_workers();
        for workers in 1..=max_workers {
            store.levels.push(Vec::new());
            let parents = std::mem::take(&mut store.levels[workers as usize - 1]);
            for parent in &parents {
                for i in table.usable().iter() {
                    if parent.workers.contains(i) {
                        continue;
                    }
                    store.insert(workers, parent.extend(i, table.get(i)))?;
                }
            }
            store.levels[workers as usize - 1] = parents;
            debug!(
                city = %city,
                workers,
                combinations = store.levels[workers as usize].len(),
                "expanded combination level"
            );
        }
        Ok(store)
    }

    /// Inserts `candidate` unless an existing layout dominates it, evicting
    /// the layouts it dominates. Returns whether it was kept.
    fn insert(&mut self, workers: u32, candidate: Combination) -> Result<bool, GovernorError> {
        let level = &mut self.levels[workers as usize];
        if level.iter().any(|c| c.naive.dominates(&candidate.naive)) {
            return Ok(false);
        }
        level.retain(|c| !candidate.naive.dominates(&c.naive));
        if level.len() >= self.capacity {
            return Err(GovernorError::CapacityExceeded {
                workers,
                capacity: self.capacity,
            });
        }
        level.push(candidate);

        let used = level.len();
        if used > self.capacity * 9 / 10 && used > self.peak_usage {
            self.peak_usage = used;
            warn!(
                used,
                capacity = self.capacity,
                workers,
                "combination store nearly full"
            );
        }
        Ok(true)
    }

    pub fn city(&self) -> CityId {
        self.city
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn usable_tiles(&self) -> usize {
        self.usable_tiles
    }

    /// Largest worker count with a level.
    pub fn max_workers(&self) -> u32 {
        (self.usable_tiles as u32).min(self.size)
    }

    pub fn level(&self, workers: u32) -> &[Combination] {
        self.levels
            .get(workers as usize)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn level_mut(&mut self, workers: u32) -> &mut [Combination] {
        self.levels
            .get_mut(workers as usize)
            .map(Vec::as_mut_slice)
            .unwrap_or_default()
    }

    /// Total layouts over all levels.
    pub fn len(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Combination> {
        self.levels.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gov_core::{CityTile, Specialists, StatVec, TileState, MAX_CITY_SIZE};
    use gov_econ::{random_city, RulesetEconomy};
    use proptest::prelude::*;

    fn example_table() -> TileYieldTable {
        let eco = RulesetEconomy::default();
        let mut city = random_city(9, 3, 0);
        city.center = TileYield::new(2, 1, 1);
        city.tiles = [(2, 1, 0), (1, 2, 0), (2, 0, 1), (0, 0, 2)]
            .into_iter()
            .map(|(f, s, t)| CityTile {
                output: TileYield::new(f, s, t),
                state: TileState::Empty,
            })
            .collect();
        TileYieldTable::snapshot(&eco, &city)
    }

    fn result(surplus: i32) -> CmResult {
        CmResult {
            workers: TileSet::empty(),
            specialists: Specialists::default(),
            production: StatVec::default(),
            surplus: StatVec::splat(surplus),
            disorder: false,
            happy: false,
        }
    }

    #[test]
    fn levels_hold_only_undominated_layouts() {
        let store = CombinationStore::build(CityId(1), 3, &example_table(), 150).unwrap();
        assert_eq!(store.max_workers(), 3);
        assert_eq!(store.level(0).len(), 1);
        assert_eq!(store.level(0)[0].naive, TileYield::new(2, 1, 1));
        // (0,0,2) is beaten by nothing on trade, so all four singles survive.
        assert_eq!(store.level(1).len(), 4);
        let pair = TileSet::from_iter([0, 1]);
        let kept = store.level(2).iter().find(|c| c.workers == pair).unwrap();
        assert_eq!(kept.naive, TileYield::new(5, 4, 1));
        assert_eq!(kept.worker_count, 2);
    }

    #[test]
    fn equal_layouts_are_kept_once() {
        let eco = RulesetEconomy::default();
        let mut city = random_city(4, 2, 0);
        city.tiles = vec![
            CityTile {
                output: TileYield::new(1, 1, 1),
                state: TileState::Empty,
            };
            3
        ];
        let table = TileYieldTable::snapshot(&eco, &city);
        let store = CombinationStore::build(city.id, 2, &table, 150).unwrap();
        assert_eq!(store.level(1).len(), 1);
        assert_eq!(store.level(2).len(), 1);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn overflow_is_reported() {
        let err = CombinationStore::build(CityId(1), 3, &example_table(), 2).unwrap_err();
        assert!(matches!(
            err,
            GovernorError::CapacityExceeded { capacity: 2, .. }
        ));
    }

    #[test]
    fn result_cache_slots() {
        let mut cache = ResultCache::default();
        assert!(cache.get(0, 0).is_none());
        cache.store(0, 0, result(1));
        // Without a table, splits are dropped.
        cache.store(1, 0, result(2));
        assert!(cache.get(1, 0).is_none());
        cache.ensure_table(2, 2);
        cache.store(1, 2, result(3));
        cache.store(3, 0, result(4));
        assert_eq!(cache.get(0, 0).unwrap().surplus, StatVec::splat(1));
        assert_eq!(cache.get(1, 2).unwrap().surplus, StatVec::splat(3));
        assert!(cache.get(3, 0).is_none());
        assert_eq!(cache.iter().count(), 2);
    }

    #[test]
    fn split_table_of_largest_city() {
        let mut cache = ResultCache::default();
        cache.ensure_table(MAX_CITY_SIZE, MAX_CITY_SIZE);
        cache.store(MAX_CITY_SIZE, MAX_CITY_SIZE, result(5));
        cache.store(MAX_CITY_SIZE, 0, result(6));
        assert_eq!(
            cache.get(MAX_CITY_SIZE, MAX_CITY_SIZE).unwrap().surplus,
            StatVec::splat(5)
        );
        assert_eq!(cache.get(MAX_CITY_SIZE, 0).unwrap().surplus, StatVec::splat(6));
        assert!(cache.get(0, MAX_CITY_SIZE).is_none());
        assert!(cache.get(MAX_CITY_SIZE + 1, 0).is_none());
    }

    proptest! {
        #[test]
        fn no_comparable_layouts_per_level(seed in 0u64..300, size in 1u32..7, tiles in 0usize..10) {
            let eco = RulesetEconomy::default();
            let city = random_city(seed, size, tiles);
            let table = TileYieldTable::snapshot(&eco, &city);
            let store = CombinationStore::build(city.id, size, &table, 150).unwrap();
            for w in 0..=store.max_workers() {
                let level = store.level(w);
                prop_assert!(!level.is_empty());
                for (i, a) in level.iter().enumerate() {
                    prop_assert_eq!(a.worker_count, w);
                    prop_assert_eq!(a.workers.len() as u32, w);
                    for b in &level[i + 1..] {
                        prop_assert!(!a.naive.dominates(&b.naive));
                        prop_assert!(!b.naive.dominates(&a.naive));
                    }
                }
            }
        }
    }
}
