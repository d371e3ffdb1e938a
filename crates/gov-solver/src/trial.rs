use gov_core::{City, CityStats, CmResult, Specialists, TileSet, TileState};
use gov_econ::Economy;
use std::ops::{Deref, DerefMut};

/// Exclusive borrow of a city with a trial assignment applied.
///
/// The city's own assignment and stats are put back when the guard is
/// dropped, so nothing outside the guard can see the trial.
pub struct ScopedTrial<'c> {
    city: &'c mut City,
    tiles: Vec<TileState>,
    specialists: Specialists,
    stats: CityStats,
}

impl<'c> ScopedTrial<'c> {
    pub fn begin(city: &'c mut City, workers: TileSet, specialists: Specialists) -> Self {
        let tiles = city.tiles.iter().map(|t| t.state).collect();
        let saved_specialists = city.specialists;
        let stats = city.stats;
        city.set_assignment(workers, specialists);
        Self {
            city,
            tiles,
            specialists: saved_specialists,
            stats,
        }
    }

    /// Runs the oracle on the trial assignment and copies out the result.
    pub fn evaluate<E: Economy>(&mut self, economy: &E) -> CmResult {
        economy.refresh(&mut *self.city);
        CmResult::from_city(&*self.city)
    }
}

impl Deref for ScopedTrial<'_> {
    type Target = City;

    fn deref(&self) -> &City {
        &*self.city
    }
}

impl DerefMut for ScopedTrial<'_> {
    fn deref_mut(&mut self) -> &mut City {
        &mut *self.city
    }
}

impl Drop for ScopedTrial<'_> {
    fn drop(&mut self) {
        for (tile, state) in self.city.tiles.iter_mut().zip(&self.tiles) {
            tile.state = *state;
        }
        self.city.specialists = self.specialists;
        self.city.stats = self.stats;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gov_econ::{random_city, RulesetEconomy};

    #[test]
    fn city_is_restored_on_drop() {
        let eco = RulesetEconomy::default();
        let mut city = random_city(11, 3, 6);
        eco.refresh(&mut city);
        let before = city.clone();
        let workers: TileSet = city.usable_tiles().iter().take(2).collect();
        let result = {
            let spare = 3 - workers.len() as u32;
            let mut trial = ScopedTrial::begin(&mut city, workers, Specialists::new(spare, 0, 0));
            assert_eq!(trial.workers(), workers);
            trial.evaluate(&eco)
        };
        assert_eq!(result.workers, workers);
        assert_eq!(result.worker_count() + result.specialist_count(), 3);
        assert_eq!(city, before);
    }
}
