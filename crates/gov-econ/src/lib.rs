#![deny(warnings)]

//! City economy model for the governor.
//!
//! This crate provides:
//! - The [`Economy`] trait, the expensive recomputation the solver treats as
//!   an oracle
//! - [`RulesetEconomy`], a classic-ruleset model that honours the
//!   independence properties the solver's caches rely on
//! - Seeded random city generation for benches and property tests

use gov_core::{
    City, CityBonuses, CityId, CityStats, CityTile, Specialist, Specialists, Stat, StatVec,
    TaxRates, TileState, TileYield, Upkeep,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

/// Errors produced by economy configuration checks.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    /// A ruleset value that must be strictly positive is not.
    #[error("ruleset value {0} must be > 0")]
    NonPositive(&'static str),
    /// A ruleset value that must be non-negative is negative.
    #[error("ruleset value {0} must be >= 0")]
    Negative(&'static str),
    /// A percentage that may not exceed 100.
    #[error("ruleset value {0} must be <= 100")]
    AboveHundred(&'static str),
}

/// Full recomputation of a city's derived economy.
///
/// Implementations are expected to satisfy, for a fixed city:
/// - primary production is at least the plain sum of worked tile outputs and
///   depends only on that sum, never on specialists
/// - gold, luxury and science depend only on total trade and the number of
///   taxmen, entertainers and scientists respectively
/// - disorder and celebration depend only on luxury and the worker count
pub trait Economy {
    /// Output of workable tile `index` under the city's current state.
    fn tile_output(&self, city: &City, index: usize) -> TileYield;

    /// Output of the city center.
    fn center_output(&self, city: &City) -> TileYield;

    /// Whether the city may field specialists of `role`.
    fn can_use_specialist(&self, city: &City, role: Specialist) -> bool;

    /// Upper bound of total trade given the trade of all usable tiles.
    fn max_trade(&self, city: &City, tile_trade: i32) -> i32;

    /// Upper bound of luxury given [`Economy::max_trade`].
    fn luxury_upper_bound(&self, city: &City, max_trade: i32) -> i32;

    /// Recompute `city.stats` from the city's current assignment.
    fn refresh(&self, city: &mut City);

    /// Rejects configurations under which output could fall as tile
    /// output grows.
    fn validate(&self) -> Result<(), EconError> {
        Ok(())
    }
}

impl<E: Economy + ?Sized> Economy for &E {
    fn tile_output(&self, city: &City, index: usize) -> TileYield {
        (**self).tile_output(city, index)
    }

    fn center_output(&self, city: &City) -> TileYield {
        (**self).center_output(city)
    }

    fn can_use_specialist(&self, city: &City, role: Specialist) -> bool {
        (**self).can_use_specialist(city, role)
    }

    fn max_trade(&self, city: &City, tile_trade: i32) -> i32 {
        (**self).max_trade(city, tile_trade)
    }

    fn luxury_upper_bound(&self, city: &City, max_trade: i32) -> i32 {
        (**self).luxury_upper_bound(city, max_trade)
    }

    fn refresh(&self, city: &mut City) {
        (**self).refresh(city)
    }

    fn validate(&self) -> Result<(), EconError> {
        (**self).validate()
    }
}

/// Ruleset constants of the reference economy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesetEconomy {
    /// Food eaten per citizen each turn.
    pub food_per_citizen: i32,
    /// Workers that are content before luxury is applied.
    pub content_base: u32,
    /// Luxury needed to lift one citizen by one mood step.
    pub luxury_per_step: i32,
    pub entertainer_luxury: i32,
    pub scientist_science: i32,
    pub taxman_gold: i32,
    /// Smallest city that may employ scientists or taxmen.
    pub min_size_for_specialists: u32,
    /// Smallest city that can celebrate.
    pub celebrate_size: u32,
    /// Share of gross trade lost to corruption, in percent.
    pub corruption_pct: i32,
    /// Extra trade on tiles that already produce trade while celebrating.
    pub celebration_trade_bonus: i32,
}

impl Default for RulesetEconomy {
    fn default() -> Self {
        Self {
            food_per_citizen: 2,
            content_base: 4,
            luxury_per_step: 2,
            entertainer_luxury: 2,
            scientist_science: 3,
            taxman_gold: 3,
            min_size_for_specialists: 5,
            celebrate_size: 3,
            corruption_pct: 10,
            celebration_trade_bonus: 1,
        }
    }
}

/// Mood of a city's working citizens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Mood {
    pub happy: u32,
    pub content: u32,
    pub unhappy: u32,
}

impl RulesetEconomy {
    /// Check ruleset constants.
    pub fn validate(&self) -> Result<(), EconError> {
        if self.luxury_per_step <= 0 {
            return Err(EconError::NonPositive("luxury_per_step"));
        }
        for (name, v) in [
            ("food_per_citizen", self.food_per_citizen),
            ("entertainer_luxury", self.entertainer_luxury),
            ("scientist_science", self.scientist_science),
            ("taxman_gold", self.taxman_gold),
            ("corruption_pct", self.corruption_pct),
            ("celebration_trade_bonus", self.celebration_trade_bonus),
        ] {
            if v < 0 {
                return Err(EconError::Negative(name));
            }
        }
        // Above 100 % net trade would shrink as gross trade grows.
        if self.corruption_pct > 100 {
            return Err(EconError::AboveHundred("corruption_pct"));
        }
        Ok(())
    }

    fn with_celebration(&self, city: &City, mut output: TileYield) -> TileYield {
        if city.celebrating && output.trade > 0 {
            output.trade += self.celebration_trade_bonus;
        }
        output
    }

    /// Mood of `workers` citizens after spending `luxury`.
    ///
    /// Each step of luxury first turns a content citizen happy; once none
    /// are left it turns an unhappy citizen content.
    pub fn mood(&self, luxury: i32, workers: u32) -> Mood {
        let content = workers.min(self.content_base);
        let mut mood = Mood {
            happy: 0,
            content,
            unhappy: workers - content,
        };
        let mut steps = luxury.max(0) / self.luxury_per_step.max(1);
        while steps > 0 {
            if mood.content > 0 {
                mood.content -= 1;
                mood.happy += 1;
            } else if mood.unhappy > 0 {
                mood.unhappy -= 1;
                mood.content += 1;
            } else {
                break;
            }
            steps -= 1;
        }
        mood
    }
}

/// Apply a percentage bonus, rounding down.
fn with_bonus(value: i32, pct: i32) -> i32 {
    value * (100 + pct) / 100
}

impl Economy for RulesetEconomy {
    fn validate(&self) -> Result<(), EconError> {
        RulesetEconomy::validate(self)
    }

    fn tile_output(&self, city: &City, index: usize) -> TileYield {
        let base = city.tiles.get(index).map(|t| t.output).unwrap_or_default();
        self.with_celebration(city, base)
    }

    fn center_output(&self, city: &City) -> TileYield {
        self.with_celebration(city, city.center)
    }

    fn can_use_specialist(&self, city: &City, role: Specialist) -> bool {
        match role {
            Specialist::Entertainer => true,
            Specialist::Scientist | Specialist::Taxman => {
                city.size >= self.min_size_for_specialists
            }
        }
    }

    fn max_trade(&self, city: &City, tile_trade: i32) -> i32 {
        tile_trade + city.trade_routes
    }

    fn luxury_upper_bound(&self, city: &City, max_trade: i32) -> i32 {
        // Extremes are every citizen an entertainer or all trade turned into
        // luxury; mixes can beat either, so the bound is their sum.
        let raw = city.size as i32 * self.entertainer_luxury + max_trade;
        with_bonus(raw, city.bonuses.luxury_pct)
    }

    fn refresh(&self, city: &mut City) {
        let mut tiles = self.center_output(city);
        for i in city.workers().iter() {
            tiles += self.tile_output(city, i);
        }
        let size = city.size as i32;
        let workers = city.worker_count();
        let sp = city.specialists;

        let mut production = StatVec::default();
        let mut surplus = StatVec::default();

        production[Stat::Food] = tiles.food;
        surplus[Stat::Food] = tiles.food - self.food_per_citizen * size;

        let shields = with_bonus(tiles.shield, city.bonuses.shield_pct);
        production[Stat::Shield] = shields;
        surplus[Stat::Shield] = shields - city.upkeep.shield;

        let trade = tiles.trade + city.trade_routes;
        let corruption = trade * self.corruption_pct / 100;
        production[Stat::Trade] = trade;
        surplus[Stat::Trade] = trade - corruption;

        let net = surplus[Stat::Trade];
        let science = net * city.rates.science / 100;
        let luxury = net * city.rates.luxury / 100;
        let tax = net - science - luxury;

        production[Stat::Gold] = with_bonus(
            tax + sp.taxmen as i32 * self.taxman_gold,
            city.bonuses.gold_pct,
        );
        production[Stat::Luxury] = with_bonus(
            luxury + sp.entertainers as i32 * self.entertainer_luxury,
            city.bonuses.luxury_pct,
        );
        production[Stat::Science] = with_bonus(
            science + sp.scientists as i32 * self.scientist_science,
            city.bonuses.science_pct,
        );
        surplus[Stat::Gold] = production[Stat::Gold] - city.upkeep.gold;
        surplus[Stat::Luxury] = production[Stat::Luxury];
        surplus[Stat::Science] = production[Stat::Science];

        let mood = self.mood(production[Stat::Luxury], workers);
        let disorder = mood.unhappy > mood.happy;
        let happy = city.size >= self.celebrate_size
            && mood.happy >= (city.size + 1) / 2
            && mood.unhappy == 0;

        trace!(city = %city.id, workers, ?mood, disorder, happy, "refresh");
        city.stats = CityStats {
            production,
            surplus,
            disorder,
            happy,
        };
    }
}

/// Deterministic random city with `size` citizens and `tile_count` tiles.
///
/// Roughly one tile in seven is unavailable. Every citizen starts as an
/// entertainer, so the returned city is always a consistent assignment.
pub fn random_city(seed: u64, size: u32, tile_count: usize) -> City {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let tiles = (0..tile_count)
        .map(|_| CityTile {
            output: TileYield::new(
                rng.gen_range(0..=3),
                rng.gen_range(0..=2),
                rng.gen_range(0..=2),
            ),
            state: if rng.gen_range(0..7) == 0 {
                TileState::Unavailable
            } else {
                TileState::Empty
            },
        })
        .collect();
    let rates = match rng.gen_range(0..3) {
        0 => TaxRates::default(),
        1 => TaxRates {
            tax: 30,
            luxury: 30,
            science: 40,
        },
        _ => TaxRates {
            tax: 60,
            luxury: 10,
            science: 30,
        },
    };
    City {
        id: CityId((seed & 0xffff_ffff) as u32),
        name: format!("City{seed}"),
        size,
        center: TileYield::new(2, 1, rng.gen_range(0..=2)),
        tiles,
        specialists: Specialists::new(size, 0, 0),
        celebrating: false,
        trade_routes: rng.gen_range(0..=3),
        rates,
        bonuses: CityBonuses {
            shield_pct: if rng.gen_bool(0.3) { 50 } else { 0 },
            ..CityBonuses::default()
        },
        upkeep: Upkeep {
            shield: rng.gen_range(0..=2),
            gold: rng.gen_range(0..=3),
        },
        stats: CityStats::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gov_core::TileSet;
    use proptest::prelude::*;

    fn city() -> City {
        let mut c = random_city(3, 4, 8);
        for t in &mut c.tiles {
            t.state = TileState::Empty;
            t.output = TileYield::new(2, 1, 2);
        }
        c.center = TileYield::new(2, 1, 2);
        c.trade_routes = 0;
        c.rates = TaxRates {
            tax: 50,
            luxury: 0,
            science: 50,
        };
        c.bonuses = CityBonuses::default();
        c.upkeep = Upkeep { shield: 1, gold: 2 };
        c
    }

    #[test]
    fn refresh_computes_surplus() {
        let eco = RulesetEconomy {
            corruption_pct: 0,
            ..RulesetEconomy::default()
        };
        let mut c = city();
        c.set_assignment(TileSet::from_iter([0, 1, 2]), Specialists::new(1, 0, 0));
        eco.refresh(&mut c);
        let s = c.stats;
        assert_eq!(s.production[Stat::Food], 8);
        assert_eq!(s.surplus[Stat::Food], 0);
        assert_eq!(s.production[Stat::Shield], 4);
        assert_eq!(s.surplus[Stat::Shield], 3);
        assert_eq!(s.production[Stat::Trade], 8);
        assert_eq!(s.production[Stat::Science], 4);
        assert_eq!(s.production[Stat::Gold], 4);
        assert_eq!(s.surplus[Stat::Gold], 2);
        assert_eq!(s.production[Stat::Luxury], 2);
        assert!(!s.disorder);
    }

    #[test]
    fn mood_spends_luxury_on_content_first() {
        let eco = RulesetEconomy {
            content_base: 2,
            ..RulesetEconomy::default()
        };
        assert_eq!(
            eco.mood(0, 3),
            Mood {
                happy: 0,
                content: 2,
                unhappy: 1
            }
        );
        assert_eq!(
            eco.mood(6, 3),
            Mood {
                happy: 2,
                content: 1,
                unhappy: 0
            }
        );
        assert_eq!(eco.mood(100, 3).happy, 3);
    }

    #[test]
    fn celebration_adds_trade_to_trade_tiles() {
        let eco = RulesetEconomy::default();
        let mut c = city();
        c.tiles[0].output = TileYield::new(1, 1, 0);
        c.celebrating = true;
        assert_eq!(eco.tile_output(&c, 0).trade, 0);
        assert_eq!(eco.tile_output(&c, 1).trade, 3);
        assert_eq!(eco.center_output(&c).trade, 3);
    }

    #[test]
    fn small_cities_only_have_entertainers() {
        let eco = RulesetEconomy::default();
        let mut c = city();
        assert!(eco.can_use_specialist(&c, Specialist::Entertainer));
        assert!(!eco.can_use_specialist(&c, Specialist::Scientist));
        c.size = 5;
        assert!(eco.can_use_specialist(&c, Specialist::Taxman));
    }

    #[test]
    fn ruleset_config_defaults_from_yaml() {
        let eco: RulesetEconomy = serde_yaml::from_str("content_base: 2\n").unwrap();
        assert_eq!(eco.content_base, 2);
        assert_eq!(eco.food_per_citizen, 2);
        eco.validate().unwrap();
        let bad = RulesetEconomy {
            luxury_per_step: 0,
            ..RulesetEconomy::default()
        };
        assert_eq!(
            bad.validate(),
            Err(EconError::NonPositive("luxury_per_step"))
        );
    }

    #[test]
    fn corruption_above_hundred_is_rejected() {
        let total = RulesetEconomy {
            corruption_pct: 100,
            ..RulesetEconomy::default()
        };
        total.validate().unwrap();
        let over = RulesetEconomy {
            corruption_pct: 200,
            ..RulesetEconomy::default()
        };
        assert_eq!(
            over.validate(),
            Err(EconError::AboveHundred("corruption_pct"))
        );
    }

    #[test]
    fn random_city_is_seeded_and_consistent() {
        let a = random_city(42, 6, 20);
        let b = random_city(42, 6, 20);
        assert_eq!(a, b);
        gov_core::validate_city(&a).unwrap();
    }

    proptest! {
        #[test]
        fn primary_ignores_specialist_roles(seed in 0u64..500, sci in 0u32..4, tax in 0u32..4) {
            let eco = RulesetEconomy::default();
            let mut c = random_city(seed, 8, 12);
            let workers: TileSet = c.usable_tiles().iter().take(1).collect();
            let spare = 8 - workers.len() as u32;
            let (sci, tax) = (sci.min(spare), tax.min(spare - sci.min(spare)));
            c.set_assignment(workers, Specialists::new(spare, 0, 0));
            eco.refresh(&mut c);
            let base = c.stats;
            c.set_assignment(workers, Specialists::new(spare - sci - tax, sci, tax));
            eco.refresh(&mut c);
            for stat in Stat::PRIMARY {
                prop_assert_eq!(c.stats.production[stat], base.production[stat]);
                prop_assert_eq!(c.stats.surplus[stat], base.surplus[stat]);
            }
        }

        #[test]
        fn production_at_least_tile_sum(seed in 0u64..500) {
            let eco = RulesetEconomy::default();
            let mut c = random_city(seed, 4, 10);
            let workers: TileSet = c.usable_tiles().iter().take(4).collect();
            let spare = 4 - workers.len() as u32;
            c.set_assignment(workers, Specialists::new(spare, 0, 0));
            eco.refresh(&mut c);
            let mut sum = eco.center_output(&c);
            for i in workers.iter() {
                sum += eco.tile_output(&c, i);
            }
            for stat in Stat::PRIMARY {
                prop_assert!(c.stats.production[stat] >= sum.get(stat));
            }
        }
    }
}
