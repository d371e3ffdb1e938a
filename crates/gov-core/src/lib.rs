#![deny(warnings)]

//! Core domain model for the city governor.
//!
//! This crate defines the serializable types shared by the economy model,
//! the solver and the management agent, with validation helpers that guard
//! the basic invariants of a city and of a computed assignment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut};
use thiserror::Error;

/// Number of tracked city outputs.
pub const NUM_STATS: usize = 6;

/// Largest number of workable tiles a city may have (one bit per tile).
pub const MAX_CITY_TILES: usize = 64;

/// Largest supported city size.
pub const MAX_CITY_SIZE: u32 = 250;

/// A city output. The first three are primary (produced by tiles), the last
/// three are secondary (derived from trade and specialists).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stat {
    Food,
    Shield,
    Trade,
    Gold,
    Luxury,
    Science,
}

impl Stat {
    /// All stats in index order.
    pub const ALL: [Stat; NUM_STATS] = [
        Stat::Food,
        Stat::Shield,
        Stat::Trade,
        Stat::Gold,
        Stat::Luxury,
        Stat::Science,
    ];

    /// Stats produced directly by worked tiles.
    pub const PRIMARY: [Stat; 3] = [Stat::Food, Stat::Shield, Stat::Trade];

    /// Stats derived from trade and specialists.
    pub const SECONDARY: [Stat; 3] = [Stat::Gold, Stat::Luxury, Stat::Science];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_primary(self) -> bool {
        matches!(self, Stat::Food | Stat::Shield | Stat::Trade)
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Stat::Food => "Food",
            Stat::Shield => "Shield",
            Stat::Trade => "Trade",
            Stat::Gold => "Gold",
            Stat::Luxury => "Luxury",
            Stat::Science => "Science",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One value per [`Stat`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatVec(pub [i32; NUM_STATS]);

impl StatVec {
    /// The same value for every stat.
    pub fn splat(value: i32) -> Self {
        StatVec([value; NUM_STATS])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stat, i32)> + '_ {
        Stat::ALL.iter().map(move |&s| (s, self[s]))
    }

    /// Sum over all stats, widened so extreme minima cannot overflow.
    pub fn total(&self) -> i64 {
        self.0.iter().map(|&v| i64::from(v)).sum()
    }
}

impl Index<Stat> for StatVec {
    type Output = i32;

    fn index(&self, stat: Stat) -> &i32 {
        &self.0[stat.index()]
    }
}

impl IndexMut<Stat> for StatVec {
    fn index_mut(&mut self, stat: Stat) -> &mut i32 {
        &mut self.0[stat.index()]
    }
}

/// Primary output of a single tile (or of a sum of tiles).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileYield {
    pub food: i32,
    pub shield: i32,
    pub trade: i32,
}

impl TileYield {
    pub const fn new(food: i32, shield: i32, trade: i32) -> Self {
        Self {
            food,
            shield,
            trade,
        }
    }

    /// Value for a primary stat; secondary stats have no tile output.
    pub fn get(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Food => self.food,
            Stat::Shield => self.shield,
            Stat::Trade => self.trade,
            _ => 0,
        }
    }

    /// True when `self` is at least as good as `other` on every axis.
    pub fn dominates(&self, other: &TileYield) -> bool {
        self.food >= other.food && self.shield >= other.shield && self.trade >= other.trade
    }
}

impl Add for TileYield {
    type Output = TileYield;

    fn add(self, rhs: TileYield) -> TileYield {
        TileYield::new(
            self.food + rhs.food,
            self.shield + rhs.shield,
            self.trade + rhs.trade,
        )
    }
}

impl AddAssign for TileYield {
    fn add_assign(&mut self, rhs: TileYield) {
        *self = *self + rhs;
    }
}

/// Set of tile indices into a city's workable tiles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileSet(u64);

impl TileSet {
    pub const fn empty() -> Self {
        TileSet(0)
    }

    /// Inserts `index`. Indices at or above [`MAX_CITY_TILES`] are ignored;
    /// cities with that many tiles are rejected by [`validate_city`].
    pub fn insert(&mut self, index: usize) {
        if index < MAX_CITY_TILES {
            self.0 |= 1 << index;
        }
    }

    pub fn remove(&mut self, index: usize) {
        if index < MAX_CITY_TILES {
            self.0 &= !(1 << index);
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        index < MAX_CITY_TILES && self.0 & (1 << index) != 0
    }

    /// Copy of `self` with `index` added.
    pub fn with(mut self, index: usize) -> Self {
        self.insert(index);
        self
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> {
        let bits = self.0;
        (0..MAX_CITY_TILES).filter(move |&i| bits & (1 << i) != 0)
    }
}

impl FromIterator<usize> for TileSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = TileSet::empty();
        for i in iter {
            set.insert(i);
        }
        set
    }
}

/// Role of a citizen who does not work a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Specialist {
    Entertainer,
    Scientist,
    Taxman,
}

impl Specialist {
    pub const ALL: [Specialist; 3] = [
        Specialist::Entertainer,
        Specialist::Scientist,
        Specialist::Taxman,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Specialist::Entertainer => "entertainer",
            Specialist::Scientist => "scientist",
            Specialist::Taxman => "taxman",
        }
    }
}

/// Specialist head counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Specialists {
    pub entertainers: u32,
    pub scientists: u32,
    pub taxmen: u32,
}

impl Specialists {
    pub const fn new(entertainers: u32, scientists: u32, taxmen: u32) -> Self {
        Self {
            entertainers,
            scientists,
            taxmen,
        }
    }

    pub fn get(&self, role: Specialist) -> u32 {
        match role {
            Specialist::Entertainer => self.entertainers,
            Specialist::Scientist => self.scientists,
            Specialist::Taxman => self.taxmen,
        }
    }

    pub fn set(&mut self, role: Specialist, count: u32) {
        match role {
            Specialist::Entertainer => self.entertainers = count,
            Specialist::Scientist => self.scientists = count,
            Specialist::Taxman => self.taxmen = count,
        }
    }

    pub fn total(&self) -> u32 {
        self.entertainers + self.scientists + self.taxmen
    }
}

/// Identifier of a city, stable for the city's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CityId(pub u32);

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Occupation state of a workable tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileState {
    #[default]
    Empty,
    Worker,
    /// Worked by another city, enemy-held, or otherwise not usable.
    Unavailable,
}

/// A workable tile around the city center.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityTile {
    /// Output before ruleset modifiers such as celebration.
    pub output: TileYield,
    #[serde(default)]
    pub state: TileState,
}

/// Split of net trade into gold, luxury and science, in percent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRates {
    pub tax: i32,
    pub luxury: i32,
    pub science: i32,
}

impl Default for TaxRates {
    fn default() -> Self {
        Self {
            tax: 40,
            luxury: 0,
            science: 60,
        }
    }
}

/// Percentage bonuses granted by buildings and wonders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityBonuses {
    #[serde(default)]
    pub shield_pct: i32,
    #[serde(default)]
    pub gold_pct: i32,
    #[serde(default)]
    pub luxury_pct: i32,
    #[serde(default)]
    pub science_pct: i32,
}

impl CityBonuses {
    /// Every bonus with its field name.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, i32)> {
        [
            ("shield_pct", self.shield_pct),
            ("gold_pct", self.gold_pct),
            ("luxury_pct", self.luxury_pct),
            ("science_pct", self.science_pct),
        ]
        .into_iter()
    }
}

/// Fixed per-turn costs of a city.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upkeep {
    /// Shields for supported units.
    #[serde(default)]
    pub shield: i32,
    /// Gold for buildings.
    #[serde(default)]
    pub gold: i32,
}

/// Derived economic state, recomputed by the economy model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityStats {
    pub production: StatVec,
    pub surplus: StatVec,
    pub disorder: bool,
    pub happy: bool,
}

/// A live city: fixed configuration, current citizen assignment and the
/// derived stats of that assignment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    pub name: String,
    /// Number of citizens.
    pub size: u32,
    /// Output of the city center tile, which is always worked for free.
    pub center: TileYield,
    pub tiles: Vec<CityTile>,
    #[serde(default)]
    pub specialists: Specialists,
    #[serde(default)]
    pub celebrating: bool,
    /// Flat trade from trade routes.
    #[serde(default)]
    pub trade_routes: i32,
    #[serde(default)]
    pub rates: TaxRates,
    #[serde(default)]
    pub bonuses: CityBonuses,
    #[serde(default)]
    pub upkeep: Upkeep,
    #[serde(default)]
    pub stats: CityStats,
}

impl City {
    /// Tiles currently worked by this city.
    pub fn workers(&self) -> TileSet {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| t.state == TileState::Worker)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn worker_count(&self) -> u32 {
        self.workers().len() as u32
    }

    /// Whether the tile at `index` can hold one of this city's workers.
    pub fn can_work(&self, index: usize) -> bool {
        self.tiles
            .get(index)
            .is_some_and(|t| t.state != TileState::Unavailable)
    }

    /// All tiles this city may work, including those it works now.
    pub fn usable_tiles(&self) -> TileSet {
        (0..self.tiles.len()).filter(|&i| self.can_work(i)).collect()
    }

    /// Replaces the citizen assignment. Tiles outside `workers` that were
    /// worked become empty; unavailable tiles are never claimed.
    pub fn set_assignment(&mut self, workers: TileSet, specialists: Specialists) {
        for (i, tile) in self.tiles.iter_mut().enumerate() {
            match tile.state {
                TileState::Unavailable => {}
                _ if workers.contains(i) => tile.state = TileState::Worker,
                _ => tile.state = TileState::Empty,
            }
        }
        self.specialists = specialists;
    }
}

/// Target specification for the governor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Required surplus per stat; results below any of these are invalid.
    pub minimal_surplus: StatVec,
    /// Weight of each stat in the major fitness.
    pub factor: StatVec,
    #[serde(default)]
    pub factor_target: FactorTarget,
    /// Bonus added to the major fitness of a celebrating result.
    pub happy_factor: i32,
    #[serde(default)]
    pub require_happy: bool,
    #[serde(default)]
    pub allow_disorder: bool,
    #[serde(default = "default_true")]
    pub allow_specialists: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Parameter {
    fn default() -> Self {
        Self {
            minimal_surplus: StatVec::splat(0),
            factor: StatVec::splat(1),
            factor_target: FactorTarget::Surplus,
            happy_factor: 1,
            require_happy: false,
            allow_disorder: false,
            allow_specialists: true,
        }
    }
}

/// What the per-stat factors weigh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactorTarget {
    /// The surplus itself.
    #[default]
    Surplus,
    /// The distance between the required minimum and the surplus.
    Extra,
}

/// A complete citizen assignment and its evaluated outputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmResult {
    pub workers: TileSet,
    pub specialists: Specialists,
    pub production: StatVec,
    pub surplus: StatVec,
    pub disorder: bool,
    pub happy: bool,
}

impl CmResult {
    /// Snapshot of the city's current assignment and derived stats.
    pub fn from_city(city: &City) -> Self {
        Self {
            workers: city.workers(),
            specialists: city.specialists,
            production: city.stats.production,
            surplus: city.stats.surplus,
            disorder: city.stats.disorder,
            happy: city.stats.happy,
        }
    }

    pub fn worker_count(&self) -> u32 {
        self.workers.len() as u32
    }

    pub fn specialist_count(&self) -> u32 {
        self.specialists.total()
    }

    /// True when both results describe the same assignment with the same
    /// surplus and happiness.
    pub fn same_assignment(&self, other: &CmResult) -> bool {
        self.disorder == other.disorder
            && self.happy == other.happy
            && self.specialists == other.specialists
            && self.surplus == other.surplus
            && self.workers == other.workers
    }
}

impl fmt::Display for CmResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (left, right) in [
            (Stat::Food, Stat::Gold),
            (Stat::Shield, Stat::Luxury),
            (Stat::Trade, Stat::Science),
        ] {
            writeln!(
                f,
                "{:<8} {:>3}({:+3})    {:<8} {:>3}({:+3})",
                left.name(),
                self.production[left],
                self.surplus[left],
                right.name(),
                self.production[right],
                self.surplus[right],
            )?;
        }
        write!(
            f,
            "People (W/E/S/T): {}/{}/{}/{}",
            self.worker_count(),
            self.specialists.entertainers,
            self.specialists.scientists,
            self.specialists.taxmen
        )?;
        if self.happy {
            f.write_str(" happy")?;
        }
        if self.disorder {
            f.write_str(" disorder")?;
        }
        Ok(())
    }
}

/// Score of a valid result. Compared by `major` first, then `minor`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fitness {
    pub major: i64,
    pub minor: i64,
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A city needs at least one citizen.
    #[error("city size must be >= 1")]
    EmptyCity,
    /// More citizens than the specialist tables are sized for.
    #[error("city size {0} exceeds the maximum of 250")]
    CityTooLarge(u32),
    /// A bonus below -100 % would turn output negative.
    #[error("bonus {name} of {pct}% must be >= -100%")]
    BonusBelowFloor { name: &'static str, pct: i32 },
    /// More workable tiles than a tile set can address.
    #[error("city has {0} workable tiles, at most 64 are supported")]
    TooManyTiles(usize),
    /// Rates must each lie in [0, 100] and add up to 100.
    #[error("tax rates {tax}/{luxury}/{science} must be within [0,100] and sum to 100")]
    InvalidRates { tax: i32, luxury: i32, science: i32 },
    /// Tile output must be non-negative.
    #[error("tile {0} has negative output")]
    NegativeYield(usize),
    /// Workers plus specialists must equal the city size.
    #[error("{workers} workers + {specialists} specialists != size {size}")]
    InconsistentAssignment {
        workers: u32,
        specialists: u32,
        size: u32,
    },
    /// An assignment claims a tile the city cannot work.
    #[error("tile {0} cannot be worked by this city")]
    TileNotUsable(usize),
}

/// Validate tax rates.
pub fn validate_rates(r: &TaxRates) -> Result<(), ValidationError> {
    let in_range = [r.tax, r.luxury, r.science]
        .iter()
        .all(|v| (0..=100).contains(v));
    if !in_range || r.tax + r.luxury + r.science != 100 {
        return Err(ValidationError::InvalidRates {
            tax: r.tax,
            luxury: r.luxury,
            science: r.science,
        });
    }
    Ok(())
}

/// Validate a city's configuration and its current assignment.
pub fn validate_city(city: &City) -> Result<(), ValidationError> {
    if city.size == 0 {
        return Err(ValidationError::EmptyCity);
    }
    if city.size > MAX_CITY_SIZE {
        return Err(ValidationError::CityTooLarge(city.size));
    }
    if city.tiles.len() > MAX_CITY_TILES {
        return Err(ValidationError::TooManyTiles(city.tiles.len()));
    }
    validate_rates(&city.rates)?;
    if let Some((name, pct)) = city.bonuses.iter().find(|&(_, pct)| pct < -100) {
        return Err(ValidationError::BonusBelowFloor { name, pct });
    }
    if let Some((i, _)) = city.tiles.iter().enumerate().find(|(_, t)| {
        let o = t.output;
        o.food < 0 || o.shield < 0 || o.trade < 0
    }) {
        return Err(ValidationError::NegativeYield(i));
    }
    let workers = city.worker_count();
    if workers + city.specialists.total() != city.size {
        return Err(ValidationError::InconsistentAssignment {
            workers,
            specialists: city.specialists.total(),
            size: city.size,
        });
    }
    Ok(())
}

/// Validate that `result` is an assignment the city could adopt.
pub fn validate_result(city: &City, result: &CmResult) -> Result<(), ValidationError> {
    if let Some(i) = result.workers.iter().find(|&i| !city.can_work(i)) {
        return Err(ValidationError::TileNotUsable(i));
    }
    if result.worker_count() + result.specialist_count() != city.size {
        return Err(ValidationError::InconsistentAssignment {
            workers: result.worker_count(),
            specialists: result.specialist_count(),
            size: city.size,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn city() -> City {
        City {
            id: CityId(7),
            name: "Roma".to_string(),
            size: 2,
            center: TileYield::new(2, 1, 1),
            tiles: vec![
                CityTile {
                    output: TileYield::new(2, 0, 0),
                    state: TileState::Worker,
                },
                CityTile {
                    output: TileYield::new(1, 2, 0),
                    state: TileState::Empty,
                },
                CityTile {
                    output: TileYield::new(0, 0, 3),
                    state: TileState::Unavailable,
                },
            ],
            specialists: Specialists::new(1, 0, 0),
            celebrating: false,
            trade_routes: 0,
            rates: TaxRates::default(),
            bonuses: CityBonuses::default(),
            upkeep: Upkeep::default(),
            stats: CityStats::default(),
        }
    }

    #[test]
    fn city_validates() {
        validate_city(&city()).unwrap();
    }

    #[test]
    fn rejects_inconsistent_assignment() {
        let mut c = city();
        c.specialists.taxmen = 1;
        assert_eq!(
            validate_city(&c),
            Err(ValidationError::InconsistentAssignment {
                workers: 1,
                specialists: 2,
                size: 2
            })
        );
    }

    #[test]
    fn rejects_bad_rates() {
        let mut c = city();
        c.rates.luxury = 10;
        assert!(matches!(
            validate_city(&c),
            Err(ValidationError::InvalidRates { .. })
        ));
    }

    #[test]
    fn rejects_bonus_that_negates_output() {
        let mut c = city();
        c.bonuses.science_pct = -100;
        validate_city(&c).unwrap();
        c.bonuses.science_pct = -300;
        assert_eq!(
            validate_city(&c),
            Err(ValidationError::BonusBelowFloor {
                name: "science_pct",
                pct: -300
            })
        );
        c.bonuses.science_pct = 0;
        c.bonuses.shield_pct = -101;
        assert!(matches!(
            validate_city(&c),
            Err(ValidationError::BonusBelowFloor { name: "shield_pct", .. })
        ));
    }

    #[test]
    fn rejects_oversized_city() {
        let mut c = city();
        c.size = 70_000;
        c.specialists.entertainers = 69_999;
        assert_eq!(validate_city(&c), Err(ValidationError::CityTooLarge(70_000)));
    }

    #[test]
    fn set_assignment_keeps_unavailable_tiles() {
        let mut c = city();
        c.set_assignment(TileSet::from_iter([1, 2]), Specialists::new(1, 0, 0));
        assert_eq!(c.tiles[0].state, TileState::Empty);
        assert_eq!(c.tiles[1].state, TileState::Worker);
        assert_eq!(c.tiles[2].state, TileState::Unavailable);
        assert_eq!(c.workers(), TileSet::from_iter([1]));
        assert_eq!(c.usable_tiles(), TileSet::from_iter([0, 1]));
    }

    #[test]
    fn result_on_unusable_tile_is_rejected() {
        let c = city();
        let mut r = CmResult::from_city(&c);
        r.workers = TileSet::from_iter([2]);
        assert_eq!(validate_result(&c, &r), Err(ValidationError::TileNotUsable(2)));
    }

    #[test]
    fn fitness_orders_major_then_minor() {
        let a = Fitness { major: 5, minor: 0 };
        let b = Fitness { major: 4, minor: 100 };
        let c = Fitness { major: 5, minor: 1 };
        assert!(a > b);
        assert!(c > a);
    }

    #[test]
    fn parameter_default_matches_front_end() {
        let p = Parameter::default();
        assert_eq!(p.factor, StatVec::splat(1));
        assert_eq!(p.minimal_surplus, StatVec::splat(0));
        assert!(p.allow_specialists && !p.allow_disorder && !p.require_happy);
    }

    #[test]
    fn serde_roundtrip_city() {
        let c = city();
        let s = serde_json::to_string(&c).unwrap();
        let back: City = serde_json::from_str(&s).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn display_lists_people() {
        let mut r = CmResult::from_city(&city());
        r.happy = true;
        let text = r.to_string();
        assert!(text.contains("People (W/E/S/T): 1/1/0/0 happy"));
        assert!(text.starts_with("Food"));
    }

    proptest! {
        #[test]
        fn tileset_matches_bits(indices in proptest::collection::btree_set(0usize..MAX_CITY_TILES, 0..20)) {
            let set: TileSet = indices.iter().copied().collect();
            prop_assert_eq!(set.len(), indices.len());
            prop_assert_eq!(set.iter().collect::<Vec<_>>(), indices.iter().copied().collect::<Vec<_>>());
            for i in &indices {
                let mut s = set;
                s.remove(*i);
                prop_assert!(!s.contains(*i));
                prop_assert_eq!(s.len() + 1, set.len());
            }
        }

        #[test]
        fn dominance_is_componentwise(a in (0i32..10, 0i32..10, 0i32..10), b in (0i32..10, 0i32..10, 0i32..10)) {
            let ya = TileYield::new(a.0, a.1, a.2);
            let yb = TileYield::new(b.0, b.1, b.2);
            prop_assert!((ya + yb).dominates(&ya));
            prop_assert_eq!(ya.dominates(&yb) && yb.dominates(&ya), ya == yb);
        }
    }
}
