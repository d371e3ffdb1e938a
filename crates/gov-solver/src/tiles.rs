use gov_core::{City, TileSet, TileYield};
use gov_econ::Economy;

/// Per-tile output of one city, read once when the combination store is
/// built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileYieldTable {
    center: TileYield,
    tiles: Vec<TileYield>,
    usable: TileSet,
}

impl TileYieldTable {
    pub fn snapshot<E: Economy>(economy: &E, city: &City) -> Self {
        Self {
            center: economy.center_output(city),
            tiles: (0..city.tiles.len())
                .map(|i| economy.tile_output(city, i))
                .collect(),
            usable: city.usable_tiles(),
        }
    }

    pub fn center(&self) -> TileYield {
        self.center
    }

    /// Output of tile `index`; zero for indices outside the city.
    pub fn get(&self, index: usize) -> TileYield {
        self.tiles.get(index).copied().unwrap_or_default()
    }

    pub fn usable(&self) -> TileSet {
        self.usable
    }

    pub fn usable_count(&self) -> usize {
        self.usable.len()
    }

    /// Trade of the center plus every usable tile.
    pub fn usable_trade(&self) -> i32 {
        self.center.trade + self.usable.iter().map(|i| self.get(i).trade).sum::<i32>()
    }
}
