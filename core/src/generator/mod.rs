use crate::*;
pub use random::*;

mod random;

pub trait MinefieldGenerator {
    fn generate(self, config: GameConfig) -> Minefield;
}

/// How much of the board around the first click is kept free of mines.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SafeZone {
    /// Only the clicked cell.
    Cell,
    /// The clicked cell and its 8-connected neighbors, clipped to the board.
    Neighborhood,
}

impl SafeZone {
    /// Cells covered by this zone around `center`.
    pub fn cells(self, center: Coord2, size: Coord2) -> impl Iterator<Item = Coord2> {
        let neighbors = match self {
            Self::Cell => None,
            Self::Neighborhood => Some(NeighborIter::new(center, size)),
        };
        core::iter::once(center).chain(neighbors.into_iter().flatten())
    }

    pub fn contains(self, center: Coord2, coords: Coord2) -> bool {
        match self {
            Self::Cell => center == coords,
            Self::Neighborhood => is_adjacent(center, coords),
        }
    }

    /// Widest zone around `center` that still leaves room for every mine.
    pub fn feasible(config: GameConfig, center: Coord2) -> Self {
        let zone_len = Self::Neighborhood.cells(center, config.size).count() as CellCount;
        if config.mines <= config.total_cells().saturating_sub(zone_len) {
            Self::Neighborhood
        } else {
            Self::Cell
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighborhood_is_clipped_at_corner() {
        let cells: Vec<_> = SafeZone::Neighborhood.cells((0, 0), (4, 4)).collect();
        assert_eq!(cells, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn feasible_zone_shrinks_when_board_is_crowded() {
        let roomy = GameConfig::new((3, 3), 1).unwrap();
        assert_eq!(SafeZone::feasible(roomy, (0, 0)), SafeZone::Neighborhood);

        let crowded = GameConfig::new((3, 3), 5).unwrap();
        assert_eq!(SafeZone::feasible(crowded, (1, 1)), SafeZone::Cell);
        assert_eq!(SafeZone::feasible(crowded, (0, 0)), SafeZone::Neighborhood);
    }
}
