use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::*;

/// Uniformly random placement that keeps a zone around the first click free of mines.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMinefieldGenerator {
    seed: u64,
    start: Coord2,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64, start: Coord2) -> Self {
        Self { seed, start }
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(self, config: GameConfig) -> Minefield {
        let zone = SafeZone::feasible(config, self.start);
        if zone != SafeZone::Neighborhood {
            log::warn!(
                "Cannot keep the neighborhood of {:?} clear with {} mines, only the cell itself stays safe",
                self.start,
                config.mines
            );
        }

        let candidates: Vec<Coord2> = iter_coords(config.size)
            .filter(|&coords| !zone.contains(self.start, coords))
            .collect();
        let wanted = usize::from(config.mines);
        if wanted > candidates.len() {
            log::warn!(
                "Minefield too crowded, requested {} mines but only {} cells are eligible",
                wanted,
                candidates.len()
            );
        }

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut mine_mask: Array2<bool> = Array2::default(config.size.to_nd_index());
        let amount = wanted.min(candidates.len());
        for index in rand::seq::index::sample(&mut rng, candidates.len(), amount) {
            mine_mask[candidates[index].to_nd_index()] = true;
        }

        let minefield = Minefield::from_mine_mask(&mine_mask);
        if minefield.mine_count() != config.mines {
            log::warn!(
                "Generated minefield count mismatch, actual: {}, requested: {}",
                minefield.mine_count(),
                config.mines
            );
        }
        log::debug!(
            "generated {}x{} minefield with {} mines, first click at {:?}",
            config.rows(),
            config.cols(),
            minefield.mine_count(),
            self.start
        );
        minefield
    }
}
