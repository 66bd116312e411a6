use hashbrown::HashSet;
use ndarray::Array2;
use smallvec::SmallVec;
use std::collections::VecDeque;

use crate::*;

/// Neighbor list sized for the 8-connected neighborhood.
pub type Neighbors = SmallVec<[Coord2; 8]>;

/// Reveals `origin` and, through zero-valued cells, the whole connected zero region plus its numbered border.
///
/// Flagged and already revealed cells are never entered. Returns the number of newly revealed cells, or `None` when
/// `origin` holds a mine: detonation is the caller's decision and nothing is revealed in that case.
pub fn flood_reveal(
    minefield: &Minefield,
    revealed: &mut Array2<bool>,
    flagged: &Array2<bool>,
    origin: Coord2,
) -> Option<CellCount> {
    if minefield.contains_mine(origin) {
        return None;
    }

    let mut opened: CellCount = 0;
    let mut visited = HashSet::new();
    let mut to_visit = VecDeque::from([origin]);

    while let Some(coords) = to_visit.pop_front() {
        if !visited.insert(coords) {
            continue;
        }

        let index = coords.to_nd_index();
        if !revealed.contains_coords(coords) || revealed[index] || flagged[index] {
            log::trace!("Skipping cell at {:?}", coords);
            continue;
        }

        // zero cells have no mine neighbors, so the worklist never reaches a mine
        let CellValue::Clear(count) = minefield[coords] else {
            continue;
        };

        revealed[index] = true;
        opened += 1;
        log::trace!("Flood opened cell at {:?}, mine count: {}", coords, count);

        if count == 0 {
            to_visit.extend(
                minefield
                    .iter_neighbors(coords)
                    .filter(|&pos| !revealed[pos.to_nd_index()] && !flagged[pos.to_nd_index()])
                    .filter(|pos| !visited.contains(pos)),
            );
        }
    }

    log::debug!("Opened {} cells from {:?}", opened, origin);
    Some(opened)
}

/// What a chord on a cell would do.
#[derive(Clone, Debug, PartialEq)]
pub enum ChordPlan {
    /// Not a revealed number, or the flag count around it does not match.
    Unsatisfied,
    /// Every listed neighbor is safe and gets revealed.
    Reveal(Neighbors),
    /// The first unflagged mine among the neighbors; nothing else is revealed.
    Detonate(Coord2),
}

pub fn count_flagged_neighbors(flagged: &Array2<bool>, coords: Coord2) -> u8 {
    flagged
        .iter_neighbors(coords)
        .filter(|&pos| flagged[pos.to_nd_index()])
        .count() as u8
}

/// Unflagged, unrevealed neighbors of `coords` when it is a revealed number whose flag count matches its value.
pub fn chord_targets(
    minefield: &Minefield,
    revealed: &Array2<bool>,
    flagged: &Array2<bool>,
    coords: Coord2,
) -> Option<Neighbors> {
    if !revealed[coords.to_nd_index()] {
        return None;
    }

    match minefield[coords] {
        CellValue::Clear(count)
            if count > 0 && count == count_flagged_neighbors(flagged, coords) =>
        {
            Some(
                minefield
                    .iter_neighbors(coords)
                    .filter(|&pos| !revealed[pos.to_nd_index()] && !flagged[pos.to_nd_index()])
                    .collect(),
            )
        }
        _ => None,
    }
}

pub fn plan_chord(
    minefield: &Minefield,
    revealed: &Array2<bool>,
    flagged: &Array2<bool>,
    coords: Coord2,
) -> ChordPlan {
    let Some(targets) = chord_targets(minefield, revealed, flagged, coords) else {
        return ChordPlan::Unsatisfied;
    };

    match targets.iter().copied().find(|&pos| minefield.contains_mine(pos)) {
        Some(mine) => ChordPlan::Detonate(mine),
        None => ChordPlan::Reveal(targets),
    }
}
