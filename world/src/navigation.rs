//! Breadth-first reachability used to cache player move destinations.

use std::collections::{BTreeSet, VecDeque};

use skirmish_core::Tile;

/// Collects every tile reachable from `start` within `max_distance` orthogonal steps.
///
/// The search never enters a tile listed in `obstacles` and never leaves the
/// battle grid. The starting tile is always part of the result, so a distance
/// of zero yields exactly `{start}`. Because the search expands in
/// breadth-first order, the first visit to a tile records its shortest step
/// count and later visits are ignored.
#[must_use]
pub fn reachable_tiles(
    start: Tile,
    max_distance: u32,
    obstacles: &BTreeSet<Tile>,
) -> BTreeSet<Tile> {
    let mut reached = BTreeSet::new();
    let _ = reached.insert(start);

    let mut queue = VecDeque::new();
    queue.push_back((start, 0_u32));

    while let Some((tile, depth)) = queue.pop_front() {
        if depth >= max_distance {
            continue;
        }

        let next_depth = depth + 1;
        for neighbor in tile.neighbors() {
            if obstacles.contains(&neighbor) {
                continue;
            }

            if !reached.insert(neighbor) {
                continue;
            }

            queue.push_back((neighbor, next_depth));
        }
    }

    reached
}
