/// Visibility solver: which blocks are worth testing each frame.
///
/// A bounded breadth-first flood fill from the level seed over the
/// 26-connected neighborhood. Expansion only continues through visible
/// tiles, so empty space is never entered and invisible blocks form a
/// hard boundary: they count as occupancy but are never enqueued.
///
/// The result is the draw list — computed once per level load, sorted
/// into painter's order, and immutable for the life of the session.

use std::collections::HashSet;

use crate::domain::coord::{draw_order, Coord};
use crate::domain::tile::Tile;

/// Safety valve for unbounded worlds: stop expanding after this many
/// processed queue entries. Hitting the budget truncates the result;
/// it is not an error.
pub const EXPANSION_BUDGET: usize = 10_000;

/// Flood-fill the visible connected component around `seed` and return
/// it in draw order. The seed itself is always part of the result; the
/// compositor re-checks every tile each frame anyway.
pub fn sorted_component<F>(seed: Coord, tile_at: F) -> Vec<Coord>
where
    F: Fn(Coord) -> Tile,
{
    let mut coordinates = vec![seed];
    let mut found: HashSet<Coord> = HashSet::new();
    found.insert(seed);

    let mut queue_index = 0;
    while queue_index < coordinates.len() && queue_index < EXPANSION_BUDGET {
        let c = coordinates[queue_index];
        queue_index += 1;

        for dz in -1..=1 {
            for dx in -1..=1 {
                for dy in -1..=1 {
                    let n = c.offset(dz, dx, dy);
                    if tile_at(n).is_visible() && found.insert(n) {
                        coordinates.push(n);
                    }
                }
            }
        }
    }

    coordinates.sort_by(|a, b| draw_order(*a, *b));
    coordinates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::coord::coord;

    /// A 3×3×1 solid plate at z = 0, |x| ≤ 1, |y| ≤ 1.
    fn plate(c: Coord) -> Tile {
        if c.z == 0 && c.x.abs() <= 1 && c.y.abs() <= 1 {
            Tile::Solid
        } else {
            Tile::Empty
        }
    }

    #[test]
    fn fill_finds_the_whole_component_in_draw_order() {
        let list = sorted_component(coord(0, 0, 0), plate);
        assert_eq!(list.len(), 9);
        for pair in list.windows(2) {
            assert_eq!(draw_order(pair[0], pair[1]), std::cmp::Ordering::Less);
        }
    }

    #[test]
    fn fill_is_idempotent_and_duplicate_free() {
        let a = sorted_component(coord(0, 0, 0), plate);
        let b = sorted_component(coord(0, 0, 0), plate);
        assert_eq!(a, b);
        let unique: HashSet<Coord> = a.iter().copied().collect();
        assert_eq!(unique.len(), a.len());
    }

    #[test]
    fn fill_does_not_jump_gaps() {
        // Two plates two blocks apart: only the seeded one is found.
        let split = |c: Coord| {
            if c.z == 0 && (c.x.abs() <= 1 || c.x.abs() >= 3) && c.y.abs() <= 1 {
                Tile::Solid
            } else {
                Tile::Empty
            }
        };
        let list = sorted_component(coord(0, 0, 0), split);
        assert!(list.iter().all(|c| c.x.abs() <= 1));
    }

    #[test]
    fn invisible_blocks_bound_the_fill() {
        // A solid run walled off by an invisible fence at x = 2.
        let fenced = |c: Coord| {
            if c.z != 0 || c.y != 0 {
                Tile::Empty
            } else if c.x == 2 {
                Tile::InvisibleBlock
            } else {
                Tile::Solid
            }
        };
        let list = sorted_component(coord(0, 0, 0), fenced);
        // Nothing past the fence, and the fence itself is not listed.
        assert!(list.iter().all(|c| c.x < 2));
        // But the run up to it is complete.
        assert!(list.contains(&coord(0, 1, 0)));
    }

    #[test]
    fn empty_seed_yields_just_the_seed() {
        let list = sorted_component(coord(5, 5, 5), |_| Tile::Empty);
        assert_eq!(list, vec![coord(5, 5, 5)]);
    }

    #[test]
    fn budget_truncates_unbounded_worlds() {
        // An infinite solid plane: the fill must terminate on its own.
        let list = sorted_component(coord(0, 0, 0), |c: Coord| {
            if c.z == 0 {
                Tile::Solid
            } else {
                Tile::Empty
            }
        });
        // Every processed entry can enqueue at most 8 in-plane
        // neighbors, so the result is bounded by the budget's frontier.
        assert!(list.len() <= EXPANSION_BUDGET * 8);
        assert!(list.len() >= EXPANSION_BUDGET);
    }
}
