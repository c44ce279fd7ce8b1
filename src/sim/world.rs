/// Session: the complete state of one running level.
///
/// Everything the renderer and physics need — world offset, draw list,
/// force-redraw flag, the level clock — lives here with a single owner.
/// A session is created at level load, mutated only by `sim::step`, and
/// replaced wholesale on a level switch; switches therefore only ever
/// take effect at a tick boundary.

use std::time::Instant;

use crate::domain::coord::{coord, Coord};
use crate::domain::entity::{Camera, Player};
use crate::domain::physics::Tuning;
use crate::domain::tile::Tile;
use crate::sim::level::{self, LevelId};
use crate::sim::visibility;

/// Local-window cell the camera is pinned to while roaming. The
/// compositor centers this cell in the viewport; the world offset
/// recenters the window on the camera every tick.
pub const CAMERA_ANCHOR: Coord = coord(6, 35, 30);

/// Fixed window translation for self-animating levels, where the
/// camera never moves and the scene sits around the world origin.
pub const STATIC_ANCHOR: Coord = coord(10, 45, 45);

pub struct Session {
    pub level: LevelId,
    pub player: Player,
    pub camera: Camera,

    /// Translation from world coordinates to the local render window,
    /// recomputed each tick from the camera block.
    pub offset: Coord,

    /// Visible component around the level seed, in draw order.
    /// Immutable for the life of the session; the player's block is
    /// merged in at render time, never inserted.
    pub draw_list: Vec<Coord>,

    pub tuning: Tuning,

    /// One-shot external redraw request, consumed by the next tick.
    pub force_redraw: bool,

    started: Instant,
}

impl Session {
    pub fn new(level: LevelId, tuning: Tuning) -> Self {
        let player = Player::spawn();
        let camera = Camera::at(&player);

        let player_block = player.block;
        let draw_list = visibility::sorted_component(level.visibility_seed(), |c| {
            overlay(player_block, level, c, 0.0)
        });

        let offset = if level.is_time_driven() {
            STATIC_ANCHOR
        } else {
            anchor_offset(camera.block)
        };

        Session {
            level,
            player,
            camera,
            offset,
            draw_list,
            tuning,
            force_redraw: true,
            started: Instant::now(),
        }
    }

    /// The level clock: milliseconds since the session started.
    pub fn clock_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    /// World tile with the player overlaid on their own block.
    pub fn world_tile(&self, c: Coord, t_ms: f64) -> Tile {
        overlay(self.player.block, self.level, c, t_ms)
    }
}

/// Offset that pins `camera_block` to the camera anchor cell.
pub fn anchor_offset(camera_block: Coord) -> Coord {
    coord(
        CAMERA_ANCHOR.z - camera_block.z,
        CAMERA_ANCHOR.x - camera_block.x,
        CAMERA_ANCHOR.y - camera_block.y,
    )
}

fn overlay(player_block: Coord, level: LevelId, c: Coord, t_ms: f64) -> Tile {
    if c == player_block {
        return Tile::Player;
    }
    level::tile_at(level, c, t_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_starts_with_an_immutable_draw_list() {
        let s = Session::new(LevelId::Intro, Tuning::default());
        assert!(!s.draw_list.is_empty());
        // The player's block is overlaid on queries, not in the list.
        assert_eq!(s.world_tile(s.player.block, 0.0), Tile::Player);
    }

    #[test]
    fn draw_list_is_bounded_even_on_unbounded_levels() {
        let s = Session::new(LevelId::Wetlands, Tuning::default());
        assert!(s.draw_list.len() <= visibility::EXPANSION_BUDGET * 26);
    }

    #[test]
    fn time_driven_sessions_use_the_static_anchor() {
        let s = Session::new(LevelId::SpinningSectors, Tuning::default());
        assert_eq!(s.offset, STATIC_ANCHOR);
    }

    #[test]
    fn roaming_sessions_pin_the_camera_to_its_anchor() {
        let s = Session::new(LevelId::Intro, Tuning::default());
        assert_eq!(
            s.camera.block.translate(s.offset),
            CAMERA_ANCHOR
        );
    }
}
