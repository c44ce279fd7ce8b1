/// Per-tick orchestration.
///
/// Order within a tick:
///   1. Physics integration + collision (skipped on self-animating
///      levels, which pin the player and window instead)
///   2. Discrete coordinate + correction refresh, camera clamp
///   3. World offset recomputation from the camera block
///   4. Redraw decision
///
/// The host loop owns scheduling; this module never sleeps or blocks.

use crate::domain::coord::coord;
use crate::domain::entity::FrameInput;
use crate::domain::physics;
use crate::domain::tile::Tile;
use crate::sim::level;
use crate::sim::world::{anchor_offset, Session, STATIC_ANCHOR};

/// Advance the session one tick. Returns true when the scene changed
/// and must be recomposed.
pub fn tick(session: &mut Session, input: FrameInput) -> bool {
    let old_block = session.player.block;
    let old_offset = session.offset;
    let old_player_corr = (
        session.player.horizontal_correction,
        session.player.vertical_correction,
    );
    let old_camera_corr = (
        session.camera.horizontal_correction,
        session.camera.vertical_correction,
    );

    if session.level.is_time_driven() {
        session.player.block = coord(0, 0, 0);
        session.offset = STATIC_ANCHOR;
    } else {
        let t_ms = session.clock_ms();
        let level_id = session.level;
        // The collision oracle sees the same world the renderer does:
        // the generator with the player's (stale) block overlaid.
        let player_block = session.player.block;
        physics::step(&mut session.player, input, &session.tuning, |c| {
            if c == player_block {
                Tile::Player
            } else {
                level::tile_at(level_id, c, t_ms)
            }
        });

        session.player.update_discrete();
        session.camera.follow(&session.player);
        session.offset = anchor_offset(session.camera.block);
    }

    let redraw = session.player.block != old_block
        || session.offset != old_offset
        || (
            session.player.horizontal_correction,
            session.player.vertical_correction,
        ) != old_player_corr
        || (
            session.camera.horizontal_correction,
            session.camera.vertical_correction,
        ) != old_camera_corr
        || session.level.is_time_driven()
        || session.force_redraw;

    session.force_redraw = false;
    redraw
}
