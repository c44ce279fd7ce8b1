/// Continuous physics: velocity integration and collision push-out.
///
/// ## Tick shape
///
///   1. Gravity, input acceleration, idle decay, per-axis speed clamp.
///   2. The tick's displacement is split into `SUBSTEPS` equal
///      sub-steps; collision resolution runs after every sub-step.
///
/// The push-out correction below is only reliable for small
/// penetrations, so large motions must be sub-stepped — a full-speed
/// tick would otherwise tunnel straight through a one-block wall.
///
/// ## Push-out
///
/// The player is an axis-aligned box of half-width `HALF_WIDTH`. For
/// every penetrated solid cell (nearest first) the resolver computes
/// the displacement needed to leave through each of the six faces,
/// treats faces backed by another solid cell as unusable, and applies
/// the smallest usable displacement, zeroing that axis's velocity.

use crate::domain::coord::{coord, Coord};
use crate::domain::entity::{FrameInput, Player};
use crate::domain::tile::Tile;

/// Physics tuning, loadable from config.
#[derive(Clone, Debug)]
pub struct Tuning {
    /// Subtracted from vertical velocity every tick.
    pub gravity: f64,
    /// Acceleration per held movement key; boost applies double.
    pub accel: f64,
    /// Velocity multiplier applied when no key is held.
    pub decay: f64,
    /// Per-axis velocity clamp.
    pub max_speed: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Tuning {
            gravity: 0.1,
            accel: 0.1,
            decay: 0.9,
            max_speed: 4.5,
        }
    }
}

/// Player bounding-box half-width, in blocks.
const HALF_WIDTH: f64 = 0.3;
/// Sub-steps per tick.
const SUBSTEPS: u32 = 10;
/// Scan-and-push cycles per sub-step.
const MAX_PUSHES: u32 = 6;
/// Face push distance when the block beyond that face is itself solid:
/// far enough that the face can never be chosen.
const BLOCKED: f64 = 10.0;

/// Advance the player one tick against the given tile oracle.
pub fn step<F>(player: &mut Player, input: FrameInput, tuning: &Tuning, tile_at: F)
where
    F: Fn(Coord) -> Tile,
{
    player.pvz -= tuning.gravity;

    let a = tuning.accel;
    if input.left {
        player.pvx += a;
    }
    if input.right {
        player.pvx -= a;
    }
    if input.forward {
        player.pvy -= a;
    }
    if input.back {
        player.pvy += a;
    }
    if input.boost {
        player.pvz += 2.0 * a;
    }

    if !input.any() {
        player.pvx *= tuning.decay;
        player.pvy *= tuning.decay;
        player.pvz *= tuning.decay;
    }

    player.pvx = player.pvx.clamp(-tuning.max_speed, tuning.max_speed);
    player.pvy = player.pvy.clamp(-tuning.max_speed, tuning.max_speed);
    player.pvz = player.pvz.clamp(-tuning.max_speed, tuning.max_speed);

    let mini_vx = player.pvx / SUBSTEPS as f64;
    let mini_vy = player.pvy / SUBSTEPS as f64;
    let mini_vz = player.pvz / SUBSTEPS as f64;
    for _ in 0..SUBSTEPS {
        player.px += mini_vx;
        player.py += mini_vy;
        player.pz += mini_vz;
        project_out(player, &tile_at);
    }
}

/// Push the player's box out of any penetrated solid cell.
pub fn project_out<F>(player: &mut Player, tile_at: &F)
where
    F: Fn(Coord) -> Tile,
{
    for _ in 0..MAX_PUSHES {
        let mut pushed = false;

        // Every cell the box overlaps, nearest to the body center first
        // so the most embedded cell is resolved before its neighbors.
        let min_z = (player.pz - HALF_WIDTH).floor() as i32;
        let max_z = (player.pz + HALF_WIDTH).floor() as i32;
        let min_x = (player.px - HALF_WIDTH).floor() as i32;
        let max_x = (player.px + HALF_WIDTH).floor() as i32;
        let min_y = (player.py - HALF_WIDTH).floor() as i32;
        let max_y = (player.py + HALF_WIDTH).floor() as i32;

        let mut candidates: Vec<(f64, Coord)> = Vec::new();
        for iz in min_z..=max_z {
            for ix in min_x..=max_x {
                for iy in min_y..=max_y {
                    let distance = (iz as f64 + 0.5 - player.pz).abs()
                        + (ix as f64 + 0.5 - player.px).abs()
                        + (iy as f64 + 0.5 - player.py).abs();
                    candidates.push((distance, coord(iz, ix, iy)));
                }
            }
        }
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

        for &(_, cell) in &candidates {
            if pushed {
                break;
            }
            if !tile_at(cell).is_solid() {
                continue;
            }

            let solid = |dz: i32, dx: i32, dy: i32| tile_at(cell.offset(dz, dx, dy)).is_solid();

            let z_plus = if solid(1, 0, 0) {
                BLOCKED
            } else {
                cell.z as f64 + 1.0 + HALF_WIDTH - player.pz
            };
            let z_minus = if solid(-1, 0, 0) {
                -BLOCKED
            } else {
                cell.z as f64 - HALF_WIDTH - player.pz
            };
            let x_plus = if solid(0, 1, 0) {
                BLOCKED
            } else {
                cell.x as f64 + 1.0 + HALF_WIDTH - player.px
            };
            let x_minus = if solid(0, -1, 0) {
                -BLOCKED
            } else {
                cell.x as f64 - HALF_WIDTH - player.px
            };
            let y_plus = if solid(0, 0, 1) {
                BLOCKED
            } else {
                cell.y as f64 + 1.0 + HALF_WIDTH - player.py
            };
            let y_minus = if solid(0, 0, -1) {
                -BLOCKED
            } else {
                cell.y as f64 - HALF_WIDTH - player.py
            };

            let z_off = if z_plus < -z_minus { z_plus } else { z_minus };
            let x_off = if x_plus < -x_minus { x_plus } else { x_minus };
            let y_off = if y_plus < -y_minus { y_plus } else { y_minus };

            // Solid on all six sides: no usable face, try the next cell.
            if z_off.abs() > 9.0 && x_off.abs() > 9.0 && y_off.abs() > 9.0 {
                continue;
            }

            // Smallest displacement wins; ties go z, then x, then y.
            if z_off.abs() <= x_off.abs() && z_off.abs() <= y_off.abs() {
                player.pz += z_off;
                player.pvz = 0.0;
                if z_off != 0.0 {
                    pushed = true;
                }
            } else if x_off.abs() <= y_off.abs() {
                player.px += x_off;
                player.pvx = 0.0;
                if x_off != 0.0 {
                    pushed = true;
                }
            } else {
                player.py += y_off;
                player.pvy = 0.0;
                if y_off != 0.0 {
                    pushed = true;
                }
            }
        }

        if !pushed {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Infinite flat floor: everything below z = 0 is solid.
    fn flat_floor(c: Coord) -> Tile {
        if c.z < 0 {
            Tile::Solid
        } else {
            Tile::Empty
        }
    }

    /// A single solid cell at the origin, open space everywhere else.
    fn lone_block(c: Coord) -> Tile {
        if c == coord(0, 0, 0) {
            Tile::Solid
        } else {
            Tile::Empty
        }
    }

    fn resting_player() -> Player {
        let mut p = Player::spawn();
        p.px = 0.5;
        p.py = 0.5;
        p.pz = HALF_WIDTH;
        p.pvx = 0.0;
        p.pvy = 0.0;
        p.pvz = 0.0;
        p.update_discrete();
        p
    }

    #[test]
    fn falling_player_lands_on_the_floor() {
        let mut p = resting_player();
        p.pz = 3.0;
        for _ in 0..60 {
            step(&mut p, FrameInput::default(), &Tuning::default(), flat_floor);
        }
        // Box bottom resting exactly on the floor surface.
        assert!((p.pz - HALF_WIDTH).abs() < 1e-9, "pz = {}", p.pz);
        assert_eq!(p.pvz, 0.0);
    }

    #[test]
    fn velocity_never_exceeds_the_clamp() {
        let mut p = resting_player();
        p.pz = 50.0;
        let held = FrameInput {
            left: true,
            back: true,
            boost: true,
            ..FrameInput::default()
        };
        for _ in 0..100 {
            step(&mut p, held, &Tuning::default(), |_| Tile::Empty);
            assert!(p.pvx.abs() <= 4.5);
            assert!(p.pvy.abs() <= 4.5);
            assert!(p.pvz.abs() <= 4.5);
        }
    }

    #[test]
    fn idle_velocity_decays() {
        let mut p = resting_player();
        p.pz = 50.0;
        p.pvx = 1.0;
        step(&mut p, FrameInput::default(), &Tuning::default(), |_| Tile::Empty);
        assert!((p.pvx - 0.9).abs() < 1e-9);
    }

    #[test]
    fn shallow_penetration_resolves_along_the_smallest_axis() {
        let mut p = resting_player();
        // Slightly inside the +z face of the lone block.
        p.px = 0.5;
        p.py = 0.5;
        p.pz = 1.2;
        project_out(&mut p, &lone_block);
        assert!((p.pz - 1.3).abs() < 1e-9, "pz = {}", p.pz);
        assert_eq!(p.pvz, 0.0);
    }

    #[test]
    fn sideways_penetration_resolves_sideways() {
        let mut p = resting_player();
        // Overlapping the -x face of the lone block, well above its top.
        p.px = -0.2;
        p.py = 0.5;
        p.pz = 0.5;
        project_out(&mut p, &lone_block);
        assert!((p.px - (-0.3)).abs() < 1e-9, "px = {}", p.px);
        assert_eq!(p.pvx, 0.0);
    }

    #[test]
    fn fully_enclosed_player_is_left_in_place() {
        let mut p = resting_player();
        p.px = 0.5;
        p.py = 0.5;
        p.pz = 0.5;
        let before = (p.px, p.py, p.pz);
        project_out(&mut p, &|_| Tile::Solid);
        assert_eq!((p.px, p.py, p.pz), before);
    }

    #[test]
    fn invisible_blocks_are_solid_for_collision() {
        let mut p = resting_player();
        p.pz = 1.2;
        project_out(&mut p, &|c: Coord| {
            if c == coord(0, 0, 0) {
                Tile::InvisibleBlock
            } else {
                Tile::Empty
            }
        });
        assert!((p.pz - 1.3).abs() < 1e-9);
    }

    #[test]
    fn random_walk_never_ends_a_tick_inside_the_floor() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut p = resting_player();
        p.pz = 2.0;
        for _ in 0..400 {
            let input = FrameInput {
                left: rng.gen_bool(0.3),
                right: rng.gen_bool(0.3),
                forward: rng.gen_bool(0.3),
                back: rng.gen_bool(0.3),
                boost: rng.gen_bool(0.2),
            };
            step(&mut p, input, &Tuning::default(), flat_floor);
            // The box bottom may touch the floor but never sink into it.
            assert!(
                p.pz - HALF_WIDTH >= -1e-6,
                "player sank to pz = {}",
                p.pz
            );
        }
    }
}
