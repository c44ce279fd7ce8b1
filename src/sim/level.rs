/// The closed set of worlds and their tile oracles.
///
/// Every level is a pure function from block coordinate to tile kind;
/// nothing is stored — tiles are derived on every query, which is what
/// lets worlds be unbounded. SpinningSectors additionally reads the
/// level clock and animates on its own.
///
/// Oracle contract: `tile_at` must be pure in its arguments. It is
/// called once per draw-list candidate per frame and many times per
/// physics tick, never cached.

use crate::domain::coord::{coord, Coord};
use crate::domain::tile::Tile;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LevelId {
    Wetlands,
    SpinningSectors,
    Rectangles,
    CubeFrame,
    Intro,
    Funsies,
}

impl LevelId {
    pub const ALL: [LevelId; 6] = [
        LevelId::Wetlands,
        LevelId::SpinningSectors,
        LevelId::Rectangles,
        LevelId::CubeFrame,
        LevelId::Intro,
        LevelId::Funsies,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LevelId::Wetlands => "Wetlands",
            LevelId::SpinningSectors => "Spinning Sectors",
            LevelId::Rectangles => "Rectangles",
            LevelId::CubeFrame => "Cube Frame",
            LevelId::Intro => "Intro",
            LevelId::Funsies => "Funsies",
        }
    }

    /// Lowercase identifier used in config files.
    pub fn slug(self) -> &'static str {
        match self {
            LevelId::Wetlands => "wetlands",
            LevelId::SpinningSectors => "spinning-sectors",
            LevelId::Rectangles => "rectangles",
            LevelId::CubeFrame => "cube-frame",
            LevelId::Intro => "intro",
            LevelId::Funsies => "funsies",
        }
    }

    pub fn from_slug(s: &str) -> Option<LevelId> {
        LevelId::ALL.iter().copied().find(|l| l.slug() == s)
    }

    /// Next level in the cycle, wrapping at the end.
    pub fn next(self) -> LevelId {
        let i = LevelId::ALL.iter().position(|&l| l == self).unwrap_or(0);
        LevelId::ALL[(i + 1) % LevelId::ALL.len()]
    }

    /// Does this level animate on its own, independent of the player?
    /// Such levels skip physics and are redrawn every frame.
    pub fn is_time_driven(self) -> bool {
        matches!(self, LevelId::SpinningSectors)
    }

    /// Seed for the visibility fill: a block on (or next to) solid
    /// geometry near the spawn point, so the fill can reach the rest
    /// of the level.
    pub fn visibility_seed(self) -> Coord {
        match self {
            LevelId::Rectangles | LevelId::CubeFrame => coord(0, 0, 0),
            // Inside the sector beam at clock zero.
            LevelId::SpinningSectors => coord(0, 5, 0),
            _ => coord(2, 0, 0),
        }
    }
}

/// Tile oracle. `t_ms` is the level clock in milliseconds; only
/// time-driven levels read it.
pub fn tile_at(level: LevelId, c: Coord, t_ms: f64) -> Tile {
    match level {
        LevelId::Wetlands => wetlands(c),
        LevelId::SpinningSectors => spinning_sectors(c, t_ms),
        LevelId::Rectangles => rectangles(c),
        LevelId::CubeFrame => cube_frame(c),
        LevelId::Intro => intro(c),
        // Placeholder world: open void.
        LevelId::Funsies => Tile::Empty,
    }
}

/// Message lines shown beside bright street lights. Empty for levels
/// without signage; clipping is the compositor's concern.
pub fn message_lines(level: LevelId, c: Coord) -> &'static [&'static str] {
    match level {
        LevelId::Intro if c.x < 40 => &["Welcome!", "WASD to move,", "J to jetpack."],
        LevelId::Intro => &["Congratulations,", "you made it!"],
        _ => &[],
    }
}

// ── Wetlands ──

/// Street-light grid spacing.
const STREET_SPACING: i32 = 90;

/// Rolling terrain above a water plane, a street grid at ground level,
/// hanging spike fields and a beam lattice high above.
fn wetlands(c: Coord) -> Tile {
    let Coord { z, x, y } = c;
    let mut out = Tile::Empty;

    if z == 0 {
        out = Tile::Solid;
    } else {
        let water_level = 3.0;
        let (xf, yf) = (x as f64, y as f64);
        let surface = (xf * 0.05 + yf * 0.1).sin()
            + (xf * 0.05 + yf * 0.08).sin()
            + (xf * 0.1).sin()
            + (yf * 0.1).sin()
            + water_level;
        if (z as f64) <= surface && surface > water_level {
            out = Tile::Solid;
        } else if z as f64 == water_level && x % 4 == 0 && y % 4 == 0 {
            out = Tile::Wave;
        }
    }

    // Street grid: raised causeways every hundred blocks, but only in
    // districts the hash-ish trig test switches on.
    if z <= 4 && ((x / 5) % 20 == 0 || (y / 5) % 20 == 0) {
        let gx = (x / 100) as f64;
        let gy = (y / 100) as f64;
        if (gx * gx).sin() + (gy * gy).cos() > 0.0 {
            out = Tile::Solid;
        }
    }

    if x % STREET_SPACING == 0 && y % STREET_SPACING == 0 && z.abs() < 10 {
        out = Tile::StreetLight;
    }

    // Spike field: cones growing downward from high altitude.
    if z > 60 {
        let spikes = ((x.abs() % 20) - 10).abs()
            + ((y.abs() % 20) - 10).abs()
            + ((z % 20) - 10).abs();
        if (spikes as f64) < (z - 60) as f64 / 20.0 {
            out = Tile::Solid;
        }
    }

    // Beam lattice: cells where at least two axes sit on the grid.
    if z > 90 {
        let on_x = (x - 10) % 20 == 0;
        let on_y = (y - 10) % 20 == 0;
        let on_z = (z - 10) % 20 == 0;
        if on_x as i32 + on_y as i32 + on_z as i32 > 1 {
            out = Tile::Solid;
        }
    }

    out
}

// ── Spinning Sectors ──

/// A hollow shell sector sweeping around the origin once every
/// π seconds. The only level whose tiles depend on the clock.
fn spinning_sectors(c: Coord, t_ms: f64) -> Tile {
    let Coord { z, x, y } = c;
    let r2 = x * x + y * y + z * z;
    let mut out = Tile::Empty;

    if r2 < 64 && r2 > 16 {
        let (xf, yf) = (x as f64, y as f64);
        let len = (xf * xf + yf * yf).sqrt();
        let dot = xf * (t_ms / 500.0).cos() + yf * (t_ms / 500.0).sin();
        // The vertical axis has no radial direction; count it as
        // unaligned rather than dividing by zero.
        let alignment = if len > 0.0 { dot / len } else { 0.0 };

        let height = if alignment.abs() > 0.9 { 1 } else { 0 };
        if z <= height && z >= 0 {
            out = Tile::Solid;
            if alignment.abs() < 0.4 {
                out = Tile::Empty;
            }
        }
    }

    if z == 0 && x == 0 && y == 0 {
        out = Tile::Player;
    }
    out
}

// ── Rectangles ──

/// A solid ground plane with a one-block-high grid of wall strips.
fn rectangles(c: Coord) -> Tile {
    if c.z == 0 {
        return Tile::Solid;
    }
    if c.z == 1 {
        let (ax, ay) = (c.x.abs(), c.y.abs());
        if (ax >= ay && ax % 5 == 4) || (ay >= ax && ay % 10 == 5) {
            return Tile::Solid;
        }
    }
    Tile::Empty
}

// ── Cube Frame ──

/// An infinite tiling of hollow cube frames floating over a ground
/// plane. The frame repeats every `FRAME_PERIOD` blocks in x and y.
const FRAME_PERIOD: i32 = 26;

fn cube_frame(c: Coord) -> Tile {
    if c.z == 0 {
        return Tile::Solid;
    }
    let x = (c.x + 13).rem_euclid(FRAME_PERIOD) - 13;
    let y = (c.y + 13).rem_euclid(FRAME_PERIOD) - 13;

    let on_x = x.abs() == 5;
    let on_y = y.abs() == 5;
    let on_z = (c.z - 6).abs() == 5;
    let in_x = x.abs() <= 5;
    let in_y = y.abs() <= 5;
    let in_z = (c.z - 6).abs() <= 5;

    if on_x && on_z && in_y || on_x && in_z && on_y || in_x && on_z && on_y {
        Tile::Solid
    } else {
        Tile::Empty
    }
}

// ── Intro ──

/// The guided tour: a walled chamber, two bridges, a drop, a turn, and
/// a goal platform, fenced in everywhere by invisible blocks.
fn intro(c: Coord) -> Tile {
    let Coord { z, x, y } = c;

    if x <= 3 {
        // Starting chamber.
        if x.abs() >= 4 || y.abs() >= 4 || z < 0 {
            return Tile::InvisibleBlock;
        }
        if (3..=9).contains(&z) && x == 0 && y == 0 {
            return Tile::StreetLight;
        }
        if z <= 2 {
            return Tile::Solid;
        }
        return Tile::Empty;
    }
    if x <= 20 {
        // First bridge.
        if y.abs() > 1 {
            return Tile::InvisibleBlock;
        }
        if z == 2 {
            return Tile::Solid;
        }
        if z < 2 {
            return Tile::InvisibleBlock;
        }
        return Tile::Empty;
    }
    if x <= 21 {
        // Vertical drop.
        if y.abs() > 1 {
            return Tile::InvisibleBlock;
        }
        if (-3..=2).contains(&z) {
            return Tile::Solid;
        }
        return Tile::Empty;
    }
    if x <= 35 {
        // Second bridge, three levels down.
        if y.abs() > 1 {
            return Tile::InvisibleBlock;
        }
        if z == -3 {
            return Tile::Solid;
        }
        return Tile::Empty;
    }
    if x <= 40 {
        // Turn onto the +y leg.
        if y < -1 || y > 20 {
            return Tile::InvisibleBlock;
        }
        if z == -3 {
            return Tile::Solid;
        }
        return Tile::Empty;
    }
    if y < 28 {
        if x < 80 {
            if y <= 20 {
                if y < 17 {
                    return Tile::InvisibleBlock;
                }
                if z == -3 {
                    return Tile::Solid;
                }
                if x > 75 && (-12..=-3).contains(&z) && y == 20 {
                    return Tile::Solid;
                }
                if z < -3 {
                    return Tile::InvisibleBlock;
                }
                return Tile::Empty;
            }
            if x <= 75 {
                return Tile::InvisibleBlock;
            }
            if z == -12 {
                return Tile::Solid;
            }
            return Tile::Empty;
        }
        return Tile::InvisibleBlock;
    }
    if y < 34 {
        // Goal platform with its own light.
        if x == 78 && y == 31 && (-11..=-5).contains(&z) {
            return Tile::StreetLight;
        }
        if !(75..=81).contains(&x) {
            return Tile::InvisibleBlock;
        }
        if (-15..=-12).contains(&z) {
            return Tile::Solid;
        }
        return Tile::Empty;
    }
    Tile::InvisibleBlock
}
