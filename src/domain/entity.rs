/// Continuous actors: the player body and the camera that trails it.
///
/// Both carry a float position, a derived block coordinate, and the
/// pair of sub-block correction values the compositor uses to slide
/// glyphs between block boundaries.

use crate::domain::coord::{self, Coord};

/// One tick's worth of input, read once at the start of the physics
/// update. Held keys, not edges: movement accelerates for as long as
/// the key stays down.
#[derive(Clone, Copy, Default, Debug)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub forward: bool,
    pub back: bool,
    pub boost: bool,
}

impl FrameInput {
    /// Any movement key held? Velocity decay applies only when idle.
    pub fn any(self) -> bool {
        self.left || self.right || self.forward || self.back || self.boost
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    // Float position and velocity, world units.
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    pub pvx: f64,
    pub pvy: f64,
    pub pvz: f64,

    /// Block coordinate, refreshed once per tick after integration.
    pub block: Coord,
    /// Sub-block column shift of the rendered glyph.
    pub horizontal_correction: i32,
    /// Sub-block row shift of the rendered glyph.
    pub vertical_correction: i32,
}

impl Player {
    /// Fresh player at the spawn point, drifting gently so the first
    /// few frames already animate.
    pub fn spawn() -> Self {
        let mut p = Player {
            px: 0.0,
            py: 0.0,
            pz: 10.0,
            pvx: 0.02,
            pvy: 0.02,
            pvz: 0.0,
            block: Coord::from_floats(0.0, 0.0, 0.0),
            horizontal_correction: 0,
            vertical_correction: 0,
        };
        p.update_discrete();
        p
    }

    /// Recompute the block coordinate and both corrections from the
    /// float position.
    pub fn update_discrete(&mut self) {
        self.block = Coord::from_floats(self.px, self.py, self.pz);
        self.vertical_correction = coord::vertical_correction(self.px, self.py, self.pz);
        self.horizontal_correction = coord::horizontal_correction(self.px, self.py, self.pz);
    }
}

/// Camera position trails the player inside an elastic window: it only
/// moves when the player pushes against one of the window bounds, which
/// keeps small movements from scrolling the whole scene.
#[derive(Clone, Debug)]
pub struct Camera {
    pub cx: f64,
    pub cy: f64,
    pub cz: f64,

    pub block: Coord,
    pub horizontal_correction: i32,
    pub vertical_correction: i32,
}

/// How far the camera may lag the player. The bounds are integers so
/// that a dragged camera keeps the same fractional part as the player,
/// which keeps the camera corrections aligned with the player's.
const LAG_UP: f64 = 3.0;
const LAG_DOWN: f64 = 5.0;
const LAG_HORIZONTAL: f64 = 3.0;

impl Camera {
    /// Camera starting directly on the player.
    pub fn at(player: &Player) -> Self {
        let mut cam = Camera {
            cx: player.px,
            cy: player.py,
            cz: player.pz,
            block: player.block,
            horizontal_correction: 0,
            vertical_correction: 0,
        };
        cam.update_discrete();
        cam
    }

    /// Clamp the camera into the elastic window around the player and
    /// refresh its discrete coordinate.
    pub fn follow(&mut self, player: &Player) {
        if self.cz - player.pz > LAG_UP {
            self.cz = player.pz + LAG_UP;
        } else if self.cz - player.pz < -LAG_DOWN {
            self.cz = player.pz - LAG_DOWN;
        }
        if self.cx - player.px > LAG_HORIZONTAL {
            self.cx = player.px + LAG_HORIZONTAL;
        } else if self.cx - player.px < -LAG_HORIZONTAL {
            self.cx = player.px - LAG_HORIZONTAL;
        }
        if self.cy - player.py > LAG_HORIZONTAL {
            self.cy = player.py + LAG_HORIZONTAL;
        } else if self.cy - player.py < -LAG_HORIZONTAL {
            self.cy = player.py - LAG_HORIZONTAL;
        }

        self.update_discrete();
    }

    fn update_discrete(&mut self) {
        self.block = Coord::from_floats(self.cx, self.cy, self.cz);
        self.vertical_correction = coord::vertical_correction(self.cx, self.cy, self.cz);
        self.horizontal_correction = coord::horizontal_correction(self.cx, self.cy, self.cz);
    }
}
