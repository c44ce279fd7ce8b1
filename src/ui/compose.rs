/// Glyph compositor: turns the draw list into printable characters.
///
/// Blocks are projected obliquely onto the character grid:
///
///   screen_x = basepoint_x − 3·x + 2·y
///   screen_y = basepoint_y − 2·z + y
///
/// so +x recedes up-left, +y recedes up-right, +z is straight up. The
/// draw list arrives in painter's order; stamping front-to-back makes
/// later blocks overdraw earlier ones, so no depth buffer is needed.
/// The player's block is interleaved into the order on the fly.
///
/// Every write clips at the buffer edge — a glyph sticking out of the
/// viewport is a normal condition, never an error.

use crate::domain::coord::Coord;
use crate::domain::coord::draw_order;
use crate::domain::tile::Tile;
use crate::sim::level;
use crate::sim::world::{Session, CAMERA_ANCHOR};

// ── ScreenBuffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GlyphCell {
    pub ch: char,
    /// Bright presentation (white instead of the base grey).
    pub lit: bool,
}

pub const BLANK: GlyphCell = GlyphCell { ch: ' ', lit: false };

/// A 2D grid of glyph cells, fully overwritten on every redraw.
pub struct ScreenBuffer {
    width: usize,
    height: usize,
    cells: Vec<GlyphCell>,
}

impl ScreenBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        ScreenBuffer {
            width,
            height,
            cells: vec![BLANK; width * height],
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(BLANK);
    }

    /// Read a cell; out-of-bounds reads are blank.
    pub fn get(&self, x: i32, y: i32) -> GlyphCell {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.cells[y as usize * self.width + x as usize]
        } else {
            BLANK
        }
    }

    fn put_cell(&mut self, x: i32, y: i32, cell: GlyphCell) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.cells[y as usize * self.width + x as usize] = cell;
        }
    }

    fn put(&mut self, x: i32, y: i32, ch: char) {
        self.put_cell(x, y, GlyphCell { ch, lit: false });
    }

    fn put_lit(&mut self, x: i32, y: i32, ch: char) {
        self.put_cell(x, y, GlyphCell { ch, lit: true });
    }
}

// ── Cube stamp ──

/// Solid-neighbor tests feeding the cube stamp. Offsets are
/// (dz, dx, dy) relative to the stamped block.
#[derive(Clone, Copy, Default, Debug)]
pub struct CubeNeighbors {
    pub minus_x: bool,        // ( 0, -1,  0)
    pub minus_y: bool,        // ( 0,  0, -1)
    pub minus_z: bool,        // (-1,  0,  0)
    pub up_minus_x: bool,     // (+1, -1,  0)
    pub minus_x_plus_y: bool, // ( 0, -1, +1)
    pub plus_x_minus_y: bool, // ( 0, +1, -1)
    pub up_minus_y: bool,     // (+1,  0, -1)
    pub down_plus_x: bool,    // (-1, +1,  0)
    pub down_plus_y: bool,    // (-1,  0, +1)
    pub up_rear_corner: bool, // (+1, -1, -1)
    pub rear: bool,           // ( 0, -1, -1)
}

impl CubeNeighbors {
    fn probe<F>(solid: F) -> Self
    where
        F: Fn(i32, i32, i32) -> bool,
    {
        CubeNeighbors {
            minus_x: solid(0, -1, 0),
            minus_y: solid(0, 0, -1),
            minus_z: solid(-1, 0, 0),
            up_minus_x: solid(1, -1, 0),
            minus_x_plus_y: solid(0, -1, 1),
            plus_x_minus_y: solid(0, 1, -1),
            up_minus_y: solid(1, 0, -1),
            down_plus_x: solid(-1, 1, 0),
            down_plus_y: solid(-1, 0, 1),
            up_rear_corner: solid(1, -1, -1),
            rear: solid(0, -1, -1),
        }
    }
}

/// Stamp the cube glyph anchored at (sx, sy), spanning columns −1..4
/// and rows 0..3. Isolated block, anchor at column 0 of row 0:
///
///      ___
///     |\___\
///     | |  |
///      \|__|
///
/// Each edge cell is blanked (or left untouched) when the matching
/// neighbor test says an adjoining solid block already draws that
/// surface, which fuses abutting cubes into one continuous shape.
pub fn stamp_cube(b: &mut ScreenBuffer, sx: i32, sy: i32, n: &CubeNeighbors) {
    let y_open = n.minus_y && !n.up_minus_y;

    b.put(sx, sy, if y_open { ' ' } else { '_' });
    if y_open {
        if !n.up_rear_corner {
            b.put(sx + 1, sy, ' ');
        }
    } else if !n.rear {
        b.put(sx + 1, sy, '_');
    }
    if n.up_minus_x && !n.rear {
        b.put(sx + 2, sy, '|');
    } else if y_open {
        if !n.up_rear_corner {
            b.put(sx + 2, sy, if n.rear { ' ' } else { '\\' });
        }
    } else {
        b.put(sx + 2, sy, '_');
    }

    let left_open = n.minus_y && !n.plus_x_minus_y;

    b.put(sx - 1, sy + 1, if left_open { ' ' } else { '|' });
    b.put(sx, sy + 1, '\\');
    b.put(sx + 1, sy + 1, '_');
    b.put(sx + 2, sy + 1, '_');
    b.put(sx + 3, sy + 1, if n.up_minus_x { '\\' } else { '_' });
    if !n.up_minus_x && !n.minus_x {
        b.put(sx + 4, sy + 1, '\\');
    }

    b.put(sx - 1, sy + 2, if left_open { ' ' } else { '|' });
    b.put(sx, sy + 2, ' ');
    b.put(sx + 1, sy + 2, '|');
    b.put(sx + 2, sy + 2, ' ');
    b.put(sx + 3, sy + 2, ' ');
    b.put(
        sx + 4,
        sy + 2,
        if n.minus_x && !n.minus_x_plus_y { ' ' } else { '|' },
    );

    let floor_open = n.minus_z && !n.down_plus_y;

    b.put(
        sx,
        sy + 3,
        if n.minus_z && !n.down_plus_x { ' ' } else { '\\' },
    );
    b.put(sx + 1, sy + 3, '|');
    let floor_ch = if floor_open { ' ' } else { '_' };
    b.put(sx + 2, sy + 3, floor_ch);
    b.put(sx + 3, sy + 3, floor_ch);
    b.put(
        sx + 4,
        sy + 3,
        if n.minus_x_plus_y {
            '|'
        } else if n.minus_x {
            if floor_open {
                ' '
            } else {
                '_'
            }
        } else {
            '|'
        },
    );
}

// ── Other stamps ──

/// A street light pole at column +3. `message` is overlaid to the
/// right of a bright light; pass an empty slice to suppress it.
pub fn stamp_light(b: &mut ScreenBuffer, sx: i32, sy: i32, bright: bool, message: &[&str]) {
    if bright {
        b.put_lit(sx + 3, sy + 1, '!');
        b.put_lit(sx + 3, sy + 2, '|');
        b.put_lit(sx + 3, sy + 3, '|');
    } else {
        b.put(sx + 3, sy + 1, '?');
        b.put(sx + 3, sy + 2, '.');
        b.put(sx + 3, sy + 3, '.');
    }

    for (row, line) in message.iter().enumerate() {
        for (col, ch) in line.chars().enumerate() {
            b.put(sx + 5 + col as i32, sy + 1 + row as i32, ch);
        }
    }
}

/// A water ripple.
pub fn stamp_wave(b: &mut ScreenBuffer, sx: i32, sy: i32) {
    b.put(sx, sy + 2, '~');
    b.put(sx + 1, sy + 2, '~');
    b.put(sx + 2, sy + 2, '~');
}

/// The player marker, leaning with its horizontal heading and shifted
/// by the sub-block corrections.
pub fn stamp_player(
    b: &mut ScreenBuffer,
    sx: i32,
    sy: i32,
    heading: f64,
    h_corr: i32,
    v_corr: i32,
) {
    let ch = if heading > 0.15 {
        '\\'
    } else if heading < -0.15 {
        '/'
    } else {
        '|'
    };
    b.put_lit(sx + 2 - h_corr, sy + 2 - v_corr, ch);
}

// ── Compositor ──

pub struct Compositor {
    buffer: ScreenBuffer,
    basepoint_x: i32,
    basepoint_y: i32,
}

impl Compositor {
    pub fn new() -> Self {
        Compositor {
            buffer: ScreenBuffer::new(0, 0),
            basepoint_x: 0,
            basepoint_y: 0,
        }
    }

    pub fn buffer(&self) -> &ScreenBuffer {
        &self.buffer
    }

    /// Adopt new buffer dimensions. No-op when unchanged; otherwise
    /// the buffer is reallocated and the basepoint recomputed so the
    /// camera's anchor cell projects to the viewport center.
    pub fn resize(&mut self, width: usize, height: usize) -> bool {
        if self.buffer.width == width && self.buffer.height == height {
            return false;
        }
        self.buffer = ScreenBuffer::new(width, height);
        self.basepoint_x = width as i32 / 2 + 3 * CAMERA_ANCHOR.x - 2 * CAMERA_ANCHOR.y;
        self.basepoint_y = height as i32 / 2 + 2 * CAMERA_ANCHOR.z - CAMERA_ANCHOR.y;
        true
    }

    /// Rebuild the whole buffer from the session's draw list.
    pub fn compose(&mut self, session: &Session) {
        let t_ms = session.clock_ms();
        self.buffer.clear();

        // Camera corrections slide the whole scene a cell at a time.
        let bx = self.basepoint_x + session.camera.horizontal_correction;
        let by = self.basepoint_y + session.camera.vertical_correction;

        // Ordered merge of the static draw list with the player block.
        let list = &session.draw_list;
        let extras = [session.player.block];
        let mut list_index = 0;
        let mut extra_index = 0;
        while list_index < list.len() || extra_index < extras.len() {
            let c = if list_index >= list.len() {
                let c = extras[extra_index];
                extra_index += 1;
                c
            } else if extra_index >= extras.len()
                || draw_order(extras[extra_index], list[list_index]).is_ge()
            {
                let c = list[list_index];
                list_index += 1;
                c
            } else {
                let c = extras[extra_index];
                extra_index += 1;
                c
            };
            self.draw_block(session, c, bx, by, t_ms);
        }
    }

    fn draw_block(&mut self, session: &Session, c: Coord, bx: i32, by: i32, t_ms: f64) {
        // Tiles can be animated: the list fixes which coordinates are
        // tested, never what they contain.
        let tile = session.world_tile(c, t_ms);
        if !tile.is_visible() {
            return;
        }

        let local = c.translate(session.offset);
        let sx = bx - 3 * local.x + 2 * local.y;
        let sy = by - 2 * local.z + local.y;

        // Margin keeps partial glyphs off the viewport edge.
        let w = self.buffer.width as i32;
        let h = self.buffer.height as i32;
        if sy < 0 || sy + 3 >= h || sx <= 1 || sx + 4 > w {
            return;
        }

        match tile {
            Tile::Solid => {
                let n = CubeNeighbors::probe(|dz, dx, dy| {
                    session.world_tile(c.offset(dz, dx, dy), t_ms) == Tile::Solid
                });
                stamp_cube(&mut self.buffer, sx, sy, &n);
            }
            Tile::StreetLight => self.draw_light(session, c, sx, sy, t_ms),
            Tile::Wave => stamp_wave(&mut self.buffer, sx, sy),
            Tile::Player => stamp_player(
                &mut self.buffer,
                sx,
                sy,
                session.player.pvx - 0.66 * session.player.pvy,
                session.player.horizontal_correction,
                session.player.vertical_correction,
            ),
            Tile::Empty | Tile::InvisibleBlock => {}
        }
    }

    fn draw_light(&mut self, session: &Session, c: Coord, sx: i32, sy: i32, t_ms: f64) {
        let p = session.player.block;
        let distance = (p.x - c.x).abs().max((p.y - c.y).abs());

        // Stacked height: consecutive light tiles at and below.
        let mut height = 0;
        for step in 0..10 {
            if session.world_tile(c.offset(-step, 0, 0), t_ms) == Tile::StreetLight {
                height = step;
            } else {
                break;
            }
        }

        let bright = distance + height < 10;

        // Only the top light of a stack carries the signage, and never
        // while the player stands on it.
        let above = session.world_tile(c.offset(1, 0, 0), t_ms);
        let message = if bright && above != Tile::StreetLight && above != Tile::Player {
            level::message_lines(session.level, c)
        } else {
            &[]
        };

        stamp_light(&mut self.buffer, sx, sy, bright, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::physics::Tuning;
    use crate::sim::level::LevelId;

    fn row_text(b: &ScreenBuffer, y: i32, x_from: i32, x_to: i32) -> String {
        (x_from..x_to).map(|x| b.get(x, y).ch).collect()
    }

    // ── Cube stamp ──

    #[test]
    fn isolated_block_renders_the_full_cube() {
        let mut b = ScreenBuffer::new(12, 8);
        stamp_cube(&mut b, 3, 1, &CubeNeighbors::default());

        assert_eq!(row_text(&b, 1, 2, 9), " ___   ");
        assert_eq!(row_text(&b, 2, 2, 9), "|\\___\\ ");
        assert_eq!(row_text(&b, 3, 2, 9), "| |  | ");
        assert_eq!(row_text(&b, 4, 2, 9), " \\|__| ");
    }

    #[test]
    fn minus_y_neighbor_opens_the_left_face() {
        let mut b = ScreenBuffer::new(12, 8);
        let n = CubeNeighbors {
            minus_y: true,
            ..CubeNeighbors::default()
        };
        stamp_cube(&mut b, 3, 1, &n);

        // Top edge and left wall go blank where the blocks abut.
        assert_eq!(b.get(3, 1).ch, ' ');
        assert_eq!(b.get(4, 1).ch, ' ');
        assert_eq!(b.get(5, 1).ch, '\\');
        assert_eq!(b.get(2, 2).ch, ' ');
        assert_eq!(b.get(2, 3).ch, ' ');
    }

    #[test]
    fn minus_z_neighbor_opens_the_bottom_face() {
        let mut b = ScreenBuffer::new(12, 8);
        let n = CubeNeighbors {
            minus_z: true,
            ..CubeNeighbors::default()
        };
        stamp_cube(&mut b, 3, 1, &n);

        assert_eq!(row_text(&b, 4, 2, 9), "  |  | ");
    }

    #[test]
    fn minus_x_neighbor_opens_the_right_face() {
        let mut b = ScreenBuffer::new(12, 8);
        let n = CubeNeighbors {
            minus_x: true,
            ..CubeNeighbors::default()
        };
        stamp_cube(&mut b, 3, 1, &n);

        // Right wall blank, roof extended flat across the seam.
        assert_eq!(b.get(7, 3).ch, ' ');
        assert_eq!(b.get(6, 2).ch, '_');
        assert_eq!(b.get(7, 4).ch, '_');
    }

    #[test]
    fn stamps_clip_at_the_buffer_edge() {
        let mut b = ScreenBuffer::new(6, 3);
        stamp_cube(&mut b, 4, 1, &CubeNeighbors::default());
        stamp_light(&mut b, 4, 0, true, &["a very long message line"]);
        stamp_wave(&mut b, 5, 2);
        // Nothing to assert beyond "no panic": writes past the edge
        // are dropped.
        assert_eq!(b.get(5, 2).ch, '_');
    }

    // ── Light stamp ──

    #[test]
    fn bright_and_dim_lights_use_different_glyphs() {
        let mut b = ScreenBuffer::new(12, 8);
        stamp_light(&mut b, 2, 0, false, &[]);
        assert_eq!(b.get(5, 1).ch, '?');
        assert_eq!(b.get(5, 2).ch, '.');
        assert!(!b.get(5, 1).lit);

        stamp_light(&mut b, 2, 0, true, &[]);
        assert_eq!(b.get(5, 1).ch, '!');
        assert_eq!(b.get(5, 2).ch, '|');
        assert!(b.get(5, 1).lit);
    }

    #[test]
    fn light_message_lands_to_the_right() {
        let mut b = ScreenBuffer::new(20, 8);
        stamp_light(&mut b, 2, 0, true, &["hi", "yo"]);
        assert_eq!(row_text(&b, 1, 7, 9), "hi");
        assert_eq!(row_text(&b, 2, 7, 9), "yo");
    }

    // ── Player stamp ──

    #[test]
    fn player_glyph_leans_with_heading() {
        let mut b = ScreenBuffer::new(8, 8);
        stamp_player(&mut b, 2, 2, 0.3, 0, 0);
        assert_eq!(b.get(4, 4).ch, '\\');
        stamp_player(&mut b, 2, 2, -0.3, 0, 0);
        assert_eq!(b.get(4, 4).ch, '/');
        stamp_player(&mut b, 2, 2, 0.0, 0, 0);
        assert_eq!(b.get(4, 4).ch, '|');
        assert!(b.get(4, 4).lit);
    }

    #[test]
    fn player_corrections_shift_the_glyph() {
        let mut b = ScreenBuffer::new(8, 8);
        stamp_player(&mut b, 2, 2, 0.0, 2, 1);
        assert_eq!(b.get(2, 3).ch, '|');
    }

    // ── Compositor ──

    #[test]
    fn resize_is_a_noop_for_equal_dimensions() {
        let mut comp = Compositor::new();
        assert!(comp.resize(80, 40));
        assert!(!comp.resize(80, 40));
        assert!(comp.resize(81, 40));
    }

    #[test]
    fn empty_level_composes_just_the_player() {
        let mut comp = Compositor::new();
        comp.resize(80, 40);
        let session = Session::new(LevelId::Funsies, Tuning::default());
        comp.compose(&session);

        let mut glyphs = vec![];
        for y in 0..40 {
            for x in 0..80 {
                let cell = comp.buffer().get(x, y);
                if cell != BLANK {
                    glyphs.push((x, y, cell));
                }
            }
        }
        // One lit player marker, at the anchor cell's projection
        // shifted by the in-glyph player offset.
        assert_eq!(glyphs.len(), 1);
        let (x, y, cell) = glyphs[0];
        assert_eq!(cell.ch, '|');
        assert!(cell.lit);
        assert_eq!((x, y), (80 / 2 + 2, 40 / 2 + 2));
    }

    #[test]
    fn spawn_light_column_renders_bright() {
        let mut comp = Compositor::new();
        comp.resize(100, 50);
        let session = Session::new(LevelId::Intro, Tuning::default());
        comp.compose(&session);

        // The welcome light is a few blocks from the spawn: distance
        // plus stack height stays under the brightness threshold.
        let mut found = false;
        for y in 0..50 {
            for x in 0..100 {
                let cell = comp.buffer().get(x, y);
                if cell.ch == '!' && cell.lit {
                    found = true;
                }
            }
        }
        assert!(found, "no bright light glyph composed");
    }

    #[test]
    fn tiny_viewport_culls_everything() {
        let mut comp = Compositor::new();
        comp.resize(6, 5);
        let session = Session::new(LevelId::Intro, Tuning::default());
        comp.compose(&session);
        for y in 0..5 {
            assert_eq!(row_text(comp.buffer(), y, 0, 6), "      ");
        }
    }

    #[test]
    fn recomposition_is_deterministic() {
        let mut comp = Compositor::new();
        comp.resize(100, 50);
        let session = Session::new(LevelId::Intro, Tuning::default());
        comp.compose(&session);
        let first: Vec<GlyphCell> = (0..50)
            .flat_map(|y| (0..100).map(move |x| (x, y)))
            .map(|(x, y)| comp.buffer().get(x, y))
            .collect();
        comp.compose(&session);
        let second: Vec<GlyphCell> = (0..50)
            .flat_map(|y| (0..100).map(move |x| (x, y)))
            .map(|(x, y)| comp.buffer().get(x, y))
            .collect();
        assert_eq!(first, second);
    }
}
