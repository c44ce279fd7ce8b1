/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Crop the composed glyph buffer by the fixed margins and build
///      the next frame into `front` (array of Cell)
///   2. Compare each cell with `back` (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws. The glyph
/// buffer is composed slightly larger than the terminal so that glyph
/// fragments near the edge land in the cropped margin instead of
/// wrapping or tearing.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::ui::compose::ScreenBuffer;

/// Rows and columns trimmed off the composed buffer before display.
pub const CROP_TOP: usize = 4;
pub const CROP_BOTTOM: usize = 5;
pub const CROP_LEFT: usize = 5;
pub const CROP_RIGHT: usize = 4;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
}

impl Cell {
    /// Explicit dark background for every cell. Using the same RGB for
    /// `Clear` and all cells keeps inter-row gap pixels from showing
    /// as horizontal lines on VTE-based terminals.
    const BASE_BG: Color = Color::Rgb { r: 14, g: 16, b: 26 };

    /// Dim scene glyphs; lit glyphs render white.
    const BASE_FG: Color = Color::Grey;

    const BLANK: Cell = Cell { ch: ' ', fg: Cell::BASE_FG };

    /// Sentinel used to invalidate the back buffer: differs from any
    /// real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '\0', fg: Color::Magenta };
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell { ch, fg });
            cx += 1;
        }
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.adopt_size(tw as usize, th as usize)?;
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Current terminal size, tracking live resizes. The composed
    /// buffer should be this plus the crop margins.
    pub fn poll_size(&mut self) -> io::Result<(usize, usize)> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.adopt_size(tw as usize, th as usize)?;
        }
        Ok((self.term_w, self.term_h))
    }

    fn adopt_size(&mut self, w: usize, h: usize) -> io::Result<()> {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        // Force full repaint: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);
        queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        Ok(())
    }

    /// Present a composed glyph buffer: crop the margins, overlay the
    /// HUD line, diff against the previous frame, and flush.
    pub fn present(&mut self, buffer: &ScreenBuffer, hud: &str) -> io::Result<()> {
        for y in 0..self.term_h {
            for x in 0..self.term_w {
                let glyph = buffer.get((x + CROP_LEFT) as i32, (y + CROP_TOP) as i32);
                let fg = if glyph.lit { Color::White } else { Cell::BASE_FG };
                self.front.set(x, y, Cell { ch: glyph.ch, fg });
            }
        }

        if self.term_h > 0 {
            self.front.put_str(1, self.term_h - 1, hud, Color::DarkGrey);
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Cell::BASE_FG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Set explicit base colors at start of frame. Not ResetColor —
        // that reverts to the terminal default, which may differ from
        // BASE_BG and cause line artifacts.
        queue!(
            self.writer,
            SetForegroundColor(Cell::BASE_FG),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }

                queue!(self.writer, Print(cell.ch))?;

                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }
}
