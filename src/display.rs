use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

/// display width in pixels
pub const CHIP8_DISPLAY_WIDTH: usize = 64;

/// display height in pixels
pub const CHIP8_DISPLAY_HEIGHT: usize = 32;

/// one 64-bit word per row; bit `x` of row `y` is the pixel at (x, y)
pub type Rows = [u64; CHIP8_DISPLAY_HEIGHT];

/// The machine's monochrome bitmap. Sprites are XORed onto it and wrap
/// around both edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    rows: Rows,
    dirty: bool,
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            rows: [0; CHIP8_DISPLAY_HEIGHT],
            dirty: false,
        }
    }

    pub fn rows(&self) -> &Rows {
        &self.rows
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        (self.rows[y % CHIP8_DISPLAY_HEIGHT] >> (x % CHIP8_DISPLAY_WIDTH)) & 1 == 1
    }

    pub fn clear(&mut self) {
        self.rows = [0; CHIP8_DISPLAY_HEIGHT];
        self.dirty = true;
    }

    /// XOR `sprite` (one byte per row, MSB leftmost) onto the display with
    /// its top-left corner at (x, y). Returns true if any lit pixel was
    /// switched off.
    pub fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let mut collided = false;
        for (i, line) in sprite.iter().enumerate() {
            let row = (y as usize + i) % CHIP8_DISPLAY_HEIGHT;
            let mut mask = 0u64;
            for j in 0..8 {
                if (line >> (7 - j)) & 1 == 1 {
                    mask |= 1 << ((x as usize + j) % CHIP8_DISPLAY_WIDTH);
                }
            }
            collided |= self.rows[row] & mask != 0;
            self.rows[row] ^= mask;
        }
        self.dirty = true;
        collided
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// hand back the rows if anything changed since the last call
    pub fn take_dirty(&mut self) -> Option<&Rows> {
        if self.dirty {
            self.dirty = false;
            Some(&self.rows)
        } else {
            None
        }
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Display is used by the interpreter to put the framebuffer on a screen. It
/// should abstract the implementation details, so a variety of kinds of
/// screen would work.
pub trait Display {
    /// draw the whole bitmap
    fn present(&mut self, rows: &Rows, on: Color, off: Color) -> Result<(), io::Error>;

    /// has the user asked to close the display
    fn should_close(&self) -> bool {
        false
    }
}

// store useful metadata about the canvas
struct Resolution(usize, usize);

impl Resolution {
    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// every pixel whose state matches `lit`, as canvas coordinates
    fn bitplane_from_rows<'a>(
        &self,
        rows: &'a Rows,
        lit: bool,
    ) -> impl std::iter::Iterator<Item = (f64, f64)> + 'a {
        let w = self.0;
        rows.iter().enumerate().flat_map(move |(y, row)| {
            (0..w).filter_map(move |x| {
                if ((row >> x) & 1 == 1) == lit {
                    Some((x as f64, -1.0 * y as f64))
                } else {
                    None
                }
            })
        })
    }
}

/// monochrome display in a terminal, rendered using TUI over crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
}

impl MonoTermDisplay {
    pub fn new() -> Result<MonoTermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        terminal.hide_cursor()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution(CHIP8_DISPLAY_WIDTH, CHIP8_DISPLAY_HEIGHT),
        })
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
    }
}

impl Display for MonoTermDisplay {
    fn present(&mut self, rows: &Rows, on: Color, off: Color) -> Result<(), io::Error> {
        let resolution = &self.resolution;
        let lit: Vec<_> = resolution.bitplane_from_rows(rows, true).collect();
        let unlit: Vec<_> = resolution.bitplane_from_rows(rows, false).collect();

        // for now this assumes a 1:1 ratio between terminal cells and pixels
        self.terminal.draw(|f| {
            let size = Rect::new(0, 0, 2 + resolution.0 as u16, 2 + resolution.1 as u16);

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(off)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &unlit,
                        color: off,
                    });
                    ctx.draw(&Points {
                        coords: &lit,
                        color: on,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// useful for testing and headless runs; remembers what it was last shown
#[derive(Default)]
pub struct DummyDisplay {
    pub frames: usize,
    pub last: Option<Rows>,
}

impl DummyDisplay {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Display for DummyDisplay {
    fn present(&mut self, rows: &Rows, _on: Color, _off: Color) -> Result<(), io::Error> {
        self.frames += 1;
        self.last = Some(*rows);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: [u8; 8] = [0xff; 8];

    // Resolution tests
    #[test]
    fn test_x_bounds() {
        let r = Resolution(64, 32);
        assert_eq!(r.x_bounds(), [0.0, 63.0]);
    }

    #[test]
    fn test_y_bounds() {
        let r = Resolution(64, 32);
        assert_eq!(r.y_bounds(), [-31.0, 0.0]);
    }

    #[test]
    fn test_bitplanes_partition_pixels() {
        let r = Resolution(64, 32);
        let mut rows = [0u64; 32];
        rows[0] = 0b101;
        rows[31] = 1 << 63;
        let lit: Vec<_> = r.bitplane_from_rows(&rows, true).collect();
        assert_eq!(lit, vec![(0.0, 0.0), (2.0, 0.0), (63.0, -31.0)]);
        assert_eq!(r.bitplane_from_rows(&rows, false).count(), 2048 - 3);
    }

    // Framebuffer tests
    #[test]
    fn test_new_framebuffer_blank() {
        let fb = Framebuffer::new();
        assert_eq!(fb.rows(), &[0; 32]);
        assert!(!fb.is_dirty());
    }

    #[test]
    fn test_sprite_msb_is_leftmost() {
        let mut fb = Framebuffer::new();
        assert!(!fb.draw_sprite(10, 3, &[0x80]));
        assert!(fb.pixel(10, 3));
        assert!(!fb.pixel(17, 3));
        assert_eq!(fb.rows()[3], 1 << 10);
        assert!(fb.is_dirty());
    }

    #[test]
    fn test_redraw_restores_previous_frame() {
        let mut fb = Framebuffer::new();
        fb.draw_sprite(0, 0, &[0x3c, 0x42, 0x81]);
        let before = *fb.rows();
        assert!(!fb.draw_sprite(20, 1, &[0xf0, 0x90, 0xf0, 0x90, 0xf0]));
        assert!(fb.draw_sprite(20, 1, &[0xf0, 0x90, 0xf0, 0x90, 0xf0]));
        assert_eq!(fb.rows(), &before);
    }

    #[test]
    fn test_collision_only_when_pixel_erased() {
        let mut fb = Framebuffer::new();
        fb.draw_sprite(0, 0, &[0xf0]);
        // touching but not overlapping
        assert!(!fb.draw_sprite(4, 0, &[0xf0]));
        assert_eq!(fb.rows()[0], 0xff);
        // one overlapping pixel is enough
        assert!(fb.draw_sprite(7, 0, &[0x80]));
        assert!(!fb.pixel(7, 0));
    }

    #[test]
    fn test_sprite_wraps_both_edges() {
        let mut fb = Framebuffer::new();
        fb.draw_sprite(60, 30, &SQUARE);
        for y in 0..32 {
            for x in 0..64 {
                let expect_row = y >= 30 || y <= 5;
                let expect_col = x >= 60 || x <= 3;
                assert_eq!(
                    fb.pixel(x, y),
                    expect_row && expect_col,
                    "pixel ({}, {})",
                    x,
                    y
                );
            }
        }
    }

    #[test]
    fn test_clear_after_draw() {
        let mut fb = Framebuffer::new();
        fb.clear();
        fb.draw_sprite(5, 5, &SQUARE);
        fb.clear();
        assert_eq!(fb.rows(), &[0; 32]);
    }

    #[test]
    fn test_take_dirty_once() {
        let mut fb = Framebuffer::new();
        assert!(fb.take_dirty().is_none());
        fb.draw_sprite(0, 0, &[0x01]);
        assert_eq!(fb.take_dirty().map(|r| r[0]), Some(1 << 7));
        assert!(fb.take_dirty().is_none());
    }

    #[test]
    fn test_zero_height_sprite_marks_dirty() {
        let mut fb = Framebuffer::new();
        assert!(!fb.draw_sprite(0, 0, &[]));
        assert!(fb.is_dirty());
    }

    // DummyDisplay tests
    #[test]
    fn test_dummy_records_frames() -> Result<(), io::Error> {
        let mut d = DummyDisplay::new();
        let mut rows = [0; 32];
        rows[4] = 0xdead;
        d.present(&rows, Color::White, Color::Black)?;
        assert_eq!(d.frames, 1);
        assert_eq!(d.last, Some(rows));
        assert!(!d.should_close());
        Ok(())
    }

    #[test]
    #[ignore]
    // NB. figure out how to stop rendering during tests
    fn test_term_display_presents() -> Result<(), io::Error> {
        let mut d = MonoTermDisplay::new()?;
        d.present(&[0xaaaa_5555_aaaa_5555; 32], Color::White, Color::Black)
    }
}
