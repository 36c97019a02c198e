use std::fmt;
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;

/// one bit per pixel
pub const FRAME_BYTES: usize = WIDTH * HEIGHT / 8;

/// Display is used by the interpreter to put frames on the screen. It should
/// abstract the implementation details, so a variety of kinds of screen would
/// work.
pub trait Display {
    /// draw a packed 64x32 frame: row-major, 8 pixels per byte, msb leftmost
    fn draw(&mut self, data: &[u8]) -> Result<(), io::Error>;

    /// blank the screen
    fn clear(&mut self) -> Result<(), io::Error> {
        self.draw(&[0; FRAME_BYTES])
    }
}

/// The VM's 64x32 monochrome screen, packed the same way [`Display::draw`]
/// expects it. Coordinates wrap on both axes.
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    bits: [u8; FRAME_BYTES],
}

impl FrameBuffer {
    pub fn new() -> Self {
        FrameBuffer {
            bits: [0; FRAME_BYTES],
        }
    }

    pub fn clear(&mut self) {
        self.bits = [0; FRAME_BYTES];
    }

    fn locate(x: usize, y: usize) -> (usize, u8) {
        let idx = (y % HEIGHT) * WIDTH + (x % WIDTH);
        (idx / 8, 0x80 >> (idx % 8))
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        let (byte, mask) = Self::locate(x, y);
        self.bits[byte] & mask != 0
    }

    /// XOR one 8 pixel sprite row on at (x, y), returning true if a lit
    /// pixel got switched off
    pub fn xor_row(&mut self, x: usize, y: usize, row: u8) -> bool {
        let mut erased = false;
        for col in 0..8 {
            if row & (0x80 >> col) == 0 {
                continue;
            }
            let (byte, mask) = Self::locate(x + col, y);
            erased |= self.bits[byte] & mask != 0;
            self.bits[byte] ^= mask;
        }
        erased
    }

    /// XOR a whole sprite, one byte per row, top row at y
    pub fn draw_sprite(&mut self, x: usize, y: usize, rows: &[u8]) -> bool {
        let mut erased = false;
        for (i, &row) in rows.iter().enumerate() {
            erased |= self.xor_row(x, y + i, row);
        }
        erased
    }

    pub fn is_blank(&self) -> bool {
        self.bits.iter().all(|&b| b == 0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        FrameBuffer::new()
    }
}

/// draws the screen as rows of '#' and '.', which makes failed asserts
/// readable
impl fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FrameBuffer")?;
        for y in 0..HEIGHT {
            let row: String = (0..WIDTH)
                .map(|x| if self.pixel(x, y) { '#' } else { '.' })
                .collect();
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}

// store useful metadata about the terminal
struct Resolution(usize, usize);

impl Resolution {
    fn pixel_count(&self) -> usize {
        self.0 * self.1
    }

    fn byte_count(&self) -> usize {
        self.pixel_count() / 8
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// canvas coordinates of every pixel in `data` that is set to `bitplane`
    fn bitplane_from_data<'a>(
        &self,
        data: &'a [u8],
        bitplane: u8,
    ) -> impl std::iter::Iterator<Item = (f64, f64)> + 'a {
        let mut count = self.pixel_count();
        let w = self.0;
        std::iter::from_fn(move || {
            while count > 0 {
                count -= 1;
                let bit = 1 & (data[count / 8] >> (7 - count % 8));
                if bit == bitplane {
                    return Some((
                        (count % w) as f64,        // x
                        -1.0 * (count / w) as f64, // y
                    ));
                }
            }
            None
        })
    }
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
}

impl MonoTermDisplay {
    pub fn new() -> Result<MonoTermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution(WIDTH, HEIGHT),
        })
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, data: &[u8]) -> Result<(), io::Error> {
        if data.len() != self.resolution.byte_count() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "frame is {} bytes, expected {}",
                    data.len(),
                    self.resolution.byte_count()
                ),
            ));
        }

        // 1:1 between terminal cells and chip-8 pixels, plus the border
        let resolution = &self.resolution;
        self.terminal.draw(|f| {
            let size = Rect::new(0, 0, 2 + resolution.0 as u16, 2 + resolution.1 as u16);
            let lit: Vec<_> = resolution.bitplane_from_data(data, 1).collect();
            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &lit,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// useful for testing non-display routines; remembers what it was asked to do
#[derive(Debug, Default)]
pub struct DummyDisplay {
    pub draws: usize,
    pub clears: usize,
    pub last: Vec<u8>,
}

impl DummyDisplay {
    pub fn new() -> DummyDisplay {
        DummyDisplay::default()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, data: &[u8]) -> Result<(), io::Error> {
        self.draws += 1;
        self.last = data.to_vec();
        Ok(())
    }

    fn clear(&mut self) -> Result<(), io::Error> {
        self.clears += 1;
        self.last = vec![0; FRAME_BYTES];
        Ok(())
    }
}
