//! Display primitives for indexed-color room rendering: color math, palette
//! registers, line sinks and logging.

pub mod graphics;
pub mod logging;
pub mod palette;
pub mod renderer;

pub mod types {
    use serde::{Deserialize, Serialize};

    /// A framebuffer of palette indices, row-major, top row first.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct IndexedFrame {
        pub width: u32,
        pub height: u32,
        pub pixels: Vec<u8>,
    }

    impl IndexedFrame {
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                pixels: vec![0; (width * height) as usize],
            }
        }

        /// One row of indices; panics if `y` is out of range.
        pub fn row(&self, y: usize) -> &[u8] {
            let width = self.width as usize;
            &self.pixels[y * width..(y + 1) * width]
        }

        pub fn pixel(&self, x: usize, y: usize) -> Option<u8> {
            if x >= self.width as usize || y >= self.height as usize {
                return None;
            }
            Some(self.pixels[y * self.width as usize + x])
        }
    }
}

pub use graphics::{ColorOps, Rgb};
pub use palette::{IndexedPalette, PaletteRam, PaletteSink};
pub use renderer::{LineSink, Renderer, SoftwareRenderer};
