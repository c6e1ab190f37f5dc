//! Indexed palette storage for a 256-register display.
//!
//! The display resolves every pixel byte through 256 DAC registers. The low
//! 64 registers hold the fixed 2:2:2 object colors; the upper 192 are
//! reprogrammed with a photo's adaptive palette whenever a room is bound.

use crate::graphics::{ColorOps, Rgb};

/// Number of DAC registers on the display.
pub const PALETTE_REGISTERS: usize = 256;

/// Registers reserved for object (2:2:2) colors.
pub const OBJECT_COLORS: usize = 64;

/// Maps color indices to palette entries.
pub trait IndexedPalette {
    /// Get the palette entry for an index; out-of-range indices read black.
    fn get_color(&self, index: usize) -> Rgb;

    /// Set the palette entry for an index; out-of-range writes are ignored.
    fn set_color(&mut self, index: usize, color: Rgb);

    /// Get the number of colors in this palette.
    fn len(&self) -> usize;

    /// Check if the palette is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Destination for palette uploads (the display's color registers).
pub trait PaletteSink {
    /// Program consecutive registers starting at `first_register`.
    ///
    /// Entries that would land past the last register are dropped.
    fn load_colors(&mut self, first_register: u8, colors: &[Rgb]);
}

/// A RAM-backed copy of the display's color registers.
#[derive(Debug, Clone)]
pub struct PaletteRam {
    colors: Vec<Rgb>,
    uploads: usize,
}

impl PaletteRam {
    /// All registers black.
    pub fn new() -> Self {
        Self {
            colors: vec![Rgb::BLACK; PALETTE_REGISTERS],
            uploads: 0,
        }
    }

    /// Registers 0..64 preloaded with the 2:2:2 object colors, the rest black.
    pub fn with_object_colors() -> Self {
        let mut ram = Self::new();
        for (value, slot) in ram.colors[..OBJECT_COLORS].iter_mut().enumerate() {
            *slot = ColorOps::rgb222_to_dac(value as u8);
        }
        ram
    }

    /// Get a slice of all colors.
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Number of `load_colors` calls received so far.
    pub fn uploads(&self) -> usize {
        self.uploads
    }

    /// Resolve a pixel index to an opaque ARGB8888 preview color.
    pub fn argb(&self, index: u8) -> u32 {
        ColorOps::dac_to_argb(self.get_color(index as usize))
    }
}

impl Default for PaletteRam {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexedPalette for PaletteRam {
    fn get_color(&self, index: usize) -> Rgb {
        self.colors.get(index).copied().unwrap_or(Rgb::BLACK)
    }

    fn set_color(&mut self, index: usize, color: Rgb) {
        if let Some(slot) = self.colors.get_mut(index) {
            *slot = color;
        }
    }

    fn len(&self) -> usize {
        self.colors.len()
    }
}

impl PaletteSink for PaletteRam {
    fn load_colors(&mut self, first_register: u8, colors: &[Rgb]) {
        let start = first_register as usize;
        let end = (start + colors.len()).min(PALETTE_REGISTERS);
        self.colors[start..end].copy_from_slice(&colors[..end - start]);
        self.uploads += 1;
    }
}
