//! Color conversions between the packed formats used by room assets and the
//! display's palette registers.
//!
//! - Photos store 5:6:5 RGB in 16 bits.
//! - Object images store 2:2:2 RGB in the low 6 bits of a byte.
//! - Palette (DAC) registers take a 6-bit intensity per channel.
//! - Host-side previews use ARGB8888 (0xAARRGGBB).

use serde::{Deserialize, Serialize};

/// One palette entry. Each channel is a byte; entries produced for the
/// display hold 6-bit DAC intensities (0-63).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Largest value a DAC channel can hold.
pub const DAC_MAX: u8 = 0x3F;

/// Color operation utilities
pub struct ColorOps;

impl ColorOps {
    /// Pack 5-bit red, 6-bit green and 5-bit blue into a 5:6:5 pixel.
    ///
    /// Out-of-range channel bits are masked off.
    #[inline]
    pub fn pack_rgb565(r5: u8, g6: u8, b5: u8) -> u16 {
        ((r5 as u16 & 0x1F) << 11) | ((g6 as u16 & 0x3F) << 5) | (b5 as u16 & 0x1F)
    }

    /// Split a 5:6:5 pixel into channels on the common 6-bit scale.
    ///
    /// Red and blue are extended by one bit (shifted left); green is already
    /// six bits wide.
    #[inline]
    pub fn rgb565_to_dac(pixel: u16) -> Rgb {
        Rgb {
            r: (((pixel >> 11) & 0x1F) << 1) as u8,
            g: ((pixel >> 5) & 0x3F) as u8,
            b: ((pixel & 0x1F) << 1) as u8,
        }
    }

    /// Expand a 2:2:2 object color (`RRGGBB` in the low six bits) to DAC
    /// intensities. Each 2-bit level maps to 0, 21, 42 or 63.
    #[inline]
    pub fn rgb222_to_dac(value: u8) -> Rgb {
        let level = |bits: u8| (bits & 0x03) * 21;
        Rgb {
            r: level(value >> 4),
            g: level(value >> 2),
            b: level(value),
        }
    }

    /// Scale a 6-bit DAC intensity to 8 bits, replicating the top bits so
    /// that 63 maps to 255.
    #[inline]
    pub fn dac_to_rgb8(value: u8) -> u8 {
        let v = value.min(DAC_MAX);
        (v << 2) | (v >> 4)
    }

    /// Convert a DAC palette entry to an opaque ARGB preview color.
    #[inline]
    pub fn dac_to_argb(color: Rgb) -> u32 {
        Self::from_rgb(
            Self::dac_to_rgb8(color.r),
            Self::dac_to_rgb8(color.g),
            Self::dac_to_rgb8(color.b),
        )
    }

    /// Extract red channel from ARGB color
    #[inline]
    pub fn red(color: u32) -> u8 {
        ((color >> 16) & 0xFF) as u8
    }

    /// Extract green channel from ARGB color
    #[inline]
    pub fn green(color: u32) -> u8 {
        ((color >> 8) & 0xFF) as u8
    }

    /// Extract blue channel from ARGB color
    #[inline]
    pub fn blue(color: u32) -> u8 {
        (color & 0xFF) as u8
    }

    /// Construct RGB color with full alpha
    #[inline]
    pub fn from_rgb(r: u8, g: u8, b: u8) -> u32 {
        0xFF000000 | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
    }
}
