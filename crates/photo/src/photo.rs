//! Decoded, immutable room photos and object images.

use scroll_core::graphics::Rgb;

use crate::error::{PhotoError, Result};
use crate::header::{AssetHeader, AssetKind};
use crate::quantize::{ColorQuantizer, QuantizeStats};

/// Object pixel value that lets the background show through.
pub const TRANSPARENT: u8 = 0x40;

/// A quantized background photo: 192-entry palette plus one display index
/// (64..=255) per pixel, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    header: AssetHeader,
    palette: Vec<Rgb>,
    pixels: Vec<u8>,
    stats: QuantizeStats,
}

impl Photo {
    /// Quantize an in-memory 5:6:5 buffer (top row first).
    pub fn from_rgb565(width: u16, height: u16, pixels: &[u16]) -> Result<Self> {
        let header = AssetHeader::new(width, height).validate(AssetKind::Photo)?;
        if pixels.len() != header.pixel_count() {
            return Err(PhotoError::PixelCount {
                kind: AssetKind::Photo,
                expected: header.pixel_count(),
                actual: pixels.len(),
            });
        }
        let mut quantizer = ColorQuantizer::new();
        quantizer.observe_all(pixels);
        let mut indices = Vec::new();
        crate::loader::reserve_pixels(&mut indices, header.pixel_count())?;
        indices.resize(header.pixel_count(), 0);
        Ok(Self::quantized(header, quantizer, pixels, indices))
    }

    /// Finish a photo whose pixels were already fed to `quantizer`.
    /// `indices` must have the same length as `pixels`.
    pub(crate) fn quantized(
        header: AssetHeader,
        quantizer: ColorQuantizer,
        pixels: &[u16],
        mut indices: Vec<u8>,
    ) -> Self {
        let map = quantizer.build_palette();
        let stats = map.remap_into(pixels, &mut indices);
        Self {
            header,
            palette: map.into_palette(),
            pixels: indices,
            stats,
        }
    }

    pub fn width(&self) -> u16 {
        self.header.width
    }

    pub fn height(&self) -> u16 {
        self.header.height
    }

    pub fn header(&self) -> AssetHeader {
        self.header
    }

    /// The 192 photo colors, meant for DAC registers 64..=255.
    pub fn palette(&self) -> &[Rgb] {
        &self.palette
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn stats(&self) -> QuantizeStats {
        self.stats
    }

    /// Display index at `(x, y)`, or `None` outside the photo.
    pub fn index_at(&self, x: i64, y: i64) -> Option<u8> {
        index_in(&self.header, &self.pixels, x, y)
    }

    pub fn row(&self, y: u16) -> Option<&[u8]> {
        row_in(&self.header, &self.pixels, y)
    }
}

/// A sprite already in display index space; may contain [`TRANSPARENT`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    header: AssetHeader,
    pixels: Vec<u8>,
}

impl Image {
    /// Build from indices (top row first), checked against the object limits.
    pub fn new(width: u16, height: u16, pixels: Vec<u8>) -> Result<Self> {
        let header = AssetHeader::new(width, height).validate(AssetKind::Object)?;
        if pixels.len() != header.pixel_count() {
            return Err(PhotoError::PixelCount {
                kind: AssetKind::Object,
                expected: header.pixel_count(),
                actual: pixels.len(),
            });
        }
        Ok(Self { header, pixels })
    }

    pub(crate) fn from_parts(header: AssetHeader, pixels: Vec<u8>) -> Self {
        Self { header, pixels }
    }

    pub fn width(&self) -> u16 {
        self.header.width
    }

    pub fn height(&self) -> u16 {
        self.header.height
    }

    pub fn header(&self) -> AssetHeader {
        self.header
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel_at(&self, x: i64, y: i64) -> Option<u8> {
        index_in(&self.header, &self.pixels, x, y)
    }

    pub fn row(&self, y: u16) -> Option<&[u8]> {
        row_in(&self.header, &self.pixels, y)
    }

    /// True when every pixel is the transparency sentinel.
    pub fn is_fully_transparent(&self) -> bool {
        self.pixels.iter().all(|&p| p == TRANSPARENT)
    }
}

fn index_in(header: &AssetHeader, pixels: &[u8], x: i64, y: i64) -> Option<u8> {
    if x < 0 || y < 0 || x >= header.width as i64 || y >= header.height as i64 {
        return None;
    }
    pixels.get(y as usize * header.width as usize + x as usize).copied()
}

fn row_in<'a>(header: &AssetHeader, pixels: &'a [u8], y: u16) -> Option<&'a [u8]> {
    if y >= header.height {
        return None;
    }
    let width = header.width as usize;
    let start = y as usize * width;
    pixels.get(start..start + width)
}
