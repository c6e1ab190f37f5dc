//! Two-level adaptive palette selection for 5:6:5 photos.
//!
//! Every pixel falls into one of 4096 *fine* buckets keyed by the top four
//! bits of each channel (`RRRRGGGGBBBB`). The 128 most populous fine buckets
//! become precise palette colors. Everything else is folded into 64 *coarse*
//! buckets keyed by the top two bits of each channel (`RRGGBB`).
//!
//! Photo palette layout (192 entries, uploaded at DAC register 64):
//!
//! | palette slot | display index | contents                          |
//! |--------------|---------------|-----------------------------------|
//! | 0..64        | 64..128       | coarse means, in coarse-key order |
//! | 64..192      | 128..256      | precise means, most populous first|
//!
//! Fine buckets are ranked by pixel count, descending, with ties broken by
//! ascending fine key, so the palette is identical for identical input.

use scroll_core::graphics::{ColorOps, Rgb};
use scroll_core::logging::{log, LogCategory, LogLevel};
use serde::Serialize;

pub const FINE_BUCKETS: usize = 4096;
pub const COARSE_BUCKETS: usize = 64;
pub const PRECISE_COLORS: usize = 128;
pub const PHOTO_PALETTE_SIZE: usize = COARSE_BUCKETS + PRECISE_COLORS;

/// Display index of coarse bucket 0. Indices below this belong to objects.
pub const COARSE_INDEX_BASE: u8 = 64;
/// Display index of the most populous precise color.
pub const PRECISE_INDEX_BASE: u8 = 128;

/// `RRRRGGGGBBBB` from the top four bits of each 5:6:5 channel.
#[inline]
pub fn fine_key(pixel: u16) -> u16 {
    ((pixel & 0xF000) >> 4) | ((pixel & 0x0780) >> 3) | ((pixel & 0x001E) >> 1)
}

/// `RRGGBB` from the top two bits of each channel field of a fine key.
#[inline]
pub fn coarse_key(fine: u16) -> u8 {
    (((fine & 0x0C00) >> 6) | ((fine & 0x00C0) >> 4) | ((fine & 0x000C) >> 2)) as u8
}

/// Running channel sums (6-bit scale) and pixel count for one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColorBucket {
    pub red: u32,
    pub green: u32,
    pub blue: u32,
    pub count: u32,
    /// Set on fine buckets picked as precise colors.
    pub claimed: bool,
}

impl ColorBucket {
    #[inline]
    fn add(&mut self, color: Rgb) {
        self.red += color.r as u32;
        self.green += color.g as u32;
        self.blue += color.b as u32;
        self.count += 1;
    }

    fn absorb(&mut self, other: &ColorBucket) {
        self.red += other.red;
        self.green += other.green;
        self.blue += other.blue;
        self.count += other.count;
    }

    /// Truncating per-channel mean; an empty bucket is black.
    pub fn mean(&self) -> Rgb {
        if self.count == 0 {
            return Rgb::BLACK;
        }
        Rgb::new(
            (self.red / self.count) as u8,
            (self.green / self.count) as u8,
            (self.blue / self.count) as u8,
        )
    }
}

/// Summary of one quantization run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QuantizeStats {
    pub pixels: usize,
    /// Fine buckets holding at least one pixel.
    pub fine_buckets_used: usize,
    /// Pixels mapped to a precise color.
    pub precise_pixels: usize,
    /// Pixels mapped to a coarse color.
    pub coarse_pixels: usize,
}

/// Fine-bucket histogram for one photo.
///
/// Feed every pixel with [`observe`](Self::observe), then call
/// [`build_palette`](Self::build_palette).
#[derive(Debug, Clone)]
pub struct ColorQuantizer {
    fine: Vec<ColorBucket>,
    pixels: usize,
}

impl Default for ColorQuantizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorQuantizer {
    pub fn new() -> Self {
        Self {
            fine: vec![ColorBucket::default(); FINE_BUCKETS],
            pixels: 0,
        }
    }

    #[inline]
    pub fn observe(&mut self, pixel: u16) {
        self.fine[fine_key(pixel) as usize].add(ColorOps::rgb565_to_dac(pixel));
        self.pixels += 1;
    }

    pub fn observe_all(&mut self, pixels: &[u16]) {
        for &pixel in pixels {
            self.observe(pixel);
        }
    }

    /// Number of pixels observed so far.
    pub fn pixels(&self) -> usize {
        self.pixels
    }

    pub fn fine_bucket(&self, key: u16) -> &ColorBucket {
        &self.fine[key as usize & (FINE_BUCKETS - 1)]
    }

    /// Rank the fine buckets, claim the top 128, fold the rest into coarse
    /// buckets and assemble the 192-entry palette.
    pub fn build_palette(mut self) -> PaletteMap {
        let mut ranked: Vec<u16> = (0..FINE_BUCKETS as u16).collect();
        ranked.sort_unstable_by(|&a, &b| {
            let (ca, cb) = (self.fine[a as usize].count, self.fine[b as usize].count);
            cb.cmp(&ca).then(a.cmp(&b))
        });
        ranked.truncate(PRECISE_COLORS);

        let mut rank_of = vec![None; FINE_BUCKETS];
        for (rank, &key) in ranked.iter().enumerate() {
            self.fine[key as usize].claimed = true;
            rank_of[key as usize] = Some(rank as u8);
        }

        let mut coarse = [ColorBucket::default(); COARSE_BUCKETS];
        for (key, bucket) in self.fine.iter().enumerate() {
            if !bucket.claimed {
                coarse[coarse_key(key as u16) as usize].absorb(bucket);
            }
        }

        let mut palette = Vec::with_capacity(PHOTO_PALETTE_SIZE);
        palette.extend(coarse.iter().map(ColorBucket::mean));
        palette.extend(ranked.iter().map(|&key| self.fine[key as usize].mean()));

        let fine_buckets_used = self.fine.iter().filter(|b| b.count > 0).count();
        log(LogCategory::Quantizer, LogLevel::Debug, || {
            let covered: u32 = ranked.iter().map(|&k| self.fine[k as usize].count).sum();
            format!(
                "{} fine buckets in use; precise colors cover {} of {} pixels",
                fine_buckets_used, covered, self.pixels
            )
        });

        PaletteMap {
            palette,
            ranked,
            rank_of,
            fine_buckets_used,
        }
    }
}

/// The selected photo palette plus the lookup from any 5:6:5 pixel to its
/// display index.
#[derive(Debug, Clone)]
pub struct PaletteMap {
    palette: Vec<Rgb>,
    ranked: Vec<u16>,
    rank_of: Vec<Option<u8>>,
    fine_buckets_used: usize,
}

impl PaletteMap {
    /// The 192 photo colors, coarse block first.
    pub fn palette(&self) -> &[Rgb] {
        &self.palette
    }

    pub fn into_palette(self) -> Vec<Rgb> {
        self.palette
    }

    /// Fine keys of the precise colors in rank order.
    pub fn ranked_keys(&self) -> &[u16] {
        &self.ranked
    }

    /// Rank of a fine key among the precise colors, if it was claimed.
    pub fn rank(&self, fine: u16) -> Option<u8> {
        self.rank_of[fine as usize & (FINE_BUCKETS - 1)]
    }

    /// Display index for a 5:6:5 pixel; always in `64..=255`.
    #[inline]
    pub fn index_for(&self, pixel: u16) -> u8 {
        let fine = fine_key(pixel);
        match self.rank_of[fine as usize] {
            Some(rank) => PRECISE_INDEX_BASE + rank,
            None => COARSE_INDEX_BASE + coarse_key(fine),
        }
    }

    /// Re-quantize `pixels` into `out` (same length, same order).
    pub fn remap_into(&self, pixels: &[u16], out: &mut [u8]) -> QuantizeStats {
        debug_assert_eq!(pixels.len(), out.len());
        let mut stats = QuantizeStats {
            pixels: pixels.len(),
            fine_buckets_used: self.fine_buckets_used,
            ..QuantizeStats::default()
        };
        for (dst, &pixel) in out.iter_mut().zip(pixels) {
            let index = self.index_for(pixel);
            if index >= PRECISE_INDEX_BASE {
                stats.precise_pixels += 1;
            } else {
                stats.coarse_pixels += 1;
            }
            *dst = index;
        }
        stats
    }
}
