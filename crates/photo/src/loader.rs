//! Photo and object image decoding.
//!
//! Both formats start with an [`AssetHeader`] followed by `width * height`
//! pixels stored bottom row first. Photos carry little-endian 5:6:5 `u16`
//! pixels and are quantized on load; object images carry one display index
//! per pixel and are used as-is.
//!
//! Dimensions are checked before any pixel storage is reserved, and the
//! reservation itself is fallible, so a hostile header cannot trigger a huge
//! allocation.

use std::fs::File;
use std::io::{BufReader, Read};
use std::mem;
use std::path::Path;

use scroll_core::logging::{log, LogCategory, LogLevel};

use crate::error::{PhotoError, Result};
use crate::header::{AssetHeader, AssetKind};
use crate::photo::{Image, Photo};
use crate::quantize::ColorQuantizer;

/// Reserve exactly `count` elements or report how many bytes were refused.
pub(crate) fn reserve_pixels<T>(buf: &mut Vec<T>, count: usize) -> Result<()> {
    buf.try_reserve_exact(count).map_err(|_| PhotoError::Allocation {
        bytes: count.saturating_mul(mem::size_of::<T>()),
    })
}

fn read_header<R: Read>(reader: &mut R, kind: AssetKind) -> Result<AssetHeader> {
    let header = AssetHeader::read_from(reader)?;
    header.validate(kind).map_err(|err| {
        log(LogCategory::Loader, LogLevel::Warn, || format!("rejected {}", err));
        err
    })
}

pub fn read_photo<P: AsRef<Path>>(path: P) -> Result<Photo> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    let photo = read_photo_from(&mut reader)?;
    log(LogCategory::Loader, LogLevel::Info, || {
        format!(
            "loaded photo {} ({}x{}, {} fine buckets)",
            path.display(),
            photo.width(),
            photo.height(),
            photo.stats().fine_buckets_used
        )
    });
    Ok(photo)
}

/// Decode and quantize a photo from any byte stream.
pub fn read_photo_from<R: Read>(reader: &mut R) -> Result<Photo> {
    let header = read_header(reader, AssetKind::Photo)?;
    let count = header.pixel_count();
    let width = header.width as usize;

    let mut pixels: Vec<u16> = Vec::new();
    reserve_pixels(&mut pixels, count)?;
    pixels.resize(count, 0);
    let mut indices: Vec<u8> = Vec::new();
    reserve_pixels(&mut indices, count)?;
    indices.resize(count, 0);

    let mut quantizer = ColorQuantizer::new();
    let mut row_bytes = vec![0u8; width * 2];
    // Stored bottom row first; the last row in memory is read first.
    for row in pixels.chunks_exact_mut(width.max(1)).rev() {
        reader.read_exact(&mut row_bytes)?;
        for (dst, bytes) in row.iter_mut().zip(row_bytes.chunks_exact(2)) {
            *dst = u16::from_le_bytes([bytes[0], bytes[1]]);
            quantizer.observe(*dst);
        }
    }

    let photo = Photo::quantized(header, quantizer, &pixels, indices);
    log(LogCategory::Quantizer, LogLevel::Debug, || {
        let stats = photo.stats();
        format!(
            "{} pixels: {} precise, {} coarse",
            stats.pixels, stats.precise_pixels, stats.coarse_pixels
        )
    });
    Ok(photo)
}

pub fn read_obj_image<P: AsRef<Path>>(path: P) -> Result<Image> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    let image = read_obj_image_from(&mut reader)?;
    log(LogCategory::Loader, LogLevel::Info, || {
        format!(
            "loaded object image {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        )
    });
    Ok(image)
}

/// Decode an object image from any byte stream.
pub fn read_obj_image_from<R: Read>(reader: &mut R) -> Result<Image> {
    let header = read_header(reader, AssetKind::Object)?;
    let count = header.pixel_count();
    let width = header.width as usize;

    let mut pixels: Vec<u8> = Vec::new();
    reserve_pixels(&mut pixels, count)?;
    pixels.resize(count, 0);
    for row in pixels.chunks_exact_mut(width.max(1)).rev() {
        reader.read_exact(row)?;
    }
    Ok(Image::from_parts(header, pixels))
}
