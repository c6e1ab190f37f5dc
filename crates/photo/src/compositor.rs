//! Scanline compositing of a room photo and its objects.
//!
//! A line is produced in two passes:
//!
//! 1. **Background.** Each position copies the photo index under it, or
//!    [`BLANK_INDEX`] where the line leaves the photo on either axis.
//! 2. **Objects.** Every object of the room that crosses the line is clipped
//!    to it and copied over the background, skipping [`TRANSPARENT`] pixels.
//!    Objects are visited in the world's order, so later objects cover
//!    earlier ones.
//!
//! Horizontal and vertical lines are the same operation with the axes
//! swapped. Coordinates are photo pixels and may be negative.

use scroll_core::logging::{log, LogCategory, LogLevel};
use scroll_core::renderer::LineSink;

use crate::photo::{Image, Photo, TRANSPARENT};
use crate::world::World;

/// Width of the visible scroll window.
pub const SCROLL_X_DIM: usize = 320;
/// Height of the visible scroll window.
pub const SCROLL_Y_DIM: usize = 182;
/// Index written where a line runs off the photo.
pub const BLANK_INDEX: u8 = 0;

/// Samples lines from one bound room. Obtain one from
/// [`RoomContext::compositor`](crate::room::RoomContext::compositor).
pub struct ScanlineCompositor<'a, W: World> {
    world: &'a W,
    room: W::Room,
    photo: &'a Photo,
}

impl<'a, W: World> ScanlineCompositor<'a, W> {
    pub(crate) fn new(world: &'a W, room: W::Room, photo: &'a Photo) -> Self {
        Self { world, room, photo }
    }

    pub fn room(&self) -> W::Room {
        self.room
    }

    pub fn photo(&self) -> &'a Photo {
        self.photo
    }

    /// Fill `buf` with the line starting at `(x, y)` and running right.
    pub fn fill_horizontal(&self, x: i32, y: i32, buf: &mut [u8]) {
        let (x, y) = (x as i64, y as i64);
        let len = buf.len() as i64;

        buf.fill(BLANK_INDEX);
        if let Some(row) = u16::try_from(y).ok().and_then(|y| self.photo.row(y)) {
            let (start, end) = clip(x, len, 0, row.len() as i64);
            if start < end {
                let dst = (start - x) as usize..(end - x) as usize;
                buf[dst].copy_from_slice(&row[start as usize..end as usize]);
            }
        }

        for object in self.world.room_objects(self.room) {
            let Some(image) = self.world.object_image(object) else {
                continue;
            };
            let (ox, oy) = self.world.object_position(object);
            let (ox, oy) = (ox as i64, oy as i64);
            let image_row = y - oy;
            if image_row < 0 || image_row >= image.height() as i64 {
                continue;
            }
            overlay(buf, x, ox, image.width() as i64, |i| {
                image.pixel_at(i, image_row)
            });
        }
    }

    /// Fill `buf` with the line starting at `(x, y)` and running down.
    pub fn fill_vertical(&self, x: i32, y: i32, buf: &mut [u8]) {
        let (x, y) = (x as i64, y as i64);

        for (i, dst) in buf.iter_mut().enumerate() {
            *dst = self.photo.index_at(x, y + i as i64).unwrap_or(BLANK_INDEX);
        }

        for object in self.world.room_objects(self.room) {
            let Some(image) = self.world.object_image(object) else {
                continue;
            };
            let (ox, oy) = self.world.object_position(object);
            let (ox, oy) = (ox as i64, oy as i64);
            let image_column = x - ox;
            if image_column < 0 || image_column >= image.width() as i64 {
                continue;
            }
            overlay(buf, y, oy, image.height() as i64, |i| {
                image.pixel_at(image_column, i)
            });
        }
    }

    /// Compose a `width x height` view with its top-left corner at `(x, y)`,
    /// one horizontal line per row.
    pub fn render_view<S: LineSink + ?Sized>(
        &self,
        x: i32,
        y: i32,
        width: usize,
        height: usize,
        sink: &mut S,
    ) {
        let mut line = vec![BLANK_INDEX; width];
        for row in 0..height {
            self.fill_horizontal(x, y.saturating_add(row as i32), &mut line);
            sink.write_row(row, &line);
        }
        log(LogCategory::Compositor, LogLevel::Debug, || {
            format!("rendered {}x{} view at ({}, {}) by rows", width, height, x, y)
        });
    }

    /// Same view as [`render_view`](Self::render_view), built from vertical
    /// lines.
    pub fn render_view_columns<S: LineSink + ?Sized>(
        &self,
        x: i32,
        y: i32,
        width: usize,
        height: usize,
        sink: &mut S,
    ) {
        let mut line = vec![BLANK_INDEX; height];
        for column in 0..width {
            self.fill_vertical(x.saturating_add(column as i32), y, &mut line);
            sink.write_column(column, &line);
        }
        log(LogCategory::Compositor, LogLevel::Debug, || {
            format!("rendered {}x{} view at ({}, {}) by columns", width, height, x, y)
        });
    }

    /// Number of objects of the bound room that reach into the given view.
    pub fn visible_objects(&self, x: i32, y: i32, width: usize, height: usize) -> usize {
        let (x, y) = (x as i64, y as i64);
        self.world
            .room_objects(self.room)
            .filter_map(|o| {
                let image: &Image = self.world.object_image(o)?;
                let (ox, oy) = self.world.object_position(o);
                let (h0, h1) = clip(x, width as i64, ox as i64, image.width() as i64);
                let (v0, v1) = clip(y, height as i64, oy as i64, image.height() as i64);
                (h0 < h1 && v0 < v1).then_some(())
            })
            .count()
    }
}

/// Intersection of `[a, a + a_len)` and `[b, b + b_len)`, as `(start, end)`.
/// Empty when `start >= end`.
fn clip(a: i64, a_len: i64, b: i64, b_len: i64) -> (i64, i64) {
    (a.max(b), (a + a_len).min(b + b_len))
}

/// Copy the part of an object span that falls on the line.
///
/// `line_start` is the line's first coordinate along its axis, `span_start`
/// and `span_len` the object's extent on the same axis. `sample(i)` returns
/// the object's pixel at offset `i` into the span.
fn overlay(
    buf: &mut [u8],
    line_start: i64,
    span_start: i64,
    span_len: i64,
    sample: impl Fn(i64) -> Option<u8>,
) {
    let (start, end) = clip(line_start, buf.len() as i64, span_start, span_len);
    for pos in start..end {
        match sample(pos - span_start) {
            Some(TRANSPARENT) | None => {}
            Some(value) => buf[(pos - line_start) as usize] = value,
        }
    }
}
