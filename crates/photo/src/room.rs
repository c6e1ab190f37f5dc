//! Binding of the active room.
//!
//! A [`RoomContext`] remembers which room is on screen. Binding a room pushes
//! its photo palette to the display; afterwards the context hands out
//! compositors for that room. Each context is independent, so several views
//! may show different rooms of the same world.

use serde_json::json;

use scroll_core::logging::{log, LogCategory, LogLevel};
use scroll_core::palette::PaletteSink;

use crate::compositor::ScanlineCompositor;
use crate::error::{PhotoError, Result};
use crate::world::World;

/// First DAC register of the photo palette; registers below belong to
/// object colors.
pub const PHOTO_PALETTE_BASE: u8 = 64;

pub struct RoomContext<'w, W: World> {
    world: &'w W,
    current: Option<W::Room>,
}

impl<'w, W: World> RoomContext<'w, W> {
    pub fn new(world: &'w W) -> Self {
        Self {
            world,
            current: None,
        }
    }

    pub fn world(&self) -> &'w W {
        self.world
    }

    pub fn current_room(&self) -> Option<W::Room> {
        self.current
    }

    /// Make `room` current and load its photo palette into `sink`.
    ///
    /// Binding the same room again reloads the palette and changes nothing
    /// else.
    pub fn prep_room<S: PaletteSink + ?Sized>(&mut self, room: W::Room, sink: &mut S) -> Result<()> {
        let photo = self
            .world
            .room_photo(room)
            .ok_or_else(|| PhotoError::UnknownRoom(format!("{:?}", room)))?;
        sink.load_colors(PHOTO_PALETTE_BASE, photo.palette());
        if self.current != Some(room) {
            log(LogCategory::Room, LogLevel::Info, || {
                format!(
                    "bound room {:?} ({}x{} photo)",
                    room,
                    photo.width(),
                    photo.height()
                )
            });
        }
        self.current = Some(room);
        Ok(())
    }

    /// Compositor for the bound room.
    pub fn compositor(&self) -> Result<ScanlineCompositor<'w, W>> {
        let room = self.current.ok_or(PhotoError::NoRoomBound)?;
        let photo = self
            .world
            .room_photo(room)
            .ok_or_else(|| PhotoError::UnknownRoom(format!("{:?}", room)))?;
        Ok(ScanlineCompositor::new(self.world, room, photo))
    }

    /// Snapshot of the binding for diagnostics.
    pub fn debug_state(&self) -> serde_json::Value {
        match self.current {
            None => json!({ "bound": false }),
            Some(room) => {
                let photo = self.world.room_photo(room);
                json!({
                    "bound": true,
                    "room": format!("{:?}", room),
                    "photo_width": photo.map(|p| p.width()),
                    "photo_height": photo.map(|p| p.height()),
                    "objects": self.world.room_objects(room).count(),
                })
            }
        }
    }
}
