//! Rooms, placed objects and the manifest-backed scene.
//!
//! The compositor only needs read access to a room's photo and to the objects
//! placed in it, so it talks to the [`World`] trait. [`SceneWorld`] is the
//! in-memory implementation used by the CLI and the tests; it can be built
//! by hand or from a JSON [`RoomManifest`].

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use scroll_core::logging::{log, LogCategory, LogLevel};

use crate::error::{PhotoError, Result};
use crate::loader::{read_obj_image, read_photo};
use crate::photo::{Image, Photo};

/// Read-only view of rooms and the objects placed in them.
pub trait World {
    type Room: Copy + Eq + fmt::Debug;
    type Object;

    /// The room's background photo, or `None` if the room is not part of
    /// this world.
    fn room_photo(&self, room: Self::Room) -> Option<&Photo>;

    /// Objects placed in `room`, in a stable order. Later objects are drawn
    /// over earlier ones. Every call starts a fresh iteration.
    fn room_objects(&self, room: Self::Room) -> impl Iterator<Item = &Self::Object> + '_;

    /// Top-left corner of the object in photo coordinates.
    fn object_position(&self, object: &Self::Object) -> (i32, i32);

    fn object_image<'a>(&'a self, object: &'a Self::Object) -> Option<&'a Image>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoomId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedObject {
    pub x: i32,
    pub y: i32,
    pub image: ImageId,
}

#[derive(Debug)]
struct SceneRoom {
    name: String,
    photo: Photo,
    objects: Vec<PlacedObject>,
}

/// Rooms and images owned in memory. Objects iterate in insertion order,
/// which for a loaded manifest is the order they are listed.
#[derive(Debug, Default)]
pub struct SceneWorld {
    rooms: Vec<SceneRoom>,
    images: Vec<Image>,
}

impl SceneWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_image(&mut self, image: Image) -> ImageId {
        self.images.push(image);
        ImageId(self.images.len() - 1)
    }

    pub fn add_room(&mut self, name: impl Into<String>, photo: Photo) -> RoomId {
        self.rooms.push(SceneRoom {
            name: name.into(),
            photo,
            objects: Vec::new(),
        });
        RoomId(self.rooms.len() - 1)
    }

    /// Append an object to `room`; it is drawn above every earlier object.
    pub fn place_object(&mut self, room: RoomId, image: ImageId, x: i32, y: i32) -> Result<()> {
        if image.0 >= self.images.len() {
            return Err(PhotoError::UnknownImage(image.0));
        }
        let entry = self
            .rooms
            .get_mut(room.0)
            .ok_or_else(|| PhotoError::UnknownRoom(format!("{:?}", room)))?;
        entry.objects.push(PlacedObject { x, y, image });
        Ok(())
    }

    /// First room with the given name.
    pub fn room_by_name(&self, name: &str) -> Option<RoomId> {
        self.rooms.iter().position(|r| r.name == name).map(RoomId)
    }

    pub fn room_name(&self, room: RoomId) -> Option<&str> {
        self.rooms.get(room.0).map(|r| r.name.as_str())
    }

    pub fn rooms(&self) -> impl Iterator<Item = RoomId> + '_ {
        (0..self.rooms.len()).map(RoomId)
    }

    pub fn image(&self, id: ImageId) -> Option<&Image> {
        self.images.get(id.0)
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Read a JSON manifest and every asset it names. Asset paths are
    /// relative to the manifest's directory.
    pub fn load_manifest<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| asset_error(path, err.into()))?;
        let manifest: RoomManifest = serde_json::from_str(&text)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_manifest(&manifest, base_dir)
    }

    /// Load every photo and image of `manifest`. An image shared by several
    /// objects is read once.
    pub fn from_manifest(manifest: &RoomManifest, base_dir: &Path) -> Result<Self> {
        let mut world = Self::new();
        let mut loaded: HashMap<PathBuf, ImageId> = HashMap::new();

        for entry in &manifest.rooms {
            let photo_path = base_dir.join(&entry.photo);
            let photo = read_photo(&photo_path).map_err(|err| asset_error(&photo_path, err))?;
            let room = world.add_room(entry.name.clone(), photo);

            for object in &entry.objects {
                let image_path = base_dir.join(&object.image);
                let image = match loaded.get(&image_path) {
                    Some(&id) => id,
                    None => {
                        let image = read_obj_image(&image_path)
                            .map_err(|err| asset_error(&image_path, err))?;
                        let id = world.add_image(image);
                        loaded.insert(image_path, id);
                        id
                    }
                };
                world.place_object(room, image, object.x, object.y)?;
            }

            log(LogCategory::Room, LogLevel::Debug, || {
                format!(
                    "room {:?}: {} object(s)",
                    entry.name,
                    entry.objects.len()
                )
            });
        }

        log(LogCategory::Loader, LogLevel::Info, || {
            format!(
                "manifest loaded: {} room(s), {} distinct image(s)",
                world.rooms.len(),
                world.images.len()
            )
        });
        Ok(world)
    }
}

fn asset_error(path: &Path, source: PhotoError) -> PhotoError {
    PhotoError::Asset {
        path: path.to_path_buf(),
        source: Box::new(source),
    }
}

impl World for SceneWorld {
    type Room = RoomId;
    type Object = PlacedObject;

    fn room_photo(&self, room: RoomId) -> Option<&Photo> {
        self.rooms.get(room.0).map(|r| &r.photo)
    }

    fn room_objects(&self, room: RoomId) -> impl Iterator<Item = &PlacedObject> + '_ {
        self.rooms
            .get(room.0)
            .map(|r| r.objects.as_slice())
            .unwrap_or_default()
            .iter()
    }

    fn object_position(&self, object: &PlacedObject) -> (i32, i32) {
        (object.x, object.y)
    }

    fn object_image<'a>(&'a self, object: &'a PlacedObject) -> Option<&'a Image> {
        self.images.get(object.image.0)
    }
}

/// On-disk scene description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomManifest {
    pub rooms: Vec<RoomEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomEntry {
    pub name: String,
    pub photo: PathBuf,
    #[serde(default)]
    pub objects: Vec<ObjectEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub image: PathBuf,
    pub x: i32,
    pub y: i32,
}
