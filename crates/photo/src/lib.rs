//! Room imagery for a 256-color scrolling display.
//!
//! True-color room photos are reduced to a 192-color adaptive palette by a
//! two-level histogram ([`quantize`]), then composited line by line with
//! pre-indexed sprite objects ([`compositor`]). Display index space:
//!
//! ```text
//!   0..64    object colors (2:2:2), 0x40 marks transparent object pixels
//!  64..128   photo colors, coarse buckets
//! 128..256   photo colors, most populous fine buckets
//! ```

pub mod compositor;
pub mod error;
pub mod header;
pub mod loader;
pub mod photo;
pub mod quantize;
pub mod room;
pub mod world;

pub use compositor::{ScanlineCompositor, BLANK_INDEX, SCROLL_X_DIM, SCROLL_Y_DIM};
pub use error::{PhotoError, Result};
pub use header::{AssetHeader, AssetKind};
pub use loader::{read_obj_image, read_obj_image_from, read_photo, read_photo_from};
pub use photo::{Image, Photo, TRANSPARENT};
pub use quantize::{ColorQuantizer, PaletteMap, QuantizeStats};
pub use room::{RoomContext, PHOTO_PALETTE_BASE};
pub use world::{ImageId, PlacedObject, RoomId, RoomManifest, SceneWorld, World};
