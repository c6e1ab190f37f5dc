//! End-to-end: asset files and a manifest on disk, loaded into a
//! `SceneWorld`, bound and rendered.

use std::fs;
use std::path::{Path, PathBuf};

use scroll_core::graphics::ColorOps;
use scroll_core::palette::{IndexedPalette, PaletteRam};
use scroll_core::renderer::{Renderer, SoftwareRenderer};
use scroll_photo::{
    AssetHeader, PhotoError, RoomContext, SceneWorld, World, BLANK_INDEX, PHOTO_PALETTE_BASE,
    TRANSPARENT,
};

/// Scratch directory removed when dropped.
struct ScratchDir(PathBuf);

impl ScratchDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("scroll_scene_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).unwrap();
        Self(path)
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

/// Write a photo file from top-down rows.
fn write_photo(path: &Path, width: u16, rows: &[Vec<u16>]) {
    let mut bytes = AssetHeader::new(width, rows.len() as u16).to_bytes().to_vec();
    for row in rows.iter().rev() {
        for pixel in row {
            bytes.extend_from_slice(&pixel.to_le_bytes());
        }
    }
    fs::write(path, bytes).unwrap();
}

/// Write an object image file from top-down rows.
fn write_image(path: &Path, width: u16, rows: &[Vec<u8>]) {
    let mut bytes = AssetHeader::new(width, rows.len() as u16).to_bytes().to_vec();
    for row in rows.iter().rev() {
        bytes.extend_from_slice(row);
    }
    fs::write(path, bytes).unwrap();
}

fn build_scene(dir: &Path) -> PathBuf {
    let red = ColorOps::pack_rgb565(0x1E, 0, 0);
    let green = ColorOps::pack_rgb565(0, 0x3C, 0);
    let blue = ColorOps::pack_rgb565(0, 0, 0x1E);

    fs::create_dir_all(dir.join("objects")).unwrap();
    write_photo(
        &dir.join("hall.photo"),
        4,
        &[
            vec![red, red, red, red],
            vec![green, green, green, green],
            vec![blue, blue, blue, red],
        ],
    );
    write_photo(&dir.join("lab.photo"), 2, &[vec![blue, green]]);
    write_image(
        &dir.join("objects/lamp.obj"),
        2,
        &[vec![TRANSPARENT, 0x3F], vec![0x30, TRANSPARENT]],
    );

    let manifest = r#"{
        "rooms": [
            {
                "name": "hall",
                "photo": "hall.photo",
                "objects": [
                    {"image": "objects/lamp.obj", "x": 2, "y": 1},
                    {"image": "objects/lamp.obj", "x": -1, "y": 0}
                ]
            },
            {"name": "lab", "photo": "lab.photo"}
        ]
    }"#;
    let path = dir.join("rooms.json");
    fs::write(&path, manifest).unwrap();
    path
}

#[test]
fn test_manifest_loads_rooms_and_shares_images() {
    let scratch = ScratchDir::new("load");
    let manifest = build_scene(scratch.path());
    let world = SceneWorld::load_manifest(&manifest).unwrap();

    assert_eq!(world.rooms().count(), 2);
    assert_eq!(world.image_count(), 1);

    let hall = world.room_by_name("hall").unwrap();
    let positions: Vec<_> = world
        .room_objects(hall)
        .map(|o| world.object_position(o))
        .collect();
    assert_eq!(positions, vec![(2, 1), (-1, 0)]);

    let photo = world.room_photo(hall).unwrap();
    assert_eq!((photo.width(), photo.height()), (4, 3));
    // red is the most common color (5 of 12 pixels) and ranks first.
    assert_eq!(photo.index_at(0, 0), Some(128));
    assert_eq!(photo.index_at(3, 2), Some(128));
}

#[test]
fn test_bound_room_renders_expected_frame() {
    let scratch = ScratchDir::new("render");
    let manifest = build_scene(scratch.path());
    let world = SceneWorld::load_manifest(&manifest).unwrap();
    let hall = world.room_by_name("hall").unwrap();

    let mut context = RoomContext::new(&world);
    let mut ram = PaletteRam::with_object_colors();
    context.prep_room(hall, &mut ram).unwrap();
    assert_eq!(
        &ram.colors()[PHOTO_PALETTE_BASE as usize..],
        world.room_photo(hall).unwrap().palette()
    );

    let compositor = context.compositor().unwrap();
    let mut renderer = SoftwareRenderer::new(6, 4);
    compositor.render_view(-1, 0, 6, 4, &mut renderer);

    let (r, g, b) = (128, 129, 130);
    let frame = renderer.get_frame();
    // Column 0 is x = -1: off the photo, but the second lamp reaches it.
    assert_eq!(frame.row(0), &[BLANK_INDEX, 0x3F, r, r, r, BLANK_INDEX]);
    assert_eq!(frame.row(1), &[0x30, g, g, g, 0x3F, BLANK_INDEX]);
    assert_eq!(frame.row(2), &[BLANK_INDEX, b, b, 0x30, r, BLANK_INDEX]);
    assert_eq!(frame.row(3), &[BLANK_INDEX; 6]);

    let mut by_columns = SoftwareRenderer::new(6, 4);
    compositor.render_view_columns(-1, 0, 6, 4, &mut by_columns);
    assert_eq!(by_columns.get_frame(), frame);

    // Lamp pixel 0x3F resolves through the object color registers.
    assert_eq!(ram.get_color(0x3F), ColorOps::rgb222_to_dac(0x3F));
}

#[test]
fn test_switching_rooms_reloads_palette() {
    let scratch = ScratchDir::new("switch");
    let manifest = build_scene(scratch.path());
    let world = SceneWorld::load_manifest(&manifest).unwrap();
    let hall = world.room_by_name("hall").unwrap();
    let lab = world.room_by_name("lab").unwrap();

    let mut context = RoomContext::new(&world);
    let mut ram = PaletteRam::new();
    context.prep_room(hall, &mut ram).unwrap();
    context.prep_room(lab, &mut ram).unwrap();

    assert_eq!(ram.uploads(), 2);
    assert_eq!(&ram.colors()[64..], world.room_photo(lab).unwrap().palette());
    let state = context.debug_state();
    assert_eq!(state["bound"], true);
    assert_eq!(state["photo_width"], 2);
    assert_eq!(state["objects"], 0);
}

#[test]
fn test_broken_asset_reports_path() {
    let scratch = ScratchDir::new("broken");
    let manifest = build_scene(scratch.path());
    // Truncate the shared image.
    fs::write(scratch.path().join("objects/lamp.obj"), [2, 0, 2, 0, 1]).unwrap();

    match SceneWorld::load_manifest(&manifest) {
        Err(PhotoError::Asset { path, source }) => {
            assert!(path.ends_with("objects/lamp.obj"));
            assert!(matches!(*source, PhotoError::Io(_)));
        }
        other => panic!("expected Asset error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_missing_manifest_is_asset_error() {
    let scratch = ScratchDir::new("missing");
    let err = SceneWorld::load_manifest(scratch.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, PhotoError::Asset { .. }));
}
