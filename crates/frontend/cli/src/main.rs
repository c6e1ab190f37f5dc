use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scroll_core::graphics::ColorOps;
use scroll_core::logging::{LogConfig, LogLevel};
use scroll_core::palette::{IndexedPalette, PaletteRam};
use scroll_core::renderer::{Renderer, SoftwareRenderer};
use scroll_core::types::IndexedFrame;
use scroll_photo::{
    read_photo, RoomContext, SceneWorld, PHOTO_PALETTE_BASE, SCROLL_X_DIM, SCROLL_Y_DIM,
};
use serde_json::json;

#[derive(Parser)]
#[command(name = "scrollview", about = "Inspect and render indexed room imagery")]
struct Args {
    /// Pipeline log level: off, error, warn, info, debug or trace
    #[arg(long, default_value = "off", global = true)]
    log_level: LogLevel,

    /// Append pipeline logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Maximum pipeline log messages per second per category
    #[arg(long, default_value_t = 60, global = true)]
    log_rate_limit: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print dimensions and quantization statistics of a photo
    Info {
        photo: PathBuf,

        /// Print as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the 192-entry adaptive palette of a photo
    Palette {
        photo: PathBuf,

        /// Print as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Composite a view of a room and save it as an indexed PNG
    Render {
        /// Room manifest (JSON)
        manifest: PathBuf,

        /// Room name from the manifest
        #[arg(long)]
        room: String,

        /// Left edge of the view in photo pixels
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        x: i32,

        /// Top edge of the view in photo pixels
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        y: i32,

        #[arg(long, default_value_t = SCROLL_X_DIM)]
        width: usize,

        #[arg(long, default_value_t = SCROLL_Y_DIM)]
        height: usize,

        /// Output PNG path
        #[arg(long)]
        out: PathBuf,

        /// Build the view from vertical lines instead of rows
        #[arg(long, default_value_t = false)]
        columns: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = LogConfig::global();
    config.set_global_level(args.log_level);
    config.set_rate_limit(args.log_rate_limit);
    if let Some(path) = args.log_file.as_ref() {
        config
            .set_log_file(path.clone())
            .with_context(|| format!("opening log file {}", path.display()))?;
    }

    match args.command {
        Command::Info { photo, json } => info(&photo, json),
        Command::Palette { photo, json } => palette(&photo, json),
        Command::Render {
            manifest,
            room,
            x,
            y,
            width,
            height,
            out,
            columns,
        } => render(&manifest, &room, (x, y, width, height), &out, columns),
    }
}

fn info(path: &Path, as_json: bool) -> Result<()> {
    let photo = read_photo(path).with_context(|| format!("reading photo {}", path.display()))?;
    let stats = photo.stats();

    if as_json {
        let report = json!({
            "width": photo.width(),
            "height": photo.height(),
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}: {}x{}", path.display(), photo.width(), photo.height());
    println!("  pixels:            {}", stats.pixels);
    println!("  fine buckets used: {}", stats.fine_buckets_used);
    println!("  precise pixels:    {}", stats.precise_pixels);
    println!("  coarse pixels:     {}", stats.coarse_pixels);
    Ok(())
}

fn palette(path: &Path, as_json: bool) -> Result<()> {
    let photo = read_photo(path).with_context(|| format!("reading photo {}", path.display()))?;

    if as_json {
        let entries: Vec<_> = photo
            .palette()
            .iter()
            .enumerate()
            .map(|(i, color)| {
                json!({
                    "register": PHOTO_PALETTE_BASE as usize + i,
                    "r": color.r,
                    "g": color.g,
                    "b": color.b,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for (i, color) in photo.palette().iter().enumerate() {
        println!(
            "{:3}: {:2} {:2} {:2}  #{:06X}",
            PHOTO_PALETTE_BASE as usize + i,
            color.r,
            color.g,
            color.b,
            ColorOps::dac_to_argb(*color) & 0x00FF_FFFF
        );
    }
    Ok(())
}

fn render(
    manifest: &Path,
    room_name: &str,
    (x, y, width, height): (i32, i32, usize, usize),
    out: &Path,
    columns: bool,
) -> Result<()> {
    let world = SceneWorld::load_manifest(manifest)
        .with_context(|| format!("loading manifest {}", manifest.display()))?;
    let room = world
        .room_by_name(room_name)
        .with_context(|| format!("no room named {:?} in {}", room_name, manifest.display()))?;

    let mut registers = PaletteRam::with_object_colors();
    let mut context = RoomContext::new(&world);
    context.prep_room(room, &mut registers)?;
    let compositor = context.compositor()?;

    let frame_width = u32::try_from(width).context("view width too large")?;
    let frame_height = u32::try_from(height).context("view height too large")?;
    let mut renderer = SoftwareRenderer::new(frame_width, frame_height);
    if columns {
        compositor.render_view_columns(x, y, width, height, &mut renderer);
    } else {
        compositor.render_view(x, y, width, height, &mut renderer);
    }
    log::info!(
        "{}: {} line(s), {} visible object(s)",
        renderer.name(),
        renderer.lines_written(),
        compositor.visible_objects(x, y, width, height)
    );
    log::debug!("{}", context.debug_state());

    write_png(out, renderer.get_frame(), &registers)
        .with_context(|| format!("writing {}", out.display()))?;
    println!("wrote {}x{} view of {:?} to {}", width, height, room_name, out.display());
    Ok(())
}

/// Save an indexed frame with the register contents as its PNG palette.
fn write_png(path: &Path, frame: &IndexedFrame, registers: &PaletteRam) -> Result<()> {
    let palette: Vec<u8> = (0..registers.len())
        .flat_map(|i| {
            let color = registers.get_color(i);
            [color.r, color.g, color.b].map(ColorOps::dac_to_rgb8)
        })
        .collect();

    let file = File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), frame.width, frame.height);
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_palette(palette);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&frame.pixels)?;
    Ok(())
}
