//! Color math shared by the loaders, the quantizer and host-side previews.

pub mod color;

pub use color::{ColorOps, Rgb};
