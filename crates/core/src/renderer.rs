//! Line sinks and the software renderer that collects lines into a frame.
//!
//! The compositor produces one line of palette indices at a time; the display
//! layer consumes them through [`LineSink`]. Scrolling redraws only the rows or
//! columns that became visible, so both orientations are accepted.
//!
//! ```text
//! ScanlineCompositor -> LineSink -> {SoftwareRenderer, hardware plane}
//! ```

use crate::types::IndexedFrame;

/// Consumer of composited display lines.
pub trait LineSink {
    /// Store a horizontal line at `row`, starting at column 0.
    fn write_row(&mut self, row: usize, line: &[u8]);

    /// Store a vertical line at `column`, starting at row 0.
    fn write_column(&mut self, column: usize, line: &[u8]);
}

/// Common renderer interface for indexed framebuffers.
pub trait Renderer: LineSink {
    /// Get the current framebuffer (read-only)
    fn get_frame(&self) -> &IndexedFrame;

    /// Fill the framebuffer with one palette index.
    fn clear(&mut self, index: u8);

    /// Reset the renderer to its initial state (all pixels blank).
    fn reset(&mut self);

    /// Get the name of this renderer (for debugging/UI)
    fn name(&self) -> &str;

    /// Recreate the framebuffer at new dimensions.
    fn resize(&mut self, width: u32, height: u32);
}

/// CPU-side renderer that writes lines straight into an [`IndexedFrame`].
#[derive(Debug, Clone)]
pub struct SoftwareRenderer {
    framebuffer: IndexedFrame,
    lines_written: usize,
}

impl SoftwareRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            framebuffer: IndexedFrame::new(width, height),
            lines_written: 0,
        }
    }

    /// Number of rows and columns received since the last reset.
    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    /// Take ownership of the frame, leaving a blank one of the same size.
    pub fn take_frame(&mut self) -> IndexedFrame {
        let (width, height) = (self.framebuffer.width, self.framebuffer.height);
        std::mem::replace(&mut self.framebuffer, IndexedFrame::new(width, height))
    }
}

impl LineSink for SoftwareRenderer {
    fn write_row(&mut self, row: usize, line: &[u8]) {
        let width = self.framebuffer.width as usize;
        if row >= self.framebuffer.height as usize {
            return;
        }
        let n = line.len().min(width);
        let start = row * width;
        self.framebuffer.pixels[start..start + n].copy_from_slice(&line[..n]);
        self.lines_written += 1;
    }

    fn write_column(&mut self, column: usize, line: &[u8]) {
        let width = self.framebuffer.width as usize;
        if column >= width {
            return;
        }
        let rows = self.framebuffer.height as usize;
        for (row, &index) in line.iter().take(rows).enumerate() {
            self.framebuffer.pixels[row * width + column] = index;
        }
        self.lines_written += 1;
    }
}

impl Renderer for SoftwareRenderer {
    fn get_frame(&self) -> &IndexedFrame {
        &self.framebuffer
    }

    fn clear(&mut self, index: u8) {
        self.framebuffer.pixels.fill(index);
    }

    fn reset(&mut self) {
        self.clear(0);
        self.lines_written = 0;
    }

    fn name(&self) -> &str {
        "Software Line Renderer"
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.framebuffer = IndexedFrame::new(width, height);
        self.lines_written = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_software_renderer_creation() {
        let renderer = SoftwareRenderer::new(320, 182);
        assert_eq!(renderer.get_frame().width, 320);
        assert_eq!(renderer.get_frame().height, 182);
        assert_eq!(renderer.name(), "Software Line Renderer");
        assert_eq!(renderer.lines_written(), 0);
    }

    #[test]
    fn test_write_row_places_line() {
        let mut renderer = SoftwareRenderer::new(4, 3);
        renderer.write_row(1, &[1, 2, 3, 4]);

        let frame = renderer.get_frame();
        assert_eq!(frame.row(0), &[0, 0, 0, 0]);
        assert_eq!(frame.row(1), &[1, 2, 3, 4]);
        assert_eq!(renderer.lines_written(), 1);
    }

    #[test]
    fn test_write_column_places_line() {
        let mut renderer = SoftwareRenderer::new(3, 3);
        renderer.write_column(2, &[7, 8, 9]);

        let frame = renderer.get_frame();
        assert_eq!(frame.pixel(2, 0), Some(7));
        assert_eq!(frame.pixel(2, 1), Some(8));
        assert_eq!(frame.pixel(2, 2), Some(9));
        assert_eq!(frame.pixel(1, 1), Some(0));
    }

    #[test]
    fn test_oversized_and_out_of_range_lines_are_clipped() {
        let mut renderer = SoftwareRenderer::new(2, 2);
        renderer.write_row(0, &[5, 5, 5, 5]);
        renderer.write_row(9, &[6, 6]);
        renderer.write_column(9, &[6, 6]);

        let frame = renderer.get_frame();
        assert_eq!(frame.pixels, vec![5, 5, 0, 0]);
        assert_eq!(renderer.lines_written(), 1);
    }

    #[test]
    fn test_clear_reset_and_take() {
        let mut renderer = SoftwareRenderer::new(2, 2);
        renderer.clear(9);
        assert!(renderer.get_frame().pixels.iter().all(|&p| p == 9));

        let taken = renderer.take_frame();
        assert!(taken.pixels.iter().all(|&p| p == 9));
        assert!(renderer.get_frame().pixels.iter().all(|&p| p == 0));

        renderer.write_row(0, &[1, 1]);
        renderer.reset();
        assert!(renderer.get_frame().pixels.iter().all(|&p| p == 0));
        assert_eq!(renderer.lines_written(), 0);
    }

    #[test]
    fn test_resize() {
        let mut renderer = SoftwareRenderer::new(320, 182);
        renderer.resize(640, 400);

        let frame = renderer.get_frame();
        assert_eq!(frame.width, 640);
        assert_eq!(frame.height, 400);
        assert_eq!(frame.pixels.len(), 640 * 400);
    }
}
