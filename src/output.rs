use anyhow::Result;
use minifb::{Key, Window, WindowOptions};

use crate::overlay::OverlayPainter;
use crate::pipeline::Frame;
use crate::types::Hand;

pub struct WindowOutput {
    window: Window,
    buffer: Vec<u32>,
    width: usize,
    height: usize,
}

impl WindowOutput {
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let mut window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| anyhow::anyhow!("Failed to create window: {}", e))?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(10)));

        Ok(Self {
            window,
            buffer: vec![0; width * height],
            width,
            height,
        })
    }

    /// True once the user pressed `q`/Escape or closed the window.
    pub fn poll_quit(&self) -> bool {
        !self.window.is_open() || self.window.is_key_down(Key::Q) || self.window.is_key_down(Key::Escape)
    }

    /// Draw hands and overlay text over the frame and present it.
    pub fn render(&mut self, frame: &Frame, hands: &[Hand], lines: &[String], painter: &OverlayPainter) -> Result<()> {
        let width = frame.width() as usize;
        let height = frame.height() as usize;
        let mut display = frame.as_raw().clone();

        painter.draw_hands(&mut display, width, height, hands);
        painter.draw_lines(&mut display, width, height, lines);

        self.update(&display, width, height)
    }

    pub fn update(&mut self, rgb: &[u8], width: usize, height: usize) -> Result<()> {
        // Frame size can differ from what the window was opened with
        if width != self.width || height != self.height || self.buffer.len() != width * height {
            self.width = width;
            self.height = height;
            self.buffer.resize(width * height, 0);
        }

        pack_rgb(rgb, &mut self.buffer);

        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)
            .map_err(|e| anyhow::anyhow!("Window update failed: {}", e))
    }
}

/// RGB8 bytes to minifb's 0RGB words.
fn pack_rgb(rgb: &[u8], out: &mut [u32]) {
    for (px, chunk) in out.iter_mut().zip(rgb.chunks_exact(3)) {
        *px = ((chunk[0] as u32) << 16) | ((chunk[1] as u32) << 8) | chunk[2] as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_rgb() {
        let mut out = vec![0u32; 2];
        pack_rgb(&[0xFF, 0x80, 0x01, 0, 0, 0xFF], &mut out);
        assert_eq!(out, vec![0x00FF8001, 0x000000FF]);
    }
}
