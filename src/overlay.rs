use crate::config::UiConfig;
use crate::font;
use crate::gesture::Gesture;
use crate::ttf::FontRenderer;
use crate::types::{Hand, HAND_CONNECTIONS};

type Color = (u8, u8, u8);

/// Draws landmarks and status text onto an RGB8 frame buffer.
pub struct OverlayPainter {
    font: Option<FontRenderer>,
    font_size_pt: f32,
    text_scale: usize,
    dot_size: usize,
    landmark_color: Color,
    connection_color: Color,
    text_color: Color,
}

impl OverlayPainter {
    pub fn new(ui: &UiConfig) -> Self {
        Self {
            font: FontRenderer::try_load(&ui.font_family),
            font_size_pt: ui.font_size_pt as f32,
            text_scale: ui.text_scale.max(1),
            dot_size: ui.dot_size.max(1),
            landmark_color: parse_hex(&ui.landmark_color_hex),
            connection_color: parse_hex(&ui.connection_color_hex),
            text_color: parse_hex(&ui.text_color_hex),
        }
    }

    pub fn draw_hands(&self, buf: &mut [u8], width: usize, height: usize, hands: &[Hand]) {
        let (w, h) = (width as f32, height as f32);
        for hand in hands {
            for &(a, b) in HAND_CONNECTIONS.iter() {
                let pa = hand.landmarks[a];
                let pb = hand.landmarks[b];
                draw_line(buf, width, height, (pa.x * w, pa.y * h), (pb.x * w, pb.y * h), self.connection_color);
            }
            for p in hand.landmarks.iter() {
                draw_dot(buf, width, height, p.x * w, p.y * h, self.dot_size, self.landmark_color);
            }
        }
    }

    pub fn draw_lines(&self, buf: &mut [u8], width: usize, height: usize, lines: &[String]) {
        let line_height = match &self.font {
            Some(fr) => fr.measure_height(self.font_size_pt) + 5,
            None => font::line_height(self.text_scale),
        };

        let mut y = 20;
        for line in lines {
            match &self.font {
                Some(fr) => fr.draw_text(buf, width, height, 10, y, line, self.text_color, self.font_size_pt),
                None => font::draw_text_line(buf, width, height, 10, y, line, self.text_color, self.text_scale),
            }
            y += line_height;
        }
    }
}

/// Status text for the current frame.
///
/// The gesture line stays up once anything has been confirmed, paired with
/// this frame's classification confidence.
/// Shown above the status lines whenever the hands are scripted.
pub const SIMULATED_NOTICE: &str = "SIMULATED HANDS (not from camera)";

pub fn overlay_lines(confirmed: Option<Gesture>, confidence: f32, hands: &[Hand]) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(g) = confirmed {
        lines.push(format!("{} (Confidence: {:.2})", g, confidence));
    }
    let hand_labels: Vec<&str> = hands.iter().map(|h| h.handedness.label()).collect();
    if hand_labels.is_empty() {
        lines.push("Hands: 0".to_string());
    } else {
        lines.push(format!("Hands: {} [{}]", hands.len(), hand_labels.join(", ")));
    }
    lines
}

pub fn parse_hex(hex: &str) -> (u8, u8, u8) {
    if hex.len() == 7 && hex.starts_with('#') {
        let r = u8::from_str_radix(&hex[1..3], 16).unwrap_or(255);
        let g = u8::from_str_radix(&hex[3..5], 16).unwrap_or(0);
        let b = u8::from_str_radix(&hex[5..7], 16).unwrap_or(0);
        (r, g, b)
    } else {
        (255, 0, 0) // Default Red
    }
}

fn put_pixel(buf: &mut [u8], width: usize, height: usize, x: i32, y: i32, color: Color) {
    if x < 0 || y < 0 || x as usize >= width || y as usize >= height {
        return;
    }
    let idx = (y as usize * width + x as usize) * 3;
    if idx + 2 < buf.len() {
        buf[idx] = color.0;
        buf[idx + 1] = color.1;
        buf[idx + 2] = color.2;
    }
}

fn draw_dot(buf: &mut [u8], width: usize, height: usize, cx: f32, cy: f32, size: usize, color: Color) {
    let r = size as i32;
    let (cx, cy) = (cx as i32, cy as i32);
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r * r {
                put_pixel(buf, width, height, cx + dx, cy + dy, color);
            }
        }
    }
}

fn draw_line(buf: &mut [u8], width: usize, height: usize, from: (f32, f32), to: (f32, f32), color: Color) {
    let steps = (to.0 - from.0).abs().max((to.1 - from.1).abs()).ceil().max(1.0) as usize;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let px = from.0 + (to.0 - from.0) * t;
        let py = from.1 + (to.1 - from.1) * t;
        put_pixel(buf, width, height, px as i32, py as i32, color);
    }
}
