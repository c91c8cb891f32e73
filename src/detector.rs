use crate::inference::load_session;
use crate::pipeline::Frame;
use crate::types::Rect;
use anyhow::{anyhow, Result};
use image::imageops::FilterType;
use ort::session::Session;
use ort::value::Tensor;

const INPUT_SIZE: u32 = 192;
const VALUES_PER_BOX: usize = 18;
const NMS_IOU: f32 = 0.3;

/// A palm candidate in normalized frame coordinates.
#[derive(Debug, Clone, Copy)]
pub struct PalmBox {
    pub rect: Rect,
    pub score: f32,
}

/// SSD palm detector (192x192 input, 2016 anchors).
pub struct PalmDetector {
    session: Session,
    anchors: Vec<(f32, f32)>, // cx, cy
}

impl PalmDetector {
    pub fn new(model_path: &str) -> Result<Self> {
        let session = load_session(model_path)?;
        let anchors = generate_anchors(INPUT_SIZE as usize);
        Ok(Self { session, anchors })
    }

    pub fn detect(&mut self, frame: &Frame, min_score: f32, max_hands: usize) -> Result<Vec<PalmBox>> {
        let resized = image::imageops::resize(frame, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);

        // NHWC, scaled to [-1, 1]
        let mut input_data = Vec::with_capacity((INPUT_SIZE * INPUT_SIZE * 3) as usize);
        for pixel in resized.pixels() {
            for c in 0..3 {
                input_data.push(pixel[c] as f32 / 127.5 - 1.0);
            }
        }

        let size = INPUT_SIZE as i64;
        let input_tensor = Tensor::from_array((vec![1, size, size, 3], input_data))?;
        let outputs = self.session.run(ort::inputs![input_tensor])?;
        if outputs.len() < 2 {
            return Err(anyhow!("palm model returned {} outputs, expected 2", outputs.len()));
        }

        let (_, first) = outputs[0].try_extract_tensor::<f32>()?;
        let (_, second) = outputs[1].try_extract_tensor::<f32>()?;
        // Output order differs between conversions; the box tensor is the long one.
        let (boxes_raw, scores_raw) = if first.len() >= second.len() {
            (first, second)
        } else {
            (second, first)
        };

        Ok(Self::post_process(&self.anchors, scores_raw, boxes_raw, min_score, max_hands))
    }

    pub fn post_process(
        anchors: &[(f32, f32)],
        scores_raw: &[f32],
        boxes_raw: &[f32],
        threshold: f32,
        max_hands: usize,
    ) -> Vec<PalmBox> {
        let scale = INPUT_SIZE as f32;
        let count = anchors
            .len()
            .min(scores_raw.len())
            .min(boxes_raw.len() / VALUES_PER_BOX);

        let mut candidates = Vec::new();
        for i in 0..count {
            let score = sigmoid(scores_raw[i].clamp(-100.0, 100.0));
            if score < threshold {
                continue;
            }

            let b = &boxes_raw[i * VALUES_PER_BOX..i * VALUES_PER_BOX + 4];
            let (ax, ay) = anchors[i];
            let cx = b[0] / scale + ax;
            let cy = b[1] / scale + ay;
            let w = b[2] / scale;
            let h = b[3] / scale;

            candidates.push(PalmBox {
                rect: Rect::new(cx - w / 2.0, cy - h / 2.0, w, h),
                score,
            });
        }

        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

        let mut kept: Vec<PalmBox> = Vec::new();
        for candidate in candidates {
            if kept.len() >= max_hands {
                break;
            }
            if kept.iter().all(|k| k.rect.iou(&candidate.rect) < NMS_IOU) {
                kept.push(candidate);
            }
        }
        kept
    }
}

pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

pub fn generate_anchors(input_size: usize) -> Vec<(f32, f32)> {
    // Four SSD layers; layers sharing a stride share a feature map.
    let strides = [8, 16, 16, 16];
    let mut anchors = Vec::new();

    let mut layer = 0;
    while layer < strides.len() {
        let stride = strides[layer];
        let mut per_cell = 0;
        while layer < strides.len() && strides[layer] == stride {
            per_cell += 2; // aspect ratio 1.0 plus the interpolated scale
            layer += 1;
        }

        let feature = (input_size as f32 / stride as f32).ceil() as usize;
        for y in 0..feature {
            for x in 0..feature {
                let cx = (x as f32 + 0.5) / feature as f32;
                let cy = (y as f32 + 0.5) / feature as f32;
                for _ in 0..per_cell {
                    anchors.push((cx, cy));
                }
            }
        }
    }
    anchors
}
