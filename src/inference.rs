use anyhow::{anyhow, Context, Result};
use image::imageops::FilterType;
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::args::TrackerKind;
use crate::config::TrackerConfig;
use crate::detector::{sigmoid, PalmDetector};
use crate::pipeline::{Frame, HandTracker, SimulatedTracker};
use crate::types::{Hand, Handedness, Point3D, Rect, HAND_LANDMARKS};

const LANDMARK_INPUT: u32 = 224;
/// Palm box to hand box: grow around the palm and shift towards the fingers.
const ROI_SCALE: f32 = 2.6;
const ROI_SHIFT_Y: f32 = -0.5;

pub fn load_session(model_path: &str) -> Result<Session> {
    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(4)?
        .with_execution_providers([
            ort::execution_providers::CPUExecutionProvider::default().build(),
        ])?
        .commit_from_file(model_path)
        .with_context(|| format!("Failed to load model {}", model_path))?;
    Ok(session)
}

/// Build the requested tracker. Missing models are an error unless
/// `allow_simulated` permits falling back to scripted hands.
pub fn create_tracker(
    kind: TrackerKind,
    config: &TrackerConfig,
    allow_simulated: bool,
) -> Result<Box<dyn HandTracker>> {
    match kind {
        TrackerKind::Simulated => Ok(Box::new(SimulatedTracker::new(config.simulated_frames_per_pose))),
        TrackerKind::Onnx => match HandLandmarkTracker::new(config) {
            Ok(tracker) => Ok(Box::new(tracker)),
            Err(e) if allow_simulated => {
                warn!("Hand models unavailable ({:#}). Falling back to simulated hands.", e);
                Ok(Box::new(SimulatedTracker::new(config.simulated_frames_per_pose)))
            }
            Err(e) => Err(e.context(
                "Hand models unavailable (pass --allow-simulated or --tracker simulated to run without them)",
            )),
        },
    }
}

/// Palm detection followed by 21-point landmark regression per palm.
pub struct HandLandmarkTracker {
    landmark_session: Session,
    detector: Option<PalmDetector>,
    config: TrackerConfig,
}

impl HandLandmarkTracker {
    pub fn new(config: &TrackerConfig) -> Result<Self> {
        if !Path::new(&config.landmark_model).exists() {
            return Err(anyhow!("Hand landmark model not found: {}", config.landmark_model));
        }

        let detector = if Path::new(&config.palm_model).exists() {
            info!("Loading palm detector from {}", config.palm_model);
            Some(PalmDetector::new(&config.palm_model)?)
        } else {
            warn!("Palm detector not found ({}). Using the full frame as one hand.", config.palm_model);
            None
        };

        info!("Loading hand landmarks from {}", config.landmark_model);
        let landmark_session = load_session(&config.landmark_model)?;

        Ok(Self {
            landmark_session,
            detector,
            config: config.clone(),
        })
    }

    fn track_roi(&mut self, frame: &Frame, roi: Rect) -> Result<Option<Hand>> {
        let frame_w = frame.width() as f32;
        let frame_h = frame.height() as f32;

        // Clip to frame
        let x = roi.x.max(0.0);
        let y = roi.y.max(0.0);
        let w = (roi.x + roi.width).min(frame_w) - x;
        let h = (roi.y + roi.height).min(frame_h) - y;
        if w < 1.0 || h < 1.0 {
            return Ok(None);
        }

        let crop = image::imageops::crop_imm(frame, x as u32, y as u32, w as u32, h as u32).to_image();
        let resized = image::imageops::resize(&crop, LANDMARK_INPUT, LANDMARK_INPUT, FilterType::Triangle);

        let mut input_data = Vec::with_capacity((LANDMARK_INPUT * LANDMARK_INPUT * 3) as usize);
        for pixel in resized.pixels() {
            for c in 0..3 {
                input_data.push(pixel[c] as f32 / 255.0);
            }
        }

        let size = LANDMARK_INPUT as i64;
        let input = ort::value::Tensor::from_array((vec![1, size, size, 3], input_data))?;
        let outputs = self.landmark_session.run(ort::inputs![input])?;
        if outputs.len() < 3 {
            return Err(anyhow!("landmark model returned {} outputs, expected 3", outputs.len()));
        }

        let (_, coords) = outputs[0].try_extract_tensor::<f32>()?;
        let (_, presence) = outputs[1].try_extract_tensor::<f32>()?;
        let (_, handedness) = outputs[2].try_extract_tensor::<f32>()?;

        let presence = presence.first().copied().map(as_probability).unwrap_or(0.0);
        if presence < self.config.min_tracking_confidence {
            debug!(presence, "hand presence below tracking threshold");
            return Ok(None);
        }
        if coords.len() < HAND_LANDMARKS * 3 {
            return Ok(None);
        }

        let scale_x = w / LANDMARK_INPUT as f32;
        let scale_y = h / LANDMARK_INPUT as f32;
        let mut landmarks = [Point3D::default(); HAND_LANDMARKS];
        for (i, point) in landmarks.iter_mut().enumerate() {
            // Model local (0..224) -> crop -> normalized full frame
            *point = Point3D {
                x: (x + coords[i * 3] * scale_x) / frame_w,
                y: (y + coords[i * 3 + 1] * scale_y) / frame_h,
                z: coords[i * 3 + 2] / LANDMARK_INPUT as f32,
            };
        }

        let right = handedness.first().copied().map(as_probability).unwrap_or(0.0);
        let handedness = if right > 0.5 {
            Handedness::Right
        } else {
            Handedness::Left
        };

        Ok(Some(Hand {
            landmarks,
            handedness,
            score: presence,
        }))
    }
}

impl HandTracker for HandLandmarkTracker {
    fn name(&self) -> String {
        if self.detector.is_some() {
            "Hand Landmarks (palm + 21 pts)".to_string()
        } else {
            "Hand Landmarks (full frame, 21 pts)".to_string()
        }
    }

    fn detect(&mut self, frame: &Frame) -> Result<Vec<Hand>> {
        let frame_w = frame.width() as f32;
        let frame_h = frame.height() as f32;

        let rois: Vec<Rect> = if let Some(det) = &mut self.detector {
            det.detect(
                frame,
                self.config.min_detection_confidence,
                self.config.max_hands,
            )?
            .into_iter()
            .map(|palm| palm_to_hand_roi(palm.rect, frame_w, frame_h))
            .collect()
        } else {
            vec![Rect::new(0.0, 0.0, frame_w, frame_h)]
        };

        let mut hands = Vec::with_capacity(rois.len());
        for roi in rois {
            if let Some(hand) = self.track_roi(frame, roi)? {
                hands.push(hand);
            }
        }
        Ok(hands)
    }
}

/// Square pixel-space crop around a normalized palm box.
pub fn palm_to_hand_roi(palm: Rect, frame_w: f32, frame_h: f32) -> Rect {
    let w = palm.width * frame_w;
    let h = palm.height * frame_h;
    let cx = (palm.x + palm.width / 2.0) * frame_w;
    let cy = (palm.y + palm.height / 2.0) * frame_h + h * ROI_SHIFT_Y;
    let size = w.max(h) * ROI_SCALE;
    Rect::new(cx - size / 2.0, cy - size / 2.0, size, size)
}

/// Some exports emit logits, others probabilities.
fn as_probability(v: f32) -> f32 {
    if (0.0..=1.0).contains(&v) {
        v
    } else {
        sigmoid(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palm_roi_is_square_and_shifted_up() {
        let palm = Rect::new(0.4, 0.5, 0.1, 0.1);
        let roi = palm_to_hand_roi(palm, 640.0, 480.0);
        assert!((roi.width - roi.height).abs() < 1e-3);
        assert!((roi.width - 64.0 * ROI_SCALE).abs() < 1e-3);
        let roi_cy = roi.y + roi.height / 2.0;
        assert!(roi_cy < 0.55 * 480.0);
    }

    fn missing_models() -> TrackerConfig {
        TrackerConfig {
            palm_model: "models/does_not_exist_palm.onnx".to_string(),
            landmark_model: "models/does_not_exist_landmark.onnx".to_string(),
            ..TrackerConfig::default()
        }
    }

    #[test]
    fn test_missing_models_fail_without_opt_in() {
        let err = create_tracker(TrackerKind::Onnx, &missing_models(), false)
            .err()
            .expect("missing models must not silently simulate");
        assert!(format!("{:#}", err).contains("does_not_exist_landmark"));
    }

    #[test]
    fn test_missing_models_fall_back_when_allowed() {
        let tracker = create_tracker(TrackerKind::Onnx, &missing_models(), true).unwrap();
        assert!(tracker.is_simulated());
    }

    #[test]
    fn test_simulated_kind_needs_no_models() {
        let tracker = create_tracker(TrackerKind::Simulated, &missing_models(), false).unwrap();
        assert!(tracker.is_simulated());
    }

    #[test]
    fn test_as_probability() {
        assert_eq!(as_probability(0.25), 0.25);
        assert!(as_probability(8.0) > 0.99);
        assert!(as_probability(-8.0) < 0.01);
    }

    #[test]
    fn test_missing_landmark_model_is_error() {
        let config = TrackerConfig {
            landmark_model: "no/such/hand_landmark.onnx".to_string(),
            ..TrackerConfig::default()
        };
        assert!(HandLandmarkTracker::new(&config).is_err());
    }
}
