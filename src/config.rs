use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::speech::SpeechConfig;
use crate::stabilizer::StabilizerConfig;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub camera: CameraConfig,
    pub tracker: TrackerConfig,
    pub stabilizer: StabilizerConfig,
    pub speech: SpeechConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub mirror: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub palm_model: String,
    pub landmark_model: String,
    pub max_hands: usize,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
    /// Frames each scripted pose is held by the simulated tracker.
    pub simulated_frames_per_pose: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub font_family: String,
    pub font_size_pt: u32,
    /// Bitmap font scale, used when the TrueType font is unavailable.
    pub text_scale: usize,
    pub dot_size: usize,
    pub landmark_color_hex: String,
    pub connection_color_hex: String,
    pub text_color_hex: String,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            width: 640,
            height: 480,
            mirror: false,
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            palm_model: "models/palm_detection.onnx".to_string(),
            landmark_model: "models/hand_landmark.onnx".to_string(),
            max_hands: 2,
            min_detection_confidence: 0.8,
            min_tracking_confidence: 0.8,
            simulated_frames_per_pose: 90,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            font_family: "DejaVuSans".to_string(),
            font_size_pt: 28,
            text_scale: 4,
            dot_size: 3,
            landmark_color_hex: "#FF0000".to_string(),
            connection_color_hex: "#FFFFFF".to_string(),
            text_color_hex: "#00FF00".to_string(),
        }
    }
}

impl AppConfig {
    pub const DEFAULT_PATH: &'static str = "config.json";

    pub fn load(path: &str) -> Result<Self> {
        let config = if Path::new(path).exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path))?;
            // Missing fields fall back to defaults through #[serde(default)]
            match serde_json::from_str::<AppConfig>(&content) {
                Ok(c) => {
                    info!("Loaded configuration from {}", path);
                    c
                }
                Err(e) => {
                    warn!("Error parsing config: {}. Loading defaults.", e);
                    return Ok(Self::default());
                }
            }
        } else {
            info!("Configuration file not found. Creating default at {}", path);
            Self::default()
        };

        // Write back so newly added fields show up in the file
        config.save(path)?;

        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = AppConfig::default();
        assert_eq!(c.camera.width, 640);
        assert_eq!(c.camera.height, 480);
        assert_eq!(c.tracker.max_hands, 2);
        assert_eq!(c.tracker.min_detection_confidence, 0.8);
        assert_eq!(c.stabilizer.history_capacity, 10);
        assert_eq!(c.stabilizer.stability_threshold, 7);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let c: AppConfig = serde_json::from_str(r#"{ "camera": { "index": 2 }, "stabilizer": { "debounce_secs": 2.5 } }"#).unwrap();
        assert_eq!(c.camera.index, 2);
        assert_eq!(c.camera.width, 640);
        assert_eq!(c.stabilizer.debounce_secs, 2.5);
        assert_eq!(c.stabilizer.confidence_gate, 0.8);
        assert_eq!(c.ui.dot_size, 3);
    }

    #[test]
    fn test_load_writes_defaults_back() {
        let path = std::env::temp_dir().join(format!("hand_sign_config_{}.json", std::process::id()));
        let path = path.to_string_lossy().to_string();
        let _ = fs::remove_file(&path);

        let c = AppConfig::load(&path).unwrap();
        assert_eq!(c.speech.queue_depth, 4);
        assert!(Path::new(&path).exists());

        let reloaded = AppConfig::load(&path).unwrap();
        assert_eq!(reloaded.tracker.landmark_model, c.tracker.landmark_model);
        let _ = fs::remove_file(&path);
    }
}
