use crate::types::{Hand, Handedness, Point3D, HAND_LANDMARKS, INDEX_FINGER_TIP, THUMB_TIP, WRIST};
use anyhow::Result;
use image::{ImageBuffer, Rgb};

pub type Frame = ImageBuffer<Rgb<u8>, Vec<u8>>;

/// Finds hands in a frame. Landmarks come back normalized to the frame.
pub trait HandTracker {
    fn name(&self) -> String;
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Hand>>;

    /// True when the hands are scripted rather than seen in the frame.
    fn is_simulated(&self) -> bool {
        false
    }
}

/// Scripted poses so the app runs without the ONNX models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptedPose {
    /// Thumb and index tip positions for a single hand.
    OneHand { thumb: (f32, f32), index: (f32, f32) },
    NoHands,
    TwoHands,
}

pub const DEFAULT_SCRIPT: [ScriptedPose; 6] = [
    ScriptedPose::OneHand { thumb: (0.38, 0.50), index: (0.55, 0.32) }, // Hello
    ScriptedPose::OneHand { thumb: (0.47, 0.42), index: (0.50, 0.47) }, // Fine
    ScriptedPose::NoHands,
    ScriptedPose::OneHand { thumb: (0.50, 0.53), index: (0.47, 0.47) }, // Not good
    ScriptedPose::OneHand { thumb: (0.47, 0.45), index: (0.52, 0.45) }, // Help
    ScriptedPose::TwoHands,
];

pub struct SimulatedTracker {
    frame_count: u32,
    frames_per_pose: u32,
    script: Vec<ScriptedPose>,
}

impl SimulatedTracker {
    pub fn new(frames_per_pose: u32) -> Self {
        Self::with_script(frames_per_pose, DEFAULT_SCRIPT.to_vec())
    }

    pub fn with_script(frames_per_pose: u32, script: Vec<ScriptedPose>) -> Self {
        Self {
            frame_count: 0,
            frames_per_pose: frames_per_pose.max(1),
            script,
        }
    }

    fn current_pose(&self) -> ScriptedPose {
        if self.script.is_empty() {
            return ScriptedPose::NoHands;
        }
        let idx = (self.frame_count / self.frames_per_pose) as usize % self.script.len();
        self.script[idx]
    }
}

impl HandTracker for SimulatedTracker {
    fn name(&self) -> String {
        "Simulated Hands (scripted)".to_string()
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn detect(&mut self, _frame: &Frame) -> Result<Vec<Hand>> {
        let pose = self.current_pose();
        self.frame_count += 1;

        // Slow sway so the overlay visibly tracks something.
        let t = self.frame_count as f32 * 0.05;
        let sway = (t.sin() * 0.01, t.cos() * 0.005);

        Ok(match pose {
            ScriptedPose::NoHands => Vec::new(),
            ScriptedPose::OneHand { thumb, index } => {
                vec![scripted_hand(0.0, thumb, index, sway, Handedness::Right)]
            }
            ScriptedPose::TwoHands => vec![
                scripted_hand(-0.2, (0.40, 0.50), (0.55, 0.32), sway, Handedness::Right),
                scripted_hand(0.2, (0.60, 0.50), (0.45, 0.32), sway, Handedness::Left),
            ],
        })
    }
}

/// A plausible open hand with the thumb and index tips pinned where requested.
pub fn scripted_hand(
    shift_x: f32,
    thumb: (f32, f32),
    index: (f32, f32),
    sway: (f32, f32),
    handedness: Handedness,
) -> Hand {
    let wrist = (0.5 + shift_x, 0.75);
    let mut landmarks = [Point3D::default(); HAND_LANDMARKS];
    landmarks[WRIST] = Point3D::new(wrist.0, wrist.1, 0.0);

    // Fingers fan out from the wrist, four joints each.
    for finger in 0..5 {
        let angle = (-60.0 + finger as f32 * 30.0_f32).to_radians();
        for joint in 0..4 {
            let reach = 0.08 + joint as f32 * 0.05;
            landmarks[1 + finger * 4 + joint] = Point3D::new(
                wrist.0 + angle.sin() * reach,
                wrist.1 - angle.cos() * reach,
                0.0,
            );
        }
    }

    landmarks[THUMB_TIP] = Point3D::new(thumb.0 + shift_x, thumb.1, 0.0);
    landmarks[INDEX_FINGER_TIP] = Point3D::new(index.0 + shift_x, index.1, 0.0);

    for p in landmarks.iter_mut() {
        p.x += sway.0;
        p.y += sway.1;
    }

    Hand::new(landmarks, handedness)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{classify_hands, Gesture};

    fn blank() -> Frame {
        ImageBuffer::new(64, 48)
    }

    #[test]
    fn test_default_script_cycles_gestures() {
        let mut tracker = SimulatedTracker::new(1);
        let frame = blank();
        let seen: Vec<Option<Gesture>> = (0..DEFAULT_SCRIPT.len())
            .map(|_| classify_hands(&tracker.detect(&frame).unwrap()).gesture)
            .collect();
        assert_eq!(
            seen,
            vec![
                Some(Gesture::Hello),
                Some(Gesture::Fine),
                None,
                Some(Gesture::NotGood),
                Some(Gesture::Help),
                None,
            ]
        );
    }

    #[test]
    fn test_pose_is_held_for_configured_frames() {
        let mut tracker = SimulatedTracker::with_script(
            3,
            vec![ScriptedPose::NoHands, ScriptedPose::TwoHands],
        );
        let frame = blank();
        let counts: Vec<usize> = (0..6).map(|_| tracker.detect(&frame).unwrap().len()).collect();
        assert_eq!(counts, vec![0, 0, 0, 2, 2, 2]);
    }
}
