use std::time::Instant;

use tracing::info;

use crate::announcer::{Announcer, Dispatch};
use crate::gesture::{classify_hands, Classification, Gesture};
use crate::stabilizer::GestureStabilizer;
use crate::types::Hand;

/// Result of pushing one frame's hands through classification and smoothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutcome {
    pub classification: Classification,
    pub confirmed: Option<Gesture>,
    pub dispatch: Option<Dispatch>,
}

/// Per-frame decision logic: dispatch → classify → stabilize → announce.
pub struct GestureRecognizer {
    stabilizer: GestureStabilizer,
    announcer: Announcer,
}

impl GestureRecognizer {
    pub fn new(stabilizer: GestureStabilizer, announcer: Announcer) -> Self {
        Self {
            stabilizer,
            announcer,
        }
    }

    pub fn process(&mut self, hands: &[Hand], now: Instant) -> FrameOutcome {
        let classification = classify_hands(hands);
        let confirmed = self.stabilizer.update(classification, now);
        let dispatch = confirmed.map(|gesture| {
            info!(gesture = %gesture, "Gesture confirmed");
            self.announcer.announce(gesture)
        });

        FrameOutcome {
            classification,
            confirmed,
            dispatch,
        }
    }

    /// Last confirmed gesture, shown in the overlay.
    pub fn current(&self) -> Option<Gesture> {
        self.stabilizer.current()
    }

    pub fn shutdown(&mut self) {
        self.announcer.shutdown();
    }
}
