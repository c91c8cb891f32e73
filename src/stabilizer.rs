//! Temporal smoothing of per-frame classifications.
//!
//! A gesture is only announced once it dominates a short rolling window of
//! confident frames, and the same gesture is not re-announced within the
//! debounce interval.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::gesture::{Classification, Gesture};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizerConfig {
    /// Minimum per-frame confidence for a result to enter the history.
    pub confidence_gate: f32,
    pub history_capacity: usize,
    /// Occurrences within the history required to confirm a gesture.
    pub stability_threshold: usize,
    /// Minimum seconds before the same gesture may be confirmed again.
    pub debounce_secs: f32,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self {
            confidence_gate: 0.8,
            history_capacity: 10,
            stability_threshold: 7,
            debounce_secs: 1.0,
        }
    }
}

const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(1);

impl StabilizerConfig {
    /// `None` when `debounce_secs` is too large (or infinite) to be a `Duration`.
    pub fn debounce(&self) -> Option<Duration> {
        Duration::try_from_secs_f32(self.debounce_secs.max(0.0)).ok()
    }
}

pub struct GestureStabilizer {
    config: StabilizerConfig,
    debounce: Duration,
    history: VecDeque<Gesture>,
    last_confirmed: Option<(Gesture, Instant)>,
}

impl GestureStabilizer {
    pub fn new(config: StabilizerConfig) -> Self {
        let capacity = config.history_capacity.max(1);
        let debounce = config.debounce().unwrap_or_else(|| {
            warn!(
                debounce_secs = config.debounce_secs,
                "debounce out of range, using {:?}", DEFAULT_DEBOUNCE
            );
            DEFAULT_DEBOUNCE
        });
        Self {
            config,
            debounce,
            history: VecDeque::with_capacity(capacity + 1),
            last_confirmed: None,
        }
    }

    /// Feed one frame's classification observed at `now`.
    ///
    /// Returns the gesture when it becomes confirmed on this frame.
    pub fn update(&mut self, result: Classification, now: Instant) -> Option<Gesture> {
        let gesture = match result.gesture {
            Some(g) if result.confidence >= self.config.confidence_gate => g,
            _ => return None,
        };

        self.history.push_back(gesture);
        while self.history.len() > self.config.history_capacity.max(1) {
            self.history.pop_front();
        }

        let count = self.count(gesture);
        if count < self.config.stability_threshold {
            return None;
        }

        let debounced = match self.last_confirmed {
            None => true,
            Some((last, _)) if last != gesture => true,
            Some((_, at)) => now.saturating_duration_since(at) > self.debounce,
        };
        if !debounced {
            return None;
        }

        debug!(gesture = %gesture, count, "gesture confirmed");
        self.last_confirmed = Some((gesture, now));
        Some(gesture)
    }

    /// The most recently confirmed gesture; `None` while idle.
    pub fn current(&self) -> Option<Gesture> {
        self.last_confirmed.map(|(g, _)| g)
    }

    pub fn history(&self) -> impl Iterator<Item = &Gesture> {
        self.history.iter()
    }

    pub fn count(&self, gesture: Gesture) -> usize {
        self.history.iter().filter(|g| **g == gesture).count()
    }
}

impl Default for GestureStabilizer {
    fn default() -> Self {
        Self::new(StabilizerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(g: Gesture) -> Classification {
        Classification::detected(g)
    }

    /// Feed `n` frames of `g`, spaced `step` apart starting at `start`.
    fn feed(
        stab: &mut GestureStabilizer,
        g: Gesture,
        n: usize,
        start: Instant,
        step: Duration,
    ) -> Vec<(usize, Gesture)> {
        (0..n)
            .filter_map(|i| stab.update(hit(g), start + step * i as u32).map(|e| (i, e)))
            .collect()
    }

    #[test]
    fn test_ten_hello_frames_confirm_once_at_seventh() {
        let mut stab = GestureStabilizer::default();
        let t0 = Instant::now();
        let events = feed(&mut stab, Gesture::Hello, 10, t0, Duration::from_millis(33));
        assert_eq!(events, vec![(6, Gesture::Hello)]);
        assert_eq!(stab.current(), Some(Gesture::Hello));
    }

    #[test]
    fn test_split_window_never_confirms() {
        let mut stab = GestureStabilizer::default();
        let t0 = Instant::now();
        let step = Duration::from_millis(33);
        assert!(feed(&mut stab, Gesture::Hello, 5, t0, step).is_empty());
        assert!(feed(&mut stab, Gesture::Cool, 5, t0 + step * 5, step).is_empty());
        assert_eq!(stab.current(), None);
    }

    #[test]
    fn test_low_confidence_and_none_are_gated() {
        let mut stab = GestureStabilizer::default();
        let now = Instant::now();
        let weak = Classification {
            gesture: Some(Gesture::Fine),
            confidence: 0.79,
        };
        for _ in 0..20 {
            assert_eq!(stab.update(weak, now), None);
            assert_eq!(stab.update(Classification::NONE, now), None);
        }
        assert_eq!(stab.history().count(), 0);
    }

    #[test]
    fn test_gate_is_inclusive() {
        let mut stab = GestureStabilizer::default();
        let now = Instant::now();
        let borderline = Classification {
            gesture: Some(Gesture::Fine),
            confidence: 0.8,
        };
        let events: Vec<usize> = (0..10)
            .filter_map(|i| stab.update(borderline, now).map(|_| i))
            .collect();
        assert_eq!(events, vec![6]);
        assert_eq!(stab.count(Gesture::Fine), 10);
    }

    #[test]
    fn test_unrepresentable_debounce_falls_back_to_default() {
        let config: StabilizerConfig = serde_json::from_str(r#"{"debounce_secs": 1e39}"#).unwrap();
        assert!(config.debounce_secs.is_infinite());
        assert_eq!(config.debounce(), None);

        let mut stab = GestureStabilizer::new(config);
        let t0 = Instant::now();
        // Same cadence as the default: confirms at 600ms and again after 1s.
        let events = feed(&mut stab, Gesture::Hello, 18, t0, Duration::from_millis(100));
        assert_eq!(events, vec![(6, Gesture::Hello), (17, Gesture::Hello)]);
    }

    #[test]
    fn test_negative_debounce_clamps_to_zero() {
        let config = StabilizerConfig {
            debounce_secs: -3.0,
            ..StabilizerConfig::default()
        };
        assert_eq!(config.debounce(), Some(Duration::ZERO));
    }

    #[test]
    fn test_history_evicts_oldest() {
        let mut stab = GestureStabilizer::default();
        let now = Instant::now();
        stab.update(hit(Gesture::Help), now);
        for _ in 0..10 {
            stab.update(hit(Gesture::Fine), now);
        }
        assert_eq!(stab.history().count(), 10);
        assert_eq!(stab.count(Gesture::Help), 0);
    }

    #[test]
    fn test_debounce_suppresses_quick_repeat() {
        let mut stab = GestureStabilizer::default();
        let t0 = Instant::now();
        let step = Duration::from_millis(50);
        // Confirms at frame 6 (t0 + 300ms); following frames stay within 1s.
        let events = feed(&mut stab, Gesture::Hello, 20, t0, step);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_debounce_allows_repeat_after_interval() {
        let mut stab = GestureStabilizer::default();
        let t0 = Instant::now();
        let step = Duration::from_millis(100);
        // Confirms at frame 6 (600ms), again once more than 1s has passed (frame 17).
        let events = feed(&mut stab, Gesture::Hello, 18, t0, step);
        assert_eq!(events, vec![(6, Gesture::Hello), (17, Gesture::Hello)]);
    }

    #[test]
    fn test_new_gesture_confirms_immediately() {
        let mut stab = GestureStabilizer::default();
        let t0 = Instant::now();
        let step = Duration::from_millis(10);
        feed(&mut stab, Gesture::Hello, 10, t0, step);
        // Seven Fine frames push Hello down to three occurrences.
        let events = feed(&mut stab, Gesture::Fine, 7, t0 + step * 10, step);
        assert_eq!(events, vec![(6, Gesture::Fine)]);
    }

    #[test]
    fn test_full_window_keeps_majority_confirmable() {
        let mut stab = GestureStabilizer::default();
        let t0 = Instant::now();
        for g in [
            Gesture::Fine,
            Gesture::Help,
            Gesture::NotGood,
            Gesture::Hello,
            Gesture::Hello,
            Gesture::Hello,
            Gesture::Hello,
            Gesture::Hello,
            Gesture::Hello,
            Gesture::Hello,
        ] {
            stab.update(hit(g), t0);
        }
        assert_eq!(stab.count(Gesture::Hello), 7);
        // Evicts Fine, Hello count rises to 8 and is still due after the debounce.
        let later = t0 + Duration::from_secs(2);
        assert_eq!(stab.update(hit(Gesture::Hello), later), Some(Gesture::Hello));
    }
}
