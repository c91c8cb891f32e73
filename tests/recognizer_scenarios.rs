use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use hand_sign::announcer::{Announcer, Dispatch};
use hand_sign::gesture::{Classification, Gesture};
use hand_sign::pipeline::scripted_hand;
use hand_sign::recognizer::GestureRecognizer;
use hand_sign::speech::{SpeechEngine, SpeechError};
use hand_sign::stabilizer::GestureStabilizer;
use hand_sign::types::{Hand, Handedness};

struct RecordingSpeech {
    spoken: Sender<String>,
}

impl SpeechEngine for RecordingSpeech {
    fn name(&self) -> String {
        "recording".to_string()
    }

    fn speak(&mut self, text: &str) -> Result<(), SpeechError> {
        let _ = self.spoken.send(text.to_string());
        Ok(())
    }
}

fn recognizer() -> (GestureRecognizer, Receiver<String>) {
    let (tx, rx) = mpsc::channel();
    let announcer = Announcer::spawn(Box::new(RecordingSpeech { spoken: tx }), 8).unwrap();
    (GestureRecognizer::new(GestureStabilizer::default(), announcer), rx)
}

fn hello_hand() -> Hand {
    scripted_hand(0.0, (0.38, 0.50), (0.55, 0.32), (0.0, 0.0), Handedness::Right)
}

fn cool_hand() -> Hand {
    // Wide spread: both Cool and Hello hold, and Hello wins.
    scripted_hand(0.0, (0.30, 0.50), (0.60, 0.50), (0.0, 0.0), Handedness::Left)
}

/// Everything spoken once the worker has drained.
fn spoken(mut rec: GestureRecognizer, rx: Receiver<String>) -> Vec<String> {
    rec.shutdown();
    rx.try_iter().collect()
}

#[test]
fn ten_hello_frames_announce_once() {
    let (mut rec, rx) = recognizer();
    let t0 = Instant::now();
    let mut confirmations = Vec::new();

    for i in 0..10u32 {
        let out = rec.process(&[hello_hand()], t0 + Duration::from_millis(33) * i);
        assert_eq!(out.classification, Classification::detected(Gesture::Hello));
        if let Some(g) = out.confirmed {
            assert_eq!(out.dispatch, Some(Dispatch::Queued("Hello")));
            confirmations.push((i, g));
        }
    }

    assert_eq!(confirmations, vec![(6, Gesture::Hello)]);
    assert_eq!(rec.current(), Some(Gesture::Hello));
    assert_eq!(spoken(rec, rx), vec!["Hello".to_string()]);
}

#[test]
fn split_window_emits_nothing() {
    let (mut rec, rx) = recognizer();
    let t0 = Instant::now();
    let fine = scripted_hand(0.0, (0.47, 0.42), (0.50, 0.47), (0.0, 0.0), Handedness::Right);

    for i in 0..10u32 {
        let hand = if i < 5 { hello_hand() } else { fine.clone() };
        let out = rec.process(&[hand], t0 + Duration::from_millis(33) * i);
        assert_eq!(out.confirmed, None);
        assert_eq!(out.dispatch, None);
    }
    assert_eq!(rec.current(), None);
    assert!(spoken(rec, rx).is_empty());
}

#[test]
fn no_hands_never_announce() {
    let (mut rec, rx) = recognizer();
    let t0 = Instant::now();
    for i in 0..30u32 {
        let out = rec.process(&[], t0 + Duration::from_millis(33) * i);
        assert_eq!(out.classification, Classification::NONE);
        assert_eq!(out.confirmed, None);
    }
    assert!(spoken(rec, rx).is_empty());
}

#[test]
fn two_hands_are_ignored() {
    let (mut rec, rx) = recognizer();
    let t0 = Instant::now();
    for i in 0..30u32 {
        let out = rec.process(&[hello_hand(), cool_hand()], t0 + Duration::from_millis(33) * i);
        assert_eq!(out.classification, Classification::NONE);
    }
    assert_eq!(rec.current(), None);
    assert!(spoken(rec, rx).is_empty());
}

#[test]
fn dropouts_do_not_reset_history() {
    let (mut rec, rx) = recognizer();
    let t0 = Instant::now();
    let mut confirmed_at = None;
    // Hello every other frame; the empty frames are gated out.
    for i in 0..20u32 {
        let hands = if i % 2 == 0 { vec![cool_hand()] } else { Vec::new() };
        if let Some(g) = rec.process(&hands, t0 + Duration::from_millis(20) * i).confirmed {
            assert_eq!(g, Gesture::Hello);
            confirmed_at.get_or_insert(i);
        }
    }
    assert_eq!(confirmed_at, Some(12));
    assert_eq!(spoken(rec, rx), vec!["Hello".to_string()]);
}

#[test]
fn same_gesture_reannounced_after_debounce() {
    let (mut rec, rx) = recognizer();
    let t0 = Instant::now();
    let mut events = 0;
    for i in 0..10u32 {
        events += rec.process(&[hello_hand()], t0 + Duration::from_millis(10) * i).confirmed.is_some() as usize;
    }
    // Well past the one second debounce.
    let later = t0 + Duration::from_secs(3);
    events += rec.process(&[hello_hand()], later).confirmed.is_some() as usize;

    assert_eq!(events, 2);
    assert_eq!(spoken(rec, rx), vec!["Hello".to_string(), "Hello".to_string()]);
}
