use std::fmt;

use crate::geometry::distance;
use crate::types::{Hand, Point3D};

/// The closed set of gestures the classifier can name.
///
/// `ThankYou` has a phrase but no classification rule, so it is never produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    Hello,
    Fine,
    NotGood,
    Cool,
    Help,
    ThankYou,
}

impl Gesture {
    pub fn label(&self) -> &'static str {
        match self {
            Gesture::Hello => "Hello",
            Gesture::Fine => "Fine",
            Gesture::NotGood => "Not good",
            Gesture::Cool => "Cool",
            Gesture::Help => "Help",
            Gesture::ThankYou => "Thank you",
        }
    }

    /// Phrase spoken when the gesture is confirmed. `None` means stay silent.
    pub fn phrase(&self) -> Option<&'static str> {
        match self {
            Gesture::Hello => Some("Hello"),
            Gesture::Fine => Some("Fine"),
            Gesture::NotGood => Some("Not good"),
            Gesture::Cool => Some("Cool"),
            Gesture::Help => Some("Please help"),
            Gesture::ThankYou => Some("Thank You"),
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-frame classifier output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub gesture: Option<Gesture>,
    pub confidence: f32,
}

impl Classification {
    pub const NONE: Classification = Classification {
        gesture: None,
        confidence: 0.0,
    };

    pub fn detected(gesture: Gesture) -> Self {
        Self {
            gesture: Some(gesture),
            confidence: 1.0,
        }
    }
}

/// Thumb and index fingertip geometry the rules are evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct TipFeatures {
    pub thumb: Point3D,
    pub index: Point3D,
    pub spread: f32,
}

impl TipFeatures {
    pub fn from_hand(hand: &Hand) -> Self {
        let thumb = hand.thumb_tip();
        let index = hand.index_tip();
        Self {
            thumb,
            index,
            spread: distance(thumb, index),
        }
    }
}

type Rule = fn(&TipFeatures) -> bool;

fn spread_open(f: &TipFeatures) -> bool {
    f.spread > 0.10
}

fn thumb_above(f: &TipFeatures) -> bool {
    f.thumb.y < f.index.y
}

fn thumb_below(f: &TipFeatures) -> bool {
    f.thumb.y > f.index.y
}

fn spread_wide(f: &TipFeatures) -> bool {
    f.spread > 0.15
}

fn thumb_leading(f: &TipFeatures) -> bool {
    f.thumb.x < f.index.x
}

/// Rules in priority order. The first rule that holds names the gesture.
/// Rules overlap (any spread above 0.15 also satisfies Hello), so Cool is
/// shadowed by Hello.
pub const GESTURE_RULES: [(Gesture, Rule); 5] = [
    (Gesture::Hello, spread_open),
    (Gesture::Fine, thumb_above),
    (Gesture::NotGood, thumb_below),
    (Gesture::Cool, spread_wide),
    (Gesture::Help, thumb_leading),
];

/// Classify a single hand from its fingertip geometry.
pub fn classify_hand(hand: &Hand) -> Classification {
    let features = TipFeatures::from_hand(hand);
    GESTURE_RULES
        .iter()
        .find(|(_, rule)| rule(&features))
        .map(|(gesture, _)| Classification::detected(*gesture))
        .unwrap_or(Classification::NONE)
}

/// Only a single visible hand is classified; zero or several hands yield nothing.
pub fn classify_hands(hands: &[Hand]) -> Classification {
    match hands {
        [hand] => classify_hand(hand),
        _ => Classification::NONE,
    }
}
