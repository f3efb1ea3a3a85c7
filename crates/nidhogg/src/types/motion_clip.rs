use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{DurationSecondsWithFrac, serde_as};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// The pre-authored motion clips a field player can play.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
pub enum ClipId {
    Backwards,
    Forwards,
    Forwards50,
    TurnRight40,
    TurnLeft40,
    TurnRight60,
    TurnLeft60,
    TurnLeft180,
    SideStepRight,
    SideStepLeft,
    Shoot,
}

/// Immutable description of a motion clip.
///
/// A clip always plays to completion and always moves the robot by the same net displacement,
/// expressed in the robot frame at the start of the clip.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MotionClip {
    pub id: ClipId,
    /// Net rotation of the body in radians, counter-clockwise positive. Zero for clips that do
    /// not turn.
    #[serde(default)]
    pub turn: f64,
    /// Net forward displacement in meters.
    #[serde(default)]
    pub forward: f64,
    /// Net sideways displacement in meters, to the left is positive.
    #[serde(default)]
    pub lateral: f64,
    /// Playback duration of the clip.
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub duration: Duration,
}

impl MotionClip {
    #[must_use]
    pub fn new(id: ClipId, duration: Duration) -> Self {
        Self {
            id,
            turn: 0.0,
            forward: 0.0,
            lateral: 0.0,
            duration,
        }
    }

    #[must_use]
    pub fn with_turn(mut self, turn: f64) -> Self {
        self.turn = turn;
        self
    }

    #[must_use]
    pub fn with_displacement(mut self, forward: f64, lateral: f64) -> Self {
        self.forward = forward;
        self.lateral = lateral;
        self
    }

    /// Whether playing this clip rotates the body.
    #[must_use]
    pub fn is_turn(&self) -> bool {
        self.turn != 0.0
    }
}
