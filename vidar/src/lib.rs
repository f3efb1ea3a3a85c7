//! Reactive controllers for simulated robots.
//!
//! The [`control::FieldPlayer`] is a humanoid that searches for the ball, walks up to it and
//! shoots it at the goal using a small library of fixed motion clips. The [`rat`] controllers
//! drive wheeled robots along the walls of an arena.
pub mod behavior;
pub mod config;
pub mod control;
pub mod error;
pub mod motion;
pub mod rat;

pub use error::{Error, Result};
pub use nidhogg;

/// The vidar prelude conveniently includes commonly needed types and traits for writing and
/// testing controllers.
pub mod prelude {
    pub use crate::{
        Error, Result,
        behavior::{Action, Decision, DecisionConfig, DecisionContext, HeadingEstimator},
        config::{ConfigRoots, FieldPlayerConfig},
        control::{ExitReason, FieldPlayer, RunSummary},
        motion::{MotionLibrary, MotionLibraryConfig},
        rat::{RatConfig, RatController},
    };
    pub use nidhogg::{
        Motion, Nao, Perception, RatBody, SimulationClock, Tick,
        types::{Bearing, ClipId, MotionClip},
    };
    pub use odal::Config;
}
