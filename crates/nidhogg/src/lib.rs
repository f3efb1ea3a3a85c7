//! Interfaces between the vidar controllers and the robots they run on.
//!
//! A controller never talks to a simulator directly. It reads perception, plays motion clips and
//! advances the simulation clock through the traits in this crate, so the same controller runs
//! against the kinematic simulation and against scripted test robots.
use std::time::Duration;

pub mod types;

use types::{Bearing, MotionClip, RatSensors, WheelCommand};

/// Result of anything that advances simulated time.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// A new frame is available.
    Continue,
    /// The simulator is shutting down, the controller should return.
    Shutdown,
}

impl Tick {
    #[must_use]
    pub fn is_shutdown(self) -> bool {
        self == Tick::Shutdown
    }
}

/// What the robot currently sees.
///
/// All values describe the most recent frame, repeated reads within a frame return the same
/// values.
pub trait Perception {
    /// Direction of the ball relative to the body, `None` if the ball is not visible.
    fn ball_bearing(&self) -> Option<Bearing>;

    /// Estimated distance to the ball. Only meaningful while the ball is visible.
    fn ball_distance(&self) -> f64;

    /// Direction of the goal relative to the head, `None` if the goal is not visible.
    fn goal_bearing(&self) -> Option<Bearing>;

    /// Current head yaw joint angle in radians, to the left is positive.
    fn head_yaw(&self) -> f64;
}

/// Blocking motion playback.
///
/// Every call returns only after the motion has finished, there is no way to interrupt a motion
/// that has started.
pub trait Motion {
    /// Plays a motion clip to completion.
    fn play(&mut self, clip: &MotionClip) -> Tick;

    /// Sweeps the head from side to side looking for the ball.
    fn head_scan(&mut self) -> Tick;

    /// Plays a stand-up motion if the robot has fallen, does nothing otherwise.
    fn get_up_if_necessary(&mut self) -> Tick;
}

/// The step clock of the simulator.
pub trait SimulationClock {
    /// Advances the simulation by `step`.
    fn advance(&mut self, step: Duration) -> Tick;
}

/// A humanoid that can be driven by the field player.
pub trait Nao: Perception + Motion + SimulationClock {}

impl<T: Perception + Motion + SimulationClock> Nao for T {}

/// A differential drive robot with proximity sensors and a battery.
pub trait RatBody: SimulationClock {
    /// Reads all sensors of the current frame.
    fn read(&self) -> RatSensors;

    /// Sets the wheel velocities, they are kept until the next command.
    fn drive(&mut self, command: WheelCommand);
}
