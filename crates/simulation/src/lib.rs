//! Kinematic simulation of the collaborators the vidar controllers talk to.
//!
//! [`SoccerField`] stands in for a humanoid on a soccer field: a camera that reports the ball and
//! the goal, a motion player that moves the robot by the net displacement of each clip and a step
//! clock. [`Arena`] does the same for a wheeled rat in a walled arena with charging pads.
//!
//! Neither is a physics engine, robots are moved kinematically and the ball only moves when it is
//! pushed or kicked.
use nalgebra::{Isometry2, Vector2};
use odal::Config;
use serde::{Deserialize, Serialize};

pub mod arena;
pub mod field;

pub use arena::{Arena, ArenaConfig, Charger};
pub use field::{FieldConfig, SoccerField};

/// Config for both simulated worlds.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    pub field: FieldConfig,
    pub arena: ArenaConfig,
}

impl Config for SimulationConfig {
    const PATH: &'static str = "simulation.toml";
}

/// A planar pose, `yaw` is counter-clockwise from the x axis.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
}

impl Pose {
    #[must_use]
    pub fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self { x, y, yaw }
    }

    #[must_use]
    pub fn isometry(&self) -> Isometry2<f64> {
        Isometry2::new(Vector2::new(self.x, self.y), self.yaw)
    }
}

impl From<Isometry2<f64>> for Pose {
    fn from(isometry: Isometry2<f64>) -> Self {
        Self {
            x: isometry.translation.x,
            y: isometry.translation.y,
            yaw: isometry.rotation.angle(),
        }
    }
}
