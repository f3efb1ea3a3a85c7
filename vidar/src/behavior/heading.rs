use nidhogg::{Perception, types::Bearing};

/// Dead-reckoned estimate of the goal direction relative to the front of the body.
///
/// The estimate is replaced whenever the camera sees the goal, and adjusted by the angular effect
/// of every turn the robot makes in between. It starts at zero, assuming the robot faces the
/// goal.
///
/// There is no other source of truth between two goal sightings. A turn that is played without a
/// matching [`HeadingEstimator::apply_turn`] makes the estimate drift silently until the goal is
/// seen again.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HeadingEstimator {
    goal_direction: Bearing,
}

impl HeadingEstimator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The estimated goal direction relative to the body.
    #[must_use]
    pub fn goal_direction(&self) -> Bearing {
        self.goal_direction
    }

    /// Overwrites the estimate with a head-relative goal bearing seen at `head_yaw`.
    pub fn sample(&mut self, goal_bearing: Bearing, head_yaw: f64) {
        self.goal_direction = goal_bearing.rotated(-head_yaw);
    }

    /// Accounts for a body turn of `turn` radians, counter-clockwise positive.
    pub fn apply_turn(&mut self, turn: f64) {
        self.goal_direction = self.goal_direction.rotated(turn);
    }

    /// Samples the goal bearing of the current frame if the goal is visible.
    ///
    /// Returns whether the estimate was replaced.
    pub fn refresh(&mut self, perception: &impl Perception) -> bool {
        match perception.goal_bearing() {
            Some(goal_bearing) => {
                self.sample(goal_bearing, perception.head_yaw());
                true
            }
            None => false,
        }
    }
}
