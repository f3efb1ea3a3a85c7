//! Approach and shoot decisions.
//!
//! A decision is a pure function of the ball and the estimated goal direction. Rules are evaluated
//! in a fixed order and the first one that matches picks the action for the cycle.
use nidhogg::types::{Bearing, ClipId, normalize};
use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

use crate::{Error, Result};

/// Thresholds of the decision rules, distances in meters and angles in radians.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DecisionConfig {
    /// Below this ball distance the near rules apply, the far rules otherwise.
    pub near_range: f64,
    /// The ball is kicked when it is closer than this and the goal is aligned.
    pub shoot_range: f64,
    /// Near the ball, a ball bearing beyond this is corrected with a side step.
    pub lateral_tolerance: f64,
    /// Near the ball, a goal direction beyond this is corrected with a turn.
    pub alignment_tolerance: f64,
    /// Near the ball, a robot that is not aligned still takes short steps below this distance.
    pub short_advance_range: f64,
    /// Far from the ball, long strides are taken from this distance on.
    pub long_stride_range: f64,
    /// Maximum deviation of the blended approach direction from the ball bearing.
    pub blend_limit: f64,
    /// Relative directions beyond this are corrected with a 40 degree turn.
    pub small_turn: f64,
    /// Relative directions beyond this are corrected with a 60 degree turn.
    pub large_turn: f64,
    /// The goal counts as aligned when its direction is at most this far from zero.
    ///
    /// Zero only accepts an exactly aligned goal, which happens at the start and whenever turns
    /// cancel out exactly.
    pub aligned_epsilon: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            near_range: 0.22,
            shoot_range: 0.15,
            lateral_tolerance: 0.15,
            alignment_tolerance: 0.35,
            short_advance_range: 0.18,
            long_stride_range: 0.6,
            blend_limit: 0.5,
            small_turn: 0.3,
            large_turn: 0.7,
            aligned_epsilon: 0.0,
        }
    }
}

impl DecisionConfig {
    pub fn validate(&self) -> Result<()> {
        let thresholds = [
            self.near_range,
            self.shoot_range,
            self.lateral_tolerance,
            self.alignment_tolerance,
            self.short_advance_range,
            self.long_stride_range,
            self.blend_limit,
            self.small_turn,
            self.large_turn,
            self.aligned_epsilon,
        ];

        if thresholds
            .iter()
            .any(|threshold| !threshold.is_finite() || *threshold < 0.0)
        {
            return Err(Error::InvalidThresholds(
                "all thresholds must be finite and non-negative",
            ));
        }

        if self.small_turn > self.large_turn {
            return Err(Error::InvalidThresholds(
                "`small_turn` must not exceed `large_turn`",
            ));
        }

        if self.aligned_epsilon >= self.alignment_tolerance {
            return Err(Error::InvalidThresholds(
                "`aligned_epsilon` must be smaller than `alignment_tolerance`",
            ));
        }

        Ok(())
    }

    fn aligned(&self, goal_direction: f64) -> bool {
        goal_direction.abs() <= self.aligned_epsilon
    }
}

/// Everything a single decision is based on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionContext {
    pub ball_bearing: Bearing,
    pub ball_distance: f64,
    pub goal_direction: Bearing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    #[must_use]
    pub fn side_step(self) -> ClipId {
        match self {
            Side::Left => ClipId::SideStepLeft,
            Side::Right => ClipId::SideStepRight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Stride {
    Short,
    Long,
}

impl Stride {
    #[must_use]
    pub fn clip(self) -> ClipId {
        match self {
            Stride::Short => ClipId::Forwards,
            Stride::Long => ClipId::Forwards50,
        }
    }
}

/// The action chosen for a single control cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    Shoot,
    SideStep(Side),
    Turn(ClipId),
    Advance(Stride),
    /// Optionally turn towards the approach direction, then walk.
    Approach {
        turn: Option<ClipId>,
        stride: Stride,
    },
    /// Deliberately do nothing this cycle.
    Idle,
}

impl Action {
    /// The clips that perform this action, in playback order.
    pub fn clips(self) -> impl Iterator<Item = ClipId> {
        let (first, second) = match self {
            Action::Shoot => (Some(ClipId::Shoot), None),
            Action::SideStep(side) => (Some(side.side_step()), None),
            Action::Turn(turn) => (Some(turn), None),
            Action::Advance(stride) => (Some(stride.clip()), None),
            Action::Approach { turn, stride } => (turn, Some(stride.clip())),
            Action::Idle => (None, None),
        };

        first.into_iter().chain(second)
    }

    /// Name of the action kind, used to tally actions.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// The rule that produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Rule {
    /// Close to the ball and aligned with the goal.
    Shoot,
    /// Ball too far to the left.
    SideStepLeft,
    /// Ball too far to the right.
    SideStepRight,
    /// Goal too far to the left.
    TurnLeft,
    /// Goal too far to the right.
    TurnRight,
    /// Repeats [`Rule::Shoot`] and can never match after it.
    ShootFallback,
    /// Aligned with the goal, but not close enough to shoot.
    AlignedAdvance,
    /// Not aligned, but close enough that a short step does not lose the ball.
    ShortAdvance,
    /// Nothing applies near the ball.
    Hold,
    /// Far from the ball.
    Approach,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub rule: Rule,
    pub action: Action,
}

impl Decision {
    fn new(rule: Rule, action: Action) -> Self {
        Self { rule, action }
    }
}

/// Picks the action for a single cycle.
#[must_use]
pub fn decide(context: &DecisionContext, config: &DecisionConfig) -> Decision {
    if context.ball_distance < config.near_range {
        decide_near(context, config)
    } else {
        decide_far(context, config)
    }
}

// `Rule::ShootFallback` repeats the condition of `Rule::Shoot` and is unreachable.
#[allow(clippy::ifs_same_cond, clippy::same_functions_in_if_condition)]
fn decide_near(context: &DecisionContext, config: &DecisionConfig) -> Decision {
    let ball = context.ball_bearing.radians();
    let goal = context.goal_direction.radians();
    let distance = context.ball_distance;

    if distance < config.shoot_range && config.aligned(goal) {
        Decision::new(Rule::Shoot, Action::Shoot)
    } else if ball < -config.lateral_tolerance {
        Decision::new(Rule::SideStepLeft, Action::SideStep(Side::Left))
    } else if ball > config.lateral_tolerance {
        Decision::new(Rule::SideStepRight, Action::SideStep(Side::Right))
    } else if goal < -config.alignment_tolerance {
        Decision::new(Rule::TurnLeft, Action::Turn(ClipId::TurnLeft40))
    } else if goal > config.alignment_tolerance {
        Decision::new(Rule::TurnRight, Action::Turn(ClipId::TurnRight40))
    } else if distance < config.shoot_range && config.aligned(goal) {
        Decision::new(Rule::ShootFallback, Action::Shoot)
    } else if config.aligned(goal) {
        Decision::new(Rule::AlignedAdvance, Action::Advance(Stride::Long))
    } else if distance < config.short_advance_range {
        Decision::new(Rule::ShortAdvance, Action::Advance(Stride::Short))
    } else {
        Decision::new(Rule::Hold, Action::Idle)
    }
}

fn decide_far(context: &DecisionContext, config: &DecisionConfig) -> Decision {
    let ball = context.ball_bearing.radians();
    let blended = (context.ball_bearing - context.goal_direction).radians();

    let direction = normalize(if blended < ball - config.blend_limit {
        ball - config.blend_limit
    } else if blended > ball + config.blend_limit {
        ball + config.blend_limit
    } else {
        blended
    });

    let stride = if context.ball_distance >= config.long_stride_range {
        Stride::Long
    } else {
        Stride::Short
    };

    Decision::new(
        Rule::Approach,
        Action::Approach {
            turn: relative_turn(direction, config),
            stride,
        },
    )
}

/// The turn that brings a direction `angle` radians to the right closest to the front.
#[must_use]
pub fn relative_turn(angle: f64, config: &DecisionConfig) -> Option<ClipId> {
    if angle > config.large_turn {
        Some(ClipId::TurnRight60)
    } else if angle < -config.large_turn {
        Some(ClipId::TurnLeft60)
    } else if angle > config.small_turn {
        Some(ClipId::TurnRight40)
    } else if angle < -config.small_turn {
        Some(ClipId::TurnLeft40)
    } else {
        None
    }
}
