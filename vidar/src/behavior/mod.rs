//! Field player behaviors.
//!
//! Everything in here is synchronous: a motion clip plays to completion before the next
//! perception read, and the [`HeadingEstimator`] is updated right after every turn.
pub mod decision;
pub mod heading;
pub mod search;

use nidhogg::{Nao, Tick, types::MotionClip};
use tracing::debug;

pub use decision::{Action, Decision, DecisionConfig, DecisionContext, Rule, Side, Stride, decide};
pub use heading::HeadingEstimator;
pub use search::{BallSearch, SearchConfig, SearchOutcome, SearchStep};

/// Plays `clip` to completion and brings the heading estimate up to date with the new frame.
///
/// A turning clip is dead-reckoned into the estimate first, a goal sample in the new frame then
/// overwrites it.
pub fn play_clip(nao: &mut impl Nao, heading: &mut HeadingEstimator, clip: &MotionClip) -> Tick {
    debug!(clip = %clip.id, turn = clip.turn, "playing motion clip");

    let tick = nao.play(clip);
    if clip.is_turn() {
        heading.apply_turn(clip.turn);
    }
    heading.refresh(&*nao);

    tick
}


#[cfg(test)]
mod tests {
    use nidhogg::types::ClipId;

    use super::{testing::ScriptedNao, *};
    use crate::motion::MotionLibrary;

    #[test]
    fn turning_clip_is_dead_reckoned() {
        let library = MotionLibrary::default();
        let mut nao = ScriptedNao::seeing_ball(0.0, 1.0);
        let mut heading = HeadingEstimator::new();

        let _ = play_clip(&mut nao, &mut heading, library.clip(ClipId::TurnRight40));

        assert_eq!(heading.goal_direction().radians(), -0.693);
    }

    #[test]
    fn goal_sample_after_a_turn_wins() {
        let library = MotionLibrary::default();
        let mut nao = ScriptedNao {
            goal: Some(0.2),
            head_yaw: 0.5,
            ..ScriptedNao::seeing_ball(0.0, 1.0)
        };
        let mut heading = HeadingEstimator::new();

        let _ = play_clip(&mut nao, &mut heading, library.clip(ClipId::TurnLeft60));

        assert_eq!(heading.goal_direction().radians(), 0.2 - 0.5);
    }

    #[test]
    fn straight_clip_leaves_the_estimate_alone() {
        let library = MotionLibrary::default();
        let mut nao = ScriptedNao::seeing_ball(0.0, 1.0);
        let mut heading = HeadingEstimator::new();

        let _ = play_clip(&mut nao, &mut heading, library.clip(ClipId::Forwards50));

        assert_eq!(heading.goal_direction().radians().to_bits(), 0.0_f64.to_bits());
    }
}
