use nidhogg::{Nao, Tick, types::ClipId};
use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};
use tracing::{debug, warn};

use super::{HeadingEstimator, play_clip};
use crate::motion::MotionLibrary;

/// Config of the lost ball search.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Maximum number of full search passes per cycle, unbounded if not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
}

/// A single step of a search pass, in the order they are performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
pub enum SearchStep {
    GetUp,
    HeadScan,
    StepBack,
    SecondHeadScan,
    Reorient,
}

impl SearchStep {
    pub const SEQUENCE: [SearchStep; 5] = [
        SearchStep::GetUp,
        SearchStep::HeadScan,
        SearchStep::StepBack,
        SearchStep::SecondHeadScan,
        SearchStep::Reorient,
    ];
}

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The ball was already visible, nothing was done.
    Visible,
    /// The ball was seen right after `after`, during pass number `passes`.
    Found { passes: u32, after: SearchStep },
    /// The configured number of passes was used up without seeing the ball.
    Exhausted { passes: u32 },
    /// The simulator shut down during a search step.
    Shutdown,
}

impl SearchOutcome {
    /// Number of search passes that were started.
    #[must_use]
    pub fn passes(self) -> u32 {
        match self {
            SearchOutcome::Visible | SearchOutcome::Shutdown => 0,
            SearchOutcome::Found { passes, .. } | SearchOutcome::Exhausted { passes } => passes,
        }
    }

    #[must_use]
    pub fn ball_visible(self) -> bool {
        matches!(self, SearchOutcome::Visible | SearchOutcome::Found { .. })
    }
}

/// Looks for a ball that is not visible.
///
/// A pass gets up if necessary, scans with the head, steps back, scans again and finally turns
/// around. Visibility is checked after every step and the search ends at the first step after
/// which the ball is seen. Turning around also turns away from the goal, so it is fed into the
/// [`HeadingEstimator`] like any other turn.
#[derive(Debug, Clone, Default)]
pub struct BallSearch {
    config: SearchConfig,
}

impl BallSearch {
    #[must_use]
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn run(
        &self,
        nao: &mut impl Nao,
        library: &MotionLibrary,
        heading: &mut HeadingEstimator,
    ) -> SearchOutcome {
        if nao.ball_bearing().is_some() {
            return SearchOutcome::Visible;
        }

        let mut passes = 0;
        loop {
            if self.config.max_attempts.is_some_and(|max| passes >= max) {
                warn!(passes, "ball search exhausted");
                return SearchOutcome::Exhausted { passes };
            }
            passes += 1;

            for step in SearchStep::SEQUENCE {
                debug!(pass = passes, %step, "searching for the ball");

                if perform(step, nao, library, heading).is_shutdown() {
                    return SearchOutcome::Shutdown;
                }

                if nao.ball_bearing().is_some() {
                    debug!(pass = passes, %step, "found the ball");
                    return SearchOutcome::Found {
                        passes,
                        after: step,
                    };
                }
            }
        }
    }
}

fn perform(
    step: SearchStep,
    nao: &mut impl Nao,
    library: &MotionLibrary,
    heading: &mut HeadingEstimator,
) -> Tick {
    let clip = match step {
        SearchStep::StepBack => ClipId::Backwards,
        SearchStep::Reorient => ClipId::TurnLeft180,
        SearchStep::GetUp | SearchStep::HeadScan | SearchStep::SecondHeadScan => {
            let tick = if step == SearchStep::GetUp {
                nao.get_up_if_necessary()
            } else {
                nao.head_scan()
            };
            heading.refresh(&*nao);

            return tick;
        }
    };

    play_clip(nao, heading, library.clip(clip))
}

#[cfg(test)]
mod tests {
    use nidhogg::types::normalize;

    use super::*;
    use crate::behavior::testing::{Call, ScriptedNao};

    fn search(
        nao: &mut ScriptedNao,
        max_attempts: Option<u32>,
    ) -> (SearchOutcome, HeadingEstimator) {
        let library = MotionLibrary::default();
        let mut heading = HeadingEstimator::new();
        let outcome =
            BallSearch::new(SearchConfig { max_attempts }).run(nao, &library, &mut heading);

        (outcome, heading)
    }

    fn hidden_ball(after: usize) -> ScriptedNao {
        ScriptedNao {
            ball_after: Some(after),
            ..ScriptedNao::default()
        }
    }

    #[test]
    fn visible_ball_needs_no_search() {
        let mut nao = ScriptedNao::seeing_ball(0.1, 1.0);
        let (outcome, _) = search(&mut nao, None);

        assert_eq!(outcome, SearchOutcome::Visible);
        assert!(nao.calls.is_empty());
    }

    #[test]
    fn steps_run_in_order() {
        let mut nao = hidden_ball(7);
        let (outcome, _) = search(&mut nao, None);

        assert_eq!(
            nao.calls,
            vec![
                Call::GetUp,
                Call::HeadScan,
                Call::Play(ClipId::Backwards),
                Call::HeadScan,
                Call::Play(ClipId::TurnLeft180),
                Call::GetUp,
                Call::HeadScan,
            ]
        );
        assert_eq!(
            outcome,
            SearchOutcome::Found {
                passes: 2,
                after: SearchStep::HeadScan
            }
        );
    }

    #[test]
    fn search_stops_at_the_first_recheck() {
        for (after, step) in (1..).zip(SearchStep::SEQUENCE) {
            let mut nao = hidden_ball(after);
            let (outcome, _) = search(&mut nao, None);

            assert_eq!(nao.calls.len(), after);
            assert_eq!(outcome, SearchOutcome::Found { passes: 1, after: step });
        }
    }

    #[test]
    fn bounded_search_gives_up() {
        let mut nao = ScriptedNao::default();
        let (outcome, heading) = search(&mut nao, Some(2));

        assert_eq!(outcome, SearchOutcome::Exhausted { passes: 2 });
        assert_eq!(nao.calls.len(), 10);
        assert_eq!(
            heading.goal_direction().radians(),
            normalize(normalize(2.855) + 2.855)
        );
    }

    #[test]
    fn zero_attempts_does_nothing() {
        let mut nao = ScriptedNao::default();
        let (outcome, _) = search(&mut nao, Some(0));

        assert_eq!(outcome, SearchOutcome::Exhausted { passes: 0 });
        assert!(nao.calls.is_empty());
    }

    #[test]
    fn reorienting_moves_the_goal_estimate() {
        let mut nao = hidden_ball(5);
        let (outcome, heading) = search(&mut nao, None);

        assert_eq!(
            outcome,
            SearchOutcome::Found {
                passes: 1,
                after: SearchStep::Reorient
            }
        );
        assert_eq!(heading.goal_direction().radians(), 2.855);
    }

    #[test]
    fn shutdown_ends_the_search() {
        let mut nao = ScriptedNao {
            shutdown_after: Some(3),
            ..ScriptedNao::default()
        };
        let (outcome, _) = search(&mut nao, None);

        assert_eq!(outcome, SearchOutcome::Shutdown);
        assert_eq!(nao.calls.len(), 3);
    }
}
