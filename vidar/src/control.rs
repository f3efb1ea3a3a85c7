//! The field player control loop.
use std::collections::BTreeMap;

use nidhogg::{Nao, Tick};
use tracing::{debug, info, warn};

use crate::{
    Result,
    behavior::{
        BallSearch, Decision, DecisionContext, HeadingEstimator, SearchOutcome, decide, play_clip,
    },
    config::FieldPlayerConfig,
    motion::MotionLibrary,
};

/// What happened during a single cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    /// Outcome of the ball search, `None` if the simulator shut down before it started.
    pub search: Option<SearchOutcome>,
    pub context: Option<DecisionContext>,
    pub decision: Option<Decision>,
    pub tick: Tick,
}

impl CycleReport {
    fn shutdown(search: Option<SearchOutcome>) -> Self {
        Self {
            search,
            context: None,
            decision: None,
            tick: Tick::Shutdown,
        }
    }
}

/// Why [`FieldPlayer::run`] returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExitReason {
    #[default]
    Shutdown,
    CycleLimit,
}

/// Statistics of a complete run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    /// Number of times each kind of action was chosen.
    pub actions: BTreeMap<&'static str, u64>,
    pub search_passes: u64,
    pub exhausted_searches: u64,
    pub exit: ExitReason,
}

impl RunSummary {
    fn record(&mut self, report: &CycleReport) {
        self.cycles += 1;

        if let Some(search) = report.search {
            self.search_passes += u64::from(search.passes());
            if matches!(search, SearchOutcome::Exhausted { .. }) {
                self.exhausted_searches += 1;
            }
        }

        if let Some(decision) = report.decision {
            *self.actions.entry(decision.action.name()).or_default() += 1;
        }
    }
}

/// A soccer playing robot that searches for the ball, walks up to it and shoots it at the goal.
///
/// Every cycle advances the simulation by one step, searches for the ball until it is visible and
/// then plays the clips of a single decision to completion.
pub struct FieldPlayer<N: Nao> {
    nao: N,
    config: FieldPlayerConfig,
    library: MotionLibrary,
    search: BallSearch,
    heading: HeadingEstimator,
}

impl<N: Nao> FieldPlayer<N> {
    pub fn new(nao: N, config: FieldPlayerConfig, library: MotionLibrary) -> Result<Self> {
        config.decision.validate()?;

        Ok(Self {
            nao,
            search: BallSearch::new(config.search.clone()),
            config,
            library,
            heading: HeadingEstimator::new(),
        })
    }

    #[must_use]
    pub fn heading(&self) -> &HeadingEstimator {
        &self.heading
    }

    #[must_use]
    pub fn nao(&self) -> &N {
        &self.nao
    }

    /// Runs a single perceive, decide and act cycle.
    ///
    /// A fallen robot gets up before anything else, even when it can still see the ball.
    pub fn cycle(&mut self) -> CycleReport {
        if self.nao.advance(self.config.control.step).is_shutdown() {
            return CycleReport::shutdown(None);
        }

        self.heading.refresh(&self.nao);

        if self.nao.get_up_if_necessary().is_shutdown() {
            return CycleReport::shutdown(None);
        }
        self.heading.refresh(&self.nao);

        let search = self
            .search
            .run(&mut self.nao, &self.library, &mut self.heading);
        let ball_bearing = match (search, self.nao.ball_bearing()) {
            (SearchOutcome::Shutdown, _) => return CycleReport::shutdown(Some(search)),
            (_, Some(ball_bearing)) => ball_bearing,
            (_, None) => {
                return CycleReport {
                    search: Some(search),
                    context: None,
                    decision: None,
                    tick: Tick::Continue,
                };
            }
        };

        let context = DecisionContext {
            ball_bearing,
            ball_distance: self.nao.ball_distance(),
            goal_direction: self.heading.goal_direction(),
        };
        info!(
            ball_distance = context.ball_distance,
            ball_bearing = context.ball_bearing.radians(),
            goal_direction = context.goal_direction.radians(),
            "deciding"
        );

        let decision = decide(&context, &self.config.decision);
        debug!(rule = %decision.rule, action = decision.action.name(), "decided");

        let mut tick = Tick::Continue;
        for id in decision.action.clips() {
            tick = play_clip(&mut self.nao, &mut self.heading, self.library.clip(id));
            if tick.is_shutdown() {
                break;
            }
        }

        CycleReport {
            search: Some(search),
            context: Some(context),
            decision: Some(decision),
            tick,
        }
    }

    /// Runs cycles until the simulator shuts down or the configured cycle limit is reached.
    pub fn run(&mut self) -> RunSummary {
        let mut summary = RunSummary::default();

        loop {
            if self
                .config
                .control
                .max_cycles
                .is_some_and(|max| summary.cycles >= max)
            {
                summary.exit = ExitReason::CycleLimit;
                break;
            }

            let report = self.cycle();
            summary.record(&report);

            if report.tick.is_shutdown() {
                summary.exit = ExitReason::Shutdown;
                break;
            }
        }

        if summary.exhausted_searches > 0 {
            warn!(
                exhausted = summary.exhausted_searches,
                "the ball could not be found in some cycles"
            );
        }
        info!(cycles = summary.cycles, exit = ?summary.exit, "field player stopped");

        summary
    }
}

#[cfg(test)]
mod tests {
    use nidhogg::types::{ClipId, normalize};

    use super::*;
    use crate::{
        behavior::{
            Action, DecisionConfig, Rule, SearchConfig,
            testing::{Call, ScriptedNao},
        },
        config::ControlConfig,
    };

    fn player(nao: ScriptedNao, max_cycles: Option<u64>) -> FieldPlayer<ScriptedNao> {
        let config = FieldPlayerConfig {
            control: ControlConfig {
                max_cycles,
                ..ControlConfig::default()
            },
            ..FieldPlayerConfig::default()
        };

        FieldPlayer::new(nao, config, MotionLibrary::default()).unwrap()
    }

    #[test]
    fn invalid_thresholds_are_rejected() {
        let config = FieldPlayerConfig {
            decision: DecisionConfig {
                near_range: f64::NAN,
                ..DecisionConfig::default()
            },
            ..FieldPlayerConfig::default()
        };

        assert!(FieldPlayer::new(ScriptedNao::default(), config, MotionLibrary::default()).is_err());
    }

    #[test]
    fn cycle_advances_then_acts() {
        let mut player = player(ScriptedNao::seeing_ball(0.0, 0.10), None);
        let report = player.cycle();

        assert_eq!(report.decision.map(|decision| decision.rule), Some(Rule::Shoot));
        assert_eq!(report.search, Some(SearchOutcome::Visible));
        assert_eq!(
            player.nao().calls,
            vec![Call::Advance, Call::GetUp, Call::Play(ClipId::Shoot)]
        );
    }

    #[test]
    fn robot_gets_up_while_seeing_the_ball() {
        let mut player = player(ScriptedNao::seeing_ball(0.0, 1.0), None);
        let report = player.cycle();

        assert_eq!(report.search, Some(SearchOutcome::Visible));
        assert_eq!(player.nao().calls[..2], [Call::Advance, Call::GetUp]);
        assert!(player.nao().calls[2..].iter().all(|call| *call != Call::GetUp));
    }

    #[test]
    fn shutdown_while_getting_up_ends_the_cycle() {
        let nao = ScriptedNao {
            shutdown_after: Some(2),
            ..ScriptedNao::seeing_ball(0.0, 0.10)
        };
        let mut player = player(nao, None);
        let report = player.cycle();

        assert_eq!(report.tick, Tick::Shutdown);
        assert_eq!(report.search, None);
        assert_eq!(player.nao().calls, vec![Call::Advance, Call::GetUp]);
    }

    #[test]
    fn visible_goal_overwrites_the_turned_estimate() {
        let nao = ScriptedNao {
            goal: Some(0.9),
            head_yaw: 0.2,
            ..ScriptedNao::seeing_ball(0.0, 0.2)
        };
        let mut player = player(nao, None);

        // goal 0.7 to the right of the body, turns right and samples again afterwards
        let report = player.cycle();

        assert_eq!(
            report.decision.map(|decision| decision.action),
            Some(Action::Turn(ClipId::TurnRight40))
        );
        assert_eq!(player.heading().goal_direction().radians(), normalize(0.9 - 0.2));
    }

    #[test]
    fn unseen_goal_is_dead_reckoned() {
        let mut player = player(ScriptedNao::seeing_ball(0.0, 0.2), None);
        player.heading.apply_turn(-0.5);

        let report = player.cycle();

        assert_eq!(
            report.decision.map(|decision| decision.action),
            Some(Action::Turn(ClipId::TurnLeft40))
        );
        assert_eq!(
            player.heading().goal_direction().radians(),
            normalize(-0.5 + 0.693)
        );
    }

    #[test]
    fn far_approach_turns_then_walks() {
        let mut player = player(ScriptedNao::seeing_ball(-1.0, 1.0), None);
        let _ = player.cycle();

        assert_eq!(
            player.nao().calls,
            vec![
                Call::Advance,
                Call::GetUp,
                Call::Play(ClipId::TurnLeft60),
                Call::Play(ClipId::Forwards50),
            ]
        );
        assert_eq!(player.heading().goal_direction().radians(), 1.033);
    }

    #[test]
    fn exhausted_search_idles() {
        let config = FieldPlayerConfig {
            search: SearchConfig {
                max_attempts: Some(1),
            },
            control: ControlConfig {
                max_cycles: Some(2),
                ..ControlConfig::default()
            },
            ..FieldPlayerConfig::default()
        };
        let mut player =
            FieldPlayer::new(ScriptedNao::default(), config, MotionLibrary::default()).unwrap();

        let summary = player.run();

        assert_eq!(summary.exit, ExitReason::CycleLimit);
        assert_eq!(summary.cycles, 2);
        assert_eq!(summary.exhausted_searches, 2);
        assert_eq!(summary.search_passes, 2);
        assert!(summary.actions.is_empty());
    }

    #[test]
    fn run_stops_on_shutdown() {
        let nao = ScriptedNao {
            shutdown_after: Some(9),
            goal: Some(0.2),
            ..ScriptedNao::seeing_ball(0.0, 0.19)
        };
        let mut player = player(nao, None);
        let summary = player.run();

        assert_eq!(summary.exit, ExitReason::Shutdown);
        // every cycle holds, so only the clock and the get up are called
        assert_eq!(summary.cycles, 5);
        assert_eq!(summary.actions.get("advance"), None);
        assert_eq!(summary.actions.get("idle"), Some(&4));
    }

    #[test]
    fn run_respects_the_cycle_limit() {
        let mut player = player(ScriptedNao::seeing_ball(0.0, 1.0), Some(3));
        let summary = player.run();

        assert_eq!(summary.exit, ExitReason::CycleLimit);
        assert_eq!(summary.cycles, 3);
        assert_eq!(summary.actions.get("approach"), Some(&3));
    }
}
