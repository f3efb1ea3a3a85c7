use std::time::Duration;

use nalgebra::{Isometry2, Point2, Vector2};
use nidhogg::{
    Motion, Perception, SimulationClock, Tick,
    types::{Bearing, ClipId, MotionClip},
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use serde_with::{DurationSecondsWithFrac, serde_as};

use crate::Pose;

/// Config of the simulated soccer field, its camera and its motion player.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct FieldConfig {
    /// Initial pose of the robot.
    pub robot: Pose,
    /// Initial position of the ball.
    pub ball: Point2<f64>,
    /// Center of the goal line the robot attacks.
    pub goal: Point2<f64>,
    /// Distance between the goal posts.
    pub goal_width: f64,
    pub half_length: f64,
    pub half_width: f64,

    /// Half of the horizontal opening angle of the camera, in radians.
    pub field_of_view: f64,
    /// Maximum distance at which the ball is detected.
    pub ball_range: f64,
    /// Maximum distance at which the goal is detected.
    pub goal_range: f64,
    /// Amplitude of the uniform noise added to detected bearings.
    pub bearing_noise: f64,
    /// Amplitude of the uniform noise added to the ball distance.
    pub distance_noise: f64,
    /// Probability that a visible object is not detected in a frame.
    pub dropout: f64,

    /// Head yaw positions visited by a head scan.
    pub head_scan_yaws: Vec<f64>,
    /// Time spent at each head scan position.
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub head_scan_step: Duration,

    /// Distance the ball ends up in front of the robot when it walks into it.
    pub push_gap: f64,
    /// Half width of the area in front of the feet that pushes the ball.
    pub foot_half_width: f64,
    /// Maximum ball distance for a kick to connect.
    pub kick_reach: f64,
    /// Maximum absolute ball bearing for a kick to connect.
    pub kick_cone: f64,
    /// How far a kicked ball rolls.
    pub kick_distance: f64,
    pub stop_after_goal: bool,

    /// Simulated time after which the simulation shuts down.
    #[serde_as(as = "Option<DurationSecondsWithFrac<f64>>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<Duration>,
    pub seed: u64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            robot: Pose::new(-1.5, 1.0, 0.3),
            ball: Point2::origin(),
            goal: Point2::new(4.5, 0.0),
            goal_width: 1.5,
            half_length: 4.5,
            half_width: 3.0,
            field_of_view: 0.53,
            ball_range: 4.0,
            goal_range: 10.0,
            bearing_noise: 0.0,
            distance_noise: 0.0,
            dropout: 0.0,
            head_scan_yaws: vec![0.5, 1.0, 0.5, 0.0, -0.5, -1.0, -0.5],
            head_scan_step: Duration::from_millis(300),
            push_gap: 0.1,
            foot_half_width: 0.1,
            kick_reach: 0.2,
            kick_cone: 0.35,
            kick_distance: 4.0,
            stop_after_goal: true,
            time_limit: Some(Duration::from_secs(600)),
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Frame {
    ball_bearing: Option<Bearing>,
    ball_distance: f64,
    goal_bearing: Option<Bearing>,
}

/// A humanoid, a ball and a goal on a flat field.
///
/// Motion clips are played by advancing the clock by the clip duration and then moving the robot
/// by the net displacement of the clip. A new camera frame is taken after every clock advance,
/// clip and head scan position.
pub struct SoccerField {
    pose: Isometry2<f64>,
    ball: Point2<f64>,
    rng: StdRng,
    config: FieldConfig,
    head_yaw: f64,
    time: Duration,
    goals: u32,
    shutdown: bool,
    frame: Frame,
}

impl SoccerField {
    #[must_use]
    pub fn new(config: FieldConfig) -> Self {
        let mut field = Self {
            pose: config.robot.isometry(),
            ball: config.ball,
            rng: StdRng::seed_from_u64(config.seed),
            config,
            head_yaw: 0.0,
            time: Duration::ZERO,
            goals: 0,
            shutdown: false,
            frame: Frame::default(),
        };
        field.observe();
        field
    }

    #[must_use]
    pub fn pose(&self) -> Pose {
        Pose::from(self.pose)
    }

    #[must_use]
    pub fn ball(&self) -> Point2<f64> {
        self.ball
    }

    /// Number of goals scored so far.
    #[must_use]
    pub fn goals(&self) -> u32 {
        self.goals
    }

    /// Simulated time since the start.
    #[must_use]
    pub fn time(&self) -> Duration {
        self.time
    }

    /// Bearing and distance of `target` relative to the body, ignoring the camera.
    fn body_relative(&self, target: &Point2<f64>) -> (Bearing, f64) {
        let local = self.pose.inverse_transform_point(target);

        (Bearing::new(-local.y.atan2(local.x)), local.coords.norm())
    }

    fn observe(&mut self) {
        let (ball_bearing, ball_distance) = self.body_relative(&self.ball);
        let (goal_bearing, goal_distance) = self.body_relative(&self.config.goal);

        let ball_seen = self.detects(ball_bearing, ball_distance, self.config.ball_range);
        let goal_seen = self.detects(goal_bearing, goal_distance, self.config.goal_range);

        let bearing_noise = self.config.bearing_noise;
        let distance_noise = self.config.distance_noise;

        self.frame.ball_distance = (ball_distance + self.jitter(distance_noise)).max(0.0);
        self.frame.ball_bearing = if ball_seen {
            Some(ball_bearing.rotated(self.jitter(bearing_noise)))
        } else {
            None
        };
        // the camera reports the goal relative to the head
        self.frame.goal_bearing = if goal_seen {
            Some(goal_bearing.rotated(self.head_yaw + self.jitter(bearing_noise)))
        } else {
            None
        };
    }

    fn detects(&mut self, body_bearing: Bearing, distance: f64, range: f64) -> bool {
        let in_view = (body_bearing.radians() + self.head_yaw).abs() <= self.config.field_of_view
            && distance <= range;

        in_view && !(self.config.dropout > 0.0 && self.rng.random_bool(self.config.dropout.min(1.0)))
    }

    fn jitter(&mut self, amplitude: f64) -> f64 {
        if amplitude > 0.0 {
            self.rng.random_range(-amplitude..=amplitude)
        } else {
            0.0
        }
    }

    fn elapse(&mut self, duration: Duration) {
        self.time += duration;

        if self.config.time_limit.is_some_and(|limit| self.time >= limit) {
            tracing::info!(time = ?self.time, "simulation time limit reached");
            self.shutdown = true;
        }
    }

    fn tick(&self) -> Tick {
        if self.shutdown {
            Tick::Shutdown
        } else {
            Tick::Continue
        }
    }

    fn walk(&mut self, clip: &MotionClip) {
        let local_ball = self.pose.inverse_transform_point(&self.ball);

        self.pose *= Isometry2::new(Vector2::new(clip.forward, clip.lateral), clip.turn);

        let walks_into_ball = clip.forward > 0.0
            && local_ball.x > 0.0
            && local_ball.y.abs() < self.config.foot_half_width
            && local_ball.x - clip.forward < self.config.push_gap;

        if walks_into_ball {
            self.ball = self.pose * Point2::new(self.config.push_gap, local_ball.y);
            self.keep_ball_on_field();
        }
    }

    fn kick(&mut self) {
        let (bearing, distance) = self.body_relative(&self.ball);
        if distance > self.config.kick_reach || bearing.radians().abs() > self.config.kick_cone {
            tracing::debug!(%bearing, distance, "kick missed the ball");
            return;
        }

        let start = self.ball;
        let end = start + self.pose.rotation * Vector2::new(self.config.kick_distance, 0.0);

        if self.crosses_goal(&start, &end) {
            self.goals += 1;
            self.ball = self.config.goal;
            tracing::info!(goals = self.goals, "goal scored");

            if self.config.stop_after_goal {
                self.shutdown = true;
            }
        } else {
            self.ball = end;
            self.keep_ball_on_field();
        }
    }

    fn crosses_goal(&self, start: &Point2<f64>, end: &Point2<f64>) -> bool {
        let goal = self.config.goal;
        let before = start.x - goal.x;
        let after = end.x - goal.x;

        if before * after > 0.0 || before == after {
            return false;
        }

        let t = before / (before - after);
        let y = start.y + t * (end.y - start.y);
        (y - goal.y).abs() <= self.config.goal_width / 2.0
    }

    fn keep_ball_on_field(&mut self) {
        self.ball.x = self
            .ball
            .x
            .clamp(-self.config.half_length, self.config.half_length);
        self.ball.y = self
            .ball
            .y
            .clamp(-self.config.half_width, self.config.half_width);
    }
}

impl Perception for SoccerField {
    fn ball_bearing(&self) -> Option<Bearing> {
        self.frame.ball_bearing
    }

    fn ball_distance(&self) -> f64 {
        self.frame.ball_distance
    }

    fn goal_bearing(&self) -> Option<Bearing> {
        self.frame.goal_bearing
    }

    fn head_yaw(&self) -> f64 {
        self.head_yaw
    }
}

impl Motion for SoccerField {
    fn play(&mut self, clip: &MotionClip) -> Tick {
        if self.shutdown {
            return Tick::Shutdown;
        }

        // the clips move every joint, including the head
        self.head_yaw = 0.0;
        self.elapse(clip.duration);

        if clip.id == ClipId::Shoot {
            self.kick();
        } else {
            self.walk(clip);
        }

        self.observe();
        self.tick()
    }

    fn head_scan(&mut self) -> Tick {
        for index in 0..self.config.head_scan_yaws.len() {
            if self.shutdown {
                return Tick::Shutdown;
            }

            self.head_yaw = self.config.head_scan_yaws[index];
            self.elapse(self.config.head_scan_step);
            self.observe();

            // keep looking at the ball once it is found
            if self.frame.ball_bearing.is_some() {
                return self.tick();
            }
        }

        self.head_yaw = 0.0;
        self.observe();
        self.tick()
    }

    fn get_up_if_necessary(&mut self) -> Tick {
        // robots on this field never fall
        self.tick()
    }
}

impl SimulationClock for SoccerField {
    fn advance(&mut self, step: Duration) -> Tick {
        if self.shutdown {
            return Tick::Shutdown;
        }

        self.elapse(step);
        self.observe();
        self.tick()
    }
}
