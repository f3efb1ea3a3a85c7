//! Wall following rats.
//!
//! A rat is a small differential drive robot with eight proximity sensors `ps0` to `ps7` and a
//! battery sensor. Its controller has no state apart from the previous battery reading: a fixed
//! linear combination of the sensors is overridden by a few wall following rules, and the rat
//! stands still while its battery is recharging.
use std::{collections::BTreeMap, time::Duration};

use nidhogg::{
    RatBody,
    types::{PROXIMITY_SENSORS, RatSensors, WheelCommand},
};
use odal::Config;
use serde::{Deserialize, Serialize};
use serde_with::{DurationSecondsWithFrac, serde_as};
use strum::Display;
use tracing::{debug, info};

use crate::{Error, Result};

/// The side of the rat that is kept next to a wall.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
pub enum WallSide {
    Left,
    Right,
}

/// When the corner rule triggers.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Below,
    Above,
}

/// Steers away from a corner once `sensor` passes `threshold`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CornerRule {
    pub sensor: usize,
    pub threshold: f64,
    pub trigger: Trigger,
}

impl CornerRule {
    fn triggers(&self, distance: &[f64; PROXIMITY_SENSORS]) -> bool {
        match self.trigger {
            Trigger::Below => distance[self.sensor] < self.threshold,
            Trigger::Above => distance[self.sensor] > self.threshold,
        }
    }
}

/// All parameters of a single rat.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RatProfile {
    pub max_speed: f64,
    pub collision_avoidance_weights: [f64; PROXIMITY_SENSORS],
    pub slow_motion_weights: [f64; PROXIMITY_SENSORS],
    /// Sensor value of `ps3` or `ps4` above which the rat spins away from an obstacle.
    pub obstacle_threshold: f64,
    pub wall: WallSide,
    /// The sensor facing the followed wall.
    pub wall_sensor: usize,
    /// Wall sensor value above which the rat is close enough to the wall.
    pub wall_threshold: f64,
    pub corner: CornerRule,
    /// Factor from speed to wheel velocity, negative values drive the rat backwards.
    pub velocity_scale: f64,
    /// Whether the wall following rules override the weighted sensor sum.
    pub wall_following: bool,
}

impl RatProfile {
    /// The rat that follows the wall on its right.
    #[must_use]
    pub fn rat0() -> Self {
        Self {
            max_speed: 300.0,
            collision_avoidance_weights: [0.0, 0.0, 0.05, 0.02, -0.005, -0.005, -0.03, -0.06],
            slow_motion_weights: [0.0125, 0.00625, 0.0015, 0.0, 0.02, 0.0015, 0.00625, 0.0125],
            obstacle_threshold: 400.0,
            wall: WallSide::Right,
            wall_sensor: 2,
            wall_threshold: 200.0,
            corner: CornerRule {
                sensor: 3,
                threshold: 200.0,
                trigger: Trigger::Below,
            },
            velocity_scale: -0.00628,
            wall_following: true,
        }
    }

    /// The rat that follows the wall on its left.
    #[must_use]
    pub fn rat1() -> Self {
        Self {
            max_speed: 300.0,
            collision_avoidance_weights: [0.0, 0.0, 0.0, 0.03, 0.06, -0.015, -0.003, -0.06],
            slow_motion_weights: [0.0125, 0.00625, 0.0, 0.0, 0.0, 0.0, 0.00625, 0.0125],
            obstacle_threshold: 400.0,
            wall: WallSide::Left,
            wall_sensor: 5,
            wall_threshold: 200.0,
            corner: CornerRule {
                sensor: 4,
                threshold: 200.0,
                trigger: Trigger::Above,
            },
            velocity_scale: -0.00628,
            wall_following: true,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.wall_sensor >= PROXIMITY_SENSORS || self.corner.sensor >= PROXIMITY_SENSORS {
            return Err(Error::InvalidRatProfile("sensor index out of range"));
        }

        let values = [
            self.max_speed,
            self.obstacle_threshold,
            self.wall_threshold,
            self.corner.threshold,
            self.velocity_scale,
        ];
        if values
            .iter()
            .chain(&self.collision_avoidance_weights)
            .chain(&self.slow_motion_weights)
            .any(|value| !value.is_finite())
        {
            return Err(Error::InvalidRatProfile("all values must be finite"));
        }

        if self.max_speed <= 0.0 {
            return Err(Error::InvalidRatProfile("`max_speed` must be positive"));
        }

        Ok(())
    }
}

/// Config of the rat controllers.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RatConfig {
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub step: Duration,
    /// Stop after this many steps, run until shutdown if not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_steps: Option<u64>,
    pub profiles: BTreeMap<String, RatProfile>,
}

impl Config for RatConfig {
    const PATH: &'static str = "rat.toml";
}

impl Default for RatConfig {
    fn default() -> Self {
        Self {
            step: Duration::from_millis(32),
            max_steps: None,
            profiles: BTreeMap::from([
                ("rat0".to_owned(), RatProfile::rat0()),
                ("rat1".to_owned(), RatProfile::rat1()),
            ]),
        }
    }
}

impl RatConfig {
    pub fn profile(&self, name: &str) -> Result<&RatProfile> {
        self.profiles
            .get(name)
            .ok_or_else(|| Error::UnknownRatProfile(name.to_owned()))
    }
}

/// Controller for a single rat.
#[derive(Debug, Clone)]
pub struct RatController {
    profile: RatProfile,
    previous_battery: Option<f64>,
}

impl RatController {
    pub fn new(profile: RatProfile) -> Result<Self> {
        profile.validate()?;

        Ok(Self {
            profile,
            previous_battery: None,
        })
    }

    /// Computes the wheel command for the current sensor readings.
    pub fn step(&mut self, sensors: &RatSensors) -> WheelCommand {
        let (mut left, mut right) = if self.profile.wall_following {
            self.follow_wall(&sensors.distance)
        } else {
            self.weighted_sum(&sensors.distance)
        };

        // no reading before the first step, so the first step never halts
        if self
            .previous_battery
            .is_some_and(|previous| sensors.battery > previous)
        {
            (left, right) = (0.0, 0.0);
        }
        self.previous_battery = Some(sensors.battery);

        WheelCommand::new(
            self.profile.velocity_scale * left,
            self.profile.velocity_scale * right,
        )
    }

    fn weighted_sum(&self, distance: &[f64; PROXIMITY_SENSORS]) -> (f64, f64) {
        let profile = &self.profile;
        let mut left = profile.max_speed;
        let mut right = profile.max_speed;

        for ((value, slow), avoid) in distance
            .iter()
            .zip(profile.slow_motion_weights)
            .zip(profile.collision_avoidance_weights)
        {
            left -= (slow + avoid) * value;
            right -= (slow - avoid) * value;
        }

        (left, right)
    }

    fn follow_wall(&self, distance: &[f64; PROXIMITY_SENSORS]) -> (f64, f64) {
        let profile = &self.profile;
        let max = profile.max_speed;

        if distance[3] > profile.obstacle_threshold || distance[4] > profile.obstacle_threshold {
            return match profile.wall {
                WallSide::Right => (-max, max),
                WallSide::Left => (max, -max),
            };
        }

        if profile.corner.triggers(distance) {
            return match profile.wall {
                WallSide::Right => (max / 3.0, max),
                WallSide::Left => (max, max / 3.0),
            };
        }

        if distance[profile.wall_sensor] > profile.wall_threshold {
            (max, max)
        } else {
            match profile.wall {
                WallSide::Right => (max, max / 10.0),
                WallSide::Left => (max / 10.0, max),
            }
        }
    }
}

/// Drives `body` with `controller` until the simulator shuts down or `max_steps` is reached.
///
/// Returns the number of steps taken.
pub fn run(
    body: &mut impl RatBody,
    controller: &mut RatController,
    step: Duration,
    max_steps: Option<u64>,
) -> u64 {
    let mut steps = 0;

    while !max_steps.is_some_and(|max| steps >= max) {
        if body.advance(step).is_shutdown() {
            break;
        }

        let sensors = body.read();
        let command = controller.step(&sensors);
        debug!(distance = ?sensors.distance, battery = sensors.battery, ?command, "rat step");
        body.drive(command);

        steps += 1;
    }

    info!(steps, "rat stopped");
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensors(distance: [f64; PROXIMITY_SENSORS], battery: f64) -> RatSensors {
        RatSensors { distance, battery }
    }

    fn speeds(profile: &RatProfile, left: f64, right: f64) -> WheelCommand {
        WheelCommand::new(profile.velocity_scale * left, profile.velocity_scale * right)
    }

    #[test]
    fn default_profiles_are_valid() {
        let config = RatConfig::default();

        for name in ["rat0", "rat1"] {
            assert!(RatController::new(config.profile(name).unwrap().clone()).is_ok());
        }
        assert!(matches!(
            config.profile("rat2"),
            Err(Error::UnknownRatProfile(name)) if name == "rat2"
        ));
    }

    #[test]
    fn out_of_range_sensor_is_rejected() {
        let profile = RatProfile {
            wall_sensor: 8,
            ..RatProfile::rat0()
        };

        assert!(RatController::new(profile).is_err());
    }

    #[test]
    fn obstacle_spins_away_from_the_wall_side() {
        let mut distance = [0.0; PROXIMITY_SENSORS];
        distance[4] = 450.0;

        let rat0 = RatProfile::rat0();
        let mut controller = RatController::new(rat0.clone()).unwrap();
        assert_eq!(
            controller.step(&sensors(distance, 500.0)),
            speeds(&rat0, -300.0, 300.0)
        );

        let rat1 = RatProfile::rat1();
        let mut controller = RatController::new(rat1.clone()).unwrap();
        assert_eq!(
            controller.step(&sensors(distance, 500.0)),
            speeds(&rat1, 300.0, -300.0)
        );
    }

    #[test]
    fn close_to_the_wall_drives_straight() {
        let mut distance = [0.0; PROXIMITY_SENSORS];
        distance[2] = 300.0;
        distance[3] = 250.0;

        let rat0 = RatProfile::rat0();
        let mut controller = RatController::new(rat0.clone()).unwrap();

        assert_eq!(
            controller.step(&sensors(distance, 500.0)),
            speeds(&rat0, 300.0, 300.0)
        );
    }

    #[test]
    fn far_from_the_wall_curves_towards_it() {
        let rat1 = RatProfile::rat1();
        let mut controller = RatController::new(rat1.clone()).unwrap();

        assert_eq!(
            controller.step(&sensors([0.0; PROXIMITY_SENSORS], 500.0)),
            speeds(&rat1, 30.0, 300.0)
        );
    }

    #[test]
    fn corner_rule_overrides_the_wall_distance() {
        let rat0 = RatProfile::rat0();
        let mut controller = RatController::new(rat0.clone()).unwrap();

        // ps3 sees nothing, so rat0 is in a corner
        assert_eq!(
            controller.step(&sensors([0.0; PROXIMITY_SENSORS], 500.0)),
            speeds(&rat0, 100.0, 300.0)
        );

        let mut distance = [0.0; PROXIMITY_SENSORS];
        distance[4] = 250.0;
        distance[5] = 300.0;

        let rat1 = RatProfile::rat1();
        let mut controller = RatController::new(rat1.clone()).unwrap();
        assert_eq!(
            controller.step(&sensors(distance, 500.0)),
            speeds(&rat1, 300.0, 100.0)
        );
    }

    #[test]
    fn braitenberg_vehicle_without_wall_following() {
        let profile = RatProfile {
            wall_following: false,
            ..RatProfile::rat0()
        };
        let mut controller = RatController::new(profile.clone()).unwrap();

        assert_eq!(
            controller.step(&sensors([0.0; PROXIMITY_SENSORS], 500.0)),
            speeds(&profile, 300.0, 300.0)
        );

        let mut distance = [0.0; PROXIMITY_SENSORS];
        distance[7] = 100.0;
        let command = controller.step(&sensors(distance, 400.0));

        let expected = speeds(&profile, 304.75, 292.75);
        assert!((command.left - expected.left).abs() < 1e-9);
        assert!((command.right - expected.right).abs() < 1e-9);
    }

    #[test]
    fn rising_battery_halts_the_rat() {
        let distance = [0.0; PROXIMITY_SENSORS];
        let mut controller = RatController::new(RatProfile::rat1()).unwrap();

        // no previous reading
        assert_ne!(controller.step(&sensors(distance, 100.0)), WheelCommand::STOP);
        assert_eq!(controller.step(&sensors(distance, 101.0)), WheelCommand::STOP);
        assert_ne!(controller.step(&sensors(distance, 101.0)), WheelCommand::STOP);
        assert_ne!(controller.step(&sensors(distance, 99.0)), WheelCommand::STOP);
    }

    #[test]
    fn config_parses_from_toml() {
        let config: RatConfig = toml::from_str(
            r#"
            step = 0.032
            max_steps = 10

            [profiles.lefty]
            max_speed = 100.0
            collision_avoidance_weights = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
            slow_motion_weights = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
            obstacle_threshold = 400.0
            wall = "left"
            wall_sensor = 5
            wall_threshold = 200.0
            velocity_scale = 0.01
            wall_following = true
            corner = { sensor = 4, threshold = 200.0, trigger = "above" }
            "#,
        )
        .unwrap();

        let profile = config.profile("lefty").unwrap();
        assert_eq!(profile.wall, WallSide::Left);
        assert_eq!(profile.corner.trigger, Trigger::Above);
        assert_eq!(config.max_steps, Some(10));
    }
}
