use std::time::Duration;

use nalgebra::{Point2, Vector2};
use nidhogg::{
    RatBody, SimulationClock, Tick,
    types::{PROXIMITY_SENSORS, RatSensors, WheelCommand},
};
use serde::{Deserialize, Serialize};
use serde_with::{DurationSecondsWithFrac, serde_as};

use crate::Pose;

/// Mounting angles of the proximity sensors `ps0` to `ps7`, counter-clockwise from the front.
const SENSOR_ANGLES: [f64; PROXIMITY_SENSORS] = [-0.3, -0.8, -1.57, -2.64, 2.64, 1.57, 0.8, 0.3];

/// A circular pad that recharges the battery of a rat standing on it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Charger {
    pub center: Point2<f64>,
    pub radius: f64,
}

/// Config of the walled rat arena.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ArenaConfig {
    /// Half of the side length of the square arena.
    pub half_size: f64,
    pub start: Pose,
    pub body_radius: f64,
    pub wheel_radius: f64,
    pub axle_length: f64,
    /// Sensor value when touching a wall.
    pub sensor_gain: f64,
    /// Distance over which a sensor value decays by a factor `e`.
    pub sensor_decay: f64,
    pub battery_capacity: f64,
    /// Battery energy at the start, at most `battery_capacity`.
    pub start_battery: f64,
    /// Battery energy used per second while away from a charger.
    pub battery_drain: f64,
    /// Battery energy gained per second on a charger.
    pub battery_charge: f64,
    pub chargers: Vec<Charger>,
    #[serde_as(as = "Option<DurationSecondsWithFrac<f64>>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<Duration>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            half_size: 0.5,
            start: Pose::new(0.0, 0.0, 0.0),
            body_radius: 0.037,
            wheel_radius: 0.0205,
            axle_length: 0.052,
            sensor_gain: 4000.0,
            sensor_decay: 0.02,
            battery_capacity: 1000.0,
            start_battery: 1000.0,
            battery_drain: 5.0,
            battery_charge: 50.0,
            chargers: vec![
                Charger {
                    center: Point2::new(0.4, 0.4),
                    radius: 0.08,
                },
                Charger {
                    center: Point2::new(-0.4, -0.4),
                    radius: 0.08,
                },
            ],
            time_limit: Some(Duration::from_secs(120)),
        }
    }
}

/// A differential drive rat in a square arena.
pub struct Arena {
    config: ArenaConfig,
    position: Point2<f64>,
    yaw: f64,
    battery: f64,
    command: WheelCommand,
    time: Duration,
    shutdown: bool,
}

impl Arena {
    #[must_use]
    pub fn new(config: ArenaConfig) -> Self {
        Self {
            position: Point2::new(config.start.x, config.start.y),
            yaw: config.start.yaw,
            battery: config.start_battery.min(config.battery_capacity),
            command: WheelCommand::STOP,
            time: Duration::ZERO,
            shutdown: false,
            config,
        }
    }

    #[must_use]
    pub fn pose(&self) -> Pose {
        Pose::new(self.position.x, self.position.y, self.yaw)
    }

    #[must_use]
    pub fn battery(&self) -> f64 {
        self.battery
    }

    #[must_use]
    pub fn time(&self) -> Duration {
        self.time
    }

    #[must_use]
    pub fn on_charger(&self) -> bool {
        self.config
            .chargers
            .iter()
            .any(|charger| (self.position - charger.center).norm() <= charger.radius)
    }

    /// Distance from the body surface to the nearest wall along a ray at `angle` from the front.
    fn wall_distance(&self, angle: f64) -> f64 {
        let heading = self.yaw + angle;
        let direction = Vector2::new(heading.cos(), heading.sin());
        let half_size = self.config.half_size;

        let along = |position: f64, direction: f64| {
            if direction > 0.0 {
                (half_size - position) / direction
            } else if direction < 0.0 {
                (-half_size - position) / direction
            } else {
                f64::INFINITY
            }
        };

        let distance = along(self.position.x, direction.x).min(along(self.position.y, direction.y));
        (distance - self.config.body_radius).max(0.0)
    }
}

impl RatBody for Arena {
    fn read(&self) -> RatSensors {
        let mut distance = [0.0; PROXIMITY_SENSORS];
        for (value, angle) in distance.iter_mut().zip(SENSOR_ANGLES) {
            *value =
                self.config.sensor_gain * (-self.wall_distance(angle) / self.config.sensor_decay).exp();
        }

        RatSensors {
            distance,
            battery: self.battery,
        }
    }

    fn drive(&mut self, command: WheelCommand) {
        self.command = command;
    }
}

impl SimulationClock for Arena {
    fn advance(&mut self, step: Duration) -> Tick {
        if self.shutdown {
            return Tick::Shutdown;
        }

        let dt = step.as_secs_f64();
        self.time += step;

        if self.on_charger() {
            self.battery =
                (self.battery + self.config.battery_charge * dt).min(self.config.battery_capacity);
        } else {
            self.battery = (self.battery - self.config.battery_drain * dt).max(0.0);
        }

        // an empty battery no longer powers the motors
        if self.battery > 0.0 {
            let left = self.command.left * self.config.wheel_radius;
            let right = self.command.right * self.config.wheel_radius;
            let speed = (left + right) / 2.0;

            self.yaw += (right - left) / self.config.axle_length * dt;
            self.position += Vector2::new(self.yaw.cos(), self.yaw.sin()) * speed * dt;

            let limit = self.config.half_size - self.config.body_radius;
            self.position.x = self.position.x.clamp(-limit, limit);
            self.position.y = self.position.y.clamp(-limit, limit);
        }

        if self.config.time_limit.is_some_and(|limit| self.time >= limit) {
            self.shutdown = true;
            return Tick::Shutdown;
        }

        Tick::Continue
    }
}
