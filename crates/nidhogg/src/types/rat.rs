/// Number of proximity sensors around an e-puck body, `ps0` to `ps7`.
pub const PROXIMITY_SENSORS: usize = 8;

/// One reading of all rat sensors.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RatSensors {
    /// Raw proximity values, higher means closer.
    pub distance: [f64; PROXIMITY_SENSORS],
    /// Remaining battery energy.
    pub battery: f64,
}

/// Wheel velocities in radians per second.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WheelCommand {
    pub left: f64,
    pub right: f64,
}

impl WheelCommand {
    pub const STOP: WheelCommand = WheelCommand {
        left: 0.0,
        right: 0.0,
    };

    #[must_use]
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }
}
