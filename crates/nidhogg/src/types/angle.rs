use std::{
    f64::consts::{PI, TAU},
    fmt,
    ops::Sub,
};

/// Beyond this magnitude the angle is reduced with a remainder first, so the wrapping loops in
/// [`normalize`] stay short.
const REDUCE_LIMIT: f64 = 64.0 * PI;

/// Wraps an angle in radians into `(-π, π]`.
///
/// Angles that are already in range are returned unchanged, bit for bit. This makes the function
/// exactly idempotent and keeps sentinel values such as `0.0` intact. Non-finite angles are
/// returned as they are.
#[must_use]
pub fn normalize(angle: f64) -> f64 {
    if !angle.is_finite() {
        return angle;
    }

    let mut angle = if angle.abs() > REDUCE_LIMIT {
        angle.rem_euclid(TAU)
    } else {
        angle
    };

    while angle > PI {
        angle -= TAU;
    }
    while angle <= -PI {
        angle += TAU;
    }

    angle
}

/// A direction relative to the front of the robot, in radians.
///
/// Positive bearings lie to the right of the robot. Turning the body counter-clockwise by `Δθ`
/// increases the bearing of everything around it by `Δθ`. A bearing is always normalized into
/// `(-π, π]`; an unknown bearing is represented as `Option::<Bearing>::None` and never takes part
/// in arithmetic.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Bearing(f64);

impl Bearing {
    /// Creates a bearing from an angle in radians, normalizing it into `(-π, π]`.
    #[must_use]
    pub fn new(radians: f64) -> Self {
        Self(normalize(radians))
    }

    /// The bearing in radians.
    #[must_use]
    pub fn radians(self) -> f64 {
        self.0
    }

    /// The same direction as seen after the robot turned counter-clockwise by `delta` radians.
    #[must_use]
    pub fn rotated(self, delta: f64) -> Self {
        Self::new(self.0 + delta)
    }
}

impl Sub for Bearing {
    type Output = Bearing;

    fn sub(self, rhs: Bearing) -> Bearing {
        Bearing::new(self.0 - rhs.0)
    }
}

impl fmt::Display for Bearing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} rad", self.0)
    }
}
