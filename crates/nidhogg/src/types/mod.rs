//! Data types shared between the controllers and the robots they drive.
mod angle;
mod motion_clip;
mod rat;

pub use angle::{Bearing, normalize};
pub use motion_clip::{ClipId, MotionClip};
pub use rat::{PROXIMITY_SENSORS, RatSensors, WheelCommand};
