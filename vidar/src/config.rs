//! Configuration of the vidar controllers.
//!
//! Configs are read from a main config root, usually `./config/`, and optionally merged with the
//! overlay of a single robot in `./config/overlay/<robot>/`.
use std::{path::PathBuf, time::Duration};

use odal::Config;
use serde::{Deserialize, Serialize};
use serde_with::{DurationSecondsWithFrac, serde_as};

use crate::{
    Result,
    behavior::{DecisionConfig, SearchConfig},
};

/// Config of the control loop itself.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ControlConfig {
    /// Simulated time advanced at the start of every cycle.
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub step: Duration,
    /// Stop after this many cycles, run until shutdown if not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cycles: Option<u64>,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            step: Duration::from_millis(40),
            max_cycles: None,
        }
    }
}

/// Config of the field player.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FieldPlayerConfig {
    pub control: ControlConfig,
    pub decision: DecisionConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

impl Config for FieldPlayerConfig {
    const PATH: &'static str = "field_player.toml";
}

/// Where configs are loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRoots {
    pub main: PathBuf,
    pub overlay: Option<PathBuf>,
}

impl ConfigRoots {
    /// Config roots for `robot`, whose overlay lives in `<main>/overlay/<robot>/`.
    pub fn new(main: impl Into<PathBuf>, robot: Option<&str>) -> Self {
        let main = main.into();
        let overlay = robot.map(|robot| main.join("overlay").join(robot));

        Self { main, overlay }
    }

    /// Loads a config, merged with the robot overlay if there is one.
    pub fn load<T: Config>(&self) -> Result<T> {
        let config = match &self.overlay {
            Some(overlay) => T::load_with_overlay(&self.main, overlay)?,
            None => T::load(&self.main)?,
        };

        Ok(config)
    }
}
