//! The library of motion clips available to the field player.
use std::{collections::HashMap, time::Duration};

use nidhogg::types::{ClipId, MotionClip};
use odal::Config;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::{Error, Result};

/// Config containing the static description of every motion clip.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MotionLibraryConfig {
    pub clips: Vec<MotionClip>,
}

impl Config for MotionLibraryConfig {
    const PATH: &'static str = "motions.toml";
}

impl Default for MotionLibraryConfig {
    fn default() -> Self {
        let clip = |id, seconds| MotionClip::new(id, Duration::from_secs_f64(seconds));

        Self {
            clips: vec![
                clip(ClipId::Backwards, 2.6).with_displacement(-0.06, 0.0),
                clip(ClipId::Forwards, 2.7).with_displacement(0.06, 0.0),
                clip(ClipId::Forwards50, 5.2).with_displacement(0.25, 0.0),
                // 39.7 degrees
                clip(ClipId::TurnRight40, 4.5).with_turn(-0.693),
                clip(ClipId::TurnLeft40, 4.5).with_turn(0.693),
                // 59.2 degrees
                clip(ClipId::TurnRight60, 5.0).with_turn(-1.033),
                clip(ClipId::TurnLeft60, 5.0).with_turn(1.033),
                // 163.6 degrees
                clip(ClipId::TurnLeft180, 15.0).with_turn(2.855),
                clip(ClipId::SideStepRight, 5.0).with_displacement(0.0, -0.05),
                clip(ClipId::SideStepLeft, 5.0).with_displacement(0.0, 0.05),
                clip(ClipId::Shoot, 4.0),
            ],
        }
    }
}

/// Read-only set of motion clips, containing exactly one clip for every [`ClipId`].
#[derive(Debug, Clone)]
pub struct MotionLibrary {
    clips: HashMap<ClipId, MotionClip>,
}

impl MotionLibrary {
    /// Builds a library from its config.
    ///
    /// Fails if a clip is missing or duplicated, if a displacement is not finite or if a turn clip
    /// turns the wrong way.
    pub fn new(config: MotionLibraryConfig) -> Result<Self> {
        let mut clips = HashMap::with_capacity(config.clips.len());

        for clip in config.clips {
            validate(&clip)?;

            let id = clip.id;
            if clips.insert(id, clip).is_some() {
                return Err(Error::DuplicateClip(id));
            }
        }

        if let Some(missing) = ClipId::iter().find(|id| !clips.contains_key(id)) {
            return Err(Error::MissingClip(missing));
        }

        Ok(Self { clips })
    }

    /// Returns the clip for `id`.
    #[must_use]
    pub fn clip(&self, id: ClipId) -> &MotionClip {
        // a library is complete by construction
        &self.clips[&id]
    }

    pub fn iter(&self) -> impl Iterator<Item = &MotionClip> {
        self.clips.values()
    }
}

impl Default for MotionLibrary {
    fn default() -> Self {
        Self {
            clips: MotionLibraryConfig::default()
                .clips
                .into_iter()
                .map(|clip| (clip.id, clip))
                .collect(),
        }
    }
}

fn validate(clip: &MotionClip) -> Result<()> {
    let invalid = |reason| {
        Err(Error::InvalidClip {
            id: clip.id,
            reason,
        })
    };

    if !(clip.turn.is_finite() && clip.forward.is_finite() && clip.lateral.is_finite()) {
        return invalid("displacement is not finite");
    }

    match clip.id {
        ClipId::TurnLeft40 | ClipId::TurnLeft60 | ClipId::TurnLeft180 if clip.turn <= 0.0 => {
            invalid("a left turn must have a positive turn angle")
        }
        ClipId::TurnRight40 | ClipId::TurnRight60 if clip.turn >= 0.0 => {
            invalid("a right turn must have a negative turn angle")
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_library_is_complete() {
        let library = MotionLibrary::new(MotionLibraryConfig::default()).unwrap();

        for id in ClipId::iter() {
            assert_eq!(library.clip(id).id, id);
        }
        assert_eq!(library.iter().count(), ClipId::iter().count());
    }

    #[test]
    fn only_turn_clips_rotate() {
        let library = MotionLibrary::default();

        let turning: Vec<_> = ClipId::iter()
            .filter(|id| library.clip(*id).is_turn())
            .collect();

        assert_eq!(
            turning,
            vec![
                ClipId::TurnRight40,
                ClipId::TurnLeft40,
                ClipId::TurnRight60,
                ClipId::TurnLeft60,
                ClipId::TurnLeft180,
            ]
        );
        assert_eq!(library.clip(ClipId::TurnRight60).turn, -1.033);
        assert_eq!(library.clip(ClipId::TurnLeft180).turn, 2.855);
    }

    #[test]
    fn missing_clip_is_rejected() {
        let mut config = MotionLibraryConfig::default();
        config.clips.retain(|clip| clip.id != ClipId::Shoot);

        assert!(matches!(
            MotionLibrary::new(config),
            Err(Error::MissingClip(ClipId::Shoot))
        ));
    }

    #[test]
    fn duplicate_clip_is_rejected() {
        let mut config = MotionLibraryConfig::default();
        config.clips.push(config.clips[0].clone());

        assert!(matches!(
            MotionLibrary::new(config),
            Err(Error::DuplicateClip(ClipId::Backwards))
        ));
    }

    #[test]
    fn turn_in_the_wrong_direction_is_rejected() {
        let mut config = MotionLibraryConfig::default();
        for clip in &mut config.clips {
            if clip.id == ClipId::TurnLeft40 {
                clip.turn = -0.693;
            }
        }

        assert!(matches!(
            MotionLibrary::new(config),
            Err(Error::InvalidClip {
                id: ClipId::TurnLeft40,
                ..
            })
        ));
    }

    #[test]
    fn config_parses_from_toml() {
        let config: MotionLibraryConfig = toml::from_str(
            r#"
            [[clips]]
            id = "TurnLeft40"
            turn = 0.693
            duration = 4.5

            [[clips]]
            id = "Shoot"
            duration = 4.0
            "#,
        )
        .unwrap();

        assert_eq!(config.clips.len(), 2);
        assert_eq!(config.clips[0].id, ClipId::TurnLeft40);
        assert_eq!(config.clips[0].duration, Duration::from_secs_f64(4.5));
        assert_eq!(config.clips[1].turn, 0.0);
    }
}
