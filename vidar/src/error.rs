//! Result and Error types for the crate.
use miette::Diagnostic;
use nidhogg::types::ClipId;
use thiserror::Error;

/// Type alias for [`std::result::Result`] containing a vidar [`enum@Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while setting up a controller.
///
/// Once running, the controllers have no error path: unknown perception is a state, not an error.
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] odal::Error),

    #[error("the motion library has no clip `{0}`")]
    #[diagnostic(
        code(vidar::motion::missing_clip),
        help("every clip needs a `[[clips]]` entry in motions.toml")
    )]
    MissingClip(ClipId),

    #[error("motion clip `{0}` is defined more than once")]
    #[diagnostic(code(vidar::motion::duplicate_clip))]
    DuplicateClip(ClipId),

    #[error("motion clip `{id}` is invalid: {reason}")]
    #[diagnostic(code(vidar::motion::invalid_clip))]
    InvalidClip { id: ClipId, reason: &'static str },

    #[error("invalid decision thresholds: {0}")]
    #[diagnostic(code(vidar::decision::thresholds))]
    InvalidThresholds(&'static str),

    #[error("unknown rat profile `{0}`")]
    #[diagnostic(
        code(vidar::rat::unknown_profile),
        help("rat profiles are defined in rat.toml under `[profiles.<name>]`")
    )]
    UnknownRatProfile(String),

    #[error("rat profile is invalid: {0}")]
    #[diagnostic(code(vidar::rat::invalid_profile))]
    InvalidRatProfile(&'static str),
}
