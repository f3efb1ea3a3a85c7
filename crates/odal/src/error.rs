//! Result and Error types for the crate.
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Result containing an error variant from this module.
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration error variants
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// A config file could not be read or written.
    #[error("failed to access config file `{}`", path.display())]
    #[diagnostic(
        code(odal::io),
        help("is the config root correct? configs are looked up relative to the working directory")
    )]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// A config file is not valid TOML.
    #[error("failed to parse config file `{}`", path.display())]
    Parse {
        #[source]
        source: toml::de::Error,
        path: PathBuf,
    },

    /// The merged table does not match the config type, this wraps a [`toml::de::Error`]
    #[error(transparent)]
    #[diagnostic(code(odal::deserialize))]
    Deserialize(#[from] toml::de::Error),

    /// The config could not be turned into TOML, this wraps a [`toml::ser::Error`]
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),
}
