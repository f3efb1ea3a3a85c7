//! Configuration files with per-robot overlays.
//!
//! Every config type lives in a single TOML file at `<root>/<Config::PATH>`. A robot can carry an
//! overlay file at the same relative path inside its own overlay root, e.g.
//! `config/overlay/<robot>/field_player.toml`. Overlay keys replace the keys of the main file,
//! sub-tables are merged key by key.
use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};
use toml::{Table, Value};

mod error;

pub use error::{Error, Result};

/// A configuration that can be loaded from (and stored to) a TOML file.
pub trait Config: Serialize + DeserializeOwned {
    /// Path of the config file, relative to a config root.
    const PATH: &'static str;

    /// Loads the config from `<root>/<PATH>`.
    fn load(root: impl AsRef<Path>) -> Result<Self> {
        let main = read_table(&root.as_ref().join(Self::PATH))?;

        Ok(main.try_into()?)
    }

    /// Loads the config from `<root>/<PATH>` with `<overlay_root>/<PATH>` merged over it.
    ///
    /// A missing overlay file is not an error, most robots do not override anything.
    fn load_with_overlay(root: impl AsRef<Path>, overlay_root: impl AsRef<Path>) -> Result<Self> {
        let main = read_table(&root.as_ref().join(Self::PATH))?;
        let overlay_path = overlay_root.as_ref().join(Self::PATH);

        if !overlay_path.exists() {
            return Ok(main.try_into()?);
        }

        let overlay = read_table(&overlay_path)?;
        Ok(merge_tables(main, overlay).try_into()?)
    }

    /// Writes the complete config to `<root>/<PATH>`.
    fn store(&self, root: impl AsRef<Path>) -> Result<()> {
        write_table(&root.as_ref().join(Self::PATH), &Table::try_from(self)?)
    }

    /// Writes only the values that differ from `main` to `<overlay_root>/<PATH>`.
    fn save_as_overlay(&self, main: &Self, overlay_root: impl AsRef<Path>) -> Result<()> {
        let diff = extract_diff(&Table::try_from(main)?, &Table::try_from(self)?);

        write_table(&overlay_root.as_ref().join(Self::PATH), &diff)
    }
}

/// Merges `overlay` over `main`.
///
/// Sub-tables present in both are merged recursively, any other value in `overlay` replaces the
/// one in `main`. Keys that only exist in `overlay` are added.
#[must_use]
pub fn merge_tables(main: Table, mut overlay: Table) -> Table {
    let mut merged = Table::new();

    for (key, value) in main {
        let merged_value = match (value, overlay.remove(&key)) {
            (Value::Table(main_table), Some(Value::Table(overlay_table))) => {
                Value::Table(merge_tables(main_table, overlay_table))
            }
            (_, Some(overlay_value)) => overlay_value,
            (main_value, None) => main_value,
        };

        merged.insert(key, merged_value);
    }

    // whatever is left only exists in the overlay
    merged.extend(overlay);
    merged
}

/// Returns the smallest table that turns `main` into `changed` when merged with [`merge_tables`].
///
/// Keys that exist in `main` but not in `changed` cannot be expressed as an overlay and are
/// ignored.
#[must_use]
pub fn extract_diff(main: &Table, changed: &Table) -> Table {
    let mut diff = Table::new();

    for (key, changed_value) in changed {
        match (main.get(key), changed_value) {
            (Some(Value::Table(main_table)), Value::Table(changed_table)) => {
                let nested = extract_diff(main_table, changed_table);
                if !nested.is_empty() {
                    diff.insert(key.clone(), Value::Table(nested));
                }
            }
            (Some(main_value), _) if main_value == changed_value => {}
            _ => {
                diff.insert(key.clone(), changed_value.clone());
            }
        }
    }

    diff
}

fn read_table(path: &Path) -> Result<Table> {
    let contents = fs::read_to_string(path).map_err(|source| Error::Io {
        source,
        path: path.to_path_buf(),
    })?;

    contents.parse().map_err(|source| Error::Parse {
        source,
        path: path.to_path_buf(),
    })
}

fn write_table(path: &Path, table: &Table) -> Result<()> {
    let io_error = |source| Error::Io {
        source,
        path: PathBuf::from(path),
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    fs::write(path, toml::to_string_pretty(table)?).map_err(io_error)
}
