//! Engine settings
//!
//! Loaded from a TOML file. Every key is optional:
//!
//! ```toml
//! changes_only = true
//! status_db = "/var/lib/confrec/status.db"
//!
//! [placeholder]
//! prefix = "${"
//! suffix = "}"
//!
//! [logging]
//! profile = "production"
//! ```

#![allow(clippy::result_large_err)]

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use confrec_core::errors::{ExError, ExErrorKind};
use confrec_core::logging_facility::Profile;
use confrec_core::placeholder::PlaceholderSyntax;
use confrec_store::errors::{io_error, Result};
use serde::Deserialize;

pub const DEFAULT_STATUS_DB: &str = "confrec.db";

/// Settings for one engine instance
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSettings {
    pub placeholder: PlaceholderSyntax,
    /// Default for commands that do not choose a mode themselves
    pub changes_only: bool,
    pub logging: LoggingSettings,
    pub status_db: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    pub profile: Profile,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            placeholder: PlaceholderSyntax::default(),
            changes_only: false,
            logging: LoggingSettings::default(),
            status_db: PathBuf::from(DEFAULT_STATUS_DB),
        }
    }
}

impl EngineSettings {
    /// Parse settings from TOML text
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for unparsable TOML, unknown keys or empty
    /// placeholder delimiters.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: EngineSettings = toml::from_str(text).map_err(|e| {
            ExError::new(ExErrorKind::InvalidInput)
                .with_op("load_settings")
                .with_message(e.to_string())
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a file
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            let message = format!("Cannot read {}: {}", path.display(), e);
            io_error("load_settings", e).with_message(message)
        })?;
        Self::from_toml_str(&text)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults
    ///
    /// # Errors
    ///
    /// As [`load`](Self::load) for any failure other than a missing file.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match fs::metadata(path) {
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                Ok(Self::default())
            }
            _ => Self::load(path),
        }
    }

    fn validate(&self) -> Result<()> {
        self.placeholder.validate().map_err(|e| {
            ExError::new(ExErrorKind::InvalidInput)
                .with_op("load_settings")
                .with_message(e.to_string())
        })
    }
}
