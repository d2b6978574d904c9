//! Package file layout
//!
//! A package directory holds:
//!
//! - `config-definition.yaml` (required)
//! - `default-config.yaml` (optional)
//! - `local-config.yaml` (optional)
//! - `visibility.yaml` (produced and consumed by surrounding tooling; only
//!   its path is exposed here)

#![allow(clippy::result_large_err)]

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use confrec_core::model::ConfigSnapshots;

use crate::errors::{io_error, Result};
use crate::migrations::checksums::compute_checksum;

pub const CONFIG_DEFINITION_FILE: &str = "config-definition.yaml";
pub const DEFAULT_CONFIG_FILE: &str = "default-config.yaml";
pub const LOCAL_CONFIG_FILE: &str = "local-config.yaml";
pub const VISIBILITY_FILE: &str = "visibility.yaml";

/// Paths of one package's documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFiles {
    dir: PathBuf,
}

/// Raw text of a package's documents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageSources {
    pub definition: String,
    pub default: Option<String>,
    pub local: Option<String>,
}

impl PackageFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_definition(&self) -> PathBuf {
        self.dir.join(CONFIG_DEFINITION_FILE)
    }

    pub fn default_config(&self) -> PathBuf {
        self.dir.join(DEFAULT_CONFIG_FILE)
    }

    pub fn local_config(&self) -> PathBuf {
        self.dir.join(LOCAL_CONFIG_FILE)
    }

    pub fn visibility(&self) -> PathBuf {
        self.dir.join(VISIBILITY_FILE)
    }

    /// Read every document of the package
    ///
    /// # Errors
    ///
    /// Returns an `Io` error if the definition is missing or any present file
    /// cannot be read.
    pub fn read(&self) -> Result<PackageSources> {
        let definition_path = self.config_definition();
        let definition = fs::read_to_string(&definition_path).map_err(|e| {
            let message = format!("Cannot read {}: {}", definition_path.display(), e);
            io_error("read_package", e).with_message(message)
        })?;

        let sources = PackageSources {
            definition,
            default: read_optional(&self.default_config())?,
            local: read_optional(&self.local_config())?,
        };
        tracing::debug!(
            dir = %self.dir.display(),
            digest = %sources.digest(),
            "read package documents"
        );
        Ok(sources)
    }
}

impl PackageSources {
    /// Snapshot texts for a status record
    pub fn snapshots(&self) -> ConfigSnapshots {
        ConfigSnapshots {
            local: self.local.clone(),
            default: self.default.clone(),
            definition: Some(self.definition.clone()),
        }
    }

    /// SHA-256 over all documents, stable for identical content
    pub fn digest(&self) -> String {
        let mut canonical = String::new();
        for (label, text) in [
            (CONFIG_DEFINITION_FILE, Some(self.definition.as_str())),
            (DEFAULT_CONFIG_FILE, self.default.as_deref()),
            (LOCAL_CONFIG_FILE, self.local.as_deref()),
        ] {
            canonical.push_str(label);
            canonical.push('\n');
            if let Some(text) = text {
                canonical.push_str(&compute_checksum(text));
            }
            canonical.push('\n');
        }
        compute_checksum(&canonical)
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_error("read_package", e)),
    }
}
