//! Scrape `LocalSettings.php` for the variables an import needs.
//!
//! ## Why scrape instead of parse?
//!
//! MediaWiki's configuration is an arbitrary PHP program; evaluating it is
//! out of the question and a real PHP parser would be absurd overkill for
//! the handful of `$wgSomething = 'value';` assignments a stock install
//! contains. A line scraper covers every LocalSettings.php generated by the
//! MediaWiki installer. Hand-written configuration that computes values
//! (string interpolation, concatenation) yields the raw right-hand side —
//! callers treat values containing `$` as unusable and fall back to
//! conventional paths (see [`MediaWikiSettings::get_path_like`]).

use crate::error::Mw2DokuError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The scraped contents of a `LocalSettings.php`.
#[derive(Debug, Clone)]
pub struct MediaWikiSettings {
    values: HashMap<String, String>,
    path: PathBuf,
}

impl MediaWikiSettings {
    /// Read and scrape a settings file.
    ///
    /// # Errors
    /// * [`Mw2DokuError::SettingsNotFound`] — no file at `path`
    /// * [`Mw2DokuError::SettingsUnreadable`] — file exists but cannot be read
    /// * [`Mw2DokuError::SettingsUnparseable`] — zero assignments scraped
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Mw2DokuError> {
        let path = path.as_ref();

        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Mw2DokuError::SettingsNotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => {
                return Err(Mw2DokuError::SettingsUnreadable {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        let values = scrape_assignments(&contents);
        if values.is_empty() {
            return Err(Mw2DokuError::SettingsUnparseable {
                path: path.to_path_buf(),
            });
        }

        debug!(
            "Scraped {} settings from {}",
            values.len(),
            path.display()
        );

        Ok(Self {
            values,
            path: path.to_path_buf(),
        })
    }

    /// The file the settings were scraped from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value of a scraped variable (key without the `$` sigil).
    ///
    /// # Errors
    /// [`Mw2DokuError::MissingSetting`] when the variable was not assigned.
    pub fn get(&self, key: &str) -> Result<&str, Mw2DokuError> {
        self.values
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| Mw2DokuError::MissingSetting {
                key: key.to_string(),
            })
    }

    /// Value of a variable, or `default` when it is absent.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.values.get(key).map(String::as_str).unwrap_or(default)
    }

    /// A scraped path value, usable only when it does not embed PHP
    /// interpolation.
    ///
    /// Installer-written files assign paths like `$wgUploadDirectory =
    /// "$IP/images";` — the scraped value still contains `$IP`, which means
    /// nothing outside PHP. Such values are rejected and the caller falls
    /// back to the conventional location.
    pub fn get_path_like(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(v) if !v.is_empty() && !v.contains('$') => Some(v),
            _ => None,
        }
    }
}

/// Pull `$variable = value;` pairs out of the file, one per line.
///
/// The value loses a trailing `;` and one pair of symmetric surrounding
/// quotes. Lines that are not assignments (conditionals, require statements,
/// comments) are skipped.
fn scrape_assignments(contents: &str) -> HashMap<String, String> {
    let mut values = HashMap::new();

    for line in contents.lines() {
        let line = line.trim_start();
        if !line.starts_with('$') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };

        let key = key.trim().trim_start_matches('$');
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            continue;
        }

        let value = value.trim().trim_end_matches(';').trim();
        values.insert(key.to_string(), unquote(value).to_string());
    }

    values
}

/// Strip one pair of matching surrounding quotes, if present.
fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}
