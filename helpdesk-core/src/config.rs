//! Process-wide client configuration
//!
//! The mapper consumes a single configuration object for the few settings it
//! needs itself: the date and datetime rendering formats used by date-valued
//! accessors, and a debug flag transport implementors may consult. Base URL
//! and credentials belong to the transport collaborator, not to this core.

use serde::{Deserialize, Serialize};
use std::sync::RwLock;

use crate::{Error, Result};

/// Default rendering format for date-valued fields (chrono syntax)
pub const DEFAULT_DATE_FORMAT: &str = "%m/%d/%Y";

/// Default rendering format for timestamp-valued fields (chrono syntax)
pub const DEFAULT_DATETIME_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Client configuration consumed by the mapping core
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Format used when rendering date fields without an explicit format
    pub date_format: String,
    /// Format used when rendering timestamp fields without an explicit format
    pub datetime_format: String,
    /// Enables request-level debug output in transport implementations
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
            debug: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the date rendering format
    pub fn with_date_format<S: Into<String>>(mut self, format: S) -> Self {
        self.date_format = format.into();
        self
    }

    /// Set the datetime rendering format
    pub fn with_datetime_format<S: Into<String>>(mut self, format: S) -> Self {
        self.datetime_format = format.into();
        self
    }

    /// Set the debug flag
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Install this configuration as the process-wide configuration
    pub fn install(self) -> Result<()> {
        let mut slot = GLOBAL
            .write()
            .map_err(|_| Error::config("configuration slot is poisoned"))?;
        *slot = Some(self);
        Ok(())
    }

    /// Return the process-wide configuration, or the defaults if none was installed
    pub fn global() -> Config {
        match GLOBAL.read() {
            Ok(slot) => slot.clone().unwrap_or_default(),
            Err(poisoned) => poisoned.into_inner().clone().unwrap_or_default(),
        }
    }

    /// Clear the process-wide configuration, reverting to the defaults
    pub fn reset_global() {
        if let Ok(mut slot) = GLOBAL.write() {
            *slot = None;
        }
    }
}

static GLOBAL: RwLock<Option<Config>> = RwLock::new(None);

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_builder_style_updates() {
        let config = Config::new()
            .with_date_format("%Y-%m-%d")
            .with_datetime_format("%Y-%m-%d %H:%M")
            .with_debug(true);
        assert_eq!(config.date_format, "%Y-%m-%d");
        assert_eq!(config.datetime_format, "%Y-%m-%d %H:%M");
        assert!(config.debug);
    }

    #[test]
    #[serial]
    fn test_global_defaults_when_not_installed() {
        Config::reset_global();
        let config = Config::global();
        assert_eq!(config.date_format, DEFAULT_DATE_FORMAT);
        assert_eq!(config.datetime_format, DEFAULT_DATETIME_FORMAT);
        assert!(!config.debug);
    }

    #[test]
    #[serial]
    fn test_install_and_read_global() {
        Config::new()
            .with_date_format("%d.%m.%Y")
            .install()
            .unwrap();
        assert_eq!(Config::global().date_format, "%d.%m.%Y");
        Config::reset_global();
    }
}
