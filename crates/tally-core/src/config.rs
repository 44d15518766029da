//! # Kernel Configuration
//!
//! The few knobs of the kernel that differ between deployments.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Overrides (highest priority)                                       │
//! │     TALLY_CODES_DATED_WIDTH=5                                          │
//! │     TALLY_PHONE_COUNTRY_CODE=+20                                       │
//! │     ...read through a lookup the HOST passes in                        │
//! │                                                                         │
//! │  2. TOML document                                                      │
//! │     text the host loaded from wherever it keeps settings               │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The kernel never opens files or reads the process environment itself.
//! A host that wants environment overrides passes
//! `|key| std::env::var(key).ok()` to [`KernelConfig::apply_overrides`].
//!
//! ## Configuration File Format
//! ```toml
//! [codes]
//! dated_width = 4
//! undated_width = 6
//!
//! [phone]
//! mobile_pattern = "^01[0125][0-9]{8}$"
//! landline_pattern = "^0[2-9][0-9]{7,8}$"
//! country_code = "+20"
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, CoreResult};

/// Prefix of every override key.
pub const ENV_PREFIX: &str = "TALLY_";

/// Widest sequence padding accepted (fits any non-negative `i64`).
pub const MAX_SEQUENCE_WIDTH: usize = 18;

// =============================================================================
// Code Settings
// =============================================================================

/// Zero-padding of sequence numbers in business codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeConfig {
    /// Width when the code carries a date part (`INV-20240115-0001`).
    #[serde(default = "default_dated_width")]
    pub dated_width: usize,

    /// Width when it does not (`CUS-000042`).
    #[serde(default = "default_undated_width")]
    pub undated_width: usize,
}

fn default_dated_width() -> usize {
    4
}

fn default_undated_width() -> usize {
    6
}

impl Default for CodeConfig {
    fn default() -> Self {
        CodeConfig {
            dated_width: default_dated_width(),
            undated_width: default_undated_width(),
        }
    }
}

// =============================================================================
// Phone Settings
// =============================================================================

/// Local-market phone number shapes.
///
/// Numbers are normalized before matching: spaces, dashes, dots and
/// parentheses are dropped, and a leading international prefix
/// (`+20` / `0020`) is replaced by the trunk `0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneConfig {
    #[serde(default = "default_mobile_pattern")]
    pub mobile_pattern: String,

    #[serde(default = "default_landline_pattern")]
    pub landline_pattern: String,

    /// Country calling code including the `+`. Empty disables
    /// international-prefix normalization.
    #[serde(default = "default_country_code")]
    pub country_code: String,
}

fn default_mobile_pattern() -> String {
    "^01[0125][0-9]{8}$".to_string()
}

fn default_landline_pattern() -> String {
    "^0[2-9][0-9]{7,8}$".to_string()
}

fn default_country_code() -> String {
    "+20".to_string()
}

impl Default for PhoneConfig {
    fn default() -> Self {
        PhoneConfig {
            mobile_pattern: default_mobile_pattern(),
            landline_pattern: default_landline_pattern(),
            country_code: default_country_code(),
        }
    }
}

// =============================================================================
// Kernel Configuration
// =============================================================================

/// Complete kernel configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelConfig {
    #[serde(default)]
    pub codes: CodeConfig,

    #[serde(default)]
    pub phone: PhoneConfig,
}

impl KernelConfig {
    /// Parses and validates a TOML document. Missing keys take defaults.
    pub fn from_toml_str(contents: &str) -> CoreResult<Self> {
        let config: KernelConfig =
            toml::from_str(contents).map_err(|e| CoreError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes to TOML, e.g. to write out a starter settings file.
    pub fn to_toml_string(&self) -> CoreResult<String> {
        toml::to_string_pretty(self).map_err(|e| CoreError::InvalidConfig(e.to_string()))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CoreResult<()> {
        for (name, width) in [
            ("codes.dated_width", self.codes.dated_width),
            ("codes.undated_width", self.codes.undated_width),
        ] {
            if width == 0 || width > MAX_SEQUENCE_WIDTH {
                return Err(CoreError::InvalidConfig(format!(
                    "{} must be between 1 and {}, got {}",
                    name, MAX_SEQUENCE_WIDTH, width
                )));
            }
        }

        for (name, pattern) in [
            ("phone.mobile_pattern", &self.phone.mobile_pattern),
            ("phone.landline_pattern", &self.phone.landline_pattern),
        ] {
            Regex::new(pattern).map_err(|e| {
                CoreError::InvalidConfig(format!("{} does not compile: {}", name, e))
            })?;
        }

        let code = &self.phone.country_code;
        if !code.is_empty() {
            let digits = code.strip_prefix('+').unwrap_or("");
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                return Err(CoreError::InvalidConfig(format!(
                    "phone.country_code must look like +20, got '{}'",
                    code
                )));
            }
        }

        Ok(())
    }

    /// Applies `TALLY_*` overrides from a key lookup, then re-validates.
    ///
    /// Unparseable numeric overrides are reported, not ignored. An empty
    /// `TALLY_PHONE_COUNTRY_CODE` turns normalization off. On error `self`
    /// is left exactly as it was.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> CoreResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = |suffix: &str| format!("{}{}", ENV_PREFIX, suffix);
        let mut next = self.clone();

        for (suffix, slot) in [
            ("CODES_DATED_WIDTH", &mut next.codes.dated_width),
            ("CODES_UNDATED_WIDTH", &mut next.codes.undated_width),
        ] {
            if let Some(value) = lookup(&key(suffix)) {
                debug!(key = %key(suffix), value = %value, "Overriding code width");
                *slot = value.trim().parse().map_err(|_| {
                    CoreError::InvalidConfig(format!(
                        "{} must be a number, got '{}'",
                        key(suffix),
                        value
                    ))
                })?;
            }
        }

        if let Some(pattern) = lookup(&key("PHONE_MOBILE_PATTERN")) {
            next.phone.mobile_pattern = pattern;
        }
        if let Some(pattern) = lookup(&key("PHONE_LANDLINE_PATTERN")) {
            next.phone.landline_pattern = pattern;
        }
        if let Some(code) = lookup(&key("PHONE_COUNTRY_CODE")) {
            next.phone.country_code = code.trim().to_string();
        }

        next.validate()?;
        *self = next;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = KernelConfig::default();
        assert_eq!(config.codes.dated_width, 4);
        assert_eq!(config.codes.undated_width, 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_takes_defaults() {
        let config = KernelConfig::from_toml_str("[codes]\ndated_width = 5\n").unwrap();
        assert_eq!(config.codes.dated_width, 5);
        assert_eq!(config.codes.undated_width, 6);
        assert_eq!(config.phone, PhoneConfig::default());

        assert_eq!(KernelConfig::from_toml_str("").unwrap(), KernelConfig::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = KernelConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(KernelConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_documents() {
        assert!(matches!(
            KernelConfig::from_toml_str("[codes]\ndated_width = 0\n"),
            Err(CoreError::InvalidConfig(_))
        ));
        assert!(KernelConfig::from_toml_str("[codes]\nundated_width = 40\n").is_err());
        assert!(KernelConfig::from_toml_str("[phone]\nmobile_pattern = \"(\"\n").is_err());
        assert!(KernelConfig::from_toml_str("[phone]\ncountry_code = \"20\"\n").is_err());
        assert!(KernelConfig::from_toml_str("not toml at all = = =").is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TALLY_CODES_DATED_WIDTH", "5"),
            ("TALLY_PHONE_COUNTRY_CODE", ""),
        ]
        .into_iter()
        .collect();

        let mut config = KernelConfig::default();
        config
            .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.codes.dated_width, 5);
        assert_eq!(config.codes.undated_width, 6);
        assert!(config.phone.country_code.is_empty());
    }

    #[test]
    fn test_bad_override_is_reported() {
        let mut config = KernelConfig::default();
        let result = config.apply_overrides(|k| {
            (k == "TALLY_CODES_UNDATED_WIDTH").then(|| "six".to_string())
        });
        assert!(matches!(result, Err(CoreError::InvalidConfig(_))));
    }

    #[test]
    fn test_failed_override_leaves_config_unchanged() {
        let original = KernelConfig::default();

        // width parses, but the later pattern is invalid
        let vars: HashMap<&str, &str> = [
            ("TALLY_CODES_DATED_WIDTH", "9"),
            ("TALLY_PHONE_MOBILE_PATTERN", "("),
        ]
        .into_iter()
        .collect();
        let mut config = original.clone();
        let result = config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));
        assert!(matches!(result, Err(CoreError::InvalidConfig(_))));
        assert_eq!(config, original);

        // first width parses, second does not
        let vars: HashMap<&str, &str> = [
            ("TALLY_CODES_DATED_WIDTH", "7"),
            ("TALLY_CODES_UNDATED_WIDTH", "six"),
        ]
        .into_iter()
        .collect();
        let result = config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));
        assert!(result.is_err());
        assert_eq!(config, original);

        // width in range for the parser but not for validation
        let result = config.apply_overrides(|k| {
            (k == "TALLY_CODES_DATED_WIDTH").then(|| "0".to_string())
        });
        assert!(result.is_err());
        assert_eq!(config.codes.dated_width, original.codes.dated_width);
    }
}
