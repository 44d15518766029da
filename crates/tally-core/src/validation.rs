//! # Validation Module
//!
//! Field-shape checks shared by the kernel and the host's input layer.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend forms                                               │
//! │  └── same predicates, via the host, for immediate feedback             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── bool predicates (is_valid_email, is_valid_date_range, ...)        │
//! │  └── typed validators returning ValidationError (validate_code_prefix) │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Calculation functions                                        │
//! │  └── their own typed errors (NegativeQuantity, StateMismatch, ...)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::config::PhoneConfig;
use crate::error::{CoreError, CoreResult, ValidationError};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^[A-Za-z0-9._%+-]+@",
        r"[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?",
        r"(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*",
        r"\.[A-Za-z]{2,}$",
    ))
    .expect("email pattern is a valid regex")
});

static DEFAULT_PHONE: LazyLock<PhoneValidator> = LazyLock::new(|| {
    PhoneValidator::from_config(&PhoneConfig::default())
        .expect("default phone patterns are valid regexes")
});

// =============================================================================
// Text Predicates
// =============================================================================

/// Checks the shape `local@domain.tld`.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    !email.contains("..") && EMAIL_RE.is_match(email)
}

/// Checks a phone number against the default local mobile and landline
/// shapes. See [`PhoneValidator`] for configured markets.
pub fn is_valid_phone(phone: &str) -> bool {
    DEFAULT_PHONE.is_valid(phone)
}

/// Compiled phone rules.
#[derive(Debug, Clone)]
pub struct PhoneValidator {
    mobile: Regex,
    landline: Regex,
    country_code: String,
}

impl PhoneValidator {
    /// Compiles the configured patterns.
    pub fn from_config(config: &PhoneConfig) -> CoreResult<Self> {
        let compile = |name: &str, pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| CoreError::InvalidConfig(format!("{} does not compile: {}", name, e)))
        };
        Ok(PhoneValidator {
            mobile: compile("mobile_pattern", &config.mobile_pattern)?,
            landline: compile("landline_pattern", &config.landline_pattern)?,
            country_code: config.country_code.clone(),
        })
    }

    /// Strips separators and rewrites an international prefix to the
    /// trunk `0`: `+20 100 123 4567` → `01001234567`.
    pub fn normalize(&self, phone: &str) -> String {
        let compact: String = phone
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
            .collect();

        if let Some(digits) = self.country_code.strip_prefix('+') {
            if !digits.is_empty() {
                for international in [format!("+{}", digits), format!("00{}", digits)] {
                    if let Some(rest) = compact.strip_prefix(&international) {
                        return format!("0{}", rest.trim_start_matches('0'));
                    }
                }
            }
        }
        compact
    }

    /// True for a mobile or landline number.
    pub fn is_valid(&self, phone: &str) -> bool {
        let normalized = self.normalize(phone);
        self.mobile.is_match(&normalized) || self.landline.is_match(&normalized)
    }

    pub fn is_mobile(&self, phone: &str) -> bool {
        self.mobile.is_match(&self.normalize(phone))
    }
}

/// Checks the length of a value in characters (not bytes), inclusive.
pub fn is_valid_length(value: &str, min: usize, max: usize) -> bool {
    let len = value.chars().count();
    len >= min && len <= max
}

// =============================================================================
// Numeric Predicates
// =============================================================================

fn parse_number(value: &str) -> Option<Decimal> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}

/// True when the text is a finite decimal number (`"12"`, `"-0.5"`,
/// `"1e3"`).
pub fn is_valid_number(value: &str) -> bool {
    parse_number(value).is_some()
}

/// True for numbers greater than zero.
pub fn is_positive_number(value: &str) -> bool {
    parse_number(value).is_some_and(|n| n > Decimal::ZERO)
}

/// True for numbers greater than or equal to zero.
pub fn is_non_negative_number(value: &str) -> bool {
    parse_number(value).is_some_and(|n| n >= Decimal::ZERO)
}

// =============================================================================
// Date Predicates
// =============================================================================

/// Parses `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` or RFC 3339. Offsets are
/// converted to UTC; plain dates are taken at midnight.
pub fn parse_date_like(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Some(at.with_timezone(&Utc).naive_utc());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

/// True when both dates parse and `start <= end`.
pub fn is_valid_date_range(start: &str, end: &str) -> bool {
    match (parse_date_like(start), parse_date_like(end)) {
        (Some(start), Some(end)) => start <= end,
        _ => false,
    }
}

// =============================================================================
// Record Validators
// =============================================================================

/// Outcome of [`validate_required_fields`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RequiredFieldsCheck {
    pub valid: bool,
    /// Missing keys, in the order they were asked for.
    pub missing_fields: Vec<String>,
}

/// Checks that a JSON record carries every required key.
///
/// A field is missing when it is absent, `null`, or an empty string. A
/// record that is not a JSON object is missing everything.
///
/// ```rust
/// use serde_json::json;
/// use tally_core::validation::validate_required_fields;
///
/// let record = json!({ "name": "Acme", "phone": "", "email": null });
/// let check = validate_required_fields(&record, &["name", "phone", "email", "city"]);
/// assert!(!check.valid);
/// assert_eq!(check.missing_fields, vec!["phone", "email", "city"]);
/// ```
pub fn validate_required_fields(record: &Value, required_keys: &[&str]) -> RequiredFieldsCheck {
    let missing_fields: Vec<String> = required_keys
        .iter()
        .filter(|key| match record.get(**key) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        })
        .map(|key| key.to_string())
        .collect();

    RequiredFieldsCheck {
        valid: missing_fields.is_empty(),
        missing_fields,
    }
}

// =============================================================================
// Typed Validators
// =============================================================================

/// Validates a business-code prefix (`INV`, `CUS`, ...).
///
/// ## Rules
/// - Must not be empty
/// - ASCII letters and digits only; a `-` would make codes ambiguous
/// - At most 10 characters
pub fn validate_code_prefix(prefix: &str) -> ValidationResult<()> {
    if prefix.is_empty() {
        return Err(ValidationError::Required {
            field: "prefix".to_string(),
        });
    }

    if prefix.len() > 10 {
        return Err(ValidationError::TooLong {
            field: "prefix".to_string(),
            max: 10,
        });
    }

    if !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: "prefix".to_string(),
            reason: "must contain only ASCII letters and digits".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("owner@shop.com"));
        assert!(is_valid_email("first.last+tag@mail.example.eg"));
        assert!(is_valid_email("  spaced@shop.com "));

        assert!(!is_valid_email(""));
        assert!(!is_valid_email("owner"));
        assert!(!is_valid_email("owner@shop"));
        assert!(!is_valid_email("owner@@shop.com"));
        assert!(!is_valid_email("a..b@shop.com"));
        assert!(!is_valid_email("owner@-shop.com"));
        assert!(!is_valid_email("own er@shop.com"));
    }

    #[test]
    fn test_is_valid_phone() {
        assert!(is_valid_phone("01001234567"));
        assert!(is_valid_phone("0122 123 4567"));
        assert!(is_valid_phone("+20 100 123 4567"));
        assert!(is_valid_phone("0020-115-123-4567"));
        assert!(is_valid_phone("0223456789"));
        assert!(is_valid_phone("034567890"));

        assert!(!is_valid_phone(""));
        assert!(!is_valid_phone("01301234567"));
        assert!(!is_valid_phone("1001234567"));
        assert!(!is_valid_phone("0100123456a"));
        assert!(!is_valid_phone("12345"));
    }

    #[test]
    fn test_phone_validator_from_config() {
        let config = PhoneConfig {
            mobile_pattern: "^03[0-9]{9}$".to_string(),
            landline_pattern: "^0[2-9][0-9]{8,9}$".to_string(),
            country_code: "+92".to_string(),
        };
        let validator = PhoneValidator::from_config(&config).unwrap();
        assert!(validator.is_mobile("+92 300 1234567"));
        assert_eq!(validator.normalize("+92 300 1234567"), "03001234567");
        assert!(!validator.is_valid("01001234567"));

        let broken = PhoneConfig {
            mobile_pattern: "[".to_string(),
            ..PhoneConfig::default()
        };
        assert!(PhoneValidator::from_config(&broken).is_err());
    }

    #[test]
    fn test_numbers() {
        assert!(is_valid_number("12"));
        assert!(is_valid_number(" -0.5 "));
        assert!(is_valid_number("1e3"));
        assert!(!is_valid_number(""));
        assert!(!is_valid_number("abc"));
        assert!(!is_valid_number("1.2.3"));

        assert!(is_positive_number("0.01"));
        assert!(!is_positive_number("0"));
        assert!(!is_positive_number("-1"));
        assert!(!is_positive_number("x"));

        assert!(is_non_negative_number("0"));
        assert!(is_non_negative_number("3.5"));
        assert!(!is_non_negative_number("-0.01"));
    }

    #[test]
    fn test_is_valid_length() {
        assert!(is_valid_length("abc", 1, 3));
        assert!(!is_valid_length("abcd", 1, 3));
        assert!(!is_valid_length("", 1, 3));
        // counted in characters, not bytes
        assert!(is_valid_length("قهوة", 4, 4));
    }

    #[test]
    fn test_is_valid_date_range() {
        assert!(is_valid_date_range("2024-01-01", "2024-01-31"));
        assert!(is_valid_date_range("2024-01-15", "2024-01-15"));
        assert!(is_valid_date_range("2024-01-15T08:00:00Z", "2024-01-15T09:00:00+00:00"));
        assert!(!is_valid_date_range("2024-02-01", "2024-01-31"));
        assert!(!is_valid_date_range("not a date", "2024-01-31"));
        assert!(!is_valid_date_range("2024-01-01", "2024-13-01"));
    }

    #[test]
    fn test_validate_required_fields() {
        let record = json!({ "name": "Acme", "phone": "", "email": null, "limit": 0 });
        let check = validate_required_fields(&record, &["name", "limit"]);
        assert!(check.valid);
        assert!(check.missing_fields.is_empty());

        let check = validate_required_fields(&record, &["phone", "email", "city", "name"]);
        assert!(!check.valid);
        assert_eq!(check.missing_fields, vec!["phone", "email", "city"]);

        let check = validate_required_fields(&json!([1, 2]), &["name"]);
        assert_eq!(check.missing_fields, vec!["name"]);
    }

    #[test]
    fn test_validate_code_prefix() {
        assert!(validate_code_prefix("INV").is_ok());
        assert!(validate_code_prefix("PO2").is_ok());
        assert!(matches!(
            validate_code_prefix(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_code_prefix("IN-V"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(validate_code_prefix("ABCDEFGHIJK").is_err());
    }
}
