//! # Code Generator
//!
//! Human-readable business identifiers.
//!
//! ## Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  With a date part          INV-20240115-0001                            │
//! │                            ─┬─ ────┬─── ─┬──                            │
//! │                          prefix   date   sequence (4 digits)            │
//! │                                                                         │
//! │  Without a date part       CUS-000042                                   │
//! │                            ─┬─ ──┬───                                   │
//! │                          prefix  sequence (6 digits)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Uniqueness
//! Prefixes are alphanumeric (no `-`), dates are always eight digits, and
//! sequences are zero-padded without truncation, so two different
//! `(prefix, date, sequence)` tuples never format to the same code.
//!
//! The generator does not allocate sequence numbers. The host must supply a
//! sequence that is not repeated for the same prefix and date, e.g. from a
//! database counter. [`next_sequence`] only helps a host that derives the
//! counter from codes it has already stored; two concurrent callers reading
//! the same codes get the same answer.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::CodeConfig;
use crate::error::{CoreError, CoreResult};
use crate::validation::validate_code_prefix;

const DATE_FORMAT: &str = "%Y%m%d";

// =============================================================================
// Code Kinds
// =============================================================================

/// Business entities that get a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CodeKind {
    Invoice,
    Purchase,
    Customer,
    Supplier,
    Product,
    Return,
    Transfer,
    Damage,
}

impl CodeKind {
    /// Canonical prefix.
    pub const fn prefix(&self) -> &'static str {
        match self {
            CodeKind::Invoice => "INV",
            CodeKind::Purchase => "PUR",
            CodeKind::Customer => "CUS",
            CodeKind::Supplier => "SUP",
            CodeKind::Product => "PRD",
            CodeKind::Return => "RET",
            CodeKind::Transfer => "TRF",
            CodeKind::Damage => "DMG",
        }
    }

    /// Documents (invoices, returns, ...) carry the business date; master
    /// data (customers, suppliers, products) does not.
    pub const fn is_dated(&self) -> bool {
        !matches!(
            self,
            CodeKind::Customer | CodeKind::Supplier | CodeKind::Product
        )
    }
}

/// The parts of a code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ParsedCode {
    pub prefix: String,
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,
    pub sequence: i64,
}

// =============================================================================
// Generator
// =============================================================================

/// Code formatter with configurable sequence widths.
#[derive(Debug, Clone, Default)]
pub struct CodeGenerator {
    config: CodeConfig,
}

impl CodeGenerator {
    pub fn new(config: CodeConfig) -> Self {
        CodeGenerator { config }
    }

    /// Formats `PREFIX[-YYYYMMDD]-SEQUENCE`.
    ///
    /// # Errors
    /// - `NegativeSequence` if `sequence < 0`
    /// - `Validation` if the prefix is empty or not alphanumeric
    pub fn format(
        &self,
        prefix: &str,
        date: Option<NaiveDate>,
        sequence: i64,
    ) -> CoreResult<String> {
        if sequence < 0 {
            return Err(CoreError::NegativeSequence(sequence));
        }
        validate_code_prefix(prefix)?;

        Ok(match date {
            Some(date) => format!(
                "{}-{}-{:0width$}",
                prefix,
                date.format(DATE_FORMAT),
                sequence,
                width = self.config.dated_width
            ),
            None => format!(
                "{}-{:0width$}",
                prefix,
                sequence,
                width = self.config.undated_width
            ),
        })
    }

    /// Formats the code of a [`CodeKind`], adding the date only for dated
    /// kinds.
    pub fn generate(&self, kind: CodeKind, on: NaiveDate, sequence: i64) -> CoreResult<String> {
        let date = kind.is_dated().then_some(on);
        self.format(kind.prefix(), date, sequence)
    }
}

/// Formats a code with the default widths (4 dated, 6 undated).
///
/// ```rust
/// use chrono::NaiveDate;
/// use tally_core::format_code;
///
/// let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
/// assert_eq!(format_code("INV", Some(day), 1).unwrap(), "INV-20240115-0001");
/// assert_eq!(format_code("CUS", None, 42).unwrap(), "CUS-000042");
/// ```
pub fn format_code(prefix: &str, date: Option<NaiveDate>, sequence: i64) -> CoreResult<String> {
    CodeGenerator::default().format(prefix, date, sequence)
}

/// Formats the code of a [`CodeKind`] with the default widths.
pub fn generate_code(kind: CodeKind, on: NaiveDate, sequence: i64) -> CoreResult<String> {
    CodeGenerator::default().generate(kind, on, sequence)
}

// =============================================================================
// Parsing
// =============================================================================

fn parse_sequence(part: &str) -> Option<i64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Reads the trailing digit group after the last `-`.
///
/// Returns `None` when there is no `-`, or when what follows it is not all
/// digits.
pub fn extract_sequence(code: &str) -> Option<i64> {
    let (_, tail) = code.rsplit_once('-')?;
    parse_sequence(tail)
}

/// Splits a code produced by [`format_code`] back into its parts.
pub fn parse_code(code: &str) -> Option<ParsedCode> {
    let parts: Vec<&str> = code.split('-').collect();
    let (prefix, date, sequence) = match parts.as_slice() {
        [prefix, sequence] => (*prefix, None, *sequence),
        [prefix, date, sequence] => {
            if date.len() != 8 {
                return None;
            }
            let date = NaiveDate::parse_from_str(date, DATE_FORMAT).ok()?;
            (*prefix, Some(date), *sequence)
        }
        _ => return None,
    };
    validate_code_prefix(prefix).ok()?;

    Some(ParsedCode {
        prefix: prefix.to_string(),
        date,
        sequence: parse_sequence(sequence)?,
    })
}

/// True iff no two codes are equal.
pub fn all_unique<I, S>(codes: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    codes
        .into_iter()
        .all(|code| seen.insert(code.as_ref().to_string()))
}

/// One past the highest sequence among `existing` codes with the same
/// prefix and date; `1` when there are none.
pub fn next_sequence<I, S>(existing: I, prefix: &str, date: Option<NaiveDate>) -> i64
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    existing
        .into_iter()
        .filter_map(|code| parse_code(code.as_ref()))
        .filter(|parsed| parsed.prefix == prefix && parsed.date == date)
        .map(|parsed| parsed.sequence)
        .max()
        .map_or(1, |highest| highest.saturating_add(1))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn test_format_code() {
        assert_eq!(format_code("INV", Some(day()), 1).unwrap(), "INV-20240115-0001");
        assert_eq!(format_code("CUS", None, 42).unwrap(), "CUS-000042");
        assert_eq!(format_code("INV", Some(day()), 0).unwrap(), "INV-20240115-0000");
    }

    #[test]
    fn test_sequence_wider_than_padding_is_not_truncated() {
        assert_eq!(format_code("INV", Some(day()), 12345).unwrap(), "INV-20240115-12345");
        assert_eq!(format_code("CUS", None, 1_234_567).unwrap(), "CUS-1234567");
    }

    #[test]
    fn test_format_code_errors() {
        assert_eq!(
            format_code("INV", None, -1).unwrap_err(),
            CoreError::NegativeSequence(-1)
        );
        assert!(matches!(
            format_code("IN-V", None, 1),
            Err(CoreError::Validation(_))
        ));
        assert!(format_code("", None, 1).is_err());
    }

    #[test]
    fn test_generator_widths() {
        let generator = CodeGenerator::new(CodeConfig {
            dated_width: 6,
            undated_width: 3,
        });
        assert_eq!(generator.format("INV", Some(day()), 7).unwrap(), "INV-20240115-000007");
        assert_eq!(generator.format("CUS", None, 7).unwrap(), "CUS-007");
    }

    #[test]
    fn test_generate_code_by_kind() {
        assert_eq!(generate_code(CodeKind::Invoice, day(), 3).unwrap(), "INV-20240115-0003");
        assert_eq!(generate_code(CodeKind::Transfer, day(), 3).unwrap(), "TRF-20240115-0003");
        assert_eq!(generate_code(CodeKind::Supplier, day(), 3).unwrap(), "SUP-000003");
        assert_eq!(generate_code(CodeKind::Product, day(), 3).unwrap(), "PRD-000003");
    }

    #[test]
    fn test_extract_sequence() {
        assert_eq!(extract_sequence("INV-20240115-0001"), Some(1));
        assert_eq!(extract_sequence("CUS-000042"), Some(42));
        assert_eq!(extract_sequence("INV"), None);
        assert_eq!(extract_sequence("INV-"), None);
        assert_eq!(extract_sequence("INV-12a"), None);
        assert_eq!(extract_sequence("INV-+12"), None);
    }

    #[test]
    fn test_parse_code() {
        let parsed = parse_code("INV-20240115-0001").unwrap();
        assert_eq!(parsed.prefix, "INV");
        assert_eq!(parsed.date, Some(day()));
        assert_eq!(parsed.sequence, 1);

        let parsed = parse_code("CUS-000042").unwrap();
        assert_eq!(parsed.date, None);
        assert_eq!(parsed.sequence, 42);

        assert!(parse_code("INV-20241315-0001").is_none());
        assert!(parse_code("INV-2024115-0001").is_none());
        assert!(parse_code("A-B-C-D").is_none());
        assert!(parse_code("-0001").is_none());
    }

    #[test]
    fn test_all_unique() {
        assert!(all_unique(Vec::<String>::new()));
        assert!(all_unique(["INV-000001", "INV-000002"]));
        assert!(!all_unique(["INV-000001", "INV-000001"]));
    }

    #[test]
    fn test_same_sequence_different_prefixes() {
        let codes: Vec<String> = [CodeKind::Invoice, CodeKind::Return, CodeKind::Damage]
            .iter()
            .map(|k| generate_code(*k, day(), 1).unwrap())
            .collect();
        assert!(all_unique(&codes));
    }

    #[test]
    fn test_next_sequence() {
        let existing = [
            "INV-20240115-0001",
            "INV-20240115-0007",
            "INV-20240116-0099",
            "RET-20240115-0050",
            "garbage",
        ];
        assert_eq!(next_sequence(existing, "INV", Some(day())), 8);
        assert_eq!(next_sequence(existing, "RET", Some(day())), 51);
        assert_eq!(next_sequence(existing, "CUS", None), 1);
    }
}
