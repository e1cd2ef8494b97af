//! Analyzer configuration: comparison semantics and identity issuance.

use crate::error::CoercionError;
use crate::keys::UuidKey;
use chrono::NaiveDate;

/// Default date format used by guided decision tables (`27-Jun-2017`).
pub const DEFAULT_DATE_FORMAT: &str = "%d-%b-%Y";

/// Shared configuration for one analysis session.
///
/// Supplies the comparison semantics (currently the date format used to
/// coerce date literals) and issues identity keys to inspectors. One
/// configuration is shared by every inspector of an analyzed rule set,
/// typically behind an `Rc`.
#[derive(Debug, Clone)]
pub struct AnalyzerConfiguration {
    date_format: String,
}

impl AnalyzerConfiguration {
    /// Create a configuration with the given chrono date format string.
    pub fn new(date_format: impl Into<String>) -> Self {
        AnalyzerConfiguration { date_format: date_format.into() }
    }

    /// The chrono format string used for date literals.
    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Parse a date literal under the configured format.
    pub fn parse_date(&self, text: &str) -> Result<NaiveDate, CoercionError> {
        NaiveDate::parse_from_str(text.trim(), &self.date_format).map_err(|_| {
            CoercionError::InvalidDate {
                text: text.to_string(),
                format: self.date_format.clone(),
            }
        })
    }

    /// Issue a fresh identity key.
    ///
    /// Ownership of the key is exclusive to the inspector it was issued to.
    pub fn next_key(&self) -> UuidKey {
        UuidKey::issue()
    }
}

impl Default for AnalyzerConfiguration {
    fn default() -> Self {
        AnalyzerConfiguration::new(DEFAULT_DATE_FORMAT)
    }
}
