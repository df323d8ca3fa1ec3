//! End-of-day summary rendering.
//!
//! A [`Summary`] is built once per cycle from already-resolved display names,
//! turned into labeled fields for the chat transport, and then dropped.

use chrono::NaiveDate;
use serde::Serialize;

/// Header line shown above the summary fields.
pub const SUMMARY_TITLE: &str = "Daily status report";
/// Accent colour of the posted summary.
pub const SUMMARY_COLOR: &str = "#4af030";
/// Substituted for the reporter list when nobody reported.
pub const NO_REPORTS_TEXT: &str = "No one reported status";

pub const DATE_FIELD: &str = "Date";
pub const REPORTED_FIELD: &str = "Team members that reported status";
pub const NOT_REPORTED_FIELD: &str = "Team members that didn't report status";

/// One labeled field of the posted summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryField {
    pub title: String,
    pub value: String,
}

impl SummaryField {
    fn new(title: &str, value: String) -> Self {
        Self {
            title: title.to_string(),
            value,
        }
    }
}

/// Result of one reporting cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// UTC calendar date of the cycle.
    pub date: NaiveDate,
    /// Members who reported, as display names.
    pub reported: Vec<String>,
    /// Members present in the channel who did not report, in roster order.
    pub not_reported: Vec<String>,
}

impl Summary {
    pub fn new(date: NaiveDate, reported: Vec<String>, not_reported: Vec<String>) -> Self {
        Self {
            date,
            reported,
            not_reported,
        }
    }

    pub fn title(&self) -> &'static str {
        SUMMARY_TITLE
    }

    pub fn color(&self) -> &'static str {
        SUMMARY_COLOR
    }

    /// `Date`, reporters, and non-reporters, in display order.
    pub fn fields(&self) -> Vec<SummaryField> {
        let reported = if self.reported.is_empty() {
            NO_REPORTS_TEXT.to_string()
        } else {
            connect_values(&self.reported)
        };

        vec![
            SummaryField::new(DATE_FIELD, self.date.format("%Y-%m-%d").to_string()),
            SummaryField::new(REPORTED_FIELD, reported),
            SummaryField::new(NOT_REPORTED_FIELD, connect_values(&self.not_reported)),
        ]
    }
}

/// Join names for display: `"a, b, c"`.
pub fn connect_values<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}
