use super::{decode_all, or_empty, AdmissionDb};
use crate::ids::parse_timestamp;
use crate::outcome::{CreatedRecord, Outcome};
use crate::records::{AnalyticsEntry, Record};
use crate::schema::ANALYTICS;
use admitdb_core::CoreResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inclusive timestamp range for analytics queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Earliest timestamp, inclusive.
    pub start: String,
    /// Latest timestamp, inclusive.
    pub end: String,
}

impl DateRange {
    /// Creates a range.
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Returns true if `date` parses and lies within the range.
    ///
    /// A range whose bounds do not parse contains nothing.
    #[must_use]
    pub fn contains(&self, date: &str) -> bool {
        match (
            parse_timestamp(&self.start),
            parse_timestamp(&self.end),
            parse_timestamp(date),
        ) {
            (Some(start), Some(end), Some(at)) => start <= at && at <= end,
            _ => false,
        }
    }
}

impl AdmissionDb {
    /// Records an analytics sample for `metric`.
    pub fn update_analytics(&self, metric: &str, data: Value) -> Outcome<CreatedRecord> {
        Outcome::from_result("update analytics", self.try_update_analytics(metric, data))
    }

    fn try_update_analytics(&self, metric: &str, data: Value) -> CoreResult<CreatedRecord> {
        let entry = AnalyticsEntry::new(metric, data);
        let id = self.db.add(ANALYTICS, entry.to_record()?)?;
        Ok(CreatedRecord { id })
    }

    /// Returns the samples of `metric`, optionally limited to `range`.
    #[must_use]
    pub fn get_analytics_data(&self, metric: &str, range: Option<&DateRange>) -> Vec<AnalyticsEntry> {
        let mut entries = or_empty(
            "get analytics data",
            self.db
                .get_all_by_index(ANALYTICS, "metric", &Value::from(metric))
                .map(decode_all::<AnalyticsEntry>),
        );
        if let Some(range) = range {
            entries.retain(|entry| range.contains(&entry.date));
        }
        entries
    }
}
