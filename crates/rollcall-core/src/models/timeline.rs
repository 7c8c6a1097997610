use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

/// Label the event store uses for a learner inside the campus
const INSIDE_LABEL: &str = "Inside School";

/// Label the event store uses for a learner outside the campus
const OUTSIDE_LABEL: &str = "Outside School";

/// Presence state of a learner, as recorded by entry/exit scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresenceStatus {
    Inside,
    #[default]
    Outside,
}

impl PresenceStatus {
    /// Parse a store label. Only an exact "Inside School" is inside; any
    /// other label, including near misses, is outside.
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some(INSIDE_LABEL) => PresenceStatus::Inside,
            Some(OUTSIDE_LABEL) | None => PresenceStatus::Outside,
            Some(other) => {
                debug!(label = %other, "Unknown presence label, treating as outside");
                PresenceStatus::Outside
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PresenceStatus::Inside => INSIDE_LABEL,
            PresenceStatus::Outside => OUTSIDE_LABEL,
        }
    }

    pub fn is_inside(&self) -> bool {
        matches!(self, PresenceStatus::Inside)
    }
}

impl std::fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for PresenceStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for PresenceStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(PresenceStatus::from_label(label.as_deref()))
    }
}

/// A single presence change, ordered by timestamp within a timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub timestamp: DateTime<Utc>,
    pub status: PresenceStatus,
}

impl TimelineEntry {
    pub fn new(timestamp: DateTime<Utc>, status: PresenceStatus) -> Self {
        Self { timestamp, status }
    }
}

/// Raw history document as stored; entries without a timestamp are dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl HistoryRecord {
    pub fn to_entry(&self) -> Option<TimelineEntry> {
        self.timestamp
            .map(|ts| TimelineEntry::new(ts, PresenceStatus::from_label(self.status.as_deref())))
    }
}

/// Convert raw history into an ascending timeline.
/// The sort is stable so same-instant events keep their stored order.
pub fn timeline_from_history(records: &[HistoryRecord]) -> Vec<TimelineEntry> {
    let mut entries: Vec<TimelineEntry> = records.iter().filter_map(|r| r.to_entry()).collect();
    entries.sort_by_key(|e| e.timestamp);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_presence_status_from_label() {
        assert_eq!(PresenceStatus::from_label(Some("Inside School")), PresenceStatus::Inside);
        assert_eq!(PresenceStatus::from_label(Some("inside school")), PresenceStatus::Outside);
        assert_eq!(PresenceStatus::from_label(Some("Inside School ")), PresenceStatus::Outside);
        assert_eq!(PresenceStatus::from_label(Some("Outside School")), PresenceStatus::Outside);
        assert_eq!(PresenceStatus::from_label(Some("Canteen")), PresenceStatus::Outside);
        assert_eq!(PresenceStatus::from_label(None), PresenceStatus::Outside);
    }

    #[test]
    fn test_presence_status_serde() {
        let json = serde_json::to_string(&PresenceStatus::Inside).unwrap();
        assert_eq!(json, "\"Inside School\"");
        let parsed: PresenceStatus = serde_json::from_str("null").unwrap();
        assert_eq!(parsed, PresenceStatus::Outside);
    }

    #[test]
    fn test_timeline_from_history_drops_and_sorts() {
        let json = r#"[
            {"timestamp": "2025-03-03T02:00:00Z", "type": "exit", "status": "Outside School"},
            {"timestamp": null, "status": "Inside School"},
            {"timestamp": "2025-03-03T00:30:00Z", "type": "entry", "status": "Inside School"}
        ]"#;
        let records: Vec<HistoryRecord> = serde_json::from_str(json).unwrap();
        let timeline = timeline_from_history(&records);

        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline[0].timestamp, Utc.with_ymd_and_hms(2025, 3, 3, 0, 30, 0).unwrap());
        assert_eq!(timeline[0].status, PresenceStatus::Inside);
        assert_eq!(timeline[1].status, PresenceStatus::Outside);
    }
}
