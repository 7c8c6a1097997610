use serde::{Deserialize, Serialize};

/// A learner as known to the report: display name and raw class hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub id: String,
    pub name: String,
    pub schedule_text: Option<String>,
}

/// Student document as returned by the event store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub class_hours: Option<String>,
    /// Older documents spell class hours in snake_case; some carry both keys
    #[serde(default, rename = "class_hours")]
    pub legacy_class_hours: Option<String>,
    #[serde(default)]
    pub grade_level: Option<String>,
    #[serde(default)]
    pub adviser_id: Option<String>,
    #[serde(default)]
    pub teacher_id: Option<String>,
}

impl StudentRecord {
    /// Display name: `name` when present, otherwise "Last, First".
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().map(str::trim) {
            if !name.is_empty() {
                return name.to_string();
            }
        }
        let parts: Vec<&str> = [self.last_name.as_deref(), self.first_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        parts.join(", ")
    }

    /// Class hours from `classHours`, falling back to `class_hours` when the
    /// camelCase key is missing or blank.
    pub fn schedule_text(&self) -> Option<&str> {
        [self.class_hours.as_deref(), self.legacy_class_hours.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
    }

    pub fn to_profile(&self, id: &str) -> StudentProfile {
        StudentProfile {
            id: id.to_string(),
            name: self.display_name(),
            schedule_text: self.schedule_text().map(str::to_string),
        }
    }
}
