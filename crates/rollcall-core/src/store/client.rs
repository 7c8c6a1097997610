//! JSON REST client for the attendance event store.
//!
//! Endpoints (relative to the configured base URL):
//!
//! - `GET /students/{id}`: student document, 404 when unknown
//! - `GET /students/{id}/history?from=..&to=..`: entry/exit history
//! - `GET /students/{id}/plannedAbsences`: documents keyed `YYYYMMDD`
//! - `GET /teacherAssignments/{teacherId}`: `{ "studentIds": [...] }`
//! - `GET /students?{field}={value}`: `[{ "id": ... }]`

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{header, Client, Url};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;

use super::{EventStore, StoreError, StudentField};
use crate::models::absence::planned_absences_for_month;
use crate::models::timeline::timeline_from_history;
use crate::models::{
    HistoryRecord, PlannedAbsenceRecord, PlannedAbsences, StudentProfile, StudentRecord,
    TimelineEntry,
};

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct TeacherAssignment {
    #[serde(rename = "studentIds", default)]
    student_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct StudentRef {
    id: String,
}

/// Event store client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpEventStore {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpEventStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid event store URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Event store URL cannot be used as a base: {}", base_url);
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Build an endpoint URL, percent-encoding each path segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(StoreError::from_status(status, &body).into())
        }
    }

    async fn send(&self, url: Url, query: &[(&str, String)]) -> Result<reqwest::Response> {
        debug!(url = %url, "GET");
        self.client
            .get(url.clone())
            .headers(self.auth_headers()?)
            .query(query)
            .send()
            .await
            .map_err(StoreError::from)
            .with_context(|| format!("Failed to send GET request to {}", url))
    }

    async fn get<T: DeserializeOwned>(&self, url: Url, query: &[(&str, String)]) -> Result<T> {
        let response = Self::check_response(self.send(url.clone(), query).await?).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    /// Like `get`, but a 404 is `None` rather than an error.
    async fn get_optional<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>> {
        match self.get(url, &[]).await {
            Ok(parsed) => Ok(Some(parsed)),
            Err(e) if e.downcast_ref::<StoreError>().is_some_and(StoreError::is_not_found) => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl EventStore for HttpEventStore {
    async fn fetch_student_profile(&self, student_id: &str) -> Result<Option<StudentProfile>> {
        let url = self.endpoint(&["students", student_id]);
        let record: Option<StudentRecord> = self.get_optional(url).await?;
        Ok(record.map(|r| r.to_profile(student_id)))
    }

    async fn fetch_timeline(
        &self,
        student_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<TimelineEntry>> {
        let url = self.endpoint(&["students", student_id, "history"]);
        let query = [
            ("from", from.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ("to", to.to_rfc3339_opts(SecondsFormat::Millis, true)),
        ];
        let records: Vec<HistoryRecord> = self.get(url, &query).await?;
        let timeline = timeline_from_history(&records);
        debug!(student = %student_id, entries = timeline.len(), "Timeline fetched");
        Ok(timeline)
    }

    async fn fetch_planned_absences(
        &self,
        student_id: &str,
        year: i32,
        month: u32,
    ) -> Result<PlannedAbsences> {
        let url = self.endpoint(&["students", student_id, "plannedAbsences"]);
        let records: Vec<PlannedAbsenceRecord> = self.get(url, &[]).await?;
        Ok(planned_absences_for_month(
            records.into_iter().map(|r| (r.id, r.absence)),
            year,
            month,
        ))
    }

    async fn fetch_assigned_student_ids(&self, teacher_id: &str) -> Result<Vec<String>> {
        let url = self.endpoint(&["teacherAssignments", teacher_id]);
        let assignment: Option<TeacherAssignment> = self.get_optional(url).await?;
        Ok(assignment.map(|a| a.student_ids).unwrap_or_default())
    }

    async fn query_student_ids(&self, field: StudentField, value: &str) -> Result<Vec<String>> {
        let url = self.endpoint(&["students"]);
        let refs: Vec<StudentRef> = self
            .get(url, &[(field.as_str(), value.to_string())])
            .await?;
        Ok(refs.into_iter().map(|r| r.id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(base: &str) -> HttpEventStore {
        HttpEventStore::new(base, Duration::from_secs(DEFAULT_TIMEOUT_SECS)).unwrap()
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let url = store("https://store.example.org/api/").endpoint(&["students", "LRN 12/3", "history"]);
        assert_eq!(url.as_str(), "https://store.example.org/api/students/LRN%2012%2F3/history");
    }

    #[test]
    fn test_endpoint_without_trailing_slash() {
        let url = store("https://store.example.org/api").endpoint(&["teacherAssignments", "T-1"]);
        assert_eq!(url.as_str(), "https://store.example.org/api/teacherAssignments/T-1");
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(HttpEventStore::new("not a url", Duration::from_secs(1)).is_err());
        assert!(HttpEventStore::new("mailto:office@example.org", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_auth_headers_include_token() {
        let headers = store("https://store.example.org").with_token("abc").auth_headers().unwrap();
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Bearer abc");
    }

    #[test]
    fn test_parse_assignment_and_refs() {
        let assignment: TeacherAssignment =
            serde_json::from_str(r#"{"studentIds": ["S1", "S2"], "section": "Rizal"}"#).unwrap();
        assert_eq!(assignment.student_ids, vec!["S1", "S2"]);

        let refs: Vec<StudentRef> = serde_json::from_str(r#"[{"id": "S9", "name": "x"}]"#).unwrap();
        assert_eq!(refs[0].id, "S9");
    }
}
