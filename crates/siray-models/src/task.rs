//! Task status snapshots returned by the status endpoints.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::SirayResult;

/// Server-side task state.
///
/// Parsing never fails: unrecognized values become [`TaskState::Unknown`],
/// which counts as terminal so a new server state cannot cause endless polling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TaskState {
    NotStarted,
    Submitted,
    Queued,
    InProgress,
    Success,
    Failure,
    #[default]
    Unknown,
    /// Unrecognized value, kept verbatim.
    Other(String),
}

impl TaskState {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            // The API has historically reported NOT_START.
            "NOT_STARTED" | "NOT_START" => TaskState::NotStarted,
            "SUBMITTED" => TaskState::Submitted,
            "QUEUED" => TaskState::Queued,
            "IN_PROGRESS" => TaskState::InProgress,
            "SUCCESS" => TaskState::Success,
            "FAILURE" => TaskState::Failure,
            "UNKNOWN" | "" => TaskState::Unknown,
            _ => TaskState::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TaskState::NotStarted => "NOT_STARTED",
            TaskState::Submitted => "SUBMITTED",
            TaskState::Queued => "QUEUED",
            TaskState::InProgress => "IN_PROGRESS",
            TaskState::Success => "SUCCESS",
            TaskState::Failure => "FAILURE",
            TaskState::Unknown => "UNKNOWN",
            TaskState::Other(raw) => raw,
        }
    }

    /// Membership in the in-progress set. Everything else is terminal.
    pub fn is_processing(&self) -> bool {
        matches!(
            self,
            TaskState::NotStarted | TaskState::Submitted | TaskState::Queued | TaskState::InProgress
        )
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_processing()
    }

    /// True for `Unknown` and unrecognized server values.
    pub fn is_unknown(&self) -> bool {
        matches!(self, TaskState::Unknown | TaskState::Other(_))
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for TaskState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => TaskState::Unknown,
            Value::String(raw) => TaskState::parse(&raw),
            other => TaskState::Other(other.to_string()),
        })
    }
}

/// Wire shape of the status envelope.
///
/// Scalar fields are read leniently: numbers become strings and timestamps
/// may arrive as numeric strings.
#[derive(Debug, Default, Deserialize)]
struct StatusEnvelope {
    #[serde(default, deserialize_with = "lenient_string")]
    code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    message: Option<String>,
    #[serde(default)]
    data: Option<StatusData>,
}

#[derive(Debug, Default, Deserialize)]
struct StatusData {
    #[serde(default, deserialize_with = "lenient_string")]
    task_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    action: Option<String>,
    #[serde(default)]
    status: TaskState,
    #[serde(default, deserialize_with = "lenient_strings")]
    outputs: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_string")]
    fail_reason: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    progress: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    submit_time: Option<i64>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    start_time: Option<i64>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    finish_time: Option<i64>,
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(value_to_string(Value::deserialize(deserializer)?))
}

fn lenient_strings<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::Array(items) => Some(items.into_iter().filter_map(value_to_string).collect()),
        other => value_to_string(other).map(|s| vec![s]),
    })
}

/// Unix seconds from a number or a numeric string; anything else is dropped.
fn lenient_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    })
}

/// Snapshot of a generation task. A new snapshot is produced per query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskStatus {
    /// Response code (e.g. `success`)
    pub code: String,
    /// Response message
    pub message: String,
    pub task_id: String,
    /// Action type (e.g. `imageGenerate`)
    pub action: String,
    pub status: TaskState,
    /// Output URLs, only populated on success
    pub outputs: Vec<String>,
    /// Only populated on failure
    pub fail_reason: Option<String>,
    /// Progress string such as `"42%"`
    pub progress: Option<String>,
    /// Unix seconds
    pub submit_time: Option<i64>,
    pub start_time: Option<i64>,
    pub finish_time: Option<i64>,
    #[serde(skip)]
    raw_response: Value,
}

impl TaskStatus {
    /// Build a snapshot from a status response body.
    pub fn from_response(response: Value) -> SirayResult<Self> {
        let envelope: StatusEnvelope = serde_json::from_value(response.clone())?;
        let data = envelope.data.unwrap_or_default();

        let outputs = match data.status {
            TaskState::Success => data.outputs.unwrap_or_default(),
            _ => Vec::new(),
        };
        let fail_reason = match data.status {
            TaskState::Failure => data.fail_reason.filter(|r| !r.is_empty()),
            _ => None,
        };

        Ok(Self {
            code: envelope.code.unwrap_or_else(|| "unknown".to_string()),
            message: envelope.message.unwrap_or_default(),
            task_id: data.task_id.unwrap_or_default(),
            action: data.action.unwrap_or_default(),
            status: data.status,
            outputs,
            fail_reason,
            progress: data.progress,
            submit_time: data.submit_time,
            start_time: data.start_time,
            finish_time: data.finish_time,
            raw_response: response,
        })
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskState::Success
    }

    pub fn is_failed(&self) -> bool {
        self.status == TaskState::Failure
    }

    pub fn is_processing(&self) -> bool {
        self.status.is_processing()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// First output URL.
    pub fn result(&self) -> Option<&str> {
        self.outputs.first().map(String::as_str)
    }

    /// Progress as an integer percentage (`"42%"` -> 42).
    pub fn progress_percent(&self) -> Option<u8> {
        let raw = self.progress.as_deref()?.trim().trim_end_matches('%').trim();
        raw.parse::<u8>()
            .ok()
            .or_else(|| raw.parse::<f64>().ok().map(|p| p.clamp(0.0, 100.0) as u8))
            .map(|p| p.min(100))
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submit_time.and_then(unix_to_datetime)
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.start_time.and_then(unix_to_datetime)
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finish_time.and_then(unix_to_datetime)
    }

    /// Response body this snapshot was built from.
    pub fn raw_response(&self) -> &Value {
        &self.raw_response
    }
}

fn unix_to_datetime(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_snapshot() {
        let status = TaskStatus::from_response(json!({
            "code": "success",
            "message": "",
            "data": {
                "task_id": "t1",
                "action": "imageGenerate",
                "status": "SUCCESS",
                "outputs": ["a", "b"],
                "progress": "100%",
                "submit_time": 1762512511,
                "start_time": 1762512515,
                "finish_time": 1762512530
            }
        }))
        .unwrap();

        assert!(status.is_completed());
        assert!(!status.is_failed());
        assert!(!status.is_processing());
        assert_eq!(status.result(), Some("a"));
        assert_eq!(status.outputs, vec!["a", "b"]);
        assert_eq!(status.progress_percent(), Some(100));
        assert_eq!(status.submitted_at().unwrap().timestamp(), 1762512511);
        assert_eq!(status.finished_at().unwrap().timestamp(), 1762512530);
    }

    #[test]
    fn test_in_progress_snapshot() {
        let status = TaskStatus::from_response(json!({
            "code": "success",
            "data": {"task_id": "t1", "status": "IN_PROGRESS", "progress": "42%"}
        }))
        .unwrap();

        assert!(status.is_processing());
        assert_eq!(status.progress_percent(), Some(42));
        assert_eq!(status.result(), None);
    }

    #[test]
    fn test_failure_keeps_reason_drops_outputs() {
        let status = TaskStatus::from_response(json!({
            "code": "success",
            "data": {
                "task_id": "t1",
                "status": "FAILURE",
                "outputs": ["stale"],
                "fail_reason": "NSFW content detected"
            }
        }))
        .unwrap();

        assert!(status.is_failed());
        assert!(status.outputs.is_empty());
        assert_eq!(status.fail_reason.as_deref(), Some("NSFW content detected"));
    }

    #[test]
    fn test_fail_reason_only_on_failure() {
        let status = TaskStatus::from_response(json!({
            "data": {"task_id": "t1", "status": "QUEUED", "fail_reason": "leftover"}
        }))
        .unwrap();
        assert_eq!(status.fail_reason, None);
        assert_eq!(status.code, "unknown");
    }

    #[test]
    fn test_unrecognized_state_is_terminal() {
        let status = TaskStatus::from_response(json!({
            "data": {"task_id": "t1", "status": "ARCHIVED"}
        }))
        .unwrap();
        assert!(status.is_terminal());
        assert!(status.status.is_unknown());
        assert_eq!(status.status.as_str(), "ARCHIVED");
    }

    #[test]
    fn test_missing_data_is_unknown() {
        let status = TaskStatus::from_response(json!({"code": "error", "message": "gone"})).unwrap();
        assert_eq!(status.status, TaskState::Unknown);
        assert!(status.is_terminal());
        assert_eq!(status.message, "gone");
    }

    #[test]
    fn test_state_parsing() {
        assert_eq!(TaskState::parse("not_start"), TaskState::NotStarted);
        assert_eq!(TaskState::parse("NOT_STARTED"), TaskState::NotStarted);
        assert_eq!(TaskState::parse("in_progress"), TaskState::InProgress);
        assert!(TaskState::parse("SUBMITTED").is_processing());
        assert!(TaskState::parse("QUEUED").is_processing());
        assert!(!TaskState::parse("SUCCESS").is_processing());
    }

    #[test]
    fn test_numeric_status_is_terminal_other() {
        let status = TaskStatus::from_response(json!({"data": {"task_id": "t1", "status": 3}})).unwrap();
        assert_eq!(status.status, TaskState::Other("3".into()));
        assert!(status.is_terminal());
    }

    #[test]
    fn test_numeric_progress_and_task_id() {
        let status = TaskStatus::from_response(json!({
            "code": "success",
            "data": {"task_id": 12345, "status": "IN_PROGRESS", "progress": 42}
        }))
        .unwrap();
        assert_eq!(status.task_id, "12345");
        assert_eq!(status.progress.as_deref(), Some("42"));
        assert_eq!(status.progress_percent(), Some(42));
        assert!(status.is_processing());
    }

    #[test]
    fn test_string_timestamps() {
        let status = TaskStatus::from_response(json!({
            "data": {
                "status": "SUCCESS",
                "submit_time": "1762512511",
                "start_time": "not a time",
                "finish_time": null
            }
        }))
        .unwrap();
        assert_eq!(status.submit_time, Some(1762512511));
        assert!(status.submitted_at().is_some());
        assert_eq!(status.start_time, None);
        assert_eq!(status.finish_time, None);
    }

    #[test]
    fn test_progress_percent_garbage() {
        let status = TaskStatus::from_response(json!({
            "data": {"status": "IN_PROGRESS", "progress": "almost"}
        }))
        .unwrap();
        assert_eq!(status.progress_percent(), None);
    }
}
