//! Generation requests and task handles.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{SirayError, SirayResult};

/// Body keys owned by the request itself; extra parameters may not override them.
pub const RESERVED_PARAM_KEYS: [&str; 2] = ["model", "prompt"];

/// Endpoint family of a generation task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }

    /// Submission endpoint.
    pub fn generations_path(&self) -> &'static str {
        match self {
            MediaKind::Image => "/v1/images/generations/async",
            MediaKind::Video => "/v1/video/generations/async",
        }
    }

    /// Status endpoint for one task.
    pub fn task_path(&self, task_id: &str) -> String {
        format!("{}/{}", self.generations_path(), task_id)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = SirayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "image" | "images" => Ok(MediaKind::Image),
            "video" | "videos" => Ok(MediaKind::Video),
            other => Err(SirayError::bad_parameter(format!("unknown media kind: {other}"))),
        }
    }
}

/// Model-specific extra parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<ParamValue>),
    Map(BTreeMap<String, ParamValue>),
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::String(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::String(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Integer(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Integer(v.into())
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        ParamValue::Integer(v.into())
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(v: Vec<T>) -> Self {
        ParamValue::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, ParamValue>> for ParamValue {
    fn from(v: BTreeMap<String, ParamValue>) -> Self {
        ParamValue::Map(v)
    }
}

/// A generation request: model, prompt and model-specific extras.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    model: String,
    prompt: String,
    params: BTreeMap<String, ParamValue>,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add an extra parameter.
    ///
    /// Fails for the reserved keys `model` and `prompt`. Setting the same key
    /// twice keeps the last value.
    pub fn with_param(
        mut self,
        key: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> SirayResult<Self> {
        let key = key.into();
        if RESERVED_PARAM_KEYS.contains(&key.as_str()) {
            return Err(SirayError::bad_parameter(format!(
                "'{key}' is reserved and cannot be passed as an extra parameter"
            )));
        }
        self.params.insert(key, value.into());
        Ok(self)
    }

    /// Add several extra parameters at once.
    pub fn with_params<K, V, I>(self, params: I) -> SirayResult<Self>
    where
        K: Into<String>,
        V: Into<ParamValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        params
            .into_iter()
            .try_fold(self, |req, (k, v)| req.with_param(k, v))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn params(&self) -> &BTreeMap<String, ParamValue> {
        &self.params
    }

    /// JSON body `{model, prompt, ...params}`.
    pub fn to_body(&self) -> SirayResult<Value> {
        let mut body = serde_json::Map::new();
        body.insert("model".into(), Value::String(self.model.clone()));
        body.insert("prompt".into(), Value::String(self.prompt.clone()));
        for (key, value) in &self.params {
            body.insert(key.clone(), serde_json::to_value(value)?);
        }
        Ok(Value::Object(body))
    }
}

/// Opaque task identifier returned by a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationHandle {
    task_id: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    raw_response: Value,
}

impl GenerationHandle {
    /// Handle for an already known task id.
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            raw_response: Value::Null,
        }
    }

    /// Parse a submission response, reading `task_id` and falling back to `id`.
    pub fn from_submit_response(response: Value) -> SirayResult<Self> {
        let task_id = ["task_id", "id"]
            .iter()
            .filter_map(|key| response.get(*key))
            .find_map(|v| match v {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .ok_or_else(|| SirayError::malformed("submission response has no task_id or id"))?;

        Ok(Self {
            task_id,
            raw_response: response,
        })
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Full submission response, `Null` for handles built with [`GenerationHandle::new`].
    pub fn raw_response(&self) -> &Value {
        &self.raw_response
    }
}

impl fmt::Display for GenerationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.task_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_merges_params() {
        let req = GenerationRequest::new("flux-1.1-pro", "A sunset")
            .with_param("image", "https://example.com/in.jpg")
            .unwrap()
            .with_param("num_images", 2)
            .unwrap()
            .with_param("raw", true)
            .unwrap();

        let body = req.to_body().unwrap();
        assert_eq!(
            body,
            json!({
                "model": "flux-1.1-pro",
                "prompt": "A sunset",
                "image": "https://example.com/in.jpg",
                "num_images": 2,
                "raw": true,
            })
        );
    }

    #[test]
    fn test_reserved_keys_rejected() {
        let err = GenerationRequest::new("m", "p")
            .with_param("model", "other")
            .unwrap_err();
        assert!(matches!(err, SirayError::BadParameter(_)));

        let err = GenerationRequest::new("m", "p")
            .with_params([("seed", ParamValue::from(1)), ("prompt", "x".into())])
            .unwrap_err();
        assert!(matches!(err, SirayError::BadParameter(_)));
    }

    #[test]
    fn test_nested_params() {
        let mut size = BTreeMap::new();
        size.insert("width".to_string(), ParamValue::from(1024));
        size.insert("height".to_string(), ParamValue::from(768));

        let req = GenerationRequest::new("m", "p")
            .with_param("size", size)
            .unwrap()
            .with_param("images", vec!["a.png", "b.png"])
            .unwrap();

        let body = req.to_body().unwrap();
        assert_eq!(body["size"]["width"], 1024);
        assert_eq!(body["images"][1], "b.png");
    }

    #[test]
    fn test_handle_prefers_task_id() {
        let handle =
            GenerationHandle::from_submit_response(json!({"task_id": "t1", "id": "other"})).unwrap();
        assert_eq!(handle.task_id(), "t1");

        let handle = GenerationHandle::from_submit_response(json!({"id": "t2"})).unwrap();
        assert_eq!(handle.task_id(), "t2");
        assert_eq!(handle.raw_response()["id"], "t2");
    }

    #[test]
    fn test_handle_missing_id_is_malformed() {
        let err = GenerationHandle::from_submit_response(json!({"code": "success"})).unwrap_err();
        assert!(matches!(err, SirayError::MalformedResponse(_)));
    }

    #[test]
    fn test_media_kind_paths() {
        assert_eq!(
            MediaKind::Image.task_path("abc"),
            "/v1/images/generations/async/abc"
        );
        assert_eq!(
            MediaKind::Video.generations_path(),
            "/v1/video/generations/async"
        );
        assert_eq!("Video".parse::<MediaKind>().unwrap(), MediaKind::Video);
        assert!("audio".parse::<MediaKind>().is_err());
    }
}
