/**
 * The event document POSTed to the collector's store endpoint.
 *
 * Every document carries the same fixed key set:
 * ```json
 * {
 *   "event_id": "fc6d8c0c43fc4630ad850ee518f1b9d0",
 *   "project": "42",
 *   "timestamp": "2024-05-01T12:00:00",
 *   "level": "error",
 *   "platform": "rust",
 *   "extra": {}, "tags": {},
 *   "logger": "", "message": "...", "culprit": "",
 *   "stacktrace": { "frames": [] },
 *   "exception": {}, "user": {}
 * }
 * ```
 *
 * Absent optional parts are still emitted: strings as `""`, objects as `{}`.
 */
use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{Error as _, Serializer};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Value: the closed set of extra-context values
// ---------------------------------------------------------------------------

/**
 * A value stored in the `extra` map.
 *
 * Deliberately closed: anything that can be put in here can also be
 * encoded as JSON, with one exception: a non-finite float. Encoding a
 * `Float(NaN)` or an infinity fails, which turns the whole capture into
 * a silent no-op instead of sending a half-written document.
 */
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Map(BTreeMap<String, Value>),
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(n) if n.is_finite() => serializer.serialize_f64(*n),
            Value::Float(n) => Err(S::Error::custom(format!(
                "non-finite number {n} cannot be encoded"
            ))),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Map(map) => map.serialize(serializer),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

/// Arbitrary per-event context.
pub type Extra = BTreeMap<String, Value>;

/// Indexed string tags.
pub type Tags = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/**
 * Event severity, serialized lowercase: `"debug"`, `"info"`, `"warning"`,
 * `"error"`, `"fatal"`.
 */
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Fatal,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Stacktrace
// ---------------------------------------------------------------------------

/**
 * One stack frame.
 *
 * Frames built from a call site carry all three fields. Frames built from a
 * raw call-stack symbol only know the function text.
 */
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    pub function: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lineno: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stacktrace {
    pub frames: Vec<Frame>,
}

/// Type name and reason of a reported exception.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExceptionInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/**
 * A single fully merged event.
 *
 * Built inside a capture call, serialized immediately and never touched
 * again. Only its JSON form is ever sent or persisted.
 */
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    /// 32 lowercase hex characters, no dashes.
    pub event_id: String,

    pub project: String,

    /// UTC, second precision, no zone suffix: `2024-05-01T12:00:00`.
    pub timestamp: String,

    pub level: Level,

    pub platform: String,

    pub extra: Extra,

    pub tags: Tags,

    pub logger: String,

    pub message: String,

    /// `"<function> in <file>"` for call-site captures, otherwise empty.
    pub culprit: String,

    pub stacktrace: Stacktrace,

    #[serde(serialize_with = "empty_object_if_none")]
    pub exception: Option<ExceptionInfo>,

    #[serde(serialize_with = "empty_object_if_none")]
    pub user: Option<BTreeMap<String, String>>,
}

impl Event {
    /// Encodes the event as the JSON body sent to the collector.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

fn empty_object_if_none<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match value {
        Some(inner) => inner.serialize(serializer),
        None => BTreeMap::<String, String>::new().serialize(serializer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> Event {
        Event {
            event_id: "0".repeat(32),
            project: "1".into(),
            timestamp: "2024-05-01T12:00:00".into(),
            level: Level::Warning,
            platform: "rust".into(),
            extra: Extra::new(),
            tags: Tags::new(),
            logger: String::new(),
            message: "m".into(),
            culprit: String::new(),
            stacktrace: Stacktrace::default(),
            exception: None,
            user: None,
        }
    }

    #[test]
    fn test_event_has_fixed_key_set() {
        let json: serde_json::Value =
            serde_json::from_slice(&sample_event().to_json().unwrap()).unwrap();

        let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            [
                "culprit", "event_id", "exception", "extra", "level", "logger", "message",
                "platform", "project", "stacktrace", "tags", "timestamp", "user"
            ]
        );
        assert_eq!(json["level"], "warning");
        assert_eq!(json["exception"], serde_json::json!({}));
        assert_eq!(json["user"], serde_json::json!({}));
        assert_eq!(json["stacktrace"], serde_json::json!({ "frames": [] }));
    }

    #[test]
    fn test_exception_serializes_type_and_value() {
        let mut event = sample_event();
        event.exception = Some(ExceptionInfo {
            kind: "panic".into(),
            value: "boom".into(),
        });

        let json: serde_json::Value = serde_json::from_slice(&event.to_json().unwrap()).unwrap();
        assert_eq!(json["exception"], serde_json::json!({ "type": "panic", "value": "boom" }));
    }

    #[test]
    fn test_function_only_frame_omits_file_and_line() {
        let frame = Frame {
            filename: None,
            function: "main".into(),
            lineno: None,
        };
        assert_eq!(serde_json::to_value(&frame).unwrap(), serde_json::json!({ "function": "main" }));
    }

    #[test]
    fn test_nested_values_encode() {
        let mut inner = BTreeMap::new();
        inner.insert("depth".to_string(), Value::from(2));
        let mut event = sample_event();
        event.extra.insert("nested".into(), Value::Map(inner));
        event.extra.insert("ratio".into(), Value::from(0.5));
        event.extra.insert("ok".into(), Value::from(true));

        let json: serde_json::Value = serde_json::from_slice(&event.to_json().unwrap()).unwrap();
        assert_eq!(json["extra"]["nested"]["depth"], 2);
        assert_eq!(json["extra"]["ratio"], 0.5);
        assert_eq!(json["extra"]["ok"], true);
    }

    #[test]
    fn test_non_finite_float_fails_to_encode() {
        let mut event = sample_event();
        event.extra.insert("bad".into(), Value::Float(f64::NAN));
        assert!(event.to_json().is_err());
    }
}
