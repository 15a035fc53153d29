use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// JSON envelope for successful responses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
    pub meta: Meta,
}

impl<T> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            meta: Meta { timestamp: now(), path: None },
        }
    }
}

/// JSON envelope for failed responses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub code: String,
    pub message: String,
    pub meta: Meta,
}

impl ErrorBody {
    pub fn new(code: &str, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            success: false,
            code: code.to_string(),
            message: message.into(),
            meta: Meta {
                timestamp: now(),
                path: Some(path.into()),
            },
        }
    }
}
