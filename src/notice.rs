//! Purpose: Structured stderr notices for non-fatal decode events.
//! Exports: `Notice`, `NoticeKind`, `notice_json`.
//! Role: Reports why the CLI printed a fallback instead of the decoded value.
//! Invariants: Notices are non-fatal and never alter stdout payloads.
//! Invariants: JSON schema is stable once published; fields are additive-only.
use serde_json::{Map, Value, json};

use crate::core::error::DecodeError;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NoticeKind {
    Fallback,
}

impl NoticeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NoticeKind::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub time: String,
    pub cmd: String,
    pub path: String,
    /// Decode failure that triggered the notice.
    pub cause: DecodeError,
    /// Value printed in place of the decoded one.
    pub fallback: Value,
}

impl Notice {
    pub fn fallback(
        cmd: impl Into<String>,
        path: impl Into<String>,
        cause: DecodeError,
        fallback: Value,
    ) -> Self {
        Self {
            kind: NoticeKind::Fallback,
            time: String::new(),
            cmd: cmd.into(),
            path: path.into(),
            cause,
            fallback,
        }
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = time.into();
        self
    }

    pub fn message(&self) -> String {
        self.cause.to_string()
    }
}

pub fn notice_json(notice: &Notice) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(notice.kind.as_str()));
    inner.insert("time".to_string(), json!(notice.time));
    inner.insert("cmd".to_string(), json!(notice.cmd));
    inner.insert("path".to_string(), json!(notice.path));
    inner.insert("message".to_string(), json!(notice.message()));
    if let Some(key) = notice.cause.key() {
        inner.insert("key".to_string(), json!(key));
    }
    inner.insert("fallback".to_string(), notice.fallback.clone());
    json!({ "notice": Value::Object(inner) })
}
