use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::warn;

use crate::diff::diff_json;
use crate::types::{DeviceState, Properties};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLogMode {
    Full,
    /// First poll per device in full, then only the changed paths.
    Diffed,
}

/// Append-only NDJSON record of logins, writes and polls.
pub(crate) struct MessageLogger {
    mode: MessageLogMode,
    file: File,
    previous_states: HashMap<String, Value>,
}

impl MessageLogger {
    pub fn new(mode: MessageLogMode, path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            mode,
            file,
            previous_states: HashMap::new(),
        })
    }

    pub fn log_login(&mut self, username: &str, success: bool) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "login",
            "user": username,
            "ok": success,
        });
        self.write_line(&entry);
    }

    pub fn log_set(&mut self, device_id: &str, properties: &Properties) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "set",
            "device": device_id,
            "body": properties,
        });
        self.write_line(&entry);
    }

    pub fn log_poll(&mut self, device_id: &str, state: &DeviceState) {
        let body = serde_json::to_value(state).unwrap_or(Value::Null);

        let entry = match (self.mode, self.previous_states.get(device_id)) {
            (MessageLogMode::Diffed, Some(prev)) => {
                let mut changes = Vec::new();
                diff_json(prev, &body, "", &mut changes);
                let change_entries: Vec<Value> = changes
                    .iter()
                    .map(|(path, old, new)| json!({ "path": path, "old": old, "new": new }))
                    .collect();
                json!({
                    "ts": Utc::now().to_rfc3339(),
                    "dir": "poll",
                    "device": device_id,
                    "changes": change_entries,
                })
            }
            (MessageLogMode::Diffed, None) => json!({
                "ts": Utc::now().to_rfc3339(),
                "dir": "poll",
                "device": device_id,
                "full": true,
                "body": body,
            }),
            (MessageLogMode::Full, _) => json!({
                "ts": Utc::now().to_rfc3339(),
                "dir": "poll",
                "device": device_id,
                "body": body,
            }),
        };
        self.write_line(&entry);

        if self.mode == MessageLogMode::Diffed {
            self.previous_states.insert(device_id.to_string(), body);
        }
    }

    fn write_line(&mut self, entry: &Value) {
        if let Ok(line) = serde_json::to_string(entry)
            && let Err(e) = writeln!(self.file, "{line}")
        {
            warn!("failed to write log entry: {e}");
        }
    }
}
