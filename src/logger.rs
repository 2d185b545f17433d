use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;

use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLogMode {
    /// Every response body is written.
    Full,
    /// A body is written only when it differs from the last one for the same request.
    Diffed,
}

pub(crate) struct MessageLogger {
    mode: MessageLogMode,
    file: File,
    previous_bodies: HashMap<String, String>,
}

fn query_object(query: &[(&str, String)]) -> Value {
    let map: Map<String, Value> = query
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
        .collect();
    Value::Object(map)
}

impl MessageLogger {
    pub fn new(mode: MessageLogMode, path: &str) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Self {
            mode,
            file,
            previous_bodies: HashMap::new(),
        })
    }

    pub fn log_request(&mut self, path: &str, query: &[(&str, String)]) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "req",
            "method": "GET",
            "path": path,
            "query": query_object(query),
        });
        self.write_line(&entry);
    }

    pub fn log_command(&mut self, action: &str, zone: Option<u8>, query: &[(&str, String)]) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "cmd",
            "action": action,
            "zone": zone,
            "query": query_object(query),
        });
        self.write_line(&entry);
    }

    pub fn log_response(&mut self, path: &str, query: &[(&str, String)], status: u16, body: &str) {
        let mut entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "resp",
            "path": path,
            "query": query_object(query),
            "status": status,
        });

        let include_body = match self.mode {
            MessageLogMode::Full => true,
            MessageLogMode::Diffed => {
                let key = match query.iter().find(|(k, _)| *k == "zone") {
                    Some((_, zone)) => format!("{path}?zone={zone}"),
                    None => path.to_string(),
                };
                let changed = self.previous_bodies.get(&key).map(String::as_str) != Some(body);
                if changed {
                    self.previous_bodies.insert(key, body.to_string());
                }
                changed
            }
        };

        if include_body {
            entry["body"] = Value::String(body.to_string());
        } else {
            entry["unchanged"] = Value::Bool(true);
        }
        self.write_line(&entry);
    }

    fn write_line(&mut self, entry: &Value) {
        if let Ok(line) = serde_json::to_string(entry)
            && let Err(e) = writeln!(self.file, "{line}")
        {
            warn!("failed to write log entry: {e}");
        }
    }
}
