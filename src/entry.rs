//! Validated parsing of comment-log entries.
//!
//! A log file is either an object of `{key: entry}` or an array of entries.
//! Each entry looks like `{"target": "<shortcode>", "logs": [{"storedIds": [...]}, ...]}`,
//! but scraped files are loose: every shape check lives here and yields an
//! [`EntryOutcome`] instead of failing the file.

use serde_json::Value;
use std::fmt;

/// One well-formed entry: the post it targets and every stored comment id,
/// concatenated in log order (duplicates kept).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommentLogEntry {
    pub target: String,
    pub stored_ids: Vec<String>,
    /// `storedIds` arrays seen, empty ones included.
    pub id_lists: usize,
}

/// Why an entry was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    NotAnObject,
    TargetNotString,
    LogsNotArray,
    StoredIdsNotArray { log_index: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotAnObject => f.write_str("entry is not an object"),
            SkipReason::TargetNotString => f.write_str("`target` is not a string"),
            SkipReason::LogsNotArray => f.write_str("`logs` is not an array"),
            SkipReason::StoredIdsNotArray { log_index } => {
                write!(f, "`logs[{log_index}].storedIds` is not an array")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryOutcome {
    Valid(CommentLogEntry),
    /// Well-formed but without a target (absent, null or empty): nothing to
    /// attribute, not an error.
    Untargeted,
    Rejected(SkipReason),
}

/// Classify one entry value.
pub fn parse_entry(v: &Value) -> EntryOutcome {
    let Some(obj) = v.as_object() else {
        return EntryOutcome::Rejected(SkipReason::NotAnObject);
    };

    // Shape is checked in full before an empty target is let through.
    let target = match obj.get("target") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.as_str()).filter(|s| !s.is_empty()),
        Some(_) => return EntryOutcome::Rejected(SkipReason::TargetNotString),
    };

    let logs: &[Value] = match obj.get("logs") {
        None | Some(Value::Null) => &[],
        Some(Value::Array(logs)) => logs,
        Some(_) => return EntryOutcome::Rejected(SkipReason::LogsNotArray),
    };

    let mut stored_ids = Vec::new();
    let mut id_lists = 0;
    for (log_index, log) in logs.iter().enumerate() {
        // Non-object log records carry nothing; they are not an entry error.
        let Some(log) = log.as_object() else { continue };
        match log.get("storedIds") {
            None | Some(Value::Null) => {}
            Some(Value::Array(ids)) => {
                id_lists += 1;
                stored_ids.extend(ids.iter().filter_map(comment_id));
            }
            Some(_) => return EntryOutcome::Rejected(SkipReason::StoredIdsNotArray { log_index }),
        }
    }

    match target {
        Some(target) => EntryOutcome::Valid(CommentLogEntry { target: target.to_string(), stored_ids, id_lists }),
        None => EntryOutcome::Untargeted,
    }
}

/// Comment ids are strings; integer ids are accepted in decimal form.
fn comment_id(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        _ => None,
    }
}

/// Top-level document → `(key, entry)` pairs. Arrays get positional keys.
/// Returns `None` for any other top-level shape.
pub fn document_entries(doc: Value) -> Option<Vec<(String, Value)>> {
    match doc {
        Value::Object(map) => Some(map.into_iter().collect()),
        Value::Array(items) => Some(items.into_iter().enumerate().map(|(i, v)| (i.to_string(), v)).collect()),
        _ => None,
    }
}
