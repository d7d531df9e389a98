use crate::domain::models::{SessionRecord, UNKNOWN_USERNAME};
use serde_json::Value;

const KEY_USERNAME: &str = "username";
const KEY_DATE: &str = "date";
const KEY_DURATION: &str = "duration";
const KEY_TASKS_DONE: &str = "tasks_done";
const KEY_TASK_COUNT: &str = "task_count";
const DEFAULT_DURATION: &str = "0 min";

/// Document shape stored in the shared collection.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct SessionDocument {
    pub username: String,
    pub date: String,
    pub duration: String,
    pub tasks_done: Vec<String>,
    pub task_count: u32,
}

pub fn encode_session_document(record: &SessionRecord) -> SessionDocument {
    SessionDocument {
        username: record.username.clone(),
        date: record.timestamp.clone(),
        duration: record.duration_text.clone(),
        tasks_done: record.completed_tasks.clone(),
        task_count: record.task_count,
    }
}

/// Reads a stored document, defaulting every missing or mistyped field.
/// Returns `None` only when the document is not a JSON object at all.
pub fn decode_session_document(document: &Value) -> Option<SessionRecord> {
    let object = document.as_object()?;

    let username = object
        .get(KEY_USERNAME)
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| UNKNOWN_USERNAME.to_string());
    let timestamp = object
        .get(KEY_DATE)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let duration_text = match object.get(KEY_DURATION) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        _ => DEFAULT_DURATION.to_string(),
    };
    let completed_tasks = object
        .get(KEY_TASKS_DONE)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default();
    let task_count = object
        .get(KEY_TASK_COUNT)
        .and_then(Value::as_u64)
        .and_then(|count| u32::try_from(count).ok())
        .unwrap_or(0);

    Some(SessionRecord {
        username,
        timestamp,
        duration_text,
        completed_tasks,
        task_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> SessionRecord {
        SessionRecord {
            username: "ana".to_string(),
            timestamp: "2026-02-16 09:25".to_string(),
            duration_text: "0 min".to_string(),
            completed_tasks: vec!["Write report".to_string()],
            task_count: 1,
        }
    }

    #[test]
    fn encoded_document_uses_wire_field_names() {
        let json = serde_json::to_value(encode_session_document(&sample_record()))
            .expect("serialize document");
        assert_eq!(
            json,
            serde_json::json!({
                "username": "ana",
                "date": "2026-02-16 09:25",
                "duration": "0 min",
                "tasks_done": ["Write report"],
                "task_count": 1
            })
        );
    }

    #[test]
    fn decode_reads_back_encoded_document() {
        let record = sample_record();
        let json = serde_json::to_value(encode_session_document(&record)).expect("serialize");
        assert_eq!(decode_session_document(&json), Some(record));
    }

    #[test]
    fn decode_defaults_missing_fields() {
        let decoded = decode_session_document(&serde_json::json!({})).expect("object decodes");
        assert_eq!(decoded.username, UNKNOWN_USERNAME);
        assert_eq!(decoded.duration_text, DEFAULT_DURATION);
        assert_eq!(decoded.minutes(), 0);
        assert!(decoded.completed_tasks.is_empty());
        assert_eq!(decoded.task_count, 0);
    }

    #[test]
    fn decode_tolerates_mistyped_fields() {
        let decoded = decode_session_document(&serde_json::json!({
            "username": 42,
            "duration": 30,
            "tasks_done": "nope",
            "task_count": "2"
        }))
        .expect("object decodes");
        assert_eq!(decoded.username, UNKNOWN_USERNAME);
        assert_eq!(decoded.minutes(), 30);
        assert!(decoded.completed_tasks.is_empty());
        assert_eq!(decoded.task_count, 0);
    }

    #[test]
    fn decode_skips_non_objects() {
        assert!(decode_session_document(&serde_json::json!("text")).is_none());
        assert!(decode_session_document(&Value::Null).is_none());
    }
}
