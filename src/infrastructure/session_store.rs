use crate::domain::models::SessionRecord;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::record_mapper::{decode_session_document, encode_session_document};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    pub id: String,
    pub record: SessionRecord,
}

/// Append-only collection of session records shared by every user.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Every stored record. Order is unspecified; an absent collection is empty.
    async fn fetch_all(&self) -> Result<Vec<StoredSession>, InfraError>;

    /// Appends one record and returns the id the store assigned to it.
    async fn append(&self, record: &SessionRecord) -> Result<String, InfraError>;
}

/// Store backed by a JSON-over-REST document database collection: `GET`
/// returns an object keyed by id (or `null`), `POST` appends and answers with
/// `{"name": "<id>"}`.
#[derive(Debug, Clone)]
pub struct ReqwestSessionStore {
    client: Client,
    endpoint: Url,
    fetch_timeout: Duration,
    upload_timeout: Duration,
}

#[derive(Debug, serde::Deserialize)]
struct AppendResponse {
    name: Option<String>,
}

impl ReqwestSessionStore {
    pub fn new(endpoint: Url, fetch_timeout: Duration, upload_timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            fetch_timeout,
            upload_timeout,
        }
    }

    fn store_http_error(status: reqwest::StatusCode, body: &str) -> InfraError {
        let message = if body.trim().is_empty() {
            format!("session store error: http {}", status.as_u16())
        } else {
            format!("session store error: http {}; body={body}", status.as_u16())
        };
        InfraError::Store(message)
    }

    async fn with_deadline<T, F>(deadline: Duration, operation: &str, future: F) -> Result<T, InfraError>
    where
        F: Future<Output = Result<T, InfraError>>,
    {
        tokio::time::timeout(deadline, future)
            .await
            .map_err(|_| InfraError::Timeout(format!("{operation} exceeded {}ms", deadline.as_millis())))?
    }

    async fn send_fetch(&self) -> Result<Vec<StoredSession>, InfraError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(|error| InfraError::Store(format!("network error while fetching sessions: {error}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| InfraError::Store(format!("failed reading sessions response: {error}")))?;
        if !status.is_success() {
            return Err(Self::store_http_error(status, &body));
        }

        let parsed: Value = serde_json::from_str(&body).map_err(|error| {
            InfraError::Store(format!("invalid sessions payload: {error}; body={body}"))
        })?;
        Ok(decode_collection(parsed))
    }

    async fn send_append(&self, record: &SessionRecord) -> Result<String, InfraError> {
        let document = encode_session_document(record);
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&document)
            .send()
            .await
            .map_err(|error| InfraError::Store(format!("network error while appending session: {error}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| InfraError::Store(format!("failed reading append response: {error}")))?;
        if !status.is_success() {
            return Err(Self::store_http_error(status, &body));
        }

        let parsed: AppendResponse = serde_json::from_str(&body).map_err(|error| {
            InfraError::Store(format!("invalid append payload: {error}; body={body}"))
        })?;
        parsed
            .name
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| InfraError::Store("append response did not include name".to_string()))
    }
}

#[async_trait]
impl SessionStore for ReqwestSessionStore {
    async fn fetch_all(&self) -> Result<Vec<StoredSession>, InfraError> {
        Self::with_deadline(self.fetch_timeout, "fetch sessions", self.send_fetch()).await
    }

    async fn append(&self, record: &SessionRecord) -> Result<String, InfraError> {
        Self::with_deadline(self.upload_timeout, "append session", self.send_append(record)).await
    }
}

/// Flattens a collection payload into records. Array payloads (integer keys)
/// are accepted too; non-object entries are dropped.
pub fn decode_collection(payload: Value) -> Vec<StoredSession> {
    let entries: Vec<(String, Value)> = match payload {
        Value::Object(map) => map.into_iter().collect(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), item))
            .collect(),
        _ => Vec::new(),
    };

    entries
        .into_iter()
        .filter_map(|(id, document)| match decode_session_document(&document) {
            Some(record) => Some(StoredSession { id, record }),
            None => {
                tracing::debug!(session_id = %id, "skipping session document that is not an object");
                None
            }
        })
        .collect()
}

/// Process-local store used when no remote collection is configured.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<Vec<StoredSession>>,
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn fetch_all(&self) -> Result<Vec<StoredSession>, InfraError> {
        let sessions = self
            .sessions
            .lock()
            .map_err(|error| InfraError::Store(format!("in-memory store lock poisoned: {error}")))?;
        Ok(sessions.clone())
    }

    async fn append(&self, record: &SessionRecord) -> Result<String, InfraError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|error| InfraError::Store(format!("in-memory store lock poisoned: {error}")))?;
        let id = format!("mem-{}", sessions.len() + 1);
        sessions.push(StoredSession {
            id: id.clone(),
            record: record.clone(),
        });
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(username: &str, duration: &str) -> SessionRecord {
        SessionRecord {
            username: username.to_string(),
            timestamp: "2026-02-16 09:00".to_string(),
            duration_text: duration.to_string(),
            completed_tasks: Vec::new(),
            task_count: 0,
        }
    }

    #[test]
    fn decode_collection_handles_null_object_and_array() {
        assert!(decode_collection(Value::Null).is_empty());

        let mut from_object = decode_collection(serde_json::json!({
            "-a": { "username": "ana", "duration": "25 min", "task_count": 0 },
            "-b": "garbage",
            "-c": { "duration": "5 min" }
        }));
        from_object.sort_by(|left, right| left.id.cmp(&right.id));
        assert_eq!(from_object.len(), 2);
        assert_eq!(from_object[0].record.username, "ana");
        assert_eq!(from_object[1].record.username, "Unknown");

        let from_array = decode_collection(serde_json::json!([
            null,
            { "username": "ben", "duration": "10 min" }
        ]));
        assert_eq!(from_array.len(), 1);
        assert_eq!(from_array[0].id, "1");
    }

    #[tokio::test]
    async fn in_memory_store_appends_in_order() {
        let store = InMemorySessionStore::default();
        store.append(&record("ana", "5 min")).await.expect("append");
        let id = store.append(&record("ben", "10 min")).await.expect("append");
        assert_eq!(id, "mem-2");

        let fetched = store.fetch_all().await.expect("fetch");
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched[1].record.username, "ben");
    }
}
