//! Provider adapters
//!
//! Everything the poller needs to know about one asynchronous-job
//! provider, expressed as a plain configuration value: endpoints,
//! credential, and where to look in its payloads.

use atelier_core::domain::field_path::FieldPath;
use atelier_core::domain::job::{JobHandle, JobStatus};
use reqwest::RequestBuilder;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use std::fmt;

/// Placeholder replaced by the job handle in status URL templates
pub const HANDLE_PLACEHOLDER: &str = "{id}";

/// How a provider expects to be authenticated
#[derive(Clone)]
pub enum Credential {
    /// Key sent verbatim in a named header (e.g. `X-API-Key`)
    Header { name: String, key: String },
    /// `Authorization: Bearer <key>`
    Bearer(String),
    /// `Authorization: Key <key>`, used by fal
    FalKey(String),
}

impl Credential {
    pub fn header(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Header {
            name: name.into(),
            key: key.into(),
        }
    }

    /// Attaches the credential to an outgoing request
    pub fn apply(&self, builder: RequestBuilder) -> RequestBuilder {
        match self {
            Credential::Header { name, key } => builder.header(name.as_str(), key.as_str()),
            Credential::Bearer(key) => builder.bearer_auth(key),
            Credential::FalKey(key) => builder.header(AUTHORIZATION, format!("Key {key}")),
        }
    }
}

// Keys never end up in logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Header { name, .. } => write!(f, "Header({name}: ***)"),
            Credential::Bearer(_) => f.write_str("Bearer(***)"),
            Credential::FalKey(_) => f.write_str("FalKey(***)"),
        }
    }
}

/// Adapter for a create-job / poll-status provider
#[derive(Debug, Clone)]
pub struct AsyncJobProvider {
    name: String,
    create_url: String,
    status_url_template: String,
    credential: Credential,
    handle_path: FieldPath,
    status_path: FieldPath,
    output_paths: Vec<FieldPath>,
}

impl AsyncJobProvider {
    /// Creates an adapter reading the handle from `id` and the status
    /// from `status`
    ///
    /// # Arguments
    /// * `name` - Provider name used in logs
    /// * `create_url` - Job creation endpoint (POST)
    /// * `status_url_template` - Status endpoint (GET) containing `{id}`
    /// * `credential` - Attached to both calls
    pub fn new(
        name: impl Into<String>,
        create_url: impl Into<String>,
        status_url_template: impl Into<String>,
        credential: Credential,
    ) -> Self {
        Self {
            name: name.into(),
            create_url: create_url.into(),
            status_url_template: status_url_template.into(),
            credential,
            handle_path: FieldPath::key("id"),
            status_path: FieldPath::key("status"),
            output_paths: Vec::new(),
        }
    }

    /// Sets the ordered candidate paths for the image reference
    pub fn with_output_paths(mut self, paths: Vec<FieldPath>) -> Self {
        self.output_paths = paths;
        self
    }

    pub fn with_handle_path(mut self, path: FieldPath) -> Self {
        self.handle_path = path;
        self
    }

    pub fn with_status_path(mut self, path: FieldPath) -> Self {
        self.status_path = path;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn create_url(&self) -> &str {
        &self.create_url
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn output_paths(&self) -> &[FieldPath] {
        &self.output_paths
    }

    /// Status endpoint for one job; the handle is percent-encoded
    pub fn status_url(&self, handle: &JobHandle) -> String {
        self.status_url_template
            .replace(HANDLE_PLACEHOLDER, &urlencoding::encode(handle.as_str()))
    }

    /// Job handle from a creation response; numeric ids are accepted
    pub fn handle_from(&self, body: &Value) -> Option<JobHandle> {
        match self.handle_path.lookup(body)? {
            Value::String(id) => JobHandle::new(id.as_str()),
            Value::Number(id) => JobHandle::new(id.to_string()),
            _ => None,
        }
    }

    pub fn status_from(&self, payload: &Value) -> JobStatus {
        JobStatus::from_label(self.status_path.lookup(payload).and_then(Value::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider() -> AsyncJobProvider {
        AsyncJobProvider::new(
            "test",
            "https://api.test/v1/prediction/",
            "https://api.test/v1/prediction/{id}",
            Credential::header("X-API-Key", "secret"),
        )
    }

    #[test]
    fn test_status_url_substitutes_handle() {
        let handle = JobHandle::new("abc123").unwrap();
        assert_eq!(
            provider().status_url(&handle),
            "https://api.test/v1/prediction/abc123"
        );
    }

    #[test]
    fn test_status_url_escapes_handle() {
        let p = provider();
        assert_eq!(
            p.status_url(&JobHandle::new("a/b").unwrap()),
            "https://api.test/v1/prediction/a%2Fb"
        );
        assert_eq!(
            p.status_url(&JobHandle::new("x?y#z").unwrap()),
            "https://api.test/v1/prediction/x%3Fy%23z"
        );
    }

    #[test]
    fn test_handle_from_body() {
        let p = provider();
        assert_eq!(
            p.handle_from(&json!({ "id": "abc123" })).unwrap().as_str(),
            "abc123"
        );
        assert_eq!(p.handle_from(&json!({ "id": 42 })).unwrap().as_str(), "42");
        assert!(p.handle_from(&json!({ "id": "" })).is_none());
        assert!(p.handle_from(&json!({ "message": "quota exceeded" })).is_none());
    }

    #[test]
    fn test_custom_paths() {
        let p = provider()
            .with_handle_path(FieldPath::key("request_id"))
            .with_status_path(FieldPath::key("data").then("state"));
        assert!(p.handle_from(&json!({ "request_id": "r1" })).is_some());
        assert_eq!(
            p.status_from(&json!({ "data": { "state": "succeeded" } })),
            JobStatus::Succeeded
        );
        assert_eq!(p.status_from(&json!({ "status": "succeeded" })), JobStatus::Pending);
    }

    #[test]
    fn test_credential_debug_redacts_key() {
        let rendered = format!("{:?}", Credential::header("X-API-Key", "secret"));
        assert!(!rendered.contains("secret"));
        assert!(!format!("{:?}", Credential::Bearer("secret".into())).contains("secret"));
    }
}
