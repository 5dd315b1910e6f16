//! File-backed mock transport
//!
//! Fixtures are JSON files named `{fixture}_{suffix}.json`, where `fixture`
//! is derived from the logical call (endpoint kind plus selector) and `suffix`
//! is configurable so several fixture sets can share one directory.
//!
//! - [`MockTransport`] answers every request from the fixture directory.
//! - [`RecordingTransport`] wraps another transport and writes each successful
//!   response as a fixture, with stable two-space indentation for JSON bodies.

use super::{ApiRequest, ApiResponse, CookieJar, FixtureContent, Transport};
use crate::types::BankError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default fixture suffix for both reading and writing
pub const DEFAULT_MOCK_SUFFIX: &str = "mock";

/// Mock replay/record settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockConfig {
    /// Directory fixtures are replayed from; `None` means live network
    pub use_dir: Option<PathBuf>,
    /// Directory responses are recorded into; `None` disables recording
    pub write_dir: Option<PathBuf>,
    /// Suffix of the fixtures that are read
    pub use_suffix: String,
    /// Suffix of the fixtures that are written
    pub write_suffix: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            use_dir: None,
            write_dir: None,
            use_suffix: DEFAULT_MOCK_SUFFIX.to_string(),
            write_suffix: DEFAULT_MOCK_SUFFIX.to_string(),
        }
    }
}

impl MockConfig {
    /// Replay fixtures from `dir` with the default suffix
    pub fn replay(dir: impl Into<PathBuf>) -> Self {
        Self {
            use_dir: Some(dir.into()),
            ..Self::default()
        }
    }

    /// Whether fixtures replace the network
    pub fn use_mocks(&self) -> bool {
        self.use_dir.is_some()
    }

    /// Whether responses are recorded
    pub fn write_mocks(&self) -> bool {
        self.write_dir.is_some()
    }
}

impl fmt::Display for MockConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MockConfig[use_dir={:?}, write_dir={:?}, use_suffix={}, write_suffix={}]",
            self.use_dir, self.write_dir, self.use_suffix, self.write_suffix
        )
    }
}

/// Path of the fixture standing for `fixture` in `dir`
pub fn fixture_path(dir: &Path, fixture: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{}_{}.json", fixture, suffix))
}

/// Transport answering every request from fixture files
#[derive(Debug, Clone)]
pub struct MockTransport {
    dir: PathBuf,
    suffix: String,
}

impl MockTransport {
    pub fn new(dir: PathBuf, suffix: String) -> Self {
        Self { dir, suffix }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, BankError> {
        let path = fixture_path(&self.dir, &request.fixture, &self.suffix);
        tracing::debug!(fixture = %path.display(), "replaying fixture");

        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| BankError::fixture(&path, e))?;

        match request.fixture_content {
            FixtureContent::Body => Ok(ApiResponse::ok(text)),
            FixtureContent::Empty => Ok(ApiResponse::ok("{}")),
            FixtureContent::Cookies => {
                let cookies: CookieJar =
                    serde_json::from_str(&text).map_err(|e| BankError::fixture(&path, e))?;
                Ok(ApiResponse {
                    status: 200,
                    body: "{}".to_string(),
                    cookies,
                })
            }
        }
    }
}

/// Decorator recording the responses of another transport
pub struct RecordingTransport {
    inner: Arc<dyn Transport>,
    dir: PathBuf,
    suffix: String,
}

impl RecordingTransport {
    pub fn new(inner: Arc<dyn Transport>, dir: PathBuf, suffix: String) -> Self {
        Self { inner, dir, suffix }
    }

    async fn record(&self, request: &ApiRequest, response: &ApiResponse) -> Result<(), BankError> {
        let path = fixture_path(&self.dir, &request.fixture, &self.suffix);
        let content = fixture_text(request.fixture_content, response)
            .map_err(|e| BankError::fixture(&path, e))?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| BankError::fixture(&path, e))?;
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| BankError::fixture(&path, e))?;

        tracing::debug!(fixture = %path.display(), "recorded fixture");
        Ok(())
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, BankError> {
        let response = self.inner.execute(request.clone()).await?;
        if response.is_success() {
            self.record(&request, &response).await?;
        }
        Ok(response)
    }
}

/// Render the fixture file content for a response
///
/// JSON bodies are re-indented. A body that is not JSON is stored verbatim,
/// so replaying it yields the same bytes.
fn fixture_text(
    content: FixtureContent,
    response: &ApiResponse,
) -> Result<String, serde_json::Error> {
    let value = match content {
        FixtureContent::Cookies => serde_json::to_value(&response.cookies)?,
        FixtureContent::Empty => Value::Object(Default::default()),
        FixtureContent::Body => match serde_json::from_str::<Value>(&response.body) {
            Ok(value) => value,
            Err(_) => return Ok(response.body.clone()),
        },
    };
    let mut text = serde_json::to_string_pretty(&value)?;
    text.push('\n');
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::ScriptedTransport;
    use tempfile::TempDir;

    #[test]
    fn test_fixture_path() {
        let path = fixture_path(Path::new("/tmp/mocks"), "accounts-1", "mock");
        assert_eq!(path, PathBuf::from("/tmp/mocks/accounts-1_mock.json"));
    }

    #[test]
    fn test_mock_config_defaults() {
        let config = MockConfig::default();
        assert!(!config.use_mocks());
        assert!(!config.write_mocks());
        assert_eq!(config.use_suffix, "mock");
        assert_eq!(config.write_suffix, "mock");

        let replay = MockConfig::replay("/tmp/mocks");
        assert!(replay.use_mocks());
        assert!(!replay.write_mocks());
    }

    #[tokio::test]
    async fn test_mock_transport_replays_body() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("cards_mock.json"), r#"{"comptes": []}"#).unwrap();

        let transport = MockTransport::new(dir.path().to_path_buf(), "mock".to_string());
        let response = transport
            .execute(ApiRequest::get("https://unused.test", "cards"))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, r#"{"comptes": []}"#);
        assert!(response.cookies.is_empty());
    }

    #[tokio::test]
    async fn test_mock_transport_replays_cookies() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("authentication_security_test.json"),
            r#"{"JSESSIONID": "abc"}"#,
        )
        .unwrap();

        let transport = MockTransport::new(dir.path().to_path_buf(), "test".to_string());
        let request = ApiRequest::post("https://unused.test", "authentication_security")
            .fixture_content(FixtureContent::Cookies);
        let response = transport.execute(request).await.unwrap();

        assert_eq!(response.cookies.get("JSESSIONID"), Some("abc"));
        assert_eq!(response.body, "{}");
    }

    #[tokio::test]
    async fn test_mock_transport_missing_fixture() {
        let dir = TempDir::new().unwrap();
        let transport = MockTransport::new(dir.path().to_path_buf(), "mock".to_string());
        let result = transport
            .execute(ApiRequest::get("https://unused.test", "absent"))
            .await;

        assert!(matches!(result, Err(BankError::Fixture { .. })));
    }

    #[tokio::test]
    async fn test_recording_transport_writes_indented_fixtures() {
        let dir = TempDir::new().unwrap();
        let scripted = Arc::new(ScriptedTransport::new());
        scripted.push_ok(r#"{"b":1,"a":[1,2]}"#);

        let recorder =
            RecordingTransport::new(scripted.clone(), dir.path().to_path_buf(), "rec".to_string());
        let response = recorder
            .execute(ApiRequest::get("https://unused.test", "accounts-1"))
            .await
            .unwrap();
        assert_eq!(response.body, r#"{"b":1,"a":[1,2]}"#);

        let written = std::fs::read_to_string(dir.path().join("accounts-1_rec.json")).unwrap();
        let reparsed: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(reparsed, serde_json::json!({"b": 1, "a": [1, 2]}));
        assert!(written.contains("\n  \"a\": [\n    1,"));
        assert!(written.ends_with("}\n"));
    }

    #[tokio::test]
    async fn test_recording_transport_writes_cookies_and_empty() {
        let dir = TempDir::new().unwrap();
        let scripted = Arc::new(ScriptedTransport::new());
        let jar: CookieJar = [("JSESSIONID", "final")].into_iter().collect();
        scripted.push(ApiResponse {
            status: 200,
            body: "<html></html>".to_string(),
            cookies: jar,
        });
        scripted.push_ok("<html>bye</html>");

        let recorder =
            RecordingTransport::new(scripted, dir.path().to_path_buf(), "mock".to_string());
        recorder
            .execute(
                ApiRequest::post("https://unused.test", "authentication_security")
                    .fixture_content(FixtureContent::Cookies),
            )
            .await
            .unwrap();
        recorder
            .execute(
                ApiRequest::get("https://unused.test", "logout")
                    .fixture_content(FixtureContent::Empty),
            )
            .await
            .unwrap();

        let cookies =
            std::fs::read_to_string(dir.path().join("authentication_security_mock.json")).unwrap();
        assert_eq!(cookies, "{\n  \"JSESSIONID\": \"final\"\n}\n");
        let logout = std::fs::read_to_string(dir.path().join("logout_mock.json")).unwrap();
        assert_eq!(logout, "{}\n");
    }

    #[tokio::test]
    async fn test_recording_transport_skips_failures() {
        let dir = TempDir::new().unwrap();
        let scripted = Arc::new(ScriptedTransport::new());
        scripted.push_status(500, "boom");

        let recorder =
            RecordingTransport::new(scripted, dir.path().to_path_buf(), "mock".to_string());
        let response = recorder
            .execute(ApiRequest::get("https://unused.test", "cards"))
            .await
            .unwrap();

        assert_eq!(response.status, 500);
        assert!(!dir.path().join("cards_mock.json").exists());
    }

    #[test]
    fn test_fixture_text_keeps_non_json_bodies() {
        let response = ApiResponse::ok("plain text");
        let text = fixture_text(FixtureContent::Body, &response).unwrap();
        assert_eq!(text, "plain text");
    }

    #[tokio::test]
    async fn test_non_json_body_replays_identically() {
        let dir = TempDir::new().unwrap();
        let scripted = Arc::new(ScriptedTransport::new());
        scripted.push_ok("<html>maintenance</html>");

        let recorder =
            RecordingTransport::new(scripted, dir.path().to_path_buf(), "mock".to_string());
        let live = recorder
            .execute(ApiRequest::get("https://unused.test", "cards"))
            .await
            .unwrap();

        let replay = MockTransport::new(dir.path().to_path_buf(), "mock".to_string());
        let replayed = replay
            .execute(ApiRequest::get("https://unused.test", "cards"))
            .await
            .unwrap();

        assert_eq!(replayed.body, live.body);
    }
}
