//! WebDriver client and session.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use shelfcheck_core::Signal;
use shelfcheck_runner::{InputHandle, LookupClient, LookupError, LookupSession};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info};

use crate::config::WebDriverConfig;
use crate::protocol::{
    element_ids, element_ref, error_from_payload, session_id, CLEAR_SCRIPT, ENTER_KEY,
};

/// HTTP transport shared by the client and its sessions.
#[derive(Debug)]
struct Wire {
    inner: reqwest::Client,
    base_url: String,
    command_timeout: Duration,
}

impl Wire {
    /// Send a command and return its `value` member.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, LookupError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(method = %method, path = %path, "WebDriver command");

        let mut request = self.inner.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let exchange = async {
            let response = request
                .send()
                .await
                .map_err(|e| LookupError::Transport(e.to_string()))?;
            let status = response.status();
            let body = response
                .bytes()
                .await
                .map_err(|e| LookupError::Transport(e.to_string()))?;
            Ok::<_, LookupError>((status, body))
        };
        let (status, body) = tokio::time::timeout(self.command_timeout, exchange)
            .await
            .map_err(|_| {
                LookupError::Timeout(format!(
                    "{path} got no reply within {}s",
                    self.command_timeout.as_secs()
                ))
            })??;

        let payload = serde_json::from_slice::<Value>(&body);
        if !status.is_success() {
            return Err(match payload {
                Ok(payload) => error_from_payload(status.as_u16(), &payload),
                Err(_) => LookupError::Protocol(format!("HTTP {status} with a non-JSON body")),
            });
        }

        let payload =
            payload.map_err(|e| LookupError::Protocol(format!("invalid response body: {e}")))?;
        Ok(payload.get("value").cloned().unwrap_or(Value::Null))
    }
}

/// Opens one browser session per task.
#[derive(Debug)]
pub struct WebDriverClient {
    wire: Arc<Wire>,
    config: WebDriverConfig,
}

impl WebDriverClient {
    /// Create a new client.
    pub fn new(config: WebDriverConfig) -> Self {
        let wire = Wire {
            inner: reqwest::Client::new(),
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            command_timeout: config.command_timeout,
        };
        Self {
            wire: Arc::new(wire),
            config,
        }
    }
}

#[async_trait]
impl LookupClient for WebDriverClient {
    type Session = WebDriverSession;

    async fn open_session(&self) -> Result<WebDriverSession, LookupError> {
        let value = self
            .wire
            .send(Method::POST, "/session", Some(&self.config.capabilities()))
            .await
            .map_err(|e| match e {
                LookupError::Transport(msg)
                | LookupError::Protocol(msg)
                | LookupError::Timeout(msg) => LookupError::Session(msg),
                other => other,
            })?;

        let id = session_id(&value)?;
        info!(session_id = %id, "WebDriver session opened");

        Ok(WebDriverSession {
            wire: Arc::clone(&self.wire),
            id,
            poll_interval: self.config.poll_interval,
        })
    }
}

/// One browser session.
#[derive(Debug)]
pub struct WebDriverSession {
    wire: Arc<Wire>,
    id: String,
    poll_interval: Duration,
}

impl WebDriverSession {
    pub fn id(&self) -> &str {
        &self.id
    }

    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, LookupError> {
        let path = format!("/session/{}{}", self.id, path);
        self.wire.send(method, &path, body).await
    }

    async fn find_elements(&self, selector: &str) -> Result<Vec<String>, LookupError> {
        let body = json!({ "using": "css selector", "value": selector });
        let value = self
            .command(Method::POST, "/elements", Some(&body))
            .await?;
        element_ids(&value)
    }

    async fn element_flag(&self, element_id: &str, flag: &str) -> Result<bool, LookupError> {
        let path = format!("/element/{element_id}/{flag}");
        let value = self.command(Method::GET, &path, None).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    /// First element matching `selector` that is displayed and enabled.
    async fn find_clickable(&self, selector: &str) -> Result<Option<String>, LookupError> {
        for id in self.find_elements(selector).await? {
            let clickable = async {
                Ok::<_, LookupError>(
                    self.element_flag(&id, "displayed").await?
                        && self.element_flag(&id, "enabled").await?,
                )
            };
            match clickable.await {
                Ok(true) => return Ok(Some(id)),
                // Re-rendered between lookup and check; look again next poll.
                Ok(false) | Err(LookupError::StaleReference(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    async fn observe(
        &self,
        results_selector: &str,
        empty_selector: &str,
    ) -> Result<Signal, LookupError> {
        Ok(Signal {
            results: !self.find_elements(results_selector).await?.is_empty(),
            empty: !self.find_elements(empty_selector).await?.is_empty(),
        })
    }

    async fn send_keys(&self, input: &InputHandle, text: &str) -> Result<(), LookupError> {
        let path = format!("/element/{}/value", input.as_str());
        self.command(Method::POST, &path, Some(&json!({ "text": text })))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl LookupSession for WebDriverSession {
    async fn navigate(&self, url: &str) -> Result<(), LookupError> {
        self.command(Method::POST, "/url", Some(&json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn find_input(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<InputHandle, LookupError> {
        let deadline = Instant::now() + timeout;
        let expired = || {
            LookupError::Timeout(format!(
                "no clickable element matched '{selector}' within {}s",
                timeout.as_secs()
            ))
        };
        loop {
            let found = timeout_at(deadline, self.find_clickable(selector))
                .await
                .map_err(|_| expired())?;
            if let Some(id) = found? {
                return Ok(InputHandle::new(id));
            }
            if Instant::now() >= deadline {
                return Err(expired());
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn clear_input(&self, input: &InputHandle) -> Result<(), LookupError> {
        let body = json!({
            "script": CLEAR_SCRIPT,
            "args": [element_ref(input.as_str())],
        });
        self.command(Method::POST, "/execute/sync", Some(&body))
            .await?;
        Ok(())
    }

    async fn submit_text(&self, input: &InputHandle, text: &str) -> Result<(), LookupError> {
        self.send_keys(input, text).await
    }

    async fn submit_query(&self, input: &InputHandle) -> Result<(), LookupError> {
        self.send_keys(input, ENTER_KEY).await
    }

    async fn wait_for_results_or_empty(
        &self,
        results_selector: &str,
        empty_selector: &str,
        timeout: Duration,
    ) -> Result<Signal, LookupError> {
        let deadline = Instant::now() + timeout;
        let expired = || {
            LookupError::Timeout(format!(
                "no results or empty marker within {}s",
                timeout.as_secs()
            ))
        };
        loop {
            let signal = timeout_at(deadline, self.observe(results_selector, empty_selector))
                .await
                .map_err(|_| expired())??;
            if signal.results || signal.empty {
                break;
            }
            if Instant::now() >= deadline {
                return Err(expired());
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        // Classify from a fresh look: the page may re-render after the
        // condition first holds.
        tokio::time::timeout(timeout, self.observe(results_selector, empty_selector))
            .await
            .map_err(|_| expired())?
    }

    async fn close(&self) -> Result<(), LookupError> {
        self.command(Method::DELETE, "", None).await?;
        debug!(session_id = %self.id, "WebDriver session closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ELEMENT_KEY;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> WebDriverConfig {
        WebDriverConfig {
            poll_interval: Duration::from_millis(10),
            ..WebDriverConfig::new(server.uri())
        }
    }

    async fn mount_session(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/session"))
            .and(body_partial_json(json!({
                "capabilities": { "alwaysMatch": { "browserName": "chrome" } }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": { "sessionId": "s1", "capabilities": {} }
            })))
            .mount(server)
            .await;
    }

    fn elements(ids: &[&str]) -> ResponseTemplate {
        let value: Vec<Value> = ids.iter().map(|id| json!({ ELEMENT_KEY: id })).collect();
        ResponseTemplate::new(200).set_body_json(json!({ "value": value }))
    }

    fn ok_null() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({ "value": null }))
    }

    #[tokio::test]
    async fn test_open_session() {
        let server = MockServer::start().await;
        mount_session(&server).await;

        let client = WebDriverClient::new(config(&server));
        let session = client.open_session().await.unwrap();
        assert_eq!(session.id(), "s1");
    }

    #[tokio::test]
    async fn test_open_session_refused() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/session"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "value": { "error": "session not created", "message": "Chrome failed to start" }
            })))
            .mount(&server)
            .await;

        let client = WebDriverClient::new(config(&server));
        let err = client.open_session().await.unwrap_err();
        assert!(matches!(err, LookupError::Session(_)));
    }

    #[tokio::test]
    async fn test_open_session_unreachable_is_session_failure() {
        let client = WebDriverClient::new(WebDriverConfig::new("http://127.0.0.1:9"));
        let err = client.open_session().await.unwrap_err();
        assert!(matches!(err, LookupError::Session(_)));
    }

    #[tokio::test]
    async fn test_find_input_waits_for_clickable_element() {
        let server = MockServer::start().await;
        mount_session(&server).await;
        Mock::given(method("POST"))
            .and(path("/session/s1/elements"))
            .respond_with(elements(&["e1"]))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/session/s1/element/e1/displayed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": true })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/session/s1/element/e1/enabled"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": true })))
            .mount(&server)
            .await;

        let session = WebDriverClient::new(config(&server))
            .open_session()
            .await
            .unwrap();
        let input = session
            .find_input("input#buscar", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(input, InputHandle::new("e1"));
    }

    #[tokio::test]
    async fn test_find_input_times_out() {
        let server = MockServer::start().await;
        mount_session(&server).await;
        Mock::given(method("POST"))
            .and(path("/session/s1/elements"))
            .respond_with(elements(&[]))
            .mount(&server)
            .await;

        let session = WebDriverClient::new(config(&server))
            .open_session()
            .await
            .unwrap();
        let err = session
            .find_input("input#buscar", Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_find_input_deadline_covers_stalled_driver() {
        let server = MockServer::start().await;
        mount_session(&server).await;
        Mock::given(method("POST"))
            .and(path("/session/s1/elements"))
            .respond_with(elements(&["e1"]).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let session = WebDriverClient::new(config(&server))
            .open_session()
            .await
            .unwrap();
        let start = std::time::Instant::now();
        let err = session
            .find_input("input#buscar", Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::Timeout(_)));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_wait_deadline_covers_stalled_driver() {
        let server = MockServer::start().await;
        mount_session(&server).await;
        Mock::given(method("POST"))
            .and(path("/session/s1/elements"))
            .respond_with(elements(&[]).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let session = WebDriverClient::new(config(&server))
            .open_session()
            .await
            .unwrap();
        let start = std::time::Instant::now();
        let err = session
            .wait_for_results_or_empty("div.producto", "span.empty", Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::Timeout(_)));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_command_timeout_bounds_single_request() {
        let server = MockServer::start().await;
        mount_session(&server).await;
        Mock::given(method("POST"))
            .and(path("/session/s1/url"))
            .respond_with(ok_null().set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let session = WebDriverClient::new(WebDriverConfig {
            command_timeout: Duration::from_millis(100),
            ..config(&server)
        })
        .open_session()
        .await
        .unwrap();
        let err = session.navigate("http://catalog.example").await.unwrap_err();
        assert!(matches!(err, LookupError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_non_json_error_keeps_status_code() {
        let server = MockServer::start().await;
        mount_session(&server).await;
        Mock::given(method("POST"))
            .and(path("/session/s1/url"))
            .respond_with(
                ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"),
            )
            .mount(&server)
            .await;

        let session = WebDriverClient::new(config(&server))
            .open_session()
            .await
            .unwrap();
        let err = session.navigate("http://catalog.example").await.unwrap_err();
        match err {
            LookupError::Protocol(detail) => assert!(detail.contains("502"), "{detail}"),
            other => panic!("expected protocol error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_clear_input_reports_stale_reference() {
        let server = MockServer::start().await;
        mount_session(&server).await;
        Mock::given(method("POST"))
            .and(path("/session/s1/execute/sync"))
            .and(body_partial_json(json!({ "script": CLEAR_SCRIPT })))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "value": { "error": "stale element reference", "message": "element is not attached" }
            })))
            .mount(&server)
            .await;

        let session = WebDriverClient::new(config(&server))
            .open_session()
            .await
            .unwrap();
        let err = session
            .clear_input(&InputHandle::new("e1"))
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_submit_sends_text_then_enter() {
        let server = MockServer::start().await;
        mount_session(&server).await;
        Mock::given(method("POST"))
            .and(path("/session/s1/element/e1/value"))
            .and(body_partial_json(json!({ "text": "Moby Dick" })))
            .respond_with(ok_null())
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/session/s1/element/e1/value"))
            .and(body_partial_json(json!({ "text": ENTER_KEY })))
            .respond_with(ok_null())
            .expect(1)
            .mount(&server)
            .await;

        let session = WebDriverClient::new(config(&server))
            .open_session()
            .await
            .unwrap();
        let input = InputHandle::new("e1");
        session.submit_text(&input, "Moby Dick").await.unwrap();
        session.submit_query(&input).await.unwrap();
    }

    #[tokio::test]
    async fn test_wait_reports_empty_marker() {
        let server = MockServer::start().await;
        mount_session(&server).await;
        Mock::given(method("POST"))
            .and(path("/session/s1/elements"))
            .and(body_partial_json(json!({ "value": "div.producto" })))
            .respond_with(elements(&[]))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/session/s1/elements"))
            .and(body_partial_json(json!({ "value": "span.empty" })))
            .respond_with(elements(&["m1"]))
            .mount(&server)
            .await;

        let session = WebDriverClient::new(config(&server))
            .open_session()
            .await
            .unwrap();
        let signal = session
            .wait_for_results_or_empty("div.producto", "span.empty", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(signal, Signal::empty());
    }

    #[tokio::test]
    async fn test_close_deletes_session() {
        let server = MockServer::start().await;
        mount_session(&server).await;
        Mock::given(method("DELETE"))
            .and(path("/session/s1"))
            .respond_with(ok_null())
            .expect(1)
            .mount(&server)
            .await;

        let session = WebDriverClient::new(config(&server))
            .open_session()
            .await
            .unwrap();
        session.close().await.unwrap();
    }
}
