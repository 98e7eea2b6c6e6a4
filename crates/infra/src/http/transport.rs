use std::time::Duration;

use async_trait::async_trait;
use conduit_core::{Transport, TransportError, TransportRequest, TransportResponse};
use conduit_domain::constants::{DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT};
use conduit_domain::{ConduitError, Method};
use reqwest::Client as ReqwestClient;
use serde_json::Value;
use tracing::debug;

use crate::errors::{transport_error, InfraError};

/// Single-attempt HTTP transport backed by reqwest.
///
/// Retries, auth and classification all live above this layer; every
/// response that arrives is returned as-is whatever its status.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
}

impl ReqwestTransport {
    /// Start building a new transport.
    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, ConduitError> {
        Self::builder().build()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .client
            .request(reqwest_method(request.method), &request.url)
            .timeout(request.timeout);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|err| {
            debug!(method = %request.method, url = %request.url, error = %err, "HTTP request failed");
            transport_error(&err)
        })?;

        let status = response.status().as_u16();
        debug!(method = %request.method, url = %request.url, status, "received HTTP response");

        let text = response.text().await.map_err(|err| transport_error(&err))?;
        Ok(TransportResponse { status, body: parse_body(&text) })
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// JSON when it parses, the raw text otherwise, `None` when empty.
fn parse_body(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())))
}

/// Builder for [`ReqwestTransport`].
#[derive(Debug)]
pub struct ReqwestTransportBuilder {
    connect_timeout: Duration,
    user_agent: Option<String>,
}

impl Default for ReqwestTransportBuilder {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            user_agent: None,
        }
    }
}

impl ReqwestTransportBuilder {
    /// Upper bound on establishing a connection; per-attempt timeouts are
    /// set on each request.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<ReqwestTransport, ConduitError> {
        let agent = self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let builder = ReqwestClient::builder()
            .connect_timeout(self.connect_timeout)
            .user_agent(agent)
            .no_proxy();

        let client = builder.build().map_err(|err| ConduitError::from(InfraError::from(err)))?;

        Ok(ReqwestTransport { client })
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use conduit_core::TransportErrorKind;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn request(method: Method, url: String) -> TransportRequest {
        TransportRequest {
            method,
            url,
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            timeout: Duration::from_secs(5),
        }
    }

    fn transport() -> ReqwestTransport {
        ReqwestTransport::new().expect("transport")
    }

    #[tokio::test]
    async fn sends_query_headers_and_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/items"))
            .and(query_param("page", "1"))
            .and(header("X-Trace", "abc"))
            .and(body_json(json!({"name": "widget"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": 1}})))
            .expect(1)
            .mount(&server)
            .await;

        let mut req = request(Method::Post, format!("{}/items", server.uri()));
        req.query.push(("page".into(), "1".into()));
        req.headers.push(("X-Trace".into(), "abc".into()));
        req.body = Some(json!({"name": "widget"}));

        let response = transport().send(req).await.expect("response");

        assert_eq!(response.status, 201);
        assert_eq!(response.body, Some(json!({"data": {"id": 1}})));
    }

    #[tokio::test]
    async fn error_statuses_are_responses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let response =
            transport().send(request(Method::Get, server.uri())).await.expect("response");

        assert_eq!(response.status, 503);
        assert_eq!(response.body, Some(json!("upstream down")));
    }

    #[tokio::test]
    async fn empty_body_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE")).respond_with(ResponseTemplate::new(204)).mount(&server).await;

        let response =
            transport().send(request(Method::Delete, server.uri())).await.expect("response");

        assert_eq!(response.status, 204);
        assert_eq!(response.body, None);
    }

    #[tokio::test]
    async fn per_request_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let mut req = request(Method::Get, server.uri());
        req.timeout = Duration::from_millis(50);

        let err = transport().send(req).await.unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Timeout);
    }

    #[tokio::test]
    async fn refused_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED

        let err = transport().send(request(Method::Get, format!("http://{addr}"))).await.unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Connect);
    }

    #[test]
    fn parse_body_fallbacks() {
        assert_eq!(parse_body(""), None);
        assert_eq!(parse_body("  \n"), None);
        assert_eq!(parse_body("{\"a\":1}"), Some(json!({"a": 1})));
        assert_eq!(parse_body("plain"), Some(json!("plain")));
    }
}
