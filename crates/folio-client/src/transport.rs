//! Single-shot HTTP transport
//!
//! A [`Transport`] performs exactly one network call per [`Transport::send`] and
//! reports either the raw 2xx response or a [`RawFailure`]. It never retries and
//! never looks at the body shape; that is the job of the executor and normalizer.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Methods that are safe to replay automatically.
    ///
    /// DELETE counts as idempotent; POST, PUT and PATCH do not.
    pub fn is_idempotent(self) -> bool {
        matches!(self, HttpMethod::Get | HttpMethod::Delete)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// File content to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FilePayload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Multipart form: file parts plus flattened string fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    pub files: Vec<(String, FilePayload)>,
    pub fields: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(MultipartForm),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::Empty,
            timeout,
        }
    }

    pub fn with_query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_json(self, body: serde_json::Value) -> Self {
        let mut request = self.with_header("Content-Type", "application/json");
        request.body = RequestBody::Json(body);
        request
    }

    pub fn with_multipart(mut self, form: MultipartForm) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// A 2xx response, body untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Why a transport call did not produce a 2xx response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawFailure {
    /// Nothing usable came back (connect error, timeout, aborted body). Status 0.
    NoResponse { reason: String },
    /// The server answered with a non-2xx status.
    Status { status: u16, body: Vec<u8> },
}

impl RawFailure {
    pub fn status(&self) -> u16 {
        match self {
            RawFailure::NoResponse { .. } => 0,
            RawFailure::Status { status, .. } => *status,
        }
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse, RawFailure>;
}

/// Production transport backed by `reqwest`.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Describe a reqwest error with enough context to diagnose it from logs
    fn describe_error(e: &reqwest::Error, url: &str) -> String {
        if e.is_timeout() {
            format!("timeout calling {} - request took too long", url)
        } else if e.is_connect() {
            format!(
                "connection error calling {} - check network connectivity and DNS. Error: {}",
                url, e
            )
        } else if e.is_request() {
            format!("request error calling {} - malformed request. Error: {}", url, e)
        } else if e.is_body() || e.is_decode() {
            format!("failed to read response body from {}: {}", url, e)
        } else {
            format!("failed calling {}: {}. Debug details: {:?}", url, e, e)
        }
    }

    fn build_headers(headers: &[(String, String)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    map.insert(name, value);
                }
                _ => warn!("[ReqwestTransport] Skipping invalid header: {}", name),
            }
        }
        inject_trace_context(&mut map);
        map
    }

    fn build_form(form: MultipartForm) -> Result<reqwest::multipart::Form, reqwest::Error> {
        let mut multipart = reqwest::multipart::Form::new();
        for (field, file) in form.files {
            let FilePayload {
                file_name,
                content_type,
                bytes,
            } = file;
            let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
            let part = match content_type {
                Some(content_type) => part.mime_str(&content_type)?,
                None => part,
            };
            multipart = multipart.part(field, part);
        }
        for (name, value) in form.fields {
            multipart = multipart.text(name, value);
        }
        Ok(multipart)
    }
}

/// Inject the current trace context into outgoing headers for distributed tracing
fn inject_trace_context(headers: &mut HeaderMap) {
    use opentelemetry::Context;
    use opentelemetry::global;

    struct HeaderInjector<'a>(&'a mut HeaderMap);

    impl opentelemetry::propagation::Injector for HeaderInjector<'_> {
        fn set(&mut self, key: &str, value: String) {
            if let Ok(header_name) = HeaderName::from_bytes(key.as_bytes()) {
                if let Ok(header_value) = HeaderValue::from_str(&value) {
                    self.0.insert(header_name, header_value);
                }
            }
        }
    }

    global::get_text_map_propagator(|propagator| {
        propagator.inject_context(&Context::current(), &mut HeaderInjector(headers));
    });
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse, RawFailure> {
        let HttpRequest {
            method,
            url,
            query,
            headers,
            body,
            timeout,
        } = request;

        debug!("[ReqwestTransport] {} {}", method.as_str(), url);

        let mut builder = self
            .client
            .request(method.into(), &url)
            .headers(Self::build_headers(&headers))
            .timeout(timeout);
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => {
                let form = Self::build_form(form).map_err(|e| RawFailure::NoResponse {
                    reason: format!("invalid multipart form for {}: {}", url, e),
                })?;
                builder.multipart(form)
            }
        };

        let response = builder.send().await.map_err(|e| RawFailure::NoResponse {
            reason: Self::describe_error(&e, &url),
        })?;

        let status = response.status().as_u16();
        let response_headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| RawFailure::NoResponse {
                reason: Self::describe_error(&e, &url),
            })?
            .to_vec();

        debug!(
            "[ReqwestTransport] {} {} -> {} ({} bytes)",
            method.as_str(),
            url,
            status,
            body.len()
        );

        if !(200..300).contains(&status) {
            return Err(RawFailure::Status { status, body });
        }

        Ok(RawResponse {
            status,
            headers: response_headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idempotent_methods() {
        assert!(HttpMethod::Get.is_idempotent());
        assert!(HttpMethod::Delete.is_idempotent());
        assert!(!HttpMethod::Post.is_idempotent());
        assert!(!HttpMethod::Put.is_idempotent());
        assert!(!HttpMethod::Patch.is_idempotent());
    }

    #[test]
    fn test_json_request_sets_content_type() {
        let request = HttpRequest::new(HttpMethod::Post, "http://x/records", Duration::from_secs(1))
            .with_json(serde_json::json!({ "title": "t" }));
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert!(matches!(request.body, RequestBody::Json(_)));
    }

    #[test]
    fn test_failure_status() {
        let no_response = RawFailure::NoResponse {
            reason: "timeout".to_string(),
        };
        assert_eq!(no_response.status(), 0);
        let status = RawFailure::Status {
            status: 503,
            body: Vec::new(),
        };
        assert_eq!(status.status(), 503);
    }

    #[test]
    fn test_build_headers_skips_invalid() {
        let headers = ReqwestTransport::build_headers(&[
            ("Authorization".to_string(), "Bearer abc".to_string()),
            ("bad header".to_string(), "x".to_string()),
        ]);
        assert_eq!(headers.get("authorization").unwrap(), "Bearer abc");
        assert!(headers.get("bad header").is_none());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_no_response() {
        let transport = ReqwestTransport::new();
        let request = HttpRequest::new(
            HttpMethod::Get,
            "http://127.0.0.1:1/records",
            Duration::from_millis(500),
        );
        let failure = transport.send(request).await.unwrap_err();
        assert_eq!(failure.status(), 0);
    }
}
