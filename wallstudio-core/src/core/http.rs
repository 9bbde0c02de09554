use attohttpc::header::HeaderName;
use attohttpc::Method;
use std::collections::BTreeMap;

use crate::core::error::WallpaperError;

const USER_AGENT: &str = "WallStudio/0.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// One outgoing request. Built with the `with_*` methods and handed to a [`Transport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    pub url: String,
    pub method: HttpMethod,
    pub query: Vec<(String, String)>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Vec<u8>>,
}

impl RequestContext {
    pub fn new(url: impl Into<String>, method: HttpMethod) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("User-Agent".to_string(), USER_AGENT.to_string());

        Self {
            url: url.into(),
            method,
            query: Vec::new(),
            headers,
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(url, HttpMethod::Get)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(url, HttpMethod::Post)
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn with_json(mut self, body: &serde_json::Value) -> Self {
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        self.body = Some(body.to_string().into_bytes());
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the body of a 2xx response, or a `Network` error naming the status.
    pub fn into_success_body(self) -> Result<Vec<u8>, WallpaperError> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(WallpaperError::Network(format!("HTTP status {}", self.status)))
        }
    }
}

/// Blocking HTTP seam shared by the search, generation and download paths.
pub trait Transport: Send + Sync {
    fn execute(&self, request: RequestContext) -> Result<HttpResponse, WallpaperError>;
}

/// [`Transport`] backed by attohttpc with rustls.
#[derive(Debug, Default, Clone, Copy)]
pub struct AttoTransport;

impl Transport for AttoTransport {
    fn execute(&self, request: RequestContext) -> Result<HttpResponse, WallpaperError> {
        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        };
        log::debug!("{} {}", method, request.url);

        let mut builder = attohttpc::RequestBuilder::new(method, &request.url);
        for (key, value) in &request.query {
            builder = builder.param(key, value);
        }
        for (key, value) in &request.headers {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(WallpaperError::network)?;
            builder = builder.try_header(name, value.as_str())?;
        }

        let response = match request.body {
            Some(body) => builder.bytes(body).send()?,
            None => builder.send()?,
        };

        let status = response.status().as_u16();
        let body = response.bytes()?;
        log::debug!("{} -> {} ({} bytes)", request.url, status, body.len());
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_query_and_headers() {
        let request = RequestContext::get("https://example.test/search")
            .with_query("page", 3)
            .with_query("query", "nature")
            .with_header("Authorization", "key");

        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.query_value("page"), Some("3"));
        assert_eq!(request.query_value("query"), Some("nature"));
        assert_eq!(request.headers.get("Authorization").map(String::as_str), Some("key"));
        assert!(request.headers.contains_key("User-Agent"));
        assert!(request.body.is_none());
    }

    #[test]
    fn json_body_sets_content_type() {
        let request = RequestContext::post("https://example.test").with_json(&serde_json::json!({"a": 1}));
        assert_eq!(request.body.as_deref(), Some(br#"{"a":1}"#.as_slice()));
        assert_eq!(
            request.headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn non_success_status_is_network_error() {
        let ok = HttpResponse { status: 204, body: vec![1] };
        assert_eq!(ok.into_success_body().unwrap(), vec![1]);

        let missing = HttpResponse { status: 404, body: Vec::new() };
        assert_eq!(
            missing.into_success_body(),
            Err(WallpaperError::Network("HTTP status 404".into()))
        );
    }
}
