use std::collections::HashMap;

use axum::extract::{Query, Request};
use axum::http::{HeaderMap, Method, Uri, header};

/// Owned snapshot of the request a guard function receives.
///
/// Immutable; the guard never mutates the request it is deciding on.
#[derive(Debug, Clone)]
pub struct GuardContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
}

impl GuardContext {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        Self {
            method,
            uri,
            headers,
        }
    }

    pub fn from_request(req: &Request) -> Self {
        Self::new(req.method().clone(), req.uri().clone(), req.headers().clone())
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Path plus query string, as requested.
    pub fn resolved_url(&self) -> &str {
        self.uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| self.uri.path())
    }

    /// Decoded query parameters. A malformed query string reads as empty.
    pub fn query(&self) -> HashMap<String, String> {
        Query::<HashMap<String, String>>::try_from_uri(&self.uri)
            .map(|Query(params)| params)
            .unwrap_or_default()
    }

    /// Header value, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Cookie value from any `Cookie` header.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }
}
