use crate::errors::ApiError;
use derive_more::Display;
use serde::Serialize;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    #[display(fmt = "GET")]
    Get,
    #[display(fmt = "POST")]
    Post,
    #[display(fmt = "PATCH")]
    Patch,
    #[display(fmt = "DELETE")]
    Delete,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One backend call: path below the API root, method, optional JSON body and
/// header overrides. The body is serialized once so a retried call sends the
/// exact same bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApiRequest {
    path: String,
    method: Method,
    body: Option<String>,
    headers: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Attach a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        let encoded = serde_json::to_string(body).map_err(|e| {
            tracing::error!(error = %e, path = %self.path, "Failed to serialize request body");
            ApiError::request_failed()
        })?;
        self.body = Some(encoded);
        Ok(self)
    }

    /// Add a header override. `Authorization` is managed by the client and is
    /// ignored here.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}
