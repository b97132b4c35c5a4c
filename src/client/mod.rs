//! Gateway for every backend call.
//!
//! [`ApiClient::call`] attaches the stored access credential, refreshes it
//! once when the backend answers 401, and turns every failure into an
//! [`ApiError`]. Endpoint wrappers in [`crate::api`] are built on top of it.

pub mod flow;
pub mod navigator;
pub mod request;

pub use flow::{CallFlow, CallState, Next};
pub use navigator::{LogNavigator, Navigator};
pub use request::{ApiRequest, Method};

use crate::config::ClientConfig;
use crate::errors::{ApiError, ApiResult};
use crate::models::credentials::Credentials;
use crate::observability::generate_request_id;
use crate::session::SessionStore;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::Instrument;

pub const REFRESH_PATH: &str = "/auth/token/refresh/";
const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    api_url: String,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: SessionStore) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            session,
            navigator: Arc::new(LogNavigator),
        })
    }

    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Perform one backend call.
    ///
    /// Returns the parsed JSON body, or `None` for 204 No Content. A 401 is
    /// answered with at most one refresh and one retry of the same request;
    /// when the session cannot be recovered the credential pair is cleared,
    /// the navigator is reset to the root and the call fails as unauthorized.
    pub async fn call(&self, request: &ApiRequest) -> ApiResult<Option<Value>> {
        let request_id = generate_request_id();
        let span = tracing::info_span!(
            "api_call",
            method = %request.method(),
            path = %request.path(),
            request_id = %request_id,
        );
        self.run(request, &request_id).instrument(span).await
    }

    /// `call` for endpoints that always answer with a body.
    pub async fn fetch<T: DeserializeOwned>(&self, request: &ApiRequest) -> ApiResult<T> {
        match self.call(request).await? {
            Some(value) => decode(value, request.path()),
            None => {
                tracing::warn!(path = %request.path(), "Expected a response body, got none");
                Err(ApiError::request_failed())
            }
        }
    }

    /// `call` for endpoints that may answer 204.
    pub async fn send<T: DeserializeOwned>(&self, request: &ApiRequest) -> ApiResult<Option<T>> {
        self.call(request)
            .await?
            .map(|value| decode(value, request.path()))
            .transpose()
    }

    async fn run(&self, request: &ApiRequest, request_id: &str) -> ApiResult<Option<Value>> {
        let mut flow = CallFlow::new();
        let mut credentials = self.session.get()?;

        flow.begin();
        let mut response = self
            .dispatch(request, credentials.as_ref(), request_id)
            .await
            .map_err(|err| {
                flow.abort();
                err
            })?;

        loop {
            match flow.on_status(response.status(), credentials.is_some()) {
                Next::Accept => {
                    let outcome = read_body(response).await;
                    flow.settle(outcome.is_ok());
                    tracing::debug!(state = %flow.state(), "Call settled");
                    return outcome;
                }
                Next::Refresh => {
                    tracing::info!("Access credential rejected, refreshing");
                    let renewed = match &credentials {
                        Some(current) => self.refresh(current).await.map_err(|err| {
                            flow.abort();
                            err
                        })?,
                        None => None,
                    };

                    match flow.on_refresh(renewed.is_some()) {
                        Next::Retry => {
                            credentials = renewed;
                            response = self
                                .dispatch(request, credentials.as_ref(), request_id)
                                .await
                                .map_err(|err| {
                                    flow.abort();
                                    err
                                })?;
                        }
                        _ => return Err(self.reset_session()),
                    }
                }
                Next::Retry | Next::Reset => return Err(self.reset_session()),
            }
        }
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        credentials: Option<&Credentials>,
        request_id: &str,
    ) -> ApiResult<Response> {
        let url = format!("{}{}", self.api_url, request.path());

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(pair) = credentials {
            let bearer = HeaderValue::from_str(&format!("Bearer {}", pair.access)).map_err(|_| {
                tracing::error!("Stored access credential is not a valid header value");
                ApiError::request_failed()
            })?;
            headers.insert(AUTHORIZATION, bearer);
        }
        if let Ok(value) = HeaderValue::from_str(request_id) {
            headers.insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
        }
        for (name, value) in request.headers() {
            let Ok(header) = HeaderName::from_bytes(name.as_bytes()) else {
                tracing::warn!(header = %name, "Skipping invalid header name");
                continue;
            };
            if header == AUTHORIZATION {
                tracing::warn!("Ignoring Authorization override, credentials come from the session");
                continue;
            }
            match HeaderValue::from_str(value) {
                Ok(value) => {
                    headers.insert(header, value);
                }
                Err(_) => tracing::warn!(header = %name, "Skipping invalid header value"),
            }
        }

        let mut builder = self
            .http
            .request(request.method().into(), &url)
            .headers(headers);
        if let Some(body) = request.body() {
            builder = builder.body(body.to_string());
        }

        tracing::debug!(url = %url, authenticated = credentials.is_some(), "Sending request");
        let response = builder.send().await?;
        tracing::debug!(status = response.status().as_u16(), "Received response");
        Ok(response)
    }

    /// Trade the refresh credential for a new access credential and persist
    /// it. `Ok(None)` means the backend would not renew the session.
    async fn refresh(&self, current: &Credentials) -> ApiResult<Option<Credentials>> {
        let url = format!("{}{}", self.api_url, REFRESH_PATH);
        let result = self
            .http
            .post(&url)
            .json(&RefreshRequest {
                refresh: &current.refresh,
            })
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(error = %err, "Refresh request failed");
                return Ok(None);
            }
        };

        if !response.status().is_success() {
            tracing::info!(
                status = response.status().as_u16(),
                "Refresh credential rejected"
            );
            return Ok(None);
        }

        let access = match response.json::<RefreshResponse>().await {
            Ok(body) => body.access,
            Err(err) => {
                tracing::warn!(error = %err, "Refresh response has no access credential");
                return Ok(None);
            }
        };

        let renewed = current.with_access(access);
        self.session.set(&renewed)?;
        tracing::info!("Access credential refreshed");
        Ok(Some(renewed))
    }

    /// Full-session reset after an unrecoverable authentication failure.
    fn reset_session(&self) -> ApiError {
        tracing::warn!("Authentication could not be recovered, clearing session");
        if let Err(err) = self.session.clear() {
            tracing::error!(error = %err, "Failed to clear credentials during session reset");
        }
        self.navigator.reset_to_root();
        ApiError::unauthorized()
    }
}

async fn read_body(response: Response) -> ApiResult<Option<Value>> {
    let status = response.status();
    if status == StatusCode::NO_CONTENT {
        return Ok(None);
    }

    let bytes = response.bytes().await?;

    if !status.is_success() {
        let err = ApiError::from_response(status, &bytes);
        tracing::debug!(status = status.as_u16(), kind = %err.kind, "Call failed");
        return Err(err);
    }

    serde_json::from_slice(&bytes).map(Some).map_err(|err| {
        tracing::warn!(error = %err, "Response body is not valid JSON");
        ApiError::request_failed()
    })
}

fn decode<T: DeserializeOwned>(value: Value, path: &str) -> ApiResult<T> {
    serde_json::from_value(value).map_err(|err| {
        tracing::error!(path, error = %err, "Unexpected response shape");
        ApiError::request_failed()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Saved {
        saved: bool,
    }

    #[test]
    fn test_decode_matching_shape() {
        let saved: Saved = decode(json!({"saved": true}), "/wishlists/toggle/1/").unwrap();
        assert_eq!(saved, Saved { saved: true });
    }

    #[test]
    fn test_decode_mismatch_is_request_failed() {
        let result: ApiResult<Saved> = decode(json!({"other": 1}), "/wishlists/toggle/1/");
        assert_eq!(result.unwrap_err(), ApiError::request_failed());
    }
}
