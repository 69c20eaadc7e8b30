//! Blocking HTTP transport for the Google APIs
//!
//! Clients build an [`ApiRequest`], hand it to a [`Transport`] and interpret
//! the [`ApiResponse`]. Only [`HttpTransport`] touches the network; tests
//! swap in a scripted transport.

use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use duke_relay_core::{StoreError, StoreResult};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::auth::ServiceAccountAuth;
use crate::error::AuthError;

/// Characters escaped when an ID or range is placed in a URL path
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'!')
    .remove(b':');

/// Percent-encode one URL path segment
pub fn path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Request body variants the clients need
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    /// A local file streamed as the body
    File { path: PathBuf, content_type: String },
}

/// A request against an absolute API URL
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn query(mut self, name: &str, value: impl Into<String>) -> Self {
        self.query.push((name.to_string(), value.into()));
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn file(mut self, path: impl Into<PathBuf>, content_type: impl Into<String>) -> Self {
        self.body = RequestBody::File {
            path: path.into(),
            content_type: content_type.into(),
        };
        self
    }

    /// Value of a query parameter, if set
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// A response with its body fully read
#[derive(Debug, Clone, Default)]
pub struct ApiResponse {
    pub status: u16,
    /// Header names are lowercase
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Turn a non-2xx response into a [`StoreError`]
    pub fn error_for_status(self) -> StoreResult<Self> {
        if self.is_success() {
            return Ok(self);
        }

        let message = serde_json::from_slice::<ErrorEnvelope>(&self.body)
            .map(|envelope| envelope.error.message)
            .unwrap_or_else(|_| String::from_utf8_lossy(&self.body).trim().to_string());

        if self.status == 404 {
            Err(StoreError::NotFound(message))
        } else {
            Err(StoreError::remote(self.status, message))
        }
    }

    /// Deserialize the JSON body
    pub fn json<T: DeserializeOwned>(&self) -> StoreResult<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            StoreError::UnexpectedResponse(format!("malformed response body: {e}"))
        })
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Sends API requests
pub trait Transport {
    fn send(&self, request: ApiRequest) -> StoreResult<ApiResponse>;
}

/// Transport over `reqwest`'s blocking client with service account auth
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    auth: ServiceAccountAuth,
}

impl HttpTransport {
    /// Default request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new(auth: ServiceAccountAuth) -> Result<Self, AuthError> {
        Self::with_timeout(auth, Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(auth: ServiceAccountAuth, timeout: Duration) -> Result<Self, AuthError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self { client, auth })
    }

    /// Service account the requests are made as
    pub fn client_email(&self) -> &str {
        self.auth.client_email()
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: ApiRequest) -> StoreResult<ApiResponse> {
        let token = self
            .auth
            .token()
            .map_err(|e| StoreError::Auth(e.to_string()))?;

        tracing::debug!("{} {}", request.method, request.url);

        let mut builder = self
            .client
            .request(request.method, &request.url)
            .bearer_auth(token)
            .query(&request.query);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::File { path, content_type } => {
                let file = File::open(&path)?;
                let length = file.metadata()?.len();
                builder
                    .header(reqwest::header::CONTENT_TYPE, content_type)
                    .header(reqwest::header::CONTENT_LENGTH, length)
                    .body(reqwest::blocking::Body::from(file))
            }
        };

        let response = builder
            .send()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
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
            .map_err(|e| StoreError::Transport(e.to_string()))?
            .to_vec();

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

/// Scripted transport for client tests
#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;

    /// Replays queued responses and records every request
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        responses: RefCell<VecDeque<StoreResult<ApiResponse>>>,
        pub(crate) requests: RefCell<Vec<ApiRequest>>,
    }

    impl ScriptedTransport {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn respond(self, status: u16, body: &str) -> Self {
            self.respond_with(ApiResponse {
                status,
                headers: Vec::new(),
                body: body.as_bytes().to_vec(),
            })
        }

        pub(crate) fn respond_json(self, body: Value) -> Self {
            self.respond(200, &body.to_string())
        }

        pub(crate) fn respond_with(self, response: ApiResponse) -> Self {
            self.responses.borrow_mut().push_back(Ok(response));
            self
        }

        pub(crate) fn fail(self, error: StoreError) -> Self {
            self.responses.borrow_mut().push_back(Err(error));
            self
        }

        pub(crate) fn request(&self, index: usize) -> ApiRequest {
            self.requests.borrow()[index].clone()
        }

        pub(crate) fn request_count(&self) -> usize {
            self.requests.borrow().len()
        }
    }

    impl Transport for ScriptedTransport {
        fn send(&self, request: ApiRequest) -> StoreResult<ApiResponse> {
            self.requests.borrow_mut().push(request);
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(StoreError::Transport("no scripted response".into())))
        }
    }
}
