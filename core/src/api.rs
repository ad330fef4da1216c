//! Request descriptors consumed by the HTTP middleware.
//!
//! Action creators never perform I/O. They return an [`ApiCall`] naming the
//! endpoint, method, body and the response schema, together with the three
//! action types the middleware dispatches over the request lifecycle:
//!
//! 1. `request` before the call is made
//! 2. `success` with the normalized [`ApiResponse`] once the response has been
//!    merged into the entity cache
//! 3. `failure` with the error value otherwise

use crate::config::ApiConfig;
use crate::entities::{IdSelection, Schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// HTTP method of an API call
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// Read (the default)
    #[default]
    Get,
    /// Create
    Post,
    /// Replace
    Put,
    /// Remove
    Delete,
}

impl HttpMethod {
    /// Upper-case method name as sent on the wire
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The action types dispatched over one request lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ActionTypes {
    /// Dispatched before the HTTP call
    pub request: &'static str,
    /// Dispatched with the normalized response
    pub success: &'static str,
    /// Dispatched with the error value
    pub failure: &'static str,
}

impl ActionTypes {
    /// Builds a lifecycle triple
    #[must_use]
    pub const fn new(request: &'static str, success: &'static str, failure: &'static str) -> Self {
        Self {
            request,
            success,
            failure,
        }
    }

    /// Returns the triple in dispatch order
    #[must_use]
    pub const fn as_array(&self) -> [&'static str; 3] {
        [self.request, self.success, self.failure]
    }
}

/// Description of an HTTP call for the API middleware
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ApiCall {
    /// Path relative to the API root, without a leading slash
    pub endpoint: String,
    /// HTTP method
    pub method: HttpMethod,
    /// JSON request body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Shape of the response, used to normalize it into the entity cache
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    /// Lifecycle action types
    pub types: ActionTypes,
}

impl ApiCall {
    /// Creates a GET call with no body and no response schema
    #[must_use]
    pub fn new(endpoint: impl Into<String>, types: ActionTypes) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: HttpMethod::default(),
            body: None,
            schema: None,
            types,
        }
    }

    /// Sets the HTTP method
    #[must_use]
    pub const fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the JSON body
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets the response schema
    #[must_use]
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Absolute URL of this call under the configured API root
    #[must_use]
    pub fn url(&self, config: &ApiConfig) -> String {
        format!(
            "{}{}",
            config.api_root,
            self.endpoint.trim_start_matches('/')
        )
    }
}

/// Payload of a success action: the id(s) the normalized response resolved to
///
/// Full entities are never carried by actions; they live in the entity cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// Normalized result
    pub result: IdSelection,
}

impl ApiResponse {
    /// Wraps a normalized result
    #[must_use]
    pub fn new(result: impl Into<IdSelection>) -> Self {
        Self {
            result: result.into(),
        }
    }
}

/// An action as it appears on the wire, for middleware and devtools
///
/// Slices decode the types they own and ignore the rest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireAction {
    /// Namespaced action type, e.g. `customer/LOAD_CUSTOMERS_REQUEST`
    #[serde(rename = "type")]
    pub action_type: String,
    /// Normalized response of a success action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ApiResponse>,
    /// Error value of a failure action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl WireAction {
    /// A wire action carrying only its type
    #[must_use]
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            response: None,
            error: None,
        }
    }

    /// Attaches a normalized response
    #[must_use]
    pub fn with_response(mut self, response: ApiResponse) -> Self {
        self.response = Some(response);
        self
    }

    /// Attaches an error value
    #[must_use]
    pub fn with_error(mut self, error: Value) -> Self {
        self.error = Some(error);
        self
    }
}
