//! Domain types for the customer slice.
//!
//! The slice never looks inside a customer beyond its id. Everything else is
//! opaque JSON owned by the backend and stored in the shared entity cache.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shopfront_core::api::{ApiResponse, WireAction};
use shopfront_core::entities::EntityId;
use shopfront_macros::Action;
use thiserror::Error;

/// A customer record
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Backend identifier, absent until the customer has been saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    /// Every other field, untouched
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Customer {
    /// An unsaved customer without fields
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the id
    #[must_use]
    pub fn with_id(mut self, id: impl Into<EntityId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets a payload field
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Reads a payload field
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// The id, if it designates a saved customer
    ///
    /// An empty string or zero id counts as unset.
    #[must_use]
    pub fn saved_id(&self) -> Option<&EntityId> {
        self.id.as_ref().filter(|id| match id {
            EntityId::Int(n) => *n != 0,
            EntityId::Str(s) => !s.is_empty(),
        })
    }

    /// JSON object sent as a request body
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut object = self.fields.clone();
        if let Some(id) = &self.id {
            object.insert("id".to_string(), id.to_json());
        }
        Value::Object(object)
    }
}

/// State of the customer slice
///
/// `ids` lists the customers this slice knows about; their data lives in the
/// entity cache.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerState {
    /// Known customer ids, without duplicates
    pub ids: Vec<EntityId>,
    /// A load request is in flight
    #[serde(default)]
    pub fetching: bool,
    /// A save or delete request is in flight
    #[serde(default)]
    pub saving: bool,
    /// Error of the last failed load
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<Value>,
    /// Error of the last failed save or delete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_error: Option<Value>,
}

impl CustomerState {
    /// Creates the initial state: no ids, nothing in flight, no errors
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Actions of the customer slice
///
/// Each HTTP operation has a request, success and failure action. Success
/// actions carry the normalized result ids; failure actions carry the error
/// value exactly as the middleware reported it.
#[derive(Action, Clone, Debug, PartialEq)]
#[action(namespace = "customer")]
pub enum CustomerAction {
    // ========== Load all ==========
    /// Loading the customer list started
    #[request]
    LoadCustomersRequest,

    /// The customer list arrived
    #[success]
    LoadCustomersSuccess {
        /// Normalized result
        response: ApiResponse,
    },

    /// Loading the customer list failed
    #[failure]
    LoadCustomersFailure {
        /// Opaque error value
        error: Value,
    },

    // ========== Load one ==========
    /// Loading one customer started
    #[request]
    LoadCustomerRequest,

    /// One customer arrived
    #[success]
    LoadCustomerSuccess {
        /// Normalized result
        response: ApiResponse,
    },

    /// Loading one customer failed
    #[failure]
    LoadCustomerFailure {
        /// Opaque error value
        error: Value,
    },

    // ========== Save ==========
    /// Saving a customer started
    #[request]
    SaveCustomerRequest,

    /// The saved customer arrived
    #[success]
    SaveCustomerSuccess {
        /// Normalized result
        response: ApiResponse,
    },

    /// Saving a customer failed
    #[failure]
    SaveCustomerFailure {
        /// Opaque error value
        error: Value,
    },

    // ========== Delete ==========
    /// Deleting a customer started
    #[request]
    DeleteCustomerRequest,

    /// The customer was deleted
    #[success]
    DeleteCustomerSuccess {
        /// Normalized result
        response: ApiResponse,
    },

    /// Deleting a customer failed
    #[failure]
    DeleteCustomerFailure {
        /// Opaque error value
        error: Value,
    },
}

/// `customer/LOAD_CUSTOMERS_REQUEST`
pub const LOAD_CUSTOMERS_REQUEST: &str = CustomerAction::LOAD_CUSTOMERS_REQUEST;
/// `customer/LOAD_CUSTOMERS_SUCCESS`
pub const LOAD_CUSTOMERS_SUCCESS: &str = CustomerAction::LOAD_CUSTOMERS_SUCCESS;
/// `customer/LOAD_CUSTOMERS_FAILURE`
pub const LOAD_CUSTOMERS_FAILURE: &str = CustomerAction::LOAD_CUSTOMERS_FAILURE;
/// `customer/LOAD_CUSTOMER_REQUEST`
pub const LOAD_CUSTOMER_REQUEST: &str = CustomerAction::LOAD_CUSTOMER_REQUEST;
/// `customer/LOAD_CUSTOMER_SUCCESS`
pub const LOAD_CUSTOMER_SUCCESS: &str = CustomerAction::LOAD_CUSTOMER_SUCCESS;
/// `customer/LOAD_CUSTOMER_FAILURE`
pub const LOAD_CUSTOMER_FAILURE: &str = CustomerAction::LOAD_CUSTOMER_FAILURE;
/// `customer/SAVE_CUSTOMER_REQUEST`
pub const SAVE_CUSTOMER_REQUEST: &str = CustomerAction::SAVE_CUSTOMER_REQUEST;
/// `customer/SAVE_CUSTOMER_SUCCESS`
pub const SAVE_CUSTOMER_SUCCESS: &str = CustomerAction::SAVE_CUSTOMER_SUCCESS;
/// `customer/SAVE_CUSTOMER_FAILURE`
pub const SAVE_CUSTOMER_FAILURE: &str = CustomerAction::SAVE_CUSTOMER_FAILURE;
/// `customer/DELETE_CUSTOMER_REQUEST`
pub const DELETE_CUSTOMER_REQUEST: &str = CustomerAction::DELETE_CUSTOMER_REQUEST;
/// `customer/DELETE_CUSTOMER_SUCCESS`
pub const DELETE_CUSTOMER_SUCCESS: &str = CustomerAction::DELETE_CUSTOMER_SUCCESS;
/// `customer/DELETE_CUSTOMER_FAILURE`
pub const DELETE_CUSTOMER_FAILURE: &str = CustomerAction::DELETE_CUSTOMER_FAILURE;

/// Errors decoding a wire action into a [`CustomerAction`]
#[derive(Debug, Error)]
pub enum ActionDecodeError {
    /// The JSON is not a wire action at all
    #[error("malformed action: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A success action arrived without its normalized response
    #[error("{action_type} has no response")]
    MissingResponse {
        /// The offending action type
        action_type: String,
    },
}

impl CustomerAction {
    /// Decodes a wire action
    ///
    /// Returns `Ok(None)` for action types owned by other slices. A failure
    /// action without an error value decodes with a `null` error.
    ///
    /// # Errors
    ///
    /// Returns [`ActionDecodeError::MissingResponse`] for a success action
    /// without a response.
    pub fn from_wire(wire: WireAction) -> Result<Option<Self>, ActionDecodeError> {
        let WireAction {
            action_type,
            response,
            error,
        } = wire;

        let success = |response: Option<ApiResponse>| {
            response.ok_or_else(|| ActionDecodeError::MissingResponse {
                action_type: action_type.clone(),
            })
        };
        let error = error.unwrap_or(Value::Null);

        let action = match action_type.as_str() {
            Self::LOAD_CUSTOMERS_REQUEST => Self::LoadCustomersRequest,
            Self::LOAD_CUSTOMERS_SUCCESS => Self::LoadCustomersSuccess {
                response: success(response)?,
            },
            Self::LOAD_CUSTOMERS_FAILURE => Self::LoadCustomersFailure { error },
            Self::LOAD_CUSTOMER_REQUEST => Self::LoadCustomerRequest,
            Self::LOAD_CUSTOMER_SUCCESS => Self::LoadCustomerSuccess {
                response: success(response)?,
            },
            Self::LOAD_CUSTOMER_FAILURE => Self::LoadCustomerFailure { error },
            Self::SAVE_CUSTOMER_REQUEST => Self::SaveCustomerRequest,
            Self::SAVE_CUSTOMER_SUCCESS => Self::SaveCustomerSuccess {
                response: success(response)?,
            },
            Self::SAVE_CUSTOMER_FAILURE => Self::SaveCustomerFailure { error },
            Self::DELETE_CUSTOMER_REQUEST => Self::DeleteCustomerRequest,
            Self::DELETE_CUSTOMER_SUCCESS => Self::DeleteCustomerSuccess {
                response: success(response)?,
            },
            Self::DELETE_CUSTOMER_FAILURE => Self::DeleteCustomerFailure { error },
            _ => return Ok(None),
        };

        Ok(Some(action))
    }

    /// Decodes a wire action from JSON
    ///
    /// # Errors
    ///
    /// Returns [`ActionDecodeError`] if the JSON is not a wire action or a
    /// success action lacks its response.
    pub fn from_json(value: Value) -> Result<Option<Self>, ActionDecodeError> {
        Self::from_wire(serde_json::from_value(value)?)
    }

    /// Encodes this action for the wire
    #[must_use]
    pub fn to_wire(&self) -> WireAction {
        let wire = WireAction::new(self.action_type());
        match self {
            Self::LoadCustomersSuccess { response }
            | Self::LoadCustomerSuccess { response }
            | Self::SaveCustomerSuccess { response }
            | Self::DeleteCustomerSuccess { response } => wire.with_response(response.clone()),
            Self::LoadCustomersFailure { error }
            | Self::LoadCustomerFailure { error }
            | Self::SaveCustomerFailure { error }
            | Self::DeleteCustomerFailure { error } => wire.with_error(error.clone()),
            Self::LoadCustomersRequest
            | Self::LoadCustomerRequest
            | Self::SaveCustomerRequest
            | Self::DeleteCustomerRequest => wire,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shopfront_core::entities::IdSelection;

    #[test]
    fn customer_json_keeps_unknown_fields() {
        let customer: Customer =
            serde_json::from_value(json!({"id": 5, "name": "Ada", "tags": ["vip"]})).unwrap();

        assert_eq!(customer.id, Some(EntityId::from(5)));
        assert_eq!(customer.field("name"), Some(&json!("Ada")));
        assert_eq!(customer.to_json(), json!({"id": 5, "name": "Ada", "tags": ["vip"]}));
    }

    #[test]
    fn customer_without_id() {
        let customer: Customer = serde_json::from_value(json!({"name": "New"})).unwrap();
        assert_eq!(customer.id, None);
        assert_eq!(customer.saved_id(), None);
        assert_eq!(customer.to_json(), json!({"name": "New"}));
    }

    #[test]
    fn blank_ids_are_not_saved() {
        assert_eq!(Customer::new().with_id("").saved_id(), None);
        assert_eq!(Customer::new().with_id(0).saved_id(), None);

        let customer = Customer::new().with_id(1);
        assert_eq!(customer.saved_id(), Some(&EntityId::from(1)));
        let customer = Customer::new().with_id("0");
        assert_eq!(customer.saved_id(), Some(&EntityId::from("0")));
    }

    #[test]
    fn initial_state_is_empty() {
        let state = CustomerState::new();
        assert!(state.ids.is_empty());
        assert!(!state.fetching);
        assert!(!state.saving);
        assert!(state.fetch_error.is_none());
        assert!(state.save_error.is_none());
        assert_eq!(serde_json::to_value(&state).unwrap(), json!({
            "ids": [],
            "fetching": false,
            "saving": false
        }));
    }

    #[test]
    fn twelve_namespaced_action_types() {
        assert_eq!(CustomerAction::ACTION_TYPES.len(), 12);
        assert!(
            CustomerAction::ACTION_TYPES
                .iter()
                .all(|t| t.starts_with("customer/"))
        );
        assert_eq!(LOAD_CUSTOMERS_REQUEST, "customer/LOAD_CUSTOMERS_REQUEST");
        assert_eq!(LOAD_CUSTOMER_SUCCESS, "customer/LOAD_CUSTOMER_SUCCESS");
        assert_eq!(SAVE_CUSTOMER_FAILURE, "customer/SAVE_CUSTOMER_FAILURE");
        assert_eq!(DELETE_CUSTOMER_REQUEST, "customer/DELETE_CUSTOMER_REQUEST");
    }

    #[test]
    fn lifecycle_phases() {
        assert!(CustomerAction::SaveCustomerRequest.is_request());
        assert!(
            CustomerAction::DeleteCustomerSuccess {
                response: ApiResponse::new(EntityId::from(1))
            }
            .is_success()
        );
        assert!(CustomerAction::LoadCustomerFailure { error: json!("x") }.is_failure());
    }

    #[test]
    fn decode_success_action() {
        let action = CustomerAction::from_json(json!({
            "type": "customer/LOAD_CUSTOMERS_SUCCESS",
            "response": {"result": [1, 2, 3]}
        }))
        .unwrap();

        assert_eq!(
            action,
            Some(CustomerAction::LoadCustomersSuccess {
                response: ApiResponse::new(IdSelection::many([1, 2, 3])),
            })
        );
    }

    #[test]
    fn decode_failure_keeps_error_verbatim() {
        let action = CustomerAction::from_json(json!({
            "type": "customer/SAVE_CUSTOMER_FAILURE",
            "error": {"status": 422, "errors": {"email": "taken"}}
        }))
        .unwrap();

        assert_eq!(
            action,
            Some(CustomerAction::SaveCustomerFailure {
                error: json!({"status": 422, "errors": {"email": "taken"}}),
            })
        );

        let bare = CustomerAction::from_json(json!({"type": "customer/LOAD_CUSTOMER_FAILURE"})).unwrap();
        assert_eq!(bare, Some(CustomerAction::LoadCustomerFailure { error: Value::Null }));
    }

    #[test]
    fn decode_ignores_other_slices() {
        let action = CustomerAction::from_json(json!({"type": "order/LOAD_ORDERS_REQUEST"})).unwrap();
        assert_eq!(action, None);
    }

    #[test]
    fn decode_rejects_success_without_response() {
        let error =
            CustomerAction::from_json(json!({"type": "customer/SAVE_CUSTOMER_SUCCESS"})).unwrap_err();
        assert!(matches!(
            error,
            ActionDecodeError::MissingResponse { ref action_type } if action_type == SAVE_CUSTOMER_SUCCESS
        ));
    }

    #[test]
    fn decode_rejects_non_actions() {
        assert!(matches!(
            CustomerAction::from_json(json!([1, 2])),
            Err(ActionDecodeError::Malformed(_))
        ));
    }

    #[test]
    fn wire_encoding_matches_decoding() {
        let actions = [
            CustomerAction::DeleteCustomerRequest,
            CustomerAction::DeleteCustomerSuccess {
                response: ApiResponse::new(EntityId::from(2)),
            },
            CustomerAction::LoadCustomersFailure {
                error: json!("offline"),
            },
        ];

        for action in actions {
            let wire = action.to_wire();
            assert_eq!(wire.action_type, action.action_type());
            assert_eq!(CustomerAction::from_wire(wire).unwrap(), Some(action));
        }
    }
}
