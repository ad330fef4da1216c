//! Action creators for the customer slice.
//!
//! Each creator returns an [`ApiCall`] for the API middleware. Nothing here
//! performs I/O or touches state.

use crate::types::{
    Customer, DELETE_CUSTOMER_FAILURE, DELETE_CUSTOMER_REQUEST, DELETE_CUSTOMER_SUCCESS,
    LOAD_CUSTOMER_FAILURE, LOAD_CUSTOMER_REQUEST, LOAD_CUSTOMER_SUCCESS, LOAD_CUSTOMERS_FAILURE,
    LOAD_CUSTOMERS_REQUEST, LOAD_CUSTOMERS_SUCCESS, SAVE_CUSTOMER_FAILURE, SAVE_CUSTOMER_REQUEST,
    SAVE_CUSTOMER_SUCCESS,
};
use shopfront_core::api::{ActionTypes, ApiCall, HttpMethod};
use shopfront_core::entities::{EntityId, EntitySchema, Schema};

/// Entity cache table holding customers
pub const CUSTOMERS_KEY: &str = "customers";

/// Lifecycle of [`load_customers`]
pub const LOAD_CUSTOMERS: ActionTypes =
    ActionTypes::new(LOAD_CUSTOMERS_REQUEST, LOAD_CUSTOMERS_SUCCESS, LOAD_CUSTOMERS_FAILURE);

/// Lifecycle of [`load_customer`]
pub const LOAD_CUSTOMER: ActionTypes =
    ActionTypes::new(LOAD_CUSTOMER_REQUEST, LOAD_CUSTOMER_SUCCESS, LOAD_CUSTOMER_FAILURE);

/// Lifecycle of [`save_customer`]
pub const SAVE_CUSTOMER: ActionTypes =
    ActionTypes::new(SAVE_CUSTOMER_REQUEST, SAVE_CUSTOMER_SUCCESS, SAVE_CUSTOMER_FAILURE);

/// Lifecycle of [`delete_customer`]
pub const DELETE_CUSTOMER: ActionTypes =
    ActionTypes::new(DELETE_CUSTOMER_REQUEST, DELETE_CUSTOMER_SUCCESS, DELETE_CUSTOMER_FAILURE);

/// Schema of a single customer response
#[must_use]
pub fn customer_schema() -> Schema {
    Schema::Entity(EntitySchema::new(CUSTOMERS_KEY))
}

/// Schema of a customer list response
#[must_use]
pub fn array_of_customers() -> Schema {
    Schema::array_of(customer_schema())
}

/// Fetches every customer
#[must_use]
pub fn load_customers() -> ApiCall {
    ApiCall::new("admin/customers", LOAD_CUSTOMERS).with_schema(array_of_customers())
}

/// Fetches one customer, through the admin API or the customer's own
#[must_use]
pub fn load_customer(id: impl Into<EntityId>, admin: bool) -> ApiCall {
    ApiCall::new(customer_path(Some(&id.into()), admin), LOAD_CUSTOMER)
        .with_schema(customer_schema())
}

/// Creates or updates a customer
///
/// A customer with an id is updated with `PUT`; one without is created with
/// `POST`. The customer itself is the request body.
#[must_use]
pub fn save_customer(customer: &Customer, admin: bool) -> ApiCall {
    let id = customer.saved_id();
    let method = if id.is_some() {
        HttpMethod::Put
    } else {
        HttpMethod::Post
    };

    ApiCall::new(customer_path(id, admin), SAVE_CUSTOMER)
        .with_method(method)
        .with_body(customer.to_json())
        .with_schema(customer_schema())
}

/// Deletes a customer
///
/// Always goes through the admin API. The response carries no entity.
#[must_use]
pub fn delete_customer(id: impl Into<EntityId>) -> ApiCall {
    ApiCall::new(customer_path(Some(&id.into()), true), DELETE_CUSTOMER)
        .with_method(HttpMethod::Delete)
}

fn customer_path(id: Option<&EntityId>, admin: bool) -> String {
    let base = if admin { "admin/customers" } else { "customer" };
    match id {
        Some(id) => format!("{base}/{id}"),
        None => base.to_string(),
    }
}
