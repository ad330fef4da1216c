//! Read-only projections of the customer slice and the entity cache.

use crate::actions::{array_of_customers, customer_schema};
use crate::types::{Customer, CustomerState};
use serde_json::Value;
use shopfront_core::entities::{EntityCache, EntityId, IdSelection, denormalize};

/// Customers for `ids`, in order
///
/// Ids with no customer in the cache are skipped.
#[must_use]
pub fn get_all(ids: &[EntityId], entities: &EntityCache) -> Vec<Customer> {
    let selection = IdSelection::Many(ids.to_vec());
    let Some(Value::Array(items)) = denormalize(&selection, &array_of_customers(), entities) else {
        return Vec::new();
    };

    items.into_iter().filter_map(into_customer).collect()
}

/// The customer with `id`, if cached
#[must_use]
pub fn get_one(id: &EntityId, entities: &EntityCache) -> Option<Customer> {
    denormalize(&IdSelection::One(id.clone()), &customer_schema(), entities).and_then(into_customer)
}

/// A load request is in flight
#[must_use]
pub const fn loading(state: &CustomerState) -> bool {
    state.fetching
}

/// Error of the last failed load
#[must_use]
pub const fn load_error(state: &CustomerState) -> Option<&Value> {
    state.fetch_error.as_ref()
}

/// A save or delete request is in flight
#[must_use]
pub const fn saving(state: &CustomerState) -> bool {
    state.saving
}

/// Error of the last failed save or delete
#[must_use]
pub const fn save_error(state: &CustomerState) -> Option<&Value> {
    state.save_error.as_ref()
}

fn into_customer(value: Value) -> Option<Customer> {
    serde_json::from_value(value)
        .map_err(|error| tracing::warn!(%error, "Cached customer could not be decoded"))
        .ok()
}
