//! Reducer logic for the customer slice.
//!
//! Request actions raise one in-flight flag and clear both errors. Success
//! actions clear the flags and update the known ids. Failure actions clear the
//! flags and record the error; they never touch the ids.

use crate::types::{CustomerAction, CustomerState};
use shopfront_core::entities::EntityId;
use shopfront_core::{SmallVec, effect::Effect, reducer::Reducer};
use std::collections::HashSet;

/// Reducer for the customer slice
///
/// Pure and effect-free: the API middleware does the I/O and feeds its
/// lifecycle actions back in.
#[derive(Clone, Copy, Debug)]
pub struct CustomerReducer;

impl CustomerReducer {
    /// Creates a new `CustomerReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn start(state: &mut CustomerState, fetching: bool, saving: bool) {
        state.fetching = fetching;
        state.saving = saving;
        state.fetch_error = None;
        state.save_error = None;
    }

    const fn settle(state: &mut CustomerState) {
        state.fetching = false;
        state.saving = false;
    }
}

impl Default for CustomerReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for CustomerReducer {
    type State = CustomerState;
    type Action = CustomerAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        tracing::debug!(action = action.action_type(), "Reducing customer action");

        match action {
            // ========== Requests ==========
            CustomerAction::LoadCustomersRequest | CustomerAction::LoadCustomerRequest => {
                Self::start(state, true, false);
            },
            CustomerAction::SaveCustomerRequest | CustomerAction::DeleteCustomerRequest => {
                Self::start(state, false, true);
            },

            // ========== Successes ==========
            CustomerAction::LoadCustomersSuccess { response }
            | CustomerAction::LoadCustomerSuccess { response }
            | CustomerAction::SaveCustomerSuccess { response } => {
                Self::settle(state);
                state.ids = union(&state.ids, &response.result.to_vec());
            },
            CustomerAction::DeleteCustomerSuccess { response } => {
                Self::settle(state);
                state.ids = difference(&response.result.to_vec(), &state.ids);
            },

            // ========== Failures ==========
            CustomerAction::LoadCustomersFailure { error }
            | CustomerAction::LoadCustomerFailure { error } => {
                Self::settle(state);
                state.fetch_error = Some(error);
            },
            CustomerAction::SaveCustomerFailure { error }
            | CustomerAction::DeleteCustomerFailure { error } => {
                Self::settle(state);
                state.save_error = Some(error);
            },
        }

        SmallVec::new()
    }
}

/// Ids of `first` in order, then ids of `second` not seen yet, without
/// duplicates
fn union(first: &[EntityId], second: &[EntityId]) -> Vec<EntityId> {
    let mut seen: HashSet<&EntityId> = HashSet::with_capacity(first.len() + second.len());
    first
        .iter()
        .chain(second)
        .filter(|id| seen.insert(*id))
        .cloned()
        .collect()
}

/// Ids of `ids` that do not occur in `excluded`, in order, without duplicates
fn difference(ids: &[EntityId], excluded: &[EntityId]) -> Vec<EntityId> {
    let mut seen: HashSet<&EntityId> = excluded.iter().collect();
    ids.iter().filter(|id| seen.insert(*id)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use shopfront_core::api::ApiResponse;
    use shopfront_core::entities::IdSelection;
    use shopfront_testing::{ReducerTest, assertions};

    fn ids<I: IntoIterator<Item = i64>>(raw: I) -> Vec<EntityId> {
        raw.into_iter().map(EntityId::from).collect()
    }

    fn state_with_ids<I: IntoIterator<Item = i64>>(raw: I) -> CustomerState {
        CustomerState {
            ids: ids(raw),
            ..CustomerState::new()
        }
    }

    fn errored_state() -> CustomerState {
        CustomerState {
            ids: ids([1]),
            fetch_error: Some(json!("fetch broke")),
            save_error: Some(json!("save broke")),
            ..CustomerState::new()
        }
    }

    #[test]
    fn union_keeps_existing_order_and_appends_new() {
        assert_eq!(union(&ids([2, 3]), &ids([1, 2, 3])), ids([2, 3, 1]));
        assert_eq!(union(&[], &ids([4, 4, 5])), ids([4, 5]));
        assert_eq!(union(&ids([1]), &[]), ids([1]));
    }

    #[test]
    fn union_of_large_lists_stays_ordered() {
        let merged = union(&ids(0..5000), &ids((2500..7500).rev()));
        assert_eq!(merged.len(), 7500);
        assert_eq!(merged[..5000], ids(0..5000)[..]);
        assert_eq!(merged[5000], EntityId::from(7499));
        assert_eq!(merged[7499], EntityId::from(5000));
    }

    #[test]
    fn difference_keeps_first_operand_only() {
        assert_eq!(difference(&ids([2]), &ids([1, 2, 3])), Vec::<EntityId>::new());
        assert_eq!(difference(&ids([4]), &ids([1, 2, 3])), ids([4]));
        assert_eq!(difference(&ids([1, 5, 5]), &ids([1])), ids([5]));
    }

    #[test]
    fn load_requests_start_fetching() {
        for action in [
            CustomerAction::LoadCustomersRequest,
            CustomerAction::LoadCustomerRequest,
        ] {
            ReducerTest::new(CustomerReducer::new())
                .with_env(())
                .given_state(CustomerState {
                    saving: true,
                    ..errored_state()
                })
                .when_action(action)
                .then_state(|state| {
                    assert!(state.fetching);
                    assert!(!state.saving);
                    assert_eq!(state.fetch_error, None);
                    assert_eq!(state.save_error, None);
                    assert_eq!(state.ids, ids([1]));
                })
                .then_effects(assertions::assert_no_effects)
                .run();
        }
    }

    #[test]
    fn save_and_delete_requests_start_saving() {
        for action in [
            CustomerAction::SaveCustomerRequest,
            CustomerAction::DeleteCustomerRequest,
        ] {
            ReducerTest::new(CustomerReducer::new())
                .with_env(())
                .given_state(CustomerState {
                    fetching: true,
                    ..errored_state()
                })
                .when_action(action)
                .then_state(|state| {
                    assert!(!state.fetching);
                    assert!(state.saving);
                    assert_eq!(state.fetch_error, None);
                    assert_eq!(state.save_error, None);
                })
                .then_effects(assertions::assert_no_effects)
                .run();
        }
    }

    #[test]
    fn load_all_success_merges_ids_without_duplicates() {
        ReducerTest::new(CustomerReducer::new())
            .with_env(())
            .given_state(CustomerState {
                fetching: true,
                ..state_with_ids([2, 3])
            })
            .when_action(CustomerAction::LoadCustomersSuccess {
                response: ApiResponse::new(IdSelection::many([1, 2, 3])),
            })
            .then_state(|state| {
                assert_eq!(state.ids, ids([2, 3, 1]));
                assert!(!state.fetching);
                assert!(!state.saving);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn single_id_result_is_appended_once() {
        for action in [
            CustomerAction::LoadCustomerSuccess {
                response: ApiResponse::new(EntityId::from(9)),
            },
            CustomerAction::SaveCustomerSuccess {
                response: ApiResponse::new(EntityId::from(9)),
            },
        ] {
            ReducerTest::new(CustomerReducer::new())
                .with_env(())
                .given_state(state_with_ids([1]))
                .when_actions([action.clone(), action])
                .then_state(|state| assert_eq!(state.ids, ids([1, 9])))
                .run();
        }
    }

    #[test]
    fn delete_success_keeps_difference_of_result_and_existing() {
        ReducerTest::new(CustomerReducer::new())
            .with_env(())
            .given_state(CustomerState {
                saving: true,
                ..state_with_ids([1, 2, 3])
            })
            .when_action(CustomerAction::DeleteCustomerSuccess {
                response: ApiResponse::new(EntityId::from(2)),
            })
            .then_state(|state| {
                assert!(state.ids.is_empty());
                assert!(!state.saving);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn delete_success_with_unknown_id_keeps_only_that_id() {
        ReducerTest::new(CustomerReducer::new())
            .with_env(())
            .given_state(state_with_ids([1, 2, 3]))
            .when_action(CustomerAction::DeleteCustomerSuccess {
                response: ApiResponse::new(EntityId::from(4)),
            })
            .then_state(|state| assert_eq!(state.ids, ids([4])))
            .run();
    }

    #[test]
    fn load_failures_record_fetch_error_only() {
        for action in [
            CustomerAction::LoadCustomersFailure {
                error: json!({"status": 500}),
            },
            CustomerAction::LoadCustomerFailure {
                error: json!({"status": 500}),
            },
        ] {
            ReducerTest::new(CustomerReducer::new())
                .with_env(())
                .given_state(CustomerState {
                    fetching: true,
                    save_error: Some(json!("earlier")),
                    ..state_with_ids([1, 2])
                })
                .when_action(action)
                .then_state(|state| {
                    assert_eq!(state.fetch_error, Some(json!({"status": 500})));
                    assert_eq!(state.save_error, Some(json!("earlier")));
                    assert!(!state.fetching);
                    assert!(!state.saving);
                    assert_eq!(state.ids, ids([1, 2]));
                })
                .then_effects(assertions::assert_no_effects)
                .run();
        }
    }

    #[test]
    fn save_failures_record_save_error_only() {
        for action in [
            CustomerAction::SaveCustomerFailure {
                error: json!("invalid email"),
            },
            CustomerAction::DeleteCustomerFailure {
                error: json!("invalid email"),
            },
        ] {
            ReducerTest::new(CustomerReducer::new())
                .with_env(())
                .given_state(CustomerState {
                    saving: true,
                    fetch_error: Some(json!("earlier")),
                    ..state_with_ids([3])
                })
                .when_action(action)
                .then_state(|state| {
                    assert_eq!(state.save_error, Some(json!("invalid email")));
                    assert_eq!(state.fetch_error, Some(json!("earlier")));
                    assert!(!state.saving);
                    assert_eq!(state.ids, ids([3]));
                })
                .run();
        }
    }

    #[test]
    fn null_error_is_still_recorded() {
        ReducerTest::new(CustomerReducer::new())
            .with_env(())
            .given_state(CustomerState::new())
            .when_action(CustomerAction::SaveCustomerFailure { error: Value::Null })
            .then_state(|state| assert_eq!(state.save_error, Some(Value::Null)))
            .run();
    }

    #[test]
    fn request_then_success_round_trip() {
        ReducerTest::new(CustomerReducer::new())
            .with_env(())
            .given_state(CustomerState::new())
            .when_actions([
                CustomerAction::LoadCustomersRequest,
                CustomerAction::LoadCustomersSuccess {
                    response: ApiResponse::new(IdSelection::many([1, 2])),
                },
                CustomerAction::SaveCustomerRequest,
                CustomerAction::SaveCustomerFailure {
                    error: json!("conflict"),
                },
                CustomerAction::LoadCustomerRequest,
            ])
            .then_state(|state| {
                assert_eq!(state.ids, ids([1, 2]));
                assert!(state.fetching);
                assert_eq!(state.save_error, None);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn string_and_numeric_ids_stay_distinct() {
        ReducerTest::new(CustomerReducer::new())
            .with_env(())
            .given_state(state_with_ids([5]))
            .when_action(CustomerAction::LoadCustomerSuccess {
                response: ApiResponse::new(EntityId::from("c-5")),
            })
            .then_state(|state| {
                assert_eq!(state.ids, vec![EntityId::from(5), EntityId::from("c-5")]);
            })
            .run();
    }
}
