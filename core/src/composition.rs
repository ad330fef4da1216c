//! Reducer composition utilities
//!
//! Application state is a root record with one field per slice plus the shared
//! entity cache. This module provides the glue to build the root reducer:
//!
//! - **`scope_reducer`**: Focus a slice reducer on its field of the root state,
//!   for the root actions that belong to the slice
//! - **`combine_reducers`**: Run multiple reducers on the same state/action
//!
//! A root action that does not project into a slice's action type leaves that
//! slice untouched, which is how every slice reducer stays total over actions
//! it does not know about.
//!
//! # Example
//!
//! ```
//! use shopfront_core::composition::{combine_reducers, scope_reducer};
//! use shopfront_core::{Effect, Reducer, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct Counter {
//!     count: i32,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum CounterAction {
//!     Increment,
//! }
//!
//! struct CounterReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = Counter;
//!     type Action = CounterAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut Counter, _action: CounterAction, _env: &()) -> SmallVec<[Effect<CounterAction>; 4]> {
//!         state.count += 1;
//!         SmallVec::new()
//!     }
//! }
//!
//! #[derive(Clone, Debug, Default)]
//! struct AppState {
//!     left: Counter,
//!     right: Counter,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum AppAction {
//!     Left(CounterAction),
//!     Right(CounterAction),
//! }
//!
//! let root = combine_reducers(vec![
//!     Box::new(scope_reducer(
//!         CounterReducer,
//!         |s: &mut AppState| &mut s.left,
//!         |a: AppAction| match a {
//!             AppAction::Left(inner) => Some(inner),
//!             AppAction::Right(_) => None,
//!         },
//!         AppAction::Left,
//!     )),
//!     Box::new(scope_reducer(
//!         CounterReducer,
//!         |s: &mut AppState| &mut s.right,
//!         |a: AppAction| match a {
//!             AppAction::Right(inner) => Some(inner),
//!             AppAction::Left(_) => None,
//!         },
//!         AppAction::Right,
//!     )),
//! ]);
//!
//! let mut state = AppState::default();
//! let _ = root.reduce(&mut state, AppAction::Left(CounterAction::Increment), &());
//! assert_eq!(state.left.count, 1);
//! assert_eq!(state.right.count, 0);
//! ```

use crate::effect::Effect;
use crate::reducer::Reducer;
use smallvec::SmallVec;

/// Combines multiple reducers that operate on the same state and action types.
///
/// Each reducer is run in sequence, and all effects are collected and concatenated.
#[must_use]
pub fn combine_reducers<S, A, E>(
    reducers: Vec<Box<dyn Reducer<State = S, Action = A, Environment = E> + Send + Sync>>,
) -> CombinedReducer<S, A, E>
where
    A: Clone,
{
    CombinedReducer { reducers }
}

/// A combined reducer that runs multiple reducers in sequence.
///
/// Created by [`combine_reducers`].
pub struct CombinedReducer<S, A, E> {
    reducers: Vec<Box<dyn Reducer<State = S, Action = A, Environment = E> + Send + Sync>>,
}

impl<S, A, E> Reducer for CombinedReducer<S, A, E>
where
    A: Clone,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let mut all_effects = SmallVec::new();

        for reducer in &self.reducers {
            let effects = reducer.reduce(state, action.clone(), env);
            all_effects.extend(effects);
        }

        all_effects
    }
}

/// Scopes a slice reducer to its field of a larger root state.
///
/// - `state`: lens from the root state to the slice state
/// - `to_local`: projects a root action into the slice's action type, or
///   `None` when the action belongs to some other slice
/// - `to_root`: embeds slice actions produced by effects back into root actions
pub fn scope_reducer<S, A, R>(
    reducer: R,
    state: fn(&mut S) -> &mut R::State,
    to_local: fn(A) -> Option<R::Action>,
    to_root: fn(R::Action) -> A,
) -> ScopedReducer<S, A, R>
where
    R: Reducer,
{
    ScopedReducer {
        reducer,
        state,
        to_local,
        to_root,
    }
}

/// A slice reducer embedded into a root state and action type.
///
/// Created by [`scope_reducer`].
pub struct ScopedReducer<S, A, R>
where
    R: Reducer,
{
    reducer: R,
    state: fn(&mut S) -> &mut R::State,
    to_local: fn(A) -> Option<R::Action>,
    to_root: fn(R::Action) -> A,
}

impl<S, A, R> Reducer for ScopedReducer<S, A, R>
where
    R: Reducer,
    R::Action: Send + 'static,
    A: Send + 'static,
{
    type State = S;
    type Action = A;
    type Environment = R::Environment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let Some(local) = (self.to_local)(action) else {
            return SmallVec::new();
        };

        let to_root = self.to_root;
        self.reducer
            .reduce((self.state)(state), local, env)
            .into_iter()
            .map(|effect| effect.map(to_root))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smallvec;

    #[derive(Clone, Debug, Default)]
    struct SubState {
        value: i32,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum SubAction {
        Add(i32),
        Echo(i32),
    }

    struct SubReducer;

    impl Reducer for SubReducer {
        type State = SubState;
        type Action = SubAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                SubAction::Add(n) => {
                    state.value += n;
                    SmallVec::new()
                },
                SubAction::Echo(n) => {
                    smallvec![Effect::future(async move { Some(SubAction::Add(n)) })]
                },
            }
        }
    }

    #[derive(Clone, Debug, Default)]
    struct ParentState {
        sub: SubState,
        other: String,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum ParentAction {
        Sub(SubAction),
        Rename(String),
    }

    struct RenameReducer;

    impl Reducer for RenameReducer {
        type State = ParentState;
        type Action = ParentAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            if let ParentAction::Rename(name) = action {
                state.other = name;
            }
            SmallVec::new()
        }
    }

    fn scoped() -> ScopedReducer<ParentState, ParentAction, SubReducer> {
        scope_reducer(
            SubReducer,
            |parent: &mut ParentState| &mut parent.sub,
            |action| match action {
                ParentAction::Sub(inner) => Some(inner),
                ParentAction::Rename(_) => None,
            },
            ParentAction::Sub,
        )
    }

    #[test]
    fn scoped_reducer_updates_only_its_field() {
        let reducer = scoped();
        let mut state = ParentState {
            sub: SubState { value: 5 },
            other: "test".to_string(),
        };

        let _ = reducer.reduce(&mut state, ParentAction::Sub(SubAction::Add(3)), &());
        assert_eq!(state.sub.value, 8);
        assert_eq!(state.other, "test");
    }

    #[test]
    fn scoped_reducer_ignores_foreign_actions() {
        let reducer = scoped();
        let mut state = ParentState::default();

        let effects = reducer.reduce(&mut state, ParentAction::Rename("x".to_string()), &());
        assert!(effects.is_empty());
        assert_eq!(state.sub.value, 0);
        assert_eq!(state.other, "");
    }

    #[test]
    fn scoped_reducer_embeds_effect_actions() {
        let reducer = scoped();
        let mut state = ParentState::default();

        let mut effects = reducer.reduce(&mut state, ParentAction::Sub(SubAction::Echo(4)), &());
        assert_eq!(effects.len(), 1);

        let Some(Effect::Future(future)) = effects.pop() else {
            panic!("expected a future effect");
        };
        assert_eq!(
            tokio_test::block_on(future),
            Some(ParentAction::Sub(SubAction::Add(4)))
        );
    }

    #[test]
    fn combined_reducers_all_run() {
        let combined = combine_reducers(vec![Box::new(scoped()), Box::new(RenameReducer)]);
        let mut state = ParentState::default();

        let _ = combined.reduce(&mut state, ParentAction::Sub(SubAction::Add(2)), &());
        let _ = combined.reduce(&mut state, ParentAction::Rename("Alice".to_string()), &());

        assert_eq!(state.sub.value, 2);
        assert_eq!(state.other, "Alice");
    }
}
