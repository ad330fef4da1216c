//! # Shopfront Testing
//!
//! Testing utilities and helpers for Shopfront state slices.
//!
//! This crate provides:
//! - [`ReducerTest`]: Given/When/Then harness for reducers
//! - Entity cache fixtures
//! - Property-based testing strategies
//! - Tracing setup for test output
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//! use shopfront_testing::fixtures::EntityCacheBuilder;
//!
//! let cache = EntityCacheBuilder::new("customers")
//!     .with(json!({"id": 1, "name": "Ada"}))
//!     .with(json!({"id": 2, "name": "Grace"}))
//!     .build();
//!
//! assert_eq!(cache.count("customers"), 2);
//! ```

use shopfront_core::entities::{EntityCache, EntityId};


pub use reducer_test::{ReducerTest, assertions};

/// Entity cache fixtures
pub mod fixtures {
    use super::{EntityCache, EntityId};
    use serde_json::Value;

    /// Builds an entity cache table from plain JSON objects
    ///
    /// Each object is stored under its `id` field. Objects without a usable
    /// id are skipped.
    #[derive(Debug, Clone)]
    pub struct EntityCacheBuilder {
        key: String,
        cache: EntityCache,
    }

    impl EntityCacheBuilder {
        /// Starts a builder for the table `key`
        #[must_use]
        pub fn new(key: impl Into<String>) -> Self {
            Self {
                key: key.into(),
                cache: EntityCache::new(),
            }
        }

        /// Adds an entity
        #[must_use]
        pub fn with(mut self, entity: Value) -> Self {
            if let Some(id) = entity.get("id").and_then(EntityId::from_json) {
                self.cache.insert(&self.key, &id, entity);
            }
            self
        }

        /// Switches to another table, keeping what was added so far
        #[must_use]
        pub fn table(mut self, key: impl Into<String>) -> Self {
            self.key = key.into();
            self
        }

        /// Finishes the cache
        #[must_use]
        pub fn build(self) -> EntityCache {
            self.cache
        }
    }
}

/// Test helpers and utilities
pub mod helpers {
    use tracing_subscriber::EnvFilter;

    /// Installs a tracing subscriber writing to the test output
    ///
    /// Honours `RUST_LOG`; safe to call from every test.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use super::EntityId;
    use proptest::prelude::*;
    use serde_json::{Value, json};
    use shopfront_core::entities::IdSelection;

    /// Small numeric or string ids, so that generated sequences collide often
    pub fn entity_id() -> impl Strategy<Value = EntityId> {
        prop_oneof![
            3 => (0_i64..8).prop_map(EntityId::Int),
            1 => "[a-c]".prop_map(EntityId::Str),
        ]
    }

    /// A single id or a short list of ids
    pub fn id_selection() -> impl Strategy<Value = IdSelection> {
        prop_oneof![
            entity_id().prop_map(IdSelection::One),
            prop::collection::vec(entity_id(), 0..5).prop_map(IdSelection::Many),
        ]
    }

    /// An opaque error payload as produced by an HTTP middleware
    pub fn error_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            "[a-z ]{0,12}".prop_map(Value::from),
            (400_u16..600).prop_map(|status| json!({"status": status})),
        ]
    }
}

pub use fixtures::EntityCacheBuilder;
pub use helpers::init_tracing;
