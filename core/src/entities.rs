//! Normalized entity cache shared by all slices.
//!
//! API responses arrive as nested JSON. Before a success action is dispatched
//! the middleware flattens them with [`normalize`]: every entity is stored once
//! in the [`EntityCache`] under its schema key and id, nested entities are
//! replaced by their ids, and the action only carries the resulting
//! [`IdSelection`]. Selectors rebuild full objects with [`denormalize`].
//!
//! ```
//! use serde_json::json;
//! use shopfront_core::entities::{
//!     denormalize, normalize, EntityCache, EntitySchema, IdSelection, Schema,
//! };
//!
//! let address = Schema::Entity(EntitySchema::new("addresses"));
//! let customer = EntitySchema::new("customers").with_relation("address", address);
//! let customers = Schema::array_of(Schema::Entity(customer));
//!
//! let response = json!([{ "id": 1, "name": "Ada", "address": { "id": 9, "city": "Turin" } }]);
//! let normalized = normalize(&response, &customers).unwrap();
//!
//! let mut cache = EntityCache::new();
//! cache.merge(normalized.entities);
//! assert_eq!(normalized.result, IdSelection::many([1]));
//! assert_eq!(cache.entity("customers", &1.into()).unwrap()["address"], json!(9));
//!
//! let rebuilt = denormalize(&normalized.result, &customers, &cache).unwrap();
//! assert_eq!(rebuilt, response);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Identifier of a cached entity
///
/// Backends hand out either numeric or string ids. Cache lookups go through
/// the id's display form, so `5` and `"5"` address the same entity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    /// Numeric id
    Int(i64),
    /// String id
    Str(String),
}

impl EntityId {
    /// Reads an id from a JSON number or string
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Self::Int),
            Value::String(s) => Some(Self::Str(s.clone())),
            _ => None,
        }
    }

    /// JSON representation of the id
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Int(n) => Value::from(*n),
            Self::Str(s) => Value::from(s.as_str()),
        }
    }

    fn cache_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<i32> for EntityId {
    fn from(id: i32) -> Self {
        Self::Int(i64::from(id))
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self::Int(i64::from(id))
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::Str(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self::Str(id)
    }
}

/// One id or a list of ids, as produced by normalizing a single entity or an
/// array of entities
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdSelection {
    /// Result of an array schema
    Many(Vec<EntityId>),
    /// Result of an entity schema
    One(EntityId),
}

impl IdSelection {
    /// Builds a list selection
    pub fn many<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<EntityId>,
    {
        Self::Many(ids.into_iter().map(Into::into).collect())
    }

    /// The selected ids as a list, wrapping a single id
    #[must_use]
    pub fn to_vec(&self) -> Vec<EntityId> {
        match self {
            Self::Many(ids) => ids.clone(),
            Self::One(id) => vec![id.clone()],
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Many(ids) => Value::Array(ids.iter().map(EntityId::to_json).collect()),
            Self::One(id) => id.to_json(),
        }
    }
}

impl From<EntityId> for IdSelection {
    fn from(id: EntityId) -> Self {
        Self::One(id)
    }
}

impl From<Vec<EntityId>> for IdSelection {
    fn from(ids: Vec<EntityId>) -> Self {
        Self::Many(ids)
    }
}

/// Shape of API data, used to normalize responses and rebuild objects
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Schema {
    /// A single entity
    Entity(EntitySchema),
    /// A list of values of the inner schema
    Array(Box<Schema>),
}

impl Schema {
    /// Array of the given schema
    #[must_use]
    pub fn array_of(inner: Self) -> Self {
        Self::Array(Box::new(inner))
    }
}

/// Definition of one entity type
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntitySchema {
    /// Cache key, e.g. `customers`
    pub key: String,
    /// Name of the id field
    pub id_attribute: String,
    /// Nested fields holding other entities
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relations: BTreeMap<String, Schema>,
}

impl EntitySchema {
    /// Entity stored under `key`, identified by its `id` field
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            id_attribute: "id".to_string(),
            relations: BTreeMap::new(),
        }
    }

    /// Use another field as the id
    #[must_use]
    pub fn with_id_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.id_attribute = attribute.into();
        self
    }

    /// Declare that `field` holds data of `schema`
    #[must_use]
    pub fn with_relation(mut self, field: impl Into<String>, schema: Schema) -> Self {
        self.relations.insert(field.into(), schema);
        self
    }
}

/// Flat storage of entities: schema key, then id, then the entity object
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityCache {
    tables: BTreeMap<String, BTreeMap<String, Value>>,
}

impl EntityCache {
    /// Creates an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `entity`, replacing any previous value
    pub fn insert(&mut self, key: &str, id: &EntityId, entity: Value) {
        self.tables
            .entry(key.to_string())
            .or_default()
            .insert(id.cache_key(), entity);
    }

    /// Looks up one entity
    #[must_use]
    pub fn entity(&self, key: &str, id: &EntityId) -> Option<&Value> {
        self.tables.get(key)?.get(&id.cache_key())
    }

    /// Number of entities stored under `key`
    #[must_use]
    pub fn count(&self, key: &str) -> usize {
        self.tables.get(key).map_or(0, BTreeMap::len)
    }

    /// Returns true if no entity is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.values().all(BTreeMap::is_empty)
    }

    /// Merges another cache into this one
    ///
    /// Entities present in both are merged field by field, with `other`
    /// winning on conflicts.
    pub fn merge(&mut self, other: Self) {
        for (key, table) in other.tables {
            let target = self.tables.entry(key).or_default();
            for (id, entity) in table {
                merge_entity(target, id, entity);
            }
        }
    }

    fn merge_one(&mut self, key: &str, id: &EntityId, entity: Value) {
        let table = self.tables.entry(key.to_string()).or_default();
        merge_entity(table, id.cache_key(), entity);
    }
}

fn merge_entity(table: &mut BTreeMap<String, Value>, id: String, entity: Value) {
    match (table.get_mut(&id), entity) {
        (Some(Value::Object(existing)), Value::Object(incoming)) => {
            existing.extend(incoming);
        },
        (_, entity) => {
            table.insert(id, entity);
        },
    }
}

/// Errors raised while normalizing a response
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// An entity has no usable id
    #[error("{key} entity has no usable `{attribute}` field")]
    MissingId {
        /// Schema key
        key: String,
        /// Expected id field
        attribute: String,
    },

    /// An entity schema was applied to a non-object value
    #[error("expected a {key} object")]
    NotAnObject {
        /// Schema key
        key: String,
    },

    /// An array schema was applied to a non-array value
    #[error("expected an array")]
    NotAnArray,

    /// The top-level schema does not yield an id or a list of ids
    #[error("top-level schema must be an entity or an array of entities")]
    UnsupportedResultSchema,
}

/// Outcome of [`normalize`]
#[derive(Clone, Debug, PartialEq)]
pub struct Normalized {
    /// Id(s) of the top-level entities
    pub result: IdSelection,
    /// Every entity found in the response
    pub entities: EntityCache,
}

/// Flattens nested API data into an entity cache
///
/// # Errors
///
/// Returns [`NormalizeError`] when the data does not match `schema`, when an
/// entity lacks an id, or when `schema` is not an entity or an array of
/// entities.
pub fn normalize(value: &Value, schema: &Schema) -> Result<Normalized, NormalizeError> {
    let mut entities = EntityCache::new();

    let result = match schema {
        Schema::Entity(_) => {
            let id = visit(value, schema, &mut entities)?;
            IdSelection::One(EntityId::from_json(&id).ok_or(NormalizeError::UnsupportedResultSchema)?)
        },
        Schema::Array(inner) if matches!(**inner, Schema::Entity(_)) => {
            let ids = visit(value, schema, &mut entities)?;
            let ids = ids
                .as_array()
                .map(|ids| ids.iter().filter_map(EntityId::from_json).collect())
                .ok_or(NormalizeError::NotAnArray)?;
            IdSelection::Many(ids)
        },
        Schema::Array(_) => return Err(NormalizeError::UnsupportedResultSchema),
    };

    tracing::debug!(ids = result.to_vec().len(), "normalized response");

    Ok(Normalized { result, entities })
}

fn visit(value: &Value, schema: &Schema, cache: &mut EntityCache) -> Result<Value, NormalizeError> {
    match schema {
        Schema::Entity(entity) => {
            let Value::Object(fields) = value else {
                return Err(NormalizeError::NotAnObject {
                    key: entity.key.clone(),
                });
            };
            let id = fields
                .get(&entity.id_attribute)
                .and_then(EntityId::from_json)
                .ok_or_else(|| NormalizeError::MissingId {
                    key: entity.key.clone(),
                    attribute: entity.id_attribute.clone(),
                })?;

            let mut flat = fields.clone();
            for (field, relation) in &entity.relations {
                if let Some(nested) = fields.get(field).filter(|v| !v.is_null()) {
                    flat.insert(field.clone(), visit(nested, relation, cache)?);
                }
            }

            cache.merge_one(&entity.key, &id, Value::Object(flat));
            Ok(id.to_json())
        },
        Schema::Array(inner) => {
            let Value::Array(items) = value else {
                return Err(NormalizeError::NotAnArray);
            };
            items
                .iter()
                .map(|item| visit(item, inner, cache))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        },
    }
}

/// Rebuilds nested objects for `selection` from the cache
///
/// Returns `None` when an entity schema's id is not cached. Under an array
/// schema, ids missing from the cache are dropped from the result. Relations
/// whose entity is missing become `null`. A reference back to an entity that
/// is already being rebuilt is left as its id.
#[must_use]
pub fn denormalize(selection: &IdSelection, schema: &Schema, cache: &EntityCache) -> Option<Value> {
    let input = match (selection, schema) {
        (IdSelection::One(id), Schema::Array(_)) => Value::Array(vec![id.to_json()]),
        _ => selection.to_json(),
    };
    unvisit(&input, schema, cache, &mut Vec::new())
}

fn unvisit(
    input: &Value,
    schema: &Schema,
    cache: &EntityCache,
    path: &mut Vec<(String, EntityId)>,
) -> Option<Value> {
    match schema {
        Schema::Entity(entity) => {
            let (id, stored) = match input {
                Value::Object(inline) => {
                    let id = inline.get(&entity.id_attribute).and_then(EntityId::from_json)?;
                    (id, inline.clone())
                },
                other => {
                    let id = EntityId::from_json(other)?;
                    let Some(Value::Object(stored)) = cache.entity(&entity.key, &id) else {
                        return None;
                    };
                    (id, stored.clone())
                },
            };

            let marker = (entity.key.clone(), id);
            if path.contains(&marker) {
                tracing::trace!(key = %entity.key, id = %marker.1, "cycle in entity graph");
                return Some(marker.1.to_json());
            }

            path.push(marker);
            let rebuilt = rebuild_relations(stored, entity, cache, path);
            path.pop();

            Some(Value::Object(rebuilt))
        },
        Schema::Array(inner) => {
            let Value::Array(items) = input else {
                return None;
            };
            Some(Value::Array(
                items
                    .iter()
                    .filter_map(|item| unvisit(item, inner, cache, path))
                    .collect(),
            ))
        },
    }
}

fn rebuild_relations(
    mut fields: Map<String, Value>,
    entity: &EntitySchema,
    cache: &EntityCache,
    path: &mut Vec<(String, EntityId)>,
) -> Map<String, Value> {
    for (field, relation) in &entity.relations {
        let Some(reference) = fields.get(field).filter(|v| !v.is_null()).cloned() else {
            continue;
        };
        let resolved = unvisit(&reference, relation, cache, path).unwrap_or(Value::Null);
        fields.insert(field.clone(), resolved);
    }
    fields
}
