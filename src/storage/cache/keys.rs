//! Cache key construction
//!
//! Key grammar:
//!
//! * entity: `{type}:{id}`
//! * query: `{type}s:{json}` where `json` is the query serialized with object
//!   keys sorted at every depth, so equal queries share a key
//! * stats: `{type}:stats:{id}`

use crate::utils::error::Result;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Entity types that participate in invalidation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Problem,
    Class,
    User,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Problem, EntityKind::Class, EntityKind::User];

    /// Type name used in cache keys
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Problem => "problem",
            EntityKind::Class => "class",
            EntityKind::User => "user",
        }
    }

    /// Entity types whose query results embed this one
    ///
    /// Class listings include their problems; user listings include their
    /// classes.
    pub fn dependents(self) -> &'static [EntityKind] {
        match self {
            EntityKind::Problem => &[],
            EntityKind::Class => &[EntityKind::Problem],
            EntityKind::User => &[EntityKind::Class],
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds cache keys
pub struct CacheKeyGenerator;

impl CacheKeyGenerator {
    /// Key of a single entity
    pub fn entity(entity_type: &str, id: impl fmt::Display) -> String {
        format!("{}:{}", entity_type, id)
    }

    /// Key of a query result; independent of the query's field order
    pub fn query(entity_type: &str, query: &Value) -> String {
        format!("{}s:{}", entity_type, Self::canonicalize(query))
    }

    /// Key of a query result for any serializable query type
    pub fn query_for<Q>(entity_type: &str, query: &Q) -> Result<String>
    where
        Q: Serialize + ?Sized,
    {
        let value = serde_json::to_value(query)?;
        Ok(Self::query(entity_type, &value))
    }

    /// Key of an entity's aggregated statistics
    pub fn stats(entity_type: &str, id: impl fmt::Display) -> String {
        format!("{}:stats:{}", entity_type, id)
    }

    /// Pattern matching every query result of a type
    pub fn query_pattern(entity_type: &str) -> String {
        format!("{}s:*", entity_type)
    }

    /// Pattern matching every stats key of a type
    pub fn stats_pattern(entity_type: &str) -> String {
        format!("{}:stats:*", entity_type)
    }

    /// Pattern matching keys nested under one entity, e.g. `class:7:members`
    pub fn children_pattern(entity_type: &str, id: impl fmt::Display) -> String {
        format!("{}:{}:*", entity_type, id)
    }

    /// Sort object keys recursively; array order is kept
    pub fn canonicalize(value: &Value) -> Value {
        match value {
            Value::Object(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                let mut sorted = Map::new();
                for key in keys {
                    sorted.insert(key.clone(), Self::canonicalize(&map[key]));
                }
                Value::Object(sorted)
            }
            Value::Array(items) => Value::Array(items.iter().map(Self::canonicalize).collect()),
            other => other.clone(),
        }
    }
}
