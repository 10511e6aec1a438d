//! Test fixtures
//!
//! Plain serializable records matching what services put in the cache.

use course_datalayer::{CacheKeyGenerator, CacheManager};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub id: i64,
    pub title: String,
}

pub fn problem(id: i64) -> Problem {
    Problem {
        id,
        title: format!("Problem {}", id),
    }
}

/// Fill the cache with entity, list and stats entries for problem 1 and class 1
pub async fn populate_cache(cache: &CacheManager) -> Vec<String> {
    let keys = vec![
        CacheKeyGenerator::entity("problem", 1),
        CacheKeyGenerator::query("problem", &json!({"page": 1, "difficulty": "easy"})),
        CacheKeyGenerator::stats("problem", 1),
        CacheKeyGenerator::entity("class", 1),
        CacheKeyGenerator::query("class", &json!({"owner": 1})),
    ];

    for key in &keys {
        assert!(cache.set(key, &problem(1), None).await);
    }
    keys
}
