//! Database models

use serde::{Deserialize, Serialize};

/// A stored person record
///
/// Optional attributes are omitted from JSON output when unset
/// (empty string, or zero for `age`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub surname: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub patronymic: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub age: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub gender: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub nationality: String,
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}
