//! Persistence interface for person records

use async_trait::async_trait;
use enrich_common::db::Person;
use enrich_common::Result;

use crate::person::{NewPerson, PersonPatch};
use crate::query::SqlStatement;

pub mod sqlite;

pub use sqlite::SqlitePersonStore;

/// Storage operations the record service depends on
///
/// `get`, `update` and `delete` return `Error::NotFound` when no row has
/// the given id.
#[async_trait]
pub trait PersonStore: Send + Sync {
    /// Every row, no predicate
    async fn list_all(&self) -> Result<Vec<Person>>;

    /// Rows matching a statement built by [`crate::query::build_select`]
    async fn list(&self, query: &SqlStatement) -> Result<Vec<Person>>;

    async fn get(&self, id: i64) -> Result<Person>;

    /// Insert and return the new id
    async fn create(&self, person: &NewPerson) -> Result<i64>;

    async fn update(&self, id: i64, patch: &PersonPatch) -> Result<()>;

    async fn delete(&self, id: i64) -> Result<()>;
}
