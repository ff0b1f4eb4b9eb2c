//! SQLite implementation of [`PersonStore`]

use async_trait::async_trait;
use enrich_common::db::Person;
use enrich_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::debug;

use super::PersonStore;
use crate::person::{NewPerson, PersonPatch};
use crate::query::{
    build_update, fold_case, predicate::SELECT_PEOPLE, SqlArg, SqlStatement, TextField,
};

/// Person store over a shared SQLite connection pool
#[derive(Clone)]
pub struct SqlitePersonStore {
    pool: SqlitePool,
}

impl SqlitePersonStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn not_found(id: i64) -> Error {
    Error::NotFound(format!("person {}", id))
}

/// Append a folded shadow assignment for every text column being set
fn with_folded(mut assignments: Vec<(&'static str, SqlArg)>) -> Vec<(&'static str, SqlArg)> {
    let folded: Vec<_> = assignments
        .iter()
        .filter_map(|(column, value)| match value {
            SqlArg::Text(text) => TextField::from_param(column)
                .map(|field| (field.folded_column(), SqlArg::Text(fold_case(text)))),
            SqlArg::Int(_) => None,
        })
        .collect();
    assignments.extend(folded);
    assignments
}

#[async_trait]
impl PersonStore for SqlitePersonStore {
    async fn list_all(&self) -> Result<Vec<Person>> {
        let people = sqlx::query_as::<_, Person>(SELECT_PEOPLE)
            .fetch_all(&self.pool)
            .await?;
        Ok(people)
    }

    async fn list(&self, query: &SqlStatement) -> Result<Vec<Person>> {
        debug!(sql = %query.sql, args = query.args.len(), "Listing people");

        let mut select = sqlx::query_as::<_, Person>(&query.sql);
        for arg in &query.args {
            select = match arg {
                SqlArg::Text(value) => select.bind(value.clone()),
                SqlArg::Int(value) => select.bind(*value),
            };
        }

        Ok(select.fetch_all(&self.pool).await?)
    }

    async fn get(&self, id: i64) -> Result<Person> {
        let sql = format!("{} WHERE id = ?1", SELECT_PEOPLE);
        sqlx::query_as::<_, Person>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))
    }

    async fn create(&self, person: &NewPerson) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO people (
                name, surname, patronymic, age, gender, nationality,
                name_folded, surname_folded, patronymic_folded, gender_folded, nationality_folded
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&person.name)
        .bind(&person.surname)
        .bind(&person.patronymic)
        .bind(person.age)
        .bind(&person.gender)
        .bind(&person.nationality)
        .bind(fold_case(&person.name))
        .bind(fold_case(&person.surname))
        .bind(fold_case(&person.patronymic))
        .bind(fold_case(&person.gender))
        .bind(fold_case(&person.nationality))
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn update(&self, id: i64, patch: &PersonPatch) -> Result<()> {
        let stmt = build_update(id, with_folded(patch.assignments()))
            .ok_or_else(|| Error::Internal("update without assignments".to_string()))?;

        debug!(sql = %stmt.sql, "Updating person");

        let mut update = sqlx::query(&stmt.sql);
        for arg in &stmt.args {
            update = match arg {
                SqlArg::Text(value) => update.bind(value.clone()),
                SqlArg::Int(value) => update.bind(*value),
            };
        }

        let result = update.execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM people WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}
