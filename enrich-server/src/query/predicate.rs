//! Parameterized SQL construction for the `people` table
//!
//! Values never appear in the SQL text. Only column names from the fixed
//! allow-lists are written literally; every value becomes a numbered
//! placeholder (`?1`, `?2`, ...) whose number matches its position in
//! [`SqlStatement::args`].

use super::params::{fold_case, AgeFilter, FilterSet, Pagination};

/// Column list selected for every person query
pub const SELECT_PEOPLE: &str =
    "SELECT id, name, surname, patronymic, age, gender, nationality FROM people";

/// A bound query argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlArg {
    Text(String),
    Int(i64),
}

/// SQL text plus its arguments in placeholder order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlStatement {
    pub sql: String,
    pub args: Vec<SqlArg>,
}

impl SqlStatement {
    fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            args: Vec::new(),
        }
    }

    /// Append an argument and return its placeholder
    fn bind(&mut self, arg: SqlArg) -> String {
        self.args.push(arg);
        format!("?{}", self.args.len())
    }
}

/// Build the `SELECT` for a filtered listing
///
/// Text filters become `LIKE '%value%'` predicates over the case-folded
/// shadow columns, with the value folded the same way; age
/// filters become `=`, `>=` and `<=` comparisons. Predicates are joined
/// with `AND`; no filters means no `WHERE` clause. Row order is whatever
/// the store yields.
pub fn build_select(filters: &FilterSet, pagination: Option<Pagination>) -> SqlStatement {
    let mut stmt = SqlStatement::new(SELECT_PEOPLE);
    let mut predicates = Vec::new();

    for (field, value) in &filters.text {
        let placeholder = stmt.bind(SqlArg::Text(format!("%{}%", fold_case(value))));
        predicates.push(format!("{} LIKE {}", field.folded_column(), placeholder));
    }

    match filters.age {
        AgeFilter::Any => {}
        AgeFilter::Exact(age) => {
            let placeholder = stmt.bind(SqlArg::Int(age));
            predicates.push(format!("age = {}", placeholder));
        }
        AgeFilter::Range { min, max } => {
            let min = stmt.bind(SqlArg::Int(min));
            predicates.push(format!("age >= {}", min));
            let max = stmt.bind(SqlArg::Int(max));
            predicates.push(format!("age <= {}", max));
        }
    }

    if !predicates.is_empty() {
        stmt.sql.push_str(" WHERE ");
        stmt.sql.push_str(&predicates.join(" AND "));
    }

    if let Some(pagination) = pagination {
        let limit = stmt.bind(SqlArg::Int(pagination.limit));
        let offset = stmt.bind(SqlArg::Int(pagination.offset()));
        stmt.sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));
    }

    stmt
}

/// Build an `UPDATE people SET ... WHERE id = ?n`
///
/// Returns `None` when there is nothing to assign. Column names are
/// `'static` and come from the person field allow-list.
pub fn build_update(id: i64, assignments: Vec<(&'static str, SqlArg)>) -> Option<SqlStatement> {
    if assignments.is_empty() {
        return None;
    }

    let mut stmt = SqlStatement::new("UPDATE people SET ");
    let mut sets = Vec::with_capacity(assignments.len());
    for (column, value) in assignments {
        let placeholder = stmt.bind(value);
        sets.push(format!("{} = {}", column, placeholder));
    }
    stmt.sql.push_str(&sets.join(", "));

    let id_placeholder = stmt.bind(SqlArg::Int(id));
    stmt.sql.push_str(&format!(" WHERE id = {}", id_placeholder));

    Some(stmt)
}
