//! Filter normalization for `GET /people`
//!
//! Turns raw query parameters (always strings) into a typed [`FilterSet`]
//! and optional [`Pagination`]. Steps, in order:
//! 1. `page` / `limit` are parsed and resolved with their defaults
//! 2. every other key is classified against the filter allow-list
//! 3. `age` and the `minAge`/`maxAge` range are reconciled
//!
//! An empty parameter mapping short-circuits to [`ListRequest::Unfiltered`].

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{ServiceError, ServiceResult};

/// Upper age bound synthesized when only `minAge` is given ("unbounded")
pub const MAX_AGE_SENTINEL: i64 = 777;

/// Lower age bound synthesized when only `maxAge` is given
pub const MIN_AGE_DEFAULT: i64 = 0;

/// Page size used when `page` is given without `limit`
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Raw query parameters, one value per key
pub type QueryParams = BTreeMap<String, String>;

/// Collapse repeated query keys, keeping the first occurrence
pub fn params_from_pairs<I>(pairs: I) -> QueryParams
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut params = QueryParams::new();
    for (key, value) in pairs {
        params.entry(key).or_insert(value);
    }
    params
}

/// Text columns that accept case-insensitive substring filters
///
/// Variant order is the order predicates are emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TextField {
    Name,
    Surname,
    Patronymic,
    Gender,
    Nationality,
}

impl TextField {
    /// Map a query parameter name to its field
    pub fn from_param(name: &str) -> Option<Self> {
        match name {
            "name" => Some(TextField::Name),
            "surname" => Some(TextField::Surname),
            "patronymic" => Some(TextField::Patronymic),
            "gender" => Some(TextField::Gender),
            "nationality" => Some(TextField::Nationality),
            _ => None,
        }
    }

    /// Column name in the `people` table
    pub fn column(self) -> &'static str {
        match self {
            TextField::Name => "name",
            TextField::Surname => "surname",
            TextField::Patronymic => "patronymic",
            TextField::Gender => "gender",
            TextField::Nationality => "nationality",
        }
    }

    /// Lowercased shadow column that substring filters match against
    pub fn folded_column(self) -> &'static str {
        match self {
            TextField::Name => "name_folded",
            TextField::Surname => "surname_folded",
            TextField::Patronymic => "patronymic_folded",
            TextField::Gender => "gender_folded",
            TextField::Nationality => "nationality_folded",
        }
    }
}

/// Case folding applied to stored text and to filter values alike
///
/// Unicode-aware, so Cyrillic and other non-ASCII names match regardless
/// of case.
pub fn fold_case(value: &str) -> String {
    value.to_lowercase()
}

/// Age constraint; exact age and range never coexist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgeFilter {
    #[default]
    Any,
    Exact(i64),
    Range { min: i64, max: i64 },
}

/// Validated listing constraints for one request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSet {
    pub text: BTreeMap<TextField, String>,
    pub age: AgeFilter,
}

impl FilterSet {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.age == AgeFilter::Any
    }
}

/// Page window; `page` is 1-based
///
/// Zero or negative values are passed through to the store unchecked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    /// Rows skipped before this page
    ///
    /// Saturates instead of overflowing on extreme `page`/`limit` values.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// Outcome of normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListRequest {
    /// No parameters at all: return every row, no predicate
    Unfiltered,
    Filtered {
        filters: FilterSet,
        pagination: Option<Pagination>,
    },
}

/// Normalize raw query parameters into a [`ListRequest`]
pub fn normalize(params: &QueryParams) -> ServiceResult<ListRequest> {
    if params.is_empty() {
        return Ok(ListRequest::Unfiltered);
    }

    let page = parse_int(params, "page")?;
    let limit = parse_int(params, "limit")?;
    let pagination = resolve_pagination(page, limit);

    let mut filters = FilterSet::default();
    let mut age = None;
    let mut min_age = None;
    let mut max_age = None;

    for (key, value) in params {
        match key.as_str() {
            "page" | "limit" => {}
            "age" => age = Some(parse_value(key, value)?),
            "minAge" => min_age = Some(parse_value(key, value)?),
            "maxAge" => max_age = Some(parse_value(key, value)?),
            other => match TextField::from_param(other) {
                Some(field) => {
                    filters.text.insert(field, value.clone());
                }
                None => return Err(ServiceError::UnknownParameter(other.to_string())),
            },
        }
    }

    filters.age = reconcile_age(age, min_age, max_age);

    debug!(?filters, ?pagination, "Normalized list parameters");

    Ok(ListRequest::Filtered {
        filters,
        pagination,
    })
}

fn resolve_pagination(page: Option<i64>, limit: Option<i64>) -> Option<Pagination> {
    match (page, limit) {
        (Some(page), Some(limit)) => Some(Pagination { page, limit }),
        (Some(page), None) => Some(Pagination {
            page,
            limit: DEFAULT_PAGE_LIMIT,
        }),
        (None, Some(limit)) => Some(Pagination { page: 1, limit }),
        (None, None) => None,
    }
}

fn reconcile_age(age: Option<i64>, min_age: Option<i64>, max_age: Option<i64>) -> AgeFilter {
    match (age, min_age, max_age) {
        (Some(age), _, _) => AgeFilter::Exact(age),
        (None, None, None) => AgeFilter::Any,
        (None, min, max) => AgeFilter::Range {
            min: min.unwrap_or(MIN_AGE_DEFAULT),
            max: max.unwrap_or(MAX_AGE_SENTINEL),
        },
    }
}

fn parse_int(params: &QueryParams, key: &str) -> ServiceResult<Option<i64>> {
    params
        .get(key)
        .map(|value| parse_value(key, value))
        .transpose()
}

fn parse_value(key: &str, value: &str) -> ServiceResult<i64> {
    value
        .parse::<i64>()
        .map_err(|_| ServiceError::InvalidParameter {
            name: key.to_string(),
            value: value.to_string(),
        })
}
