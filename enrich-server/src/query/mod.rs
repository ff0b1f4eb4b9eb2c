//! Listing query pipeline: parameter normalization then SQL construction

pub mod params;
pub mod predicate;

pub use params::{
    fold_case, normalize, params_from_pairs, AgeFilter, FilterSet, ListRequest, Pagination, QueryParams,
    TextField,
};
pub use predicate::{build_select, build_update, SqlArg, SqlStatement};
