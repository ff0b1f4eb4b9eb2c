//! Enrichment: infer age, gender and nationality for a name
//!
//! Three independent lookups run concurrently. Any subset may fail; a
//! failed lookup leaves its attribute at the zero value and is only
//! logged. Enrichment itself never returns an error.

use async_trait::async_trait;

pub mod client;

pub use client::{HttpEnricher, ProviderEndpoints};

/// Attributes inferred for a name
///
/// Zero values (`0`, `""`) mean "no data".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    pub age: i64,
    pub gender: String,
    pub nationality: String,
}

/// Source of inferred attributes
#[async_trait]
pub trait Enrichment: Send + Sync {
    /// Look up all attributes for `name`
    ///
    /// An empty name yields `Attributes::default()` without any lookup.
    async fn enrich(&self, name: &str) -> Attributes;
}
