use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by a document store
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("document already exists: {0}")]
    Conflict(String),

    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("store error: {0}")]
    Backend(String),
}

/// Collections used by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Swipes,
    Matches,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Swipes => "swipes",
            Collection::Matches => "matches",
        }
    }
}

/// Query predicate over top-level document fields
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Equal(String, Value),
    NotEqual(String, Value),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Filter::Equal(field.to_string(), value.into())
    }

    pub fn ne(field: &str, value: impl Into<Value>) -> Self {
        Filter::NotEqual(field.to_string(), value.into())
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        Filter::Or(filters)
    }

    /// Evaluate against a JSON document. A missing field never satisfies
    /// either comparison.
    pub fn matches(&self, document: &Value) -> bool {
        match self {
            Filter::Equal(field, value) => document.get(field) == Some(value),
            Filter::NotEqual(field, value) => document
                .get(field)
                .map(|actual| actual != value)
                .unwrap_or(false),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(document)),
        }
    }
}

/// Collection-oriented document store.
///
/// Documents are JSON objects carrying their own `id` field. Filters passed
/// to `query` are combined with AND.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(
        &self,
        collection: Collection,
        id: &str,
        document: Value,
    ) -> Result<String, StoreError>;

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError>;

    async fn update(&self, collection: Collection, id: &str, patch: Value)
        -> Result<(), StoreError>;

    async fn query(
        &self,
        collection: Collection,
        filters: &[Filter],
    ) -> Result<Vec<Value>, StoreError>;
}
