use thiserror::Error;

/// Failures raised by a durable store backend.
///
/// `KvStore` never surfaces these to callers; they are logged and the
/// operation degrades to a no-op.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures while loading a deck of cards.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid deck JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("deck not found: {0}")]
    MissingDeck(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("card not in catalog: {0}")]
    UnknownCard(String),
}
