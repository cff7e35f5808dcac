//! Errors raised while synthesizing the generated artifact set.

use std::path::PathBuf;

/// Result type alias for synthesis operations.
pub type Result<T> = std::result::Result<T, SynthesisError>;

/// Errors that stop a synthesis run. Every variant is fatal: a run either
/// produces a consistent document set or writes nothing.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    /// A previously persisted document exists but cannot be parsed.
    #[error("Malformed {document} document '{}': {message}", path.display())]
    MalformedDocument {
        document: &'static str,
        path: PathBuf,
        message: String,
    },

    /// An icon id cannot be emitted as a bare source identifier.
    #[error("Icon '{id}' in collection '{collection}' is not a valid identifier")]
    InvalidIdentifier { collection: String, id: String },

    /// Two icons, two normalized collection names or two command symbols collide.
    #[error("Duplicate identifier '{id}' in '{collection}'")]
    DuplicateIdentifier { collection: String, id: String },

    /// A collection name does not normalize to a usable type name.
    #[error("Collection '{collection}' normalizes to '{normalized}', which is not a usable type name")]
    InvalidCollectionName {
        collection: String,
        normalized: String,
    },

    /// A document could not be serialized.
    #[error("Failed to serialize {document} document: {message}")]
    Serialize {
        document: &'static str,
        message: String,
    },

    /// Symbol, bitmap and button stages disagree on partition boundaries.
    #[error("Inconsistent partitioning for scope '{scope_id}' in {stage} stage: {detail}")]
    InconsistentPartitioning {
        scope_id: String,
        stage: &'static str,
        detail: String,
    },

    /// Partition capacity must be at least one icon.
    #[error("Partition capacity must be positive")]
    ZeroCapacity,

    /// The catalog file could not be read or parsed.
    #[error("Failed to load catalog '{}': {message}", path.display())]
    Catalog { path: PathBuf, message: String },

    /// A raster tile is missing, undecodable or has the wrong size.
    #[error("Bad tile for '{collection}.{id}': {message}")]
    Tile {
        collection: String,
        id: String,
        message: String,
    },

    /// File I/O error.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SynthesisError {
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn inconsistent(
        scope_id: impl Into<String>,
        stage: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        Self::InconsistentPartitioning {
            scope_id: scope_id.into(),
            stage,
            detail: detail.into(),
        }
    }
}
