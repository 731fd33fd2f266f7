//! Error types for import-core

/// Result type for import-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while matching, planning or applying a batch
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A template names a capture group the match does not provide
    #[error("Unresolved placeholder {placeholder} in template '{template}'")]
    UnresolvedPlaceholder {
        template: String,
        placeholder: String,
    },

    /// A template could not be parsed
    #[error("Invalid template '{template}': {message}")]
    InvalidTemplate { template: String, message: String },

    /// A rule pattern failed to compile
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A rule was asked to resolve a path it does not match
    #[error("Pattern '{pattern}' does not match {path}")]
    PatternMismatch { pattern: String, path: String },

    /// The resolved bucket does not exist and creation is disabled
    #[error("Bucket '{bucket}' not found while importing {path}")]
    BucketNotFound { bucket: String, path: String },

    /// A rule references a bucket template that is not configured
    #[error("Bucket template not found: {name}")]
    TemplateNotFound { name: String },

    /// A path queued for planning no longer exists
    #[error("Path vanished: {path}")]
    PathVanished { path: String },

    /// The catalog rejected a mutation
    #[error("Catalog mutation failed: {message}")]
    CatalogMutationFailed { message: String },

    /// No usable configuration was supplied
    #[error("Missing configuration: {message}")]
    MissingConfiguration { message: String },

    /// Settings were parsed but are inconsistent
    #[error("Invalid settings: {message}")]
    InvalidSettings { message: String },

    /// Filesystem error from import-fs
    #[error(transparent)]
    Fs(#[from] import_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::CatalogMutationFailed {
            message: message.into(),
        }
    }
}
