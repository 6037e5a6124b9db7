//! Errors returned by dictionary operations.

/// Errors returned by dictionary construction, mutation, and persistence.
///
/// Absent keys are not errors: lookups return `Option` and deletes return
/// `bool`. This type covers the genuinely fallible paths - allocation and
/// file I/O.
#[derive(Debug, thiserror::Error)]
pub enum DictError {
    /// I/O error while reading or writing a dictionary file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A dictionary file failed structural validation.
    #[error("corrupt dictionary file: {detail}")]
    Corrupt {
        /// What the validation found.
        detail: String,
    },

    /// Bucket or arena allocation could not be satisfied.
    #[error("allocation of {entries} entries failed")]
    OutOfMemory {
        /// Number of entries the failed reservation asked for.
        entries: usize,
    },

    /// The bucket count must be nonzero.
    #[error("hash size must be nonzero")]
    InvalidHashSize,
}

impl DictError {
    pub(crate) fn corrupt(detail: impl Into<String>) -> Self {
        Self::Corrupt {
            detail: detail.into(),
        }
    }
}
