use thiserror::Error;

/// Unified error type for the entire jibajeti-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Calculation ─────────────────────────────────────────────────
    #[error("Invalid loan terms: {0}")]
    InvalidLoanTerms(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Loan not found: {0}")]
    LoanNotFound(String),

    // ── Storage ─────────────────────────────────────────────────────
    #[error("Storage backend error: {0}")]
    Storage(String),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Unsupported envelope version: {0}")]
    UnsupportedVersion(u16),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed — wrong password or corrupted data")]
    Decryption,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── File I/O (native only) ──────────────────────────────────────
    #[error("File I/O error: {0}")]
    FileIO(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json reports writer failures as Io; everything else is a parse problem.
        if e.is_io() {
            CoreError::Serialization(e.to_string())
        } else {
            CoreError::Deserialization(e.to_string())
        }
    }
}

impl From<aes_gcm::Error> for CoreError {
    fn from(_: aes_gcm::Error) -> Self {
        CoreError::Decryption
    }
}
