// ==========================================
// HMS Manager - import errors
// ==========================================

use thiserror::Error;

/// File-import error type
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("CSV parse error: {0}")]
    CsvParseError(String),

    #[error("Excel parse error: {0}")]
    ExcelParseError(String),

    #[error("required column missing: {0}")]
    MissingColumn(String),

    #[error("import aborted: {0}")]
    Aborted(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias
pub type ImportResult<T> = Result<T, ImportError>;
