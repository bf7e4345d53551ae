//! Error Types
//!
//! Application-wide error definitions

use serde::Serialize;
use thiserror::Error;

/// Application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Password hashing error: {0}")]
    Password(#[from] bcrypt::BcryptError),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Client not found: {0}")]
    ClientNotFound(i64),

    #[error("Document not found: {0}")]
    DocumentNotFound(i64),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unknown document type: {0}")]
    UnknownDocumentType(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl AppError {
    /// Wraps a third-party rendering failure (printpdf, docx-rs, zip, quick-xml).
    pub fn render(err: impl std::fmt::Display) -> Self {
        AppError::Render(err.to_string())
    }
}

/// Serializable error returned by command handlers
#[derive(Debug, Serialize)]
pub struct CommandError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl From<AppError> for CommandError {
    fn from(error: AppError) -> Self {
        let code = match &error {
            AppError::Database(_) => "DB_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Spreadsheet(_) => "SPREADSHEET_ERROR",
            AppError::Pdf(_) => "PDF_ERROR",
            AppError::Password(_) => "PASSWORD_ERROR",
            AppError::Render(_) => "RENDER_ERROR",
            AppError::ClientNotFound(_) => "CLIENT_NOT_FOUND",
            AppError::DocumentNotFound(_) => "DOCUMENT_NOT_FOUND",
            AppError::FileNotFound(_) => "FILE_NOT_FOUND",
            AppError::UnknownDocumentType(_) => "UNKNOWN_DOCUMENT_TYPE",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InvalidOperation(_) => "INVALID_OPERATION",
        };

        let details = match &error {
            AppError::Database(e) => Some(format!("{:?}", e)),
            _ => None,
        };

        CommandError {
            code: code.to_string(),
            message: error.to_string(),
            details,
        }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

/// Command handler result type
pub type CommandResult<T> = Result<T, CommandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_not_found_maps_to_stable_code() {
        let err: CommandError = AppError::FileNotFound("/tmp/gone.pdf".to_string()).into();
        assert_eq!(err.code, "FILE_NOT_FOUND");
        assert!(err.message.contains("/tmp/gone.pdf"));
        assert!(err.details.is_none());
    }

    #[test]
    fn validation_error_display_includes_code() {
        let err: CommandError = AppError::Validation("email is required".to_string()).into();
        assert_eq!(err.to_string(), "[VALIDATION_ERROR] Validation failed: email is required");
    }
}
