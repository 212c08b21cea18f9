use unicode_normalization::UnicodeNormalization;

use crate::error::{PlatformError, Result};
use crate::models::FileHandle;

/// MIME types the ingestion pipeline accepts
pub const ACCEPTED_MIME_TYPES: [&str; 4] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

/// Validation utilities for input sanitization and edge case handling
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Validate that a required form field is filled in
    pub fn validate_required(field: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(PlatformError::Validation(format!("{field} cannot be empty")));
        }

        Ok(())
    }

    /// Validate a candidate upload against the type allow-list and size ceiling
    pub fn validate_file(file: &FileHandle, max_size_bytes: u64) -> Result<()> {
        if !ACCEPTED_MIME_TYPES.contains(&file.mime_type.as_str()) {
            return Err(PlatformError::UnsupportedFileType {
                name: file.name.clone(),
                mime_type: file.mime_type.clone(),
            });
        }

        if file.size > max_size_bytes {
            return Err(PlatformError::FileTooLarge {
                name: file.name.clone(),
                size: file.size,
                limit: max_size_bytes,
            });
        }

        Ok(())
    }

    /// Validate query text before a simulated execution
    pub fn validate_query(query: &str) -> Result<()> {
        if query.trim().is_empty() {
            return Err(PlatformError::Validation("Query cannot be empty".into()));
        }

        Ok(())
    }

    /// Validate a star rating
    pub fn validate_rating(rating: u8) -> Result<()> {
        if !(1..=5).contains(&rating) {
            return Err(PlatformError::Validation(format!(
                "Rating must be between 1 and 5, got {rating}"
            )));
        }

        Ok(())
    }

    /// Validate a port field; empty is allowed for file databases
    pub fn validate_port(port: &str) -> Result<()> {
        if port.is_empty() {
            return Ok(());
        }

        match port.parse::<u16>() {
            Ok(0) | Err(_) => Err(PlatformError::Validation(format!("Invalid port: {port}"))),
            Ok(_) => Ok(()),
        }
    }

    /// Sanitize text input
    #[must_use]
    pub fn sanitize_text(text: &str) -> String {
        text.nfc()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
            .collect::<String>()
            .trim()
            .to_string()
    }
}
