use crate::error::ApiError;

/// Maximum text length for synthesis requests
const MAX_TEXT_LENGTH: usize = 5000;
/// Maximum length for jewel/recording/session identifiers
const MAX_ID_LENGTH: usize = 128;

/// Validate a jewel, recording or session identifier.
pub fn validate_identifier(id: &str, field: &str) -> Result<(), ApiError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput(format!("{field} cannot be empty")));
    }
    if trimmed.len() > MAX_ID_LENGTH {
        return Err(ApiError::InvalidInput(format!(
            "{field} too long (max {MAX_ID_LENGTH} characters)"
        )));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
    {
        return Err(ApiError::InvalidInput(format!(
            "{field} may only contain letters, digits, '-' and '_'"
        )));
    }
    Ok(())
}

/// Validate synthesis text
pub fn validate_synthesis_text(text: &str) -> Result<(), ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::InvalidInput("Text cannot be empty".to_string()));
    }
    if text.len() > MAX_TEXT_LENGTH {
        return Err(ApiError::InvalidInput(format!(
            "Text too long (max {MAX_TEXT_LENGTH} characters)"
        )));
    }
    Ok(())
}

/// Validate a top-up quantity
pub fn validate_quantity(quantity: u64) -> Result<(), ApiError> {
    if quantity == 0 {
        return Err(ApiError::InvalidInput(
            "quantity must be positive".to_string(),
        ));
    }
    if quantity > 1000 {
        return Err(ApiError::InvalidInput(
            "quantity too large (max 1000)".to_string(),
        ));
    }
    Ok(())
}
