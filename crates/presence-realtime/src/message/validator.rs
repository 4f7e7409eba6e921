//! Message validation rules.

use presence_core::error::AppError;
use presence_core::result::AppResult;

/// Validates a raw inbound frame before it is parsed.
pub fn validate_inbound(raw: &str, max_bytes: usize) -> AppResult<()> {
    if raw.len() > max_bytes {
        return Err(AppError::validation(format!(
            "Message exceeds maximum size of {max_bytes} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty message"));
    }

    Ok(())
}
