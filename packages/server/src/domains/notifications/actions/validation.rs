use crate::common::{TicketingError, TicketingResult};

pub(crate) const MAX_TITLE_CHARS: usize = 255;

/// Trimmed title and message, or a field-level validation error.
pub(crate) fn validate_content(title: &str, message: &str) -> TicketingResult<(String, String)> {
    let title = title.trim();
    let message = message.trim();

    if title.is_empty() {
        return Err(TicketingError::validation("title", "must not be empty"));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(TicketingError::validation(
            "title",
            format!("must be at most {} characters", MAX_TITLE_CHARS),
        ));
    }
    if message.is_empty() {
        return Err(TicketingError::validation("message", "must not be empty"));
    }

    Ok((title.to_string(), message.to_string()))
}
