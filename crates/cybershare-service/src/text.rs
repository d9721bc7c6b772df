//! Checks on user-supplied text.

use cybershare_core::AppError;
use cybershare_core::result::AppResult;

/// `value` without surrounding whitespace; an error naming `field` if
/// nothing is left.
pub fn non_blank<'a>(field: &str, value: &'a str) -> AppResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} cannot be blank")));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_and_rejects_whitespace_only() {
        assert_eq!(non_blank("Title", "  Hello \n").unwrap(), "Hello");
        let err = non_blank("Comment", " \t\n").unwrap_err();
        assert_eq!(err.kind, cybershare_core::error::ErrorKind::Validation);
        assert_eq!(err.message, "Comment cannot be blank");
    }
}
