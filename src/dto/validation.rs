//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest user name accepted from clients.
const MAX_USER_NAME_LEN: usize = 64;

/// Validates a user name: non-blank, at most 64 characters, no control characters.
///
/// # Examples
///
/// ```ignore
/// validate_user_name("Alice")    // Ok
/// validate_user_name("   ")      // Err - blank
/// validate_user_name("a\tb")     // Err - control character
/// ```
pub fn validate_user_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("user_name_blank");
        err.message = Some("User name must not be blank".into());
        return Err(err);
    }

    if name.chars().count() > MAX_USER_NAME_LEN {
        let mut err = ValidationError::new("user_name_length");
        err.message = Some(
            format!("User name must be at most {MAX_USER_NAME_LEN} characters").into(),
        );
        return Err(err);
    }

    if name.chars().any(char::is_control) {
        let mut err = ValidationError::new("user_name_format");
        err.message = Some("User name must not contain control characters".into());
        return Err(err);
    }

    Ok(())
}
