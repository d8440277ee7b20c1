// Input format checks shared by registration and profile edits

/// Validate username format
///
/// 3-50 characters, letters, digits, underscore or hyphen, starting with a letter or digit.
pub fn validate_username_format(username: &str) -> Result<(), String> {
    let length = username.chars().count();

    if length < 3 {
        return Err("Username must be at least 3 characters".to_string());
    }

    if length > 50 {
        return Err("Username must be at most 50 characters".to_string());
    }

    // Allow alphanumeric, underscore, hyphen
    if !username.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err("Username can only contain letters, numbers, underscore, and hyphen".to_string());
    }

    // Must start with alphanumeric
    if !username.chars().next().map(char::is_alphanumeric).unwrap_or(false) {
        return Err("Username must start with a letter or number".to_string());
    }

    Ok(())
}

pub fn validate_email_format(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err("Invalid email format".to_string());
    }

    let domain = parts[1];
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') || email.contains(char::is_whitespace) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

pub fn validate_password_length(password: &str, min_length: usize) -> Result<(), String> {
    if password.chars().count() < min_length {
        return Err(format!("Password must be at least {} characters", min_length));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames() {
        assert!(validate_username_format("magnus_c").is_ok());
        assert!(validate_username_format("шахматист").is_ok());
        assert!(validate_username_format("ab").is_err());
        assert!(validate_username_format("_hidden").is_err());
        assert!(validate_username_format("bad name").is_err());
    }

    #[test]
    fn emails() {
        assert!(validate_email_format("player@club.ru").is_ok());
        assert!(validate_email_format("player@club").is_err());
        assert!(validate_email_format("@club.ru").is_err());
        assert!(validate_email_format("a@b@c.ru").is_err());
    }

    #[test]
    fn passwords() {
        assert!(validate_password_length("123456", 6).is_ok());
        assert!(validate_password_length("12345", 6).is_err());
    }
}
