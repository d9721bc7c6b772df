//! Username derivation for sign-ups that omit one.

/// Minimum username length accepted at registration.
pub const MIN_USERNAME_LEN: usize = 3;
/// Maximum username length accepted at registration.
pub const MAX_USERNAME_LEN: usize = 50;

/// Username candidate from the local part of an email address.
///
/// Keeps ASCII alphanumerics only and prefixes `user` when the result is
/// too short.
pub fn base_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let mut base: String = local
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(MAX_USERNAME_LEN - 4)
        .collect();
    if base.len() < MIN_USERNAME_LEN {
        base = format!("user{base}");
    }
    base.to_lowercase()
}

/// `base` with a random four-digit suffix.
pub fn with_random_suffix(base: &str) -> String {
    let n: u16 = rand::random_range(1000..10000);
    format!("{base}{n}")
}
