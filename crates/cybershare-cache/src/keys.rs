//! Cache key builders for every CyberShare cache entry.
//!
//! The Redis provider adds its configured namespace in front of these.

use uuid::Uuid;

// ── Auth keys ──────────────────────────────────────────────

/// Revoked access token, keyed by its `jti`.
pub fn jwt_blocklist(jti: &str) -> String {
    format!("auth:blocked:{jti}")
}

// ── Notification keys ──────────────────────────────────────

/// Cached unread notification count.
pub fn unread_notification_count(user_id: Uuid) -> String {
    format!("notif:unread:{user_id}")
}

// ── Taxonomy keys ──────────────────────────────────────────

/// Full category list.
pub fn category_list() -> String {
    "categories:all".to_string()
}

/// Categories ranked by post count.
pub fn top_categories(limit: i64) -> String {
    format!("categories:top:{limit}")
}

/// Pattern matching every category entry.
pub fn category_pattern() -> String {
    "categories:*".to_string()
}

/// Tags ranked by post count.
pub fn top_tags(limit: i64) -> String {
    format!("tags:top:{limit}")
}

/// Pattern matching every tag entry.
pub fn tag_pattern() -> String {
    "tags:*".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unread_key() {
        assert_eq!(
            unread_notification_count(Uuid::nil()),
            "notif:unread:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_patterns_cover_their_keys() {
        let prefix = category_pattern();
        let prefix = prefix.trim_end_matches('*');
        assert!(category_list().starts_with(prefix));
        assert!(top_categories(5).starts_with(prefix));
        assert!(top_tags(5).starts_with(tag_pattern().trim_end_matches('*')));
    }
}
