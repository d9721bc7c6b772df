//! Human-readable notification texts.

use cybershare_entity::user::UserRole;

/// `actor` liked a post.
pub fn liked_post(actor: &str, post_title: &str) -> String {
    format!("{actor} liked your post \"{post_title}\"")
}

/// `actor` commented on a post.
pub fn commented_on_post(actor: &str, post_title: &str) -> String {
    format!("{actor} commented on your post \"{post_title}\"")
}

/// `actor` replied to a comment.
pub fn replied_to_comment(actor: &str) -> String {
    format!("{actor} replied to your comment")
}

/// `actor` started following the recipient.
pub fn started_following(actor: &str) -> String {
    format!("{actor} started following you")
}

/// Sent to a user whose role changed.
pub fn role_changed(new_role: UserRole) -> String {
    match new_role {
        UserRole::Author => {
            "Congratulations! You have been granted the AUTHOR role and can now publish posts on CyberShare."
                .to_string()
        }
        UserRole::Admin => {
            "You have been granted the ADMIN role with full control over CyberShare.".to_string()
        }
        UserRole::User => "Your role has been changed to USER.".to_string(),
    }
}

/// Sent to an author when moderation approves a post.
pub fn post_approved(post_title: &str) -> String {
    format!("Your post \"{post_title}\" has been approved and published")
}

/// Sent to an author when moderation sends a post back to draft.
pub fn post_rejected(post_title: &str, reason: Option<&str>) -> String {
    match reason.map(str::trim).filter(|r| !r.is_empty()) {
        Some(reason) => format!("Your post \"{post_title}\" was rejected: {reason}"),
        None => format!("Your post \"{post_title}\" was rejected"),
    }
}

/// Sent to an author when moderation hides a post.
pub fn post_hidden(post_title: &str) -> String {
    format!("Your post \"{post_title}\" has been hidden by a moderator")
}
