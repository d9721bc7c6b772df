//! Optimistic like/bookmark state for a single post.
//!
//! A toggle flips the local flag immediately and hands back a snapshot.
//! Once the server answers, call [`InteractionState::commit`] with its
//! status, or [`InteractionState::rollback`] with the snapshot on failure.
//! Only one toggle may be in flight at a time.

use crate::models::InteractionStatus;

/// State captured before an optimistic toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot(InteractionStatus);

/// Local view of the caller's interactions with a post.
#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    status: InteractionStatus,
    in_flight: bool,
}

impl InteractionState {
    /// Start from a status fetched from the server.
    pub fn new(status: InteractionStatus) -> Self {
        Self {
            status,
            in_flight: false,
        }
    }

    /// The current, possibly optimistic, status.
    pub fn status(&self) -> InteractionStatus {
        self.status
    }

    /// Whether a toggle is waiting for the server.
    pub fn is_pending(&self) -> bool {
        self.in_flight
    }

    /// Flip `liked` and adjust the like counter.
    pub fn begin_like(&mut self) -> Option<Snapshot> {
        let snapshot = self.begin()?;
        let s = &mut self.status;
        s.likes_count = adjust(s.likes_count, s.liked);
        s.liked = !s.liked;
        Some(snapshot)
    }

    /// Flip `bookmarked` and adjust the bookmark counter.
    pub fn begin_bookmark(&mut self) -> Option<Snapshot> {
        let snapshot = self.begin()?;
        let s = &mut self.status;
        s.bookmarks_count = adjust(s.bookmarks_count, s.bookmarked);
        s.bookmarked = !s.bookmarked;
        Some(snapshot)
    }

    /// Replace local state with the server's answer.
    pub fn commit(&mut self, server: InteractionStatus) {
        self.status = server;
        self.in_flight = false;
    }

    /// Restore the state captured by the failed toggle.
    pub fn rollback(&mut self, snapshot: Snapshot) {
        self.status = snapshot.0;
        self.in_flight = false;
    }

    /// Count a comment the viewer just posted.
    pub fn increment_comments(&mut self) {
        self.status.comments_count += 1;
    }

    /// Drop `n` comments, e.g. a deleted subtree.
    pub fn decrement_comments(&mut self, n: i64) {
        self.status.comments_count = (self.status.comments_count - n).max(0);
    }

    fn begin(&mut self) -> Option<Snapshot> {
        if self.in_flight {
            return None;
        }
        self.in_flight = true;
        Some(Snapshot(self.status))
    }
}

fn adjust(count: i64, currently_set: bool) -> i64 {
    if currently_set {
        (count - 1).max(0)
    } else {
        count + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn liked_once() -> InteractionStatus {
        InteractionStatus {
            liked: true,
            likes_count: 1,
            comments_count: 3,
            ..Default::default()
        }
    }

    #[test]
    fn test_like_is_optimistic() {
        let mut state = InteractionState::default();

        state.begin_like().unwrap();

        assert!(state.status().liked);
        assert_eq!(state.status().likes_count, 1);
        assert!(state.is_pending());
    }

    #[test]
    fn test_second_toggle_blocked_while_pending() {
        let mut state = InteractionState::default();
        state.begin_like().unwrap();

        assert!(state.begin_like().is_none());
        assert!(state.begin_bookmark().is_none());
    }

    #[test]
    fn test_commit_takes_server_answer() {
        let mut state = InteractionState::default();
        state.begin_like().unwrap();

        let server = InteractionStatus {
            liked: true,
            likes_count: 42,
            ..Default::default()
        };
        state.commit(server);

        assert_eq!(state.status(), server);
        assert!(!state.is_pending());
    }

    #[test]
    fn test_rollback_restores_snapshot() {
        let mut state = InteractionState::new(liked_once());

        let snapshot = state.begin_like().unwrap();
        assert!(!state.status().liked);
        assert_eq!(state.status().likes_count, 0);

        state.rollback(snapshot);
        assert_eq!(state.status(), liked_once());
        assert!(state.begin_bookmark().is_some());
    }

    #[test]
    fn test_unlike_never_goes_negative() {
        let mut state = InteractionState::new(InteractionStatus {
            liked: true,
            likes_count: 0,
            ..Default::default()
        });

        state.begin_like().unwrap();

        assert_eq!(state.status().likes_count, 0);
    }

    #[test]
    fn test_bookmark_toggle() {
        let mut state = InteractionState::default();

        state.begin_bookmark().unwrap();

        assert!(state.status().bookmarked);
        assert_eq!(state.status().bookmarks_count, 1);
        assert_eq!(state.status().likes_count, 0);
    }

    #[test]
    fn test_comment_counter_clamps() {
        let mut state = InteractionState::new(liked_once());

        state.increment_comments();
        assert_eq!(state.status().comments_count, 4);

        state.decrement_comments(10);
        assert_eq!(state.status().comments_count, 0);
    }
}
