//! Follow button state for a profile page.

use crate::client::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::models::FollowStats;

/// What a follow or unfollow call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowOutcome {
    /// The request succeeded and the state changed.
    Applied,
    /// Nothing was sent: own profile, signed out, or a request in flight.
    Skipped,
    /// The server refused; the state is unchanged.
    Failed(String),
}

/// Relationship between the viewer and one profile.
#[derive(Debug, Clone)]
pub struct FollowState {
    username: String,
    own_profile: bool,
    is_following: bool,
    stats: FollowStats,
    pending: bool,
}

impl FollowState {
    /// State for `username` as seen by `viewer` (`None` when signed out).
    pub fn new(username: impl Into<String>, viewer: Option<&str>) -> Self {
        let username = username.into();
        let own_profile = viewer == Some(username.as_str());
        Self {
            username,
            own_profile,
            is_following: false,
            stats: FollowStats::default(),
            pending: false,
        }
    }

    /// Fetch counters, and the follow flag when the viewer can follow.
    pub async fn load(&mut self, client: &ApiClient) -> ClientResult<()> {
        self.stats = client.follow_stats(&self.username).await?;
        if client.is_authenticated().await && !self.own_profile {
            self.is_following = client.is_following(&self.username).await?;
        }
        Ok(())
    }

    /// Whose profile this is.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The viewer is looking at their own profile and cannot follow it.
    pub fn is_own_profile(&self) -> bool {
        self.own_profile
    }

    /// Whether the viewer follows this profile, optimistic while a toggle is pending.
    pub fn is_following(&self) -> bool {
        self.is_following
    }

    /// Follower and following counters as last loaded or adjusted.
    pub fn stats(&self) -> FollowStats {
        self.stats
    }

    /// A follow or unfollow request is in flight.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Follow the profile.
    pub async fn follow(&mut self, client: &ApiClient) -> FollowOutcome {
        if !self.begin(client).await {
            return FollowOutcome::Skipped;
        }
        let result = client.follow(&self.username).await;
        self.finish(result, true)
    }

    /// Stop following the profile.
    pub async fn unfollow(&mut self, client: &ApiClient) -> FollowOutcome {
        if !self.begin(client).await {
            return FollowOutcome::Skipped;
        }
        let result = client.unfollow(&self.username).await;
        self.finish(result, false)
    }

    /// Follow or unfollow depending on the current flag.
    pub async fn toggle(&mut self, client: &ApiClient) -> FollowOutcome {
        if self.is_following {
            self.unfollow(client).await
        } else {
            self.follow(client).await
        }
    }

    async fn begin(&mut self, client: &ApiClient) -> bool {
        if self.own_profile || self.pending || !client.is_authenticated().await {
            return false;
        }
        self.pending = true;
        true
    }

    fn finish(&mut self, result: ClientResult<()>, following: bool) -> FollowOutcome {
        self.pending = false;
        match result {
            Ok(()) => {
                self.apply(following);
                FollowOutcome::Applied
            }
            Err(e) => {
                tracing::debug!(username = %self.username, error = %e, "Follow request failed");
                FollowOutcome::Failed(server_message(e))
            }
        }
    }

    fn apply(&mut self, following: bool) {
        self.is_following = following;
        self.stats.followers = if following {
            self.stats.followers + 1
        } else {
            (self.stats.followers - 1).max(0)
        };
    }
}

fn server_message(error: ClientError) -> String {
    match error {
        ClientError::Api { message, .. } => message,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_own_profile_detection() {
        assert!(FollowState::new("alice", Some("alice")).is_own_profile());
        assert!(!FollowState::new("alice", Some("bob")).is_own_profile());
        assert!(!FollowState::new("alice", None).is_own_profile());
    }

    #[test]
    fn test_apply_adjusts_followers() {
        let mut state = FollowState::new("alice", Some("bob"));

        state.apply(true);
        assert!(state.is_following());
        assert_eq!(state.stats().followers, 1);

        state.apply(false);
        state.apply(false);
        assert!(!state.is_following());
        assert_eq!(state.stats().followers, 0);
    }

    #[test]
    fn test_failure_keeps_state_and_surfaces_message() {
        let mut state = FollowState::new("alice", Some("bob"));
        state.pending = true;

        let outcome = state.finish(
            Err(ClientError::Api {
                status: 400,
                message: "Already following".into(),
            }),
            true,
        );

        assert_eq!(outcome, FollowOutcome::Failed("Already following".into()));
        assert!(!state.is_following());
        assert!(!state.is_pending());
        assert_eq!(state.stats().followers, 0);
    }

    #[tokio::test]
    async fn test_signed_out_follow_is_skipped() {
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let mut state = FollowState::new("alice", None);

        assert_eq!(state.follow(&client).await, FollowOutcome::Skipped);
        assert!(!state.is_pending());
    }

    #[tokio::test]
    async fn test_own_profile_follow_is_skipped() {
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let mut state = FollowState::new("alice", Some("alice"));

        assert_eq!(state.toggle(&client).await, FollowOutcome::Skipped);
    }
}
