use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use crate::app::optimistic::{run_optimistic, Mutation};
use crate::app::session::SessionService;
use crate::domain::engagement::{LikeSet, ToggleLikeResponse};
use crate::domain::post::Post;
use crate::domain::user::Session;
use crate::domain::{PostId, UserId};
use crate::error::AppResult;
use crate::http::ApiClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeSnapshot {
    pub count: usize,
    pub viewer_has_liked: bool,
    pub likers: Vec<UserId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    Liked,
    AlreadyLiked,
    /// Only the first gesture in a controller's lifetime does anything.
    Suppressed,
}

struct SetLiked {
    user_id: UserId,
    liked: bool,
}

impl Mutation<LikeSet> for SetLiked {
    fn apply(&self, state: &mut LikeSet) -> bool {
        state.set(self.user_id, self.liked)
    }

    fn revert(&self, state: &mut LikeSet) {
        state.set(self.user_id, !self.liked);
    }
}

/// Like state of one post as seen by one user. Backend failures pass
/// through the session service, so a rejected identity signs the user out.
pub struct LikeController {
    api: ApiClient,
    sessions: SessionService,
    post_id: PostId,
    user_id: UserId,
    likes: Mutex<LikeSet>,
    gesture_used: AtomicBool,
}

impl LikeController {
    pub fn new(
        api: ApiClient,
        sessions: SessionService,
        post_id: PostId,
        user_id: UserId,
        initial: LikeSet,
    ) -> Self {
        Self {
            api,
            sessions,
            post_id,
            user_id,
            likes: Mutex::new(initial),
            gesture_used: AtomicBool::new(false),
        }
    }

    pub fn for_post(api: ApiClient, sessions: SessionService, post: &Post, session: &Session) -> Self {
        Self::new(api, sessions, post.id, session.user_id, post.likes.clone())
    }

    pub fn post_id(&self) -> PostId {
        self.post_id
    }

    pub async fn snapshot(&self) -> LikeSnapshot {
        let likes = self.likes.lock().await;
        self.snapshot_of(&likes)
    }

    /// Replaces the local set with the backend's.
    pub async fn refresh(&self) -> AppResult<LikeSnapshot> {
        let fetched = self.sessions.checked(self.api.likes(self.post_id).await).await?;
        let mut likes = self.likes.lock().await;
        *likes = fetched;
        Ok(self.snapshot_of(&likes))
    }

    /// Flips the viewer's like immediately, then confirms with the backend.
    /// A rejected request restores the previous membership.
    pub async fn toggle(&self) -> AppResult<LikeSnapshot> {
        let liked = !self.likes.lock().await.contains(self.user_id);
        let mutation = SetLiked {
            user_id: self.user_id,
            liked,
        };

        let result = run_optimistic(
            &self.likes,
            &mutation,
            self.api.toggle_like(self.post_id, self.user_id),
        )
        .await;
        let response = self.sessions.checked(result).await?;

        Ok(self.reconcile(&response).await)
    }

    /// Double-click like. Never unlikes.
    pub async fn like_by_gesture(&self) -> AppResult<GestureOutcome> {
        if self.gesture_used.swap(true, Ordering::SeqCst) {
            return Ok(GestureOutcome::Suppressed);
        }
        if self.likes.lock().await.contains(self.user_id) {
            return Ok(GestureOutcome::AlreadyLiked);
        }

        let mutation = SetLiked {
            user_id: self.user_id,
            liked: true,
        };
        let result = run_optimistic(
            &self.likes,
            &mutation,
            self.api.like(self.post_id, self.user_id),
        )
        .await;
        let response = self.sessions.checked(result).await?;

        self.reconcile(&response).await;
        Ok(GestureOutcome::Liked)
    }

    /// Usernames of everyone in the local like set.
    pub async fn liker_names(&self) -> AppResult<Vec<String>> {
        let ids = self.likes.lock().await.ids().to_vec();
        self.sessions.checked(self.api.usernames(&ids).await).await
    }

    async fn reconcile(&self, response: &ToggleLikeResponse) -> LikeSnapshot {
        let mut likes = self.likes.lock().await;
        likes.set(self.user_id, response.user_has_liked);
        if likes.len() != response.like_count {
            tracing::debug!(
                post_id = self.post_id,
                local = likes.len(),
                remote = response.like_count,
                "like count differs from backend"
            );
        }
        self.snapshot_of(&likes)
    }

    fn snapshot_of(&self, likes: &LikeSet) -> LikeSnapshot {
        LikeSnapshot {
            count: likes.len(),
            viewer_has_liked: likes.contains(self.user_id),
            likers: likes.ids().to_vec(),
        }
    }
}

pub fn like_count_label(count: usize) -> String {
    if count > 1 {
        format!("{} Likes", count)
    } else {
        format!("{} Like", count)
    }
}

/// "Liked by" line under a post, or `None` when nobody likes it.
pub fn liked_by_line(liker_names: &[String], viewer_name: &str, viewer_has_liked: bool) -> Option<String> {
    let first = liker_names.first()?;

    if viewer_has_liked {
        let others = liker_names
            .iter()
            .filter(|name| name.as_str() != viewer_name)
            .count();
        let line = match others {
            0 => "Liked by: You".to_string(),
            1 => "Liked by: You and 1 other".to_string(),
            n => format!("Liked by: You and {} others", n),
        };
        return Some(line);
    }

    let mut line = format!("Liked by: {}...", first);
    if liker_names.len() > 1 {
        line.push_str(&format!(" and {} others", liker_names.len() - 1));
    }
    Some(line)
}
