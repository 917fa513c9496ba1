use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use crate::app::session::SessionService;
use crate::domain::engagement::Comment;
use crate::domain::user::Session;
use crate::domain::PostId;
use crate::error::{AppError, AppResult};
use crate::http::ApiClient;

/// Comment list of one post. New comments are appended only once the backend
/// has stored them, so the list never holds locally fabricated entries.
pub struct CommentPanel {
    api: ApiClient,
    sessions: SessionService,
    post_id: PostId,
    comments: Mutex<Vec<Comment>>,
    loaded: AtomicBool,
}

impl CommentPanel {
    pub fn new(api: ApiClient, sessions: SessionService, post_id: PostId) -> Self {
        Self {
            api,
            sessions,
            post_id,
            comments: Mutex::new(Vec::new()),
            loaded: AtomicBool::new(false),
        }
    }

    pub fn post_id(&self) -> PostId {
        self.post_id
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    /// Fetches the comments in server order, replacing whatever was shown.
    pub async fn open(&self) -> AppResult<Vec<Comment>> {
        let fetched = self
            .sessions
            .checked(self.api.comments(self.post_id).await)
            .await?;
        let mut comments = self.comments.lock().await;
        *comments = fetched;
        self.loaded.store(true, Ordering::SeqCst);
        tracing::debug!(post_id = self.post_id, count = comments.len(), "comments loaded");
        Ok(comments.clone())
    }

    pub async fn submit(&self, session: &Session, text: &str) -> AppResult<Comment> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::EmptyComment);
        }

        let stored = self
            .sessions
            .checked(self.api.add_comment(self.post_id, session.user_id, text).await)
            .await?;

        self.comments.lock().await.push(stored.clone());
        tracing::info!(post_id = self.post_id, comment_id = stored.id, "comment posted");
        Ok(stored)
    }

    pub async fn comments(&self) -> Vec<Comment> {
        self.comments.lock().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.comments.lock().await.len()
    }
}
