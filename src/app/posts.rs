use crate::app::session::SessionService;
use crate::domain::post::{Post, PostDraft};
use crate::domain::PostId;
use crate::error::{AppError, AppResult};
use crate::http::ApiClient;

/// Authoring operations, always on behalf of the signed-in user.
#[derive(Clone)]
pub struct PostService {
    api: ApiClient,
    sessions: SessionService,
}

impl PostService {
    pub fn new(api: ApiClient, sessions: SessionService) -> Self {
        Self { api, sessions }
    }

    pub async fn create(&self, draft: &PostDraft) -> AppResult<Post> {
        let session = self.sessions.require().await?;
        validate(draft)?;

        let post = self
            .sessions
            .checked(self.api.create_post(draft, session.user_id).await)
            .await?;
        tracing::info!(post_id = post.id, user_id = session.user_id, "post created");
        Ok(post)
    }

    pub async fn update(&self, post_id: PostId, draft: &PostDraft) -> AppResult<Post> {
        let session = self.sessions.require().await?;
        validate(draft)?;

        let post = self
            .sessions
            .checked(self.api.update_post(post_id, session.user_id, draft).await)
            .await?;
        tracing::info!(post_id, user_id = session.user_id, "post updated");
        Ok(post)
    }

    pub async fn delete(&self, post_id: PostId) -> AppResult<()> {
        let session = self.sessions.require().await?;

        self.sessions
            .checked(self.api.delete_post(post_id, session.user_id).await)
            .await?;
        tracing::info!(post_id, user_id = session.user_id, "post deleted");
        Ok(())
    }

    /// Posts written by the signed-in user.
    pub async fn mine(&self) -> AppResult<Vec<Post>> {
        let session = self.sessions.require().await?;
        self.sessions
            .checked(self.api.posts_by_user(session.user_id).await)
            .await
    }
}

fn validate(draft: &PostDraft) -> AppResult<()> {
    let problems = draft.problems();
    if problems.is_empty() {
        Ok(())
    } else {
        Err(AppError::InvalidPost(problems))
    }
}
