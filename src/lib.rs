pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod infra;

use std::sync::Arc;

use crate::app::comments::CommentPanel;
use crate::app::feed::FeedService;
use crate::app::likes::LikeController;
use crate::app::posts::PostService;
use crate::app::session::SessionService;
use crate::config::AppConfig;
use crate::domain::post::Post;
use crate::domain::user::Session;
use crate::domain::PostId;
use crate::http::ApiClient;
use crate::infra::session_store::{FileSessionStore, SessionStore};

/// Everything a view needs, passed explicitly instead of read from globals.
#[derive(Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub sessions: SessionService,
    pub feed: FeedService,
    pub posts: PostService,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let api = ApiClient::new(config)?;
        let store = Arc::new(FileSessionStore::new(config.session_file.clone()));
        Ok(Self::new(api, store)?)
    }

    pub fn new(api: ApiClient, store: Arc<dyn SessionStore>) -> error::AppResult<Self> {
        let sessions = SessionService::restore(api.clone(), store)?;
        Ok(Self {
            feed: FeedService::new(api.clone(), sessions.clone()),
            posts: PostService::new(api.clone(), sessions.clone()),
            sessions,
            api,
        })
    }

    pub fn likes_for(&self, post: &Post, session: &Session) -> LikeController {
        LikeController::for_post(self.api.clone(), self.sessions.clone(), post, session)
    }

    pub fn comments_for(&self, post_id: PostId) -> CommentPanel {
        CommentPanel::new(self.api.clone(), self.sessions.clone(), post_id)
    }
}
