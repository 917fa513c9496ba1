use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::config::AppConfig;
use crate::domain::engagement::{
    Comment, CommentRequest, LikeSet, ToggleLikeRequest, ToggleLikeResponse,
};
use crate::domain::post::{CategoryFilter, Post, PostDraft};
use crate::domain::user::{SignInRequest, SignInResponse, SignUpRequest, UsernamesResponse};
use crate::domain::{PostId, UserId};
use crate::http::error::ApiError;
use crate::http::routes::Endpoint;

/// Thin typed wrapper over the blog backend. Every call maps to exactly one
/// HTTP request; nothing is retried or cached.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .build()?;
        Self::with_http(http, &config.api_base_url)
    }

    pub fn with_http(http: reqwest::Client, base_url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<String, ApiError> {
        let response = self.send(self.request(Endpoint::SignUp)?.json(request)).await?;
        Ok(response.text().await?)
    }

    pub async fn sign_in(&self, request: &SignInRequest) -> Result<SignInResponse, ApiError> {
        let response = self.send(self.request(Endpoint::SignIn)?.json(request)).await?;
        read_json(response).await
    }

    /// Usernames for the given ids, in the order the backend returns them.
    pub async fn usernames(&self, user_ids: &[UserId]) -> Result<Vec<String>, ApiError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let csv = user_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let response = self
            .send(self.request(Endpoint::UserNames)?.query(&[("userIds", csv)]))
            .await?;
        let body: UsernamesResponse = read_json(response).await?;
        Ok(body.usernames)
    }

    pub async fn create_post(&self, draft: &PostDraft, user_id: UserId) -> Result<Post, ApiError> {
        let builder = self
            .request(Endpoint::CreatePost)?
            .query(&[("userId", user_id)])
            .json(draft);
        read_json(self.send(builder).await?).await
    }

    pub async fn posts_by_category(&self, filter: &CategoryFilter) -> Result<Vec<Post>, ApiError> {
        let endpoint = Endpoint::PostsByCategory(filter.as_path().to_string());
        let response = self.send(self.request(endpoint)?).await?;
        read_list(response).await
    }

    pub async fn posts_by_user(&self, user_id: UserId) -> Result<Vec<Post>, ApiError> {
        let response = self.send(self.request(Endpoint::PostsByUser(user_id))?).await?;
        read_list(response).await
    }

    pub async fn update_post(
        &self,
        post_id: PostId,
        user_id: UserId,
        draft: &PostDraft,
    ) -> Result<Post, ApiError> {
        let builder = self
            .request(Endpoint::UpdatePost(post_id))?
            .query(&[("userId", user_id)])
            .json(draft);
        read_json(self.send(builder).await?).await
    }

    pub async fn delete_post(&self, post_id: PostId, user_id: UserId) -> Result<(), ApiError> {
        let builder = self
            .request(Endpoint::DeletePost(post_id))?
            .query(&[("userId", user_id)]);
        self.send(builder).await?;
        Ok(())
    }

    pub async fn likes(&self, post_id: PostId) -> Result<LikeSet, ApiError> {
        let response = self.send(self.request(Endpoint::Likes(post_id))?).await?;
        let ids: Vec<UserId> = read_list(response).await?;
        Ok(LikeSet::from(ids))
    }

    pub async fn toggle_like(
        &self,
        post_id: PostId,
        user_id: UserId,
    ) -> Result<ToggleLikeResponse, ApiError> {
        let builder = self
            .request(Endpoint::ToggleLike(post_id))?
            .json(&ToggleLikeRequest { user_id });
        read_json(self.send(builder).await?).await
    }

    /// Idempotent like; never removes an existing like.
    pub async fn like(&self, post_id: PostId, user_id: UserId) -> Result<ToggleLikeResponse, ApiError> {
        let builder = self
            .request(Endpoint::Like(post_id))?
            .query(&[("userId", user_id)]);
        read_json(self.send(builder).await?).await
    }

    pub async fn comments(&self, post_id: PostId) -> Result<Vec<Comment>, ApiError> {
        let response = self.send(self.request(Endpoint::Comments(post_id))?).await?;
        read_list(response).await
    }

    pub async fn add_comment(
        &self,
        post_id: PostId,
        user_id: UserId,
        message: &str,
    ) -> Result<Comment, ApiError> {
        let builder = self
            .request(Endpoint::CreateComment(post_id))?
            .query(&[("userId", user_id)])
            .json(&CommentRequest { message });
        read_json(self.send(builder).await?).await
    }

    fn url(&self, endpoint: &Endpoint) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(endpoint.segments());
        Ok(url)
    }

    fn request(&self, endpoint: Endpoint) -> Result<RequestBuilder, ApiError> {
        let url = self.url(&endpoint)?;
        Ok(self.http.request(endpoint.method(), url))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await.map_err(|err| {
            tracing::warn!(error = %err, "backend request failed");
            ApiError::from(err)
        })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(status = %status, url = %response.url(), "backend responded");
            return Ok(response);
        }

        let url = response.url().clone();
        let message = response.text().await.unwrap_or_default();
        tracing::warn!(status = %status, url = %url, message = %message, "backend rejected request");
        Err(ApiError::status(status, message.trim()))
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Listing endpoints answer 204 with no body when there is nothing to list.
async fn read_list<T: DeserializeOwned>(response: Response) -> Result<Vec<T>, ApiError> {
    if response.status() == StatusCode::NO_CONTENT {
        return Ok(Vec::new());
    }
    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_slice(&bytes)?)
}
