use reqwest::Method;

use crate::domain::{PostId, UserId};

/// Backend endpoints, relative to the configured API base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    SignUp,
    SignIn,
    UserNames,
    CreatePost,
    PostsByCategory(String),
    PostsByUser(UserId),
    UpdatePost(PostId),
    DeletePost(PostId),
    Likes(PostId),
    ToggleLike(PostId),
    Like(PostId),
    Comments(PostId),
    CreateComment(PostId),
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Self::SignUp | Self::SignIn => Method::POST,
            Self::UserNames => Method::GET,
            Self::CreatePost => Method::POST,
            Self::PostsByCategory(_) | Self::PostsByUser(_) => Method::GET,
            Self::UpdatePost(_) => Method::PUT,
            Self::DeletePost(_) => Method::DELETE,
            Self::Likes(_) => Method::GET,
            Self::ToggleLike(_) | Self::Like(_) => Method::POST,
            Self::Comments(_) => Method::GET,
            Self::CreateComment(_) => Method::POST,
        }
    }

    pub fn segments(&self) -> Vec<String> {
        match self {
            Self::SignUp => segments(&["auth", "signup"]),
            Self::SignIn => segments(&["auth", "signin"]),
            Self::UserNames => segments(&["auth", "getUserNames"]),
            Self::CreatePost => segments(&["posts"]),
            Self::PostsByCategory(category) => segments(&["posts", category.as_str()]),
            Self::PostsByUser(user_id) => segments(&["posts", "user", user_id.to_string().as_str()]),
            Self::UpdatePost(id) | Self::DeletePost(id) => segments(&["posts", id.to_string().as_str()]),
            Self::Likes(id) => segments(&["posts", id.to_string().as_str(), "likes"]),
            Self::ToggleLike(id) => segments(&["posts", id.to_string().as_str(), "toggle-like"]),
            Self::Like(id) => segments(&["posts", id.to_string().as_str(), "like"]),
            Self::Comments(id) | Self::CreateComment(id) => {
                segments(&["posts", id.to_string().as_str(), "comments"])
            }
        }
    }
}

fn segments(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| part.to_string()).collect()
}
