use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use crate::domain::{local_datetime, PostId, UserId};

/// Users who like a post. Each id appears at most once; first-seen order is
/// kept so liker names resolve in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<UserId>", into = "Vec<UserId>")]
pub struct LikeSet {
    ids: Vec<UserId>,
}

impl LikeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.ids.contains(&user_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[UserId] {
        &self.ids
    }

    pub fn insert(&mut self, user_id: UserId) -> bool {
        if self.contains(user_id) {
            return false;
        }
        self.ids.push(user_id);
        true
    }

    pub fn remove(&mut self, user_id: UserId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| *id != user_id);
        self.ids.len() != before
    }

    /// Forces membership; returns whether anything changed.
    pub fn set(&mut self, user_id: UserId, liked: bool) -> bool {
        if liked {
            self.insert(user_id)
        } else {
            self.remove(user_id)
        }
    }
}

impl From<Vec<UserId>> for LikeSet {
    fn from(ids: Vec<UserId>) -> Self {
        let mut set = LikeSet::new();
        for id in ids {
            set.insert(id);
        }
        set
    }
}

impl From<LikeSet> for Vec<UserId> {
    fn from(set: LikeSet) -> Self {
        set.ids
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeAction {
    Like,
    Unlike,
}

/// Backend answer to toggle-like and like calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleLikeResponse {
    pub action: LikeAction,
    pub post_id: PostId,
    pub user_id: UserId,
    pub like_count: usize,
    pub user_has_liked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    #[serde(rename = "postId")]
    pub post_id: PostId,
    #[serde(rename = "userId")]
    pub author_id: UserId,
    #[serde(rename = "author", default)]
    pub author_name: Option<String>,
    #[serde(rename = "message", default)]
    pub text: String,
    #[serde(rename = "createdAt", default, with = "local_datetime::option")]
    pub created_at: Option<PrimitiveDateTime>,
}

impl Comment {
    pub fn author_display(&self) -> &str {
        self.author_name.as_deref().unwrap_or("Unknown User")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentRequest<'a> {
    pub message: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleLikeRequest {
    pub user_id: UserId,
}
