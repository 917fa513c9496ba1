use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::PrimitiveDateTime;

use crate::domain::engagement::LikeSet;
use crate::domain::{local_datetime, PostId, UserId};

/// Categories offered by the authoring form, in display order.
pub const CATEGORIES: [&str; 5] = ["Technology", "Design", "Business", "Lifestyle", "Health"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    pub content: String,
    #[serde(default)]
    pub cover_image: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub likes: LikeSet,
    #[serde(default)]
    pub comment_count: u32,
    #[serde(default, with = "local_datetime::option")]
    pub created_at: Option<PrimitiveDateTime>,
    #[serde(default, with = "local_datetime::option")]
    pub updated_at: Option<PrimitiveDateTime>,
    #[serde(rename = "userId")]
    pub owner_user_id: UserId,
    #[serde(default)]
    pub username: String,
}

impl Post {
    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    /// Creation date as shown on cards, e.g. `May 1, 2024`.
    pub fn published_on(&self) -> Option<String> {
        self.created_at.and_then(|created_at| {
            created_at
                .format(format_description!(
                    "[month repr:short] [day padding:none], [year]"
                ))
                .ok()
        })
    }
}

/// Body of create and update requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    pub title: String,
    pub excerpt: String,
    pub category: String,
    pub cover_image: String,
    pub content: String,
}

impl PostDraft {
    /// Form problems that block submission; empty when the draft can be sent.
    pub fn problems(&self) -> Vec<&'static str> {
        let mut problems = Vec::new();
        if self.title.trim().is_empty() {
            problems.push("title is required");
        }
        if self.excerpt.trim().is_empty() {
            problems.push("excerpt is required");
        }
        if self.category.is_empty() {
            problems.push("please select a category");
        }
        if self.content.trim().is_empty() {
            problems.push("content is required");
        }
        problems
    }
}

/// Category selection for the feed. `All` is the union of every category;
/// a named category matches the post's category exactly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    pub fn parse(value: &str) -> Self {
        if value == "All" {
            Self::All
        } else {
            Self::Named(value.to_string())
        }
    }

    /// Path segment understood by `GET /posts/{category}`.
    pub fn as_path(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Named(name) => name,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => "All",
            Self::Named(name) => name,
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => post.category == *name,
        }
    }
}
