use futures::future::try_join_all;
use std::collections::BTreeSet;

use crate::app::session::SessionService;
use crate::domain::post::{CategoryFilter, Post, CATEGORIES};
use crate::domain::PostId;
use crate::error::{AppError, AppResult};
use crate::http::ApiClient;

const POPULAR_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedView {
    #[default]
    Home,
    Popular,
    Saved,
}

pub fn filter_by_category(posts: &[Post], filter: &CategoryFilter) -> Vec<Post> {
    posts
        .iter()
        .filter(|post| filter.matches(post))
        .cloned()
        .collect()
}

/// Most-liked posts first, at most three. Ties keep fetch order.
pub fn popular(posts: &[Post]) -> Vec<Post> {
    let mut ranked = posts.to_vec();
    ranked.sort_by(|a, b| b.like_count().cmp(&a.like_count()));
    ranked.truncate(POPULAR_LIMIT);
    ranked
}

pub fn saved(posts: &[Post], saved_ids: &BTreeSet<PostId>) -> Vec<Post> {
    posts
        .iter()
        .filter(|post| saved_ids.contains(&post.id))
        .cloned()
        .collect()
}

/// What the feed page shows. The saved set lives only as long as this value.
#[derive(Debug, Clone, Default)]
pub struct FeedState {
    posts: Vec<Post>,
    view: FeedView,
    category: CategoryFilter,
    saved: BTreeSet<PostId>,
}

impl FeedState {
    pub fn new(posts: Vec<Post>) -> Self {
        Self {
            posts,
            ..Self::default()
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn set_posts(&mut self, posts: Vec<Post>) {
        self.posts = posts;
    }

    pub fn view(&self) -> FeedView {
        self.view
    }

    pub fn category(&self) -> &CategoryFilter {
        &self.category
    }

    /// Picking a category always returns to the home view.
    pub fn select_category(&mut self, category: CategoryFilter) {
        self.category = category;
        self.view = FeedView::Home;
    }

    /// Leaving the home view resets the category to `All`.
    pub fn select_view(&mut self, view: FeedView) {
        self.view = view;
        if view != FeedView::Home {
            self.category = CategoryFilter::All;
        }
    }

    /// Returns whether the post is saved afterwards.
    pub fn toggle_saved(&mut self, post_id: PostId) -> bool {
        if self.saved.remove(&post_id) {
            false
        } else {
            self.saved.insert(post_id);
            true
        }
    }

    pub fn is_saved(&self, post_id: PostId) -> bool {
        self.saved.contains(&post_id)
    }

    pub fn visible(&self) -> Vec<Post> {
        match self.view {
            FeedView::Saved => saved(&self.posts, &self.saved),
            FeedView::Popular => popular(&self.posts),
            FeedView::Home => filter_by_category(&self.posts, &self.category),
        }
    }
}

#[derive(Clone)]
pub struct FeedService {
    api: ApiClient,
    sessions: SessionService,
}

impl FeedService {
    pub fn new(api: ApiClient, sessions: SessionService) -> Self {
        Self { api, sessions }
    }

    /// Posts in `filter`. The backend matches categories loosely (`all` in
    /// any case means everything, names ignore case), so named filters are
    /// re-applied to the response.
    pub async fn fetch(&self, filter: &CategoryFilter) -> AppResult<Vec<Post>> {
        let fetched = self
            .sessions
            .checked(self.api.posts_by_category(filter).await)
            .await?;
        let posts = filter_by_category(&fetched, filter);
        if posts.len() != fetched.len() {
            tracing::debug!(
                category = %filter.label(),
                dropped = fetched.len() - posts.len(),
                "dropped posts outside the requested category"
            );
        }
        tracing::debug!(category = %filter.label(), count = posts.len(), "fetched posts");
        Ok(posts)
    }

    /// Switches the feed to `filter` and reloads it from the backend.
    pub async fn load(&self, state: &mut FeedState, filter: CategoryFilter) -> AppResult<()> {
        let posts = self.fetch(&filter).await?;
        state.set_posts(posts);
        state.select_category(filter);
        Ok(())
    }

    /// Post counts for `All` and every known category. One failed fetch
    /// fails the whole count.
    pub async fn category_counts(&self) -> AppResult<Vec<(String, usize)>> {
        let filters: Vec<CategoryFilter> = std::iter::once(CategoryFilter::All)
            .chain(CATEGORIES.iter().map(|name| CategoryFilter::parse(name)))
            .collect();

        let counts = try_join_all(filters.iter().map(|filter| async move {
            let posts = self.fetch(filter).await?;
            Ok::<_, AppError>((filter.label().to_string(), posts.len()))
        }))
        .await?;

        Ok(counts)
    }

    /// Detail lookup by id. The backend has no single-post read, so this
    /// scans the full listing.
    pub async fn post(&self, post_id: PostId) -> AppResult<Post> {
        self.fetch(&CategoryFilter::All)
            .await?
            .into_iter()
            .find(|post| post.id == post_id)
            .ok_or(AppError::PostNotFound(post_id))
    }
}
