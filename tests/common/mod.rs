#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::Notify;

use quire::domain::user::Session;
use quire::http::ApiClient;
use quire::infra::session_store::{save_session, MemorySessionStore};
use quire::AppState;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const DEFAULT_PASSWORD: &str = "testpassword123";
const CREATED_AT: &str = "2024-05-01T10:20:30.123456";

// ---------------------------------------------------------------------------
// Backend state: an in-memory stand-in for the blog service
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct StoredUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone)]
pub struct StoredPost {
    pub id: i64,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub cover_image: String,
    pub category: String,
    pub likes: Vec<i64>,
    pub owner: i64,
}

#[derive(Clone)]
pub struct StoredComment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub message: String,
}

#[derive(Default)]
pub struct Backend {
    pub users: Vec<StoredUser>,
    pub posts: Vec<StoredPost>,
    pub comments: Vec<StoredComment>,
    next_id: i64,
    /// Answer 500 to toggle-like calls.
    pub fail_toggle: bool,
    /// Answer 500 to like calls.
    pub fail_like: bool,
    /// Answer 500 to comment reads and writes.
    pub fail_comments: bool,
    /// Answer 401 to calls made on behalf of a user.
    pub reject_sessions: bool,
    /// Match category names ignoring case, like a case-insensitive
    /// database collation does.
    pub loose_categories: bool,
    /// When set, toggle-like waits for a notification before answering.
    pub toggle_gate: Option<Arc<Notify>>,
    calls: HashMap<&'static str, usize>,
}

impl Backend {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn hit(&mut self, name: &'static str) {
        *self.calls.entry(name).or_default() += 1;
    }

    fn username(&self, user_id: i64) -> String {
        self.users
            .iter()
            .find(|user| user.id == user_id)
            .map(|user| user.username.clone())
            .unwrap_or_default()
    }

    fn post_json(&self, post: &StoredPost) -> Value {
        json!({
            "id": post.id,
            "title": post.title,
            "excerpt": post.excerpt,
            "content": post.content,
            "coverImage": post.cover_image,
            "category": post.category,
            "tags": null,
            "likes": post.likes,
            "createdAt": CREATED_AT,
            "updatedAt": CREATED_AT,
            "userId": post.owner,
            "username": self.username(post.owner),
        })
    }

    fn comment_json(&self, comment: &StoredComment) -> Value {
        json!({
            "id": comment.id,
            "postId": comment.post_id,
            "userId": comment.user_id,
            "author": self.username(comment.user_id),
            "message": comment.message,
            "createdAt": CREATED_AT,
            "updatedAt": CREATED_AT,
        })
    }

    fn toggle_json(post_id: i64, user_id: i64, likes: &[i64], liked: bool) -> Value {
        json!({
            "action": if liked { "like" } else { "unlike" },
            "postId": post_id,
            "userId": user_id,
            "likeCount": likes.len(),
            "userHasLiked": liked,
        })
    }
}

type Shared = Arc<Mutex<Backend>>;

// ---------------------------------------------------------------------------
// FakeBackend: one per test, served on an ephemeral port
// ---------------------------------------------------------------------------

pub struct FakeBackend {
    pub base_url: String,
    state: Shared,
}

impl FakeBackend {
    /// Each #[tokio::test] owns its runtime, so the server is started per
    /// test rather than shared.
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(Backend::default()));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("cannot bind fake backend");
        let addr = listener.local_addr().expect("no local addr");

        let app = router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake backend crashed");
        });

        Self {
            base_url: format!("http://{}/api", addr),
            state,
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut Backend) -> R) -> R {
        let mut backend = self.state.lock().unwrap();
        f(&mut backend)
    }

    pub fn calls(&self, name: &str) -> usize {
        self.with(|backend| backend.calls.get(name).copied().unwrap_or(0))
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::with_http(reqwest::Client::new(), &self.base_url).expect("bad base url")
    }

    /// App state backed by an in-memory session store the test can inspect.
    pub fn app(&self) -> (AppState, Arc<MemorySessionStore>) {
        let store = Arc::new(MemorySessionStore::new());
        let state = AppState::new(self.client(), store.clone()).expect("app state");
        (state, store)
    }

    /// App state that starts out signed in as `session`.
    pub fn signed_in_app(&self, session: &Session) -> (AppState, Arc<MemorySessionStore>) {
        let store = Arc::new(MemorySessionStore::new());
        save_session(&*store, session).expect("seed session");
        let state = AppState::new(self.client(), store.clone()).expect("app state");
        (state, store)
    }

    // ------------------------------------------------------------------
    // Test data helpers
    // ------------------------------------------------------------------

    pub fn create_user(&self, username: &str) -> Session {
        self.with(|backend| {
            let id = backend.next_id();
            let email = format!("{}@example.com", username);
            backend.users.push(StoredUser {
                id,
                username: username.to_string(),
                email: email.clone(),
                password: DEFAULT_PASSWORD.to_string(),
            });
            Session {
                user_id: id,
                username: username.to_string(),
                email,
            }
        })
    }

    pub fn create_post(&self, owner: i64, title: &str, category: &str, likes: Vec<i64>) -> i64 {
        self.with(|backend| {
            let id = backend.next_id();
            backend.posts.push(StoredPost {
                id,
                title: title.to_string(),
                excerpt: format!("{} excerpt", title),
                content: format!("{} content", title),
                cover_image: String::new(),
                category: category.to_string(),
                likes,
                owner,
            });
            id
        })
    }

    pub fn create_comment(&self, post_id: i64, user_id: i64, message: &str) -> i64 {
        self.with(|backend| {
            let id = backend.next_id();
            backend.comments.push(StoredComment {
                id,
                post_id,
                user_id,
                message: message.to_string(),
            });
            id
        })
    }

    pub fn likes_of(&self, post_id: i64) -> Vec<i64> {
        self.with(|backend| {
            backend
                .posts
                .iter()
                .find(|post| post.id == post_id)
                .map(|post| post.likes.clone())
                .unwrap_or_default()
        })
    }

    pub fn post(&self, post_id: i64) -> Option<StoredPost> {
        self.with(|backend| backend.posts.iter().find(|post| post.id == post_id).cloned())
    }
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/auth/signup", post(sign_up))
        .route("/api/auth/signin", post(sign_in))
        .route("/api/auth/getUserNames", get(user_names))
        .route("/api/posts", post(create_post))
        .route("/api/posts/user/:user_id", get(posts_by_user))
        .route(
            "/api/posts/:key",
            get(posts_by_category).put(update_post).delete(delete_post),
        )
        .route("/api/posts/:key/likes", get(list_likes))
        .route("/api/posts/:key/toggle-like", post(toggle_like))
        .route("/api/posts/:key/like", post(like_post))
        .route(
            "/api/posts/:key/comments",
            get(list_comments).post(create_comment),
        )
        .with_state(state)
}

#[derive(Deserialize)]
struct UserQuery {
    #[serde(rename = "userId")]
    user_id: i64,
}

#[derive(Deserialize)]
struct UserIdsQuery {
    #[serde(rename = "userIds")]
    user_ids: String,
}

#[derive(Deserialize)]
struct SignUpBody {
    username: String,
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct SignInBody {
    email: String,
    password: String,
}

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct PostBody {
    title: String,
    excerpt: String,
    category: String,
    cover_image: String,
    content: String,
}

#[derive(Deserialize)]
struct ToggleBody {
    #[serde(rename = "userId")]
    user_id: i64,
}

#[derive(Deserialize)]
struct CommentBody {
    message: String,
}

fn list_or_no_content(items: Vec<Value>) -> Response {
    if items.is_empty() {
        StatusCode::NO_CONTENT.into_response()
    } else {
        Json(items).into_response()
    }
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "Session rejected").into_response()
}

async fn sign_up(State(state): State<Shared>, Json(body): Json<SignUpBody>) -> Response {
    let mut backend = state.lock().unwrap();
    backend.hit("signup");
    if backend.users.iter().any(|user| user.email == body.email) {
        return (StatusCode::BAD_REQUEST, "Email already in use!").into_response();
    }
    let id = backend.next_id();
    backend.users.push(StoredUser {
        id,
        username: body.username,
        email: body.email,
        password: body.password,
    });
    (StatusCode::OK, "User registered successfully!").into_response()
}

async fn sign_in(State(state): State<Shared>, Json(body): Json<SignInBody>) -> Response {
    let mut backend = state.lock().unwrap();
    backend.hit("signin");
    match backend
        .users
        .iter()
        .find(|user| user.email == body.email && user.password == body.password)
    {
        Some(user) => Json(json!({ "id": user.id, "name": user.username, "email": user.email }))
            .into_response(),
        None => (StatusCode::BAD_REQUEST, "Invalid email or password").into_response(),
    }
}

async fn user_names(State(state): State<Shared>, Query(query): Query<UserIdsQuery>) -> Response {
    let mut backend = state.lock().unwrap();
    backend.hit("usernames");
    let usernames: Vec<String> = query
        .user_ids
        .split(',')
        .filter_map(|id| id.parse::<i64>().ok())
        .filter(|id| backend.users.iter().any(|user| user.id == *id))
        .map(|id| backend.username(id))
        .collect();
    Json(json!({ "usernames": usernames })).into_response()
}

async fn create_post(
    State(state): State<Shared>,
    Query(query): Query<UserQuery>,
    Json(body): Json<PostBody>,
) -> Response {
    let mut backend = state.lock().unwrap();
    backend.hit("posts.create");
    if backend.reject_sessions {
        return unauthorized();
    }
    let id = backend.next_id();
    let post = StoredPost {
        id,
        title: body.title,
        excerpt: body.excerpt,
        content: body.content,
        cover_image: body.cover_image,
        category: body.category,
        likes: Vec::new(),
        owner: query.user_id,
    };
    let payload = backend.post_json(&post);
    backend.posts.push(post);
    (StatusCode::CREATED, Json(payload)).into_response()
}

async fn posts_by_category(State(state): State<Shared>, Path(key): Path<String>) -> Response {
    let mut backend = state.lock().unwrap();
    backend.hit("posts.category");
    let posts: Vec<Value> = backend
        .posts
        .iter()
        .filter(|post| {
            key.eq_ignore_ascii_case("all")
                || post.category == key
                || (backend.loose_categories && post.category.eq_ignore_ascii_case(&key))
        })
        .map(|post| backend.post_json(post))
        .collect();
    list_or_no_content(posts)
}

async fn posts_by_user(State(state): State<Shared>, Path(user_id): Path<i64>) -> Response {
    let mut backend = state.lock().unwrap();
    backend.hit("posts.user");
    if backend.reject_sessions {
        return unauthorized();
    }
    let posts: Vec<Value> = backend
        .posts
        .iter()
        .filter(|post| post.owner == user_id)
        .map(|post| backend.post_json(post))
        .collect();
    list_or_no_content(posts)
}

async fn update_post(
    State(state): State<Shared>,
    Path(key): Path<i64>,
    Query(query): Query<UserQuery>,
    Json(body): Json<PostBody>,
) -> Response {
    let mut backend = state.lock().unwrap();
    backend.hit("posts.update");
    if backend.reject_sessions {
        return unauthorized();
    }
    let Some(index) = backend.posts.iter().position(|post| post.id == key) else {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to update post: Post not found")
            .into_response();
    };
    if backend.posts[index].owner != query.user_id {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to update post: User not authorized",
        )
            .into_response();
    }
    {
        let post = &mut backend.posts[index];
        post.title = body.title;
        post.excerpt = body.excerpt;
        post.category = body.category;
        post.cover_image = body.cover_image;
        post.content = body.content;
    }
    let payload = backend.post_json(&backend.posts[index]);
    Json(payload).into_response()
}

async fn delete_post(
    State(state): State<Shared>,
    Path(key): Path<i64>,
    Query(query): Query<UserQuery>,
) -> Response {
    let mut backend = state.lock().unwrap();
    backend.hit("posts.delete");
    if backend.reject_sessions {
        return unauthorized();
    }
    let before = backend.posts.len();
    backend
        .posts
        .retain(|post| !(post.id == key && post.owner == query.user_id));
    if backend.posts.len() == before {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete post: Post not found")
            .into_response();
    }
    (StatusCode::OK, "Post deleted successfully").into_response()
}

async fn list_likes(State(state): State<Shared>, Path(key): Path<i64>) -> Response {
    let mut backend = state.lock().unwrap();
    backend.hit("likes.list");
    match backend.posts.iter().find(|post| post.id == key) {
        Some(post) => Json(post.likes.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn toggle_like(
    State(state): State<Shared>,
    Path(key): Path<i64>,
    Json(body): Json<ToggleBody>,
) -> Response {
    let gate = {
        let mut backend = state.lock().unwrap();
        backend.hit("toggle-like");
        backend.toggle_gate.clone()
    };
    if let Some(gate) = gate {
        gate.notified().await;
    }

    let mut backend = state.lock().unwrap();
    if backend.reject_sessions {
        return unauthorized();
    }
    if backend.fail_toggle {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Error toggling like: database down")
            .into_response();
    }
    let Some(post) = backend.posts.iter_mut().find(|post| post.id == key) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let liked = if post.likes.contains(&body.user_id) {
        post.likes.retain(|id| *id != body.user_id);
        false
    } else {
        post.likes.push(body.user_id);
        true
    };
    Json(Backend::toggle_json(key, body.user_id, &post.likes, liked)).into_response()
}

async fn like_post(
    State(state): State<Shared>,
    Path(key): Path<i64>,
    Query(query): Query<UserQuery>,
) -> Response {
    let mut backend = state.lock().unwrap();
    backend.hit("like");
    if backend.reject_sessions {
        return unauthorized();
    }
    if backend.fail_like {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Error liking post: database down")
            .into_response();
    }
    let Some(post) = backend.posts.iter_mut().find(|post| post.id == key) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if !post.likes.contains(&query.user_id) {
        post.likes.push(query.user_id);
    }
    Json(Backend::toggle_json(key, query.user_id, &post.likes, true)).into_response()
}

async fn list_comments(State(state): State<Shared>, Path(key): Path<i64>) -> Response {
    let mut backend = state.lock().unwrap();
    backend.hit("comments.list");
    if backend.reject_sessions {
        return unauthorized();
    }
    if backend.fail_comments {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Server error: database down").into_response();
    }
    let comments: Vec<Value> = backend
        .comments
        .iter()
        .filter(|comment| comment.post_id == key)
        .map(|comment| backend.comment_json(comment))
        .collect();
    list_or_no_content(comments)
}

async fn create_comment(
    State(state): State<Shared>,
    Path(key): Path<i64>,
    Query(query): Query<UserQuery>,
    Json(body): Json<CommentBody>,
) -> Response {
    let mut backend = state.lock().unwrap();
    backend.hit("comments.create");
    if backend.reject_sessions {
        return unauthorized();
    }
    if backend.fail_comments {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Server error: database down").into_response();
    }
    let id = backend.next_id();
    let comment = StoredComment {
        id,
        post_id: key,
        user_id: query.user_id,
        message: body.message,
    };
    let payload = backend.comment_json(&comment);
    backend.comments.push(comment);
    (StatusCode::CREATED, Json(payload)).into_response()
}
