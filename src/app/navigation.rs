use crate::domain::user::Session;
use crate::domain::PostId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    SignUp,
    Home,
    CreatePost,
    Post(PostId),
    Profile,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/".to_string(),
            Self::SignUp => "/signup".to_string(),
            Self::Home => "/home".to_string(),
            Self::CreatePost => "/createPost".to_string(),
            Self::Post(id) => format!("/post/{}", id),
            Self::Profile => "/profile".to_string(),
        }
    }

    /// Unknown paths, including `/post` without an id, land on home.
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Self::Login,
            "/signup" => Self::SignUp,
            "/home" => Self::Home,
            "/createPost" => Self::CreatePost,
            "/profile" => Self::Profile,
            other => other
                .strip_prefix("/post/")
                .and_then(|id| id.parse().ok())
                .map(Self::Post)
                .unwrap_or(Self::Home),
        }
    }

    pub fn requires_session(&self) -> bool {
        !matches!(self, Self::Login | Self::SignUp)
    }

    /// Where the user actually ends up: gated routes without a session
    /// redirect to login.
    pub fn resolve(self, session: Option<&Session>) -> Self {
        if self.requires_session() && session.is_none() {
            tracing::debug!(path = %self.path(), "redirecting to login");
            Self::Login
        } else {
            self
        }
    }
}
