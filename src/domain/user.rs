use serde::{Deserialize, Serialize};

use crate::domain::UserId;

/// Client-held identity for the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignInResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<SignInResponse> for Session {
    fn from(response: SignInResponse) -> Self {
        Self {
            user_id: response.id,
            username: response.name,
            email: response.email,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsernamesResponse {
    #[serde(default)]
    pub usernames: Vec<String>,
}
