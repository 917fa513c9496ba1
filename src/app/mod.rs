pub mod comments;
pub mod feed;
pub mod likes;
pub mod navigation;
pub mod optimistic;
pub mod posts;
pub mod session;
