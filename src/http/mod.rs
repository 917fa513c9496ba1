pub mod client;
pub mod error;
pub mod routes;

pub use client::ApiClient;
pub use error::{ApiError, ErrorKind};
