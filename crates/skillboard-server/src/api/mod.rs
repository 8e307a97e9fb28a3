mod error;
pub mod skills;

pub use error::ApiError;

/// Body of `/api/something`
pub const PLACEHOLDER_TEXT: &str = "Not sure what you expected to find here...";

pub async fn something() -> &'static str {
    PLACEHOLDER_TEXT
}
