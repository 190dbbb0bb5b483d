use std::error::Error;
use std::fmt;

use crate::api_connection::ApiConnectionError;
use crate::request::RequestKey;

/// Shown to the user when a recipe can't be reworked.
pub const REGENERATION_FAILED_MESSAGE: &str =
    "Couldn't find a substitute right now (the system is busy).";

#[derive(Debug)]
pub enum SessionError {
    RecipeNotFound(String),
    CommentNotFound { recipe_id: String, comment_id: String },
    EmptyInput(&'static str),
    NoRecipeOpen,
    AlreadyPending(RequestKey),
    Regeneration(ApiConnectionError),
}

impl SessionError {
    /// Text suitable for a blocking user-facing notice.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Regeneration(_) => REGENERATION_FAILED_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::RecipeNotFound(id) => write!(f, "Recipe not found: {}", id),
            SessionError::CommentNotFound {
                recipe_id,
                comment_id,
            } => write!(f, "Comment {} not found on recipe {}", comment_id, recipe_id),
            SessionError::EmptyInput(field) => write!(f, "{} must not be empty", field),
            SessionError::NoRecipeOpen => write!(f, "No recipe is open"),
            SessionError::AlreadyPending(key) => {
                write!(f, "A {} request is already in progress", key)
            }
            SessionError::Regeneration(err) => {
                write!(f, "{} ({})", REGENERATION_FAILED_MESSAGE, err)
            }
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SessionError::Regeneration(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn regeneration_failure_shows_fixed_notice() {
        let err = SessionError::Regeneration(ApiConnectionError::ApiError {
            status: StatusCode::SERVICE_UNAVAILABLE,
            error_body: "overloaded".to_string(),
        });
        assert_eq!(err.user_message(), REGENERATION_FAILED_MESSAGE);
        assert!(err.to_string().contains("overloaded"));
        assert!(err.source().is_some());
    }

    #[test]
    fn other_errors_show_their_display_text() {
        let err = SessionError::AlreadyPending(RequestKey::Search);
        assert_eq!(err.user_message(), "A search request is already in progress");
    }
}
