use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::recommender::RecommendError;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Recommend(#[from] RecommendError),

    #[error("Corpus error: {0}")]
    Corpus(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Recommend(err) => match err {
                RecommendError::EmptyQuery => StatusCode::BAD_REQUEST,
                RecommendError::UnknownMovie(_) => StatusCode::NOT_FOUND,
                RecommendError::EmptyCorpus | RecommendError::DegenerateVocabulary => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                RecommendError::DimensionMismatch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Corpus(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::HttpClient(_) | AppError::ExternalApi(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if let AppError::Recommend(RecommendError::DimensionMismatch { expected, actual }) = &self {
            tracing::error!(expected, actual, "Vocabulary and corpus matrix are out of step");
        } else if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_for_recommend_errors() {
        assert_eq!(
            AppError::from(RecommendError::EmptyQuery).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(RecommendError::UnknownMovie(7)).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(RecommendError::EmptyCorpus).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::from(RecommendError::DimensionMismatch {
                expected: 3,
                actual: 4
            })
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_recommend_error_message_is_transparent() {
        let err = AppError::from(RecommendError::EmptyQuery);
        assert_eq!(err.to_string(), "No query provided");
    }

    #[test]
    fn test_invalid_input_is_bad_request() {
        let err = AppError::InvalidInput("n must be at most 50".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invalid input: n must be at most 50");
    }

    #[test]
    fn test_corpus_error_status() {
        let err = AppError::Corpus("missing file".to_string());
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.to_string(), "Corpus error: missing file");
    }
}
