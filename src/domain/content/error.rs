use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum ContentServiceError {
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("content not found")]
    NotFound,
}

impl From<AppError> for ContentServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::BadRequest(msg) => ContentServiceError::Invalid(msg),
            AppError::NotFound(_) => ContentServiceError::NotFound,
            _ => ContentServiceError::Dependency(err.to_string()),
        }
    }
}

impl From<ContentServiceError> for AppError {
    fn from(err: ContentServiceError) -> Self {
        match err {
            ContentServiceError::Invalid(msg) => AppError::BadRequest(msg),
            ContentServiceError::NotFound => AppError::NotFound("Content not found".to_string()),
            ContentServiceError::Dependency(msg) => AppError::StoreUnavailable(msg),
        }
    }
}
