use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum DeliveryServiceError {
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("delivery request not found")]
    NotFound,
}

impl From<AppError> for DeliveryServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::BadRequest(msg) => DeliveryServiceError::Invalid(msg),
            AppError::NotFound(_) => DeliveryServiceError::NotFound,
            _ => DeliveryServiceError::Dependency(err.to_string()),
        }
    }
}

impl From<DeliveryServiceError> for AppError {
    fn from(err: DeliveryServiceError) -> Self {
        match err {
            DeliveryServiceError::Invalid(msg) => AppError::BadRequest(msg),
            DeliveryServiceError::NotFound => AppError::NotFound("Request not found".to_string()),
            DeliveryServiceError::Dependency(msg) => AppError::StoreUnavailable(msg),
        }
    }
}
