use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

use crate::domain::order::OrderError;

// ============================================================================
// API Response Envelope
// ============================================================================
//
// Every response, success or failure, uses the same {success, message, data}
// shape so clients have exactly one decode path.
//
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

impl ResponseError for OrderError {
    fn status_code(&self) -> StatusCode {
        match self {
            OrderError::NotFound => StatusCode::NOT_FOUND,
            OrderError::CannotCancel(_) | OrderError::InvalidTransition { .. } => {
                StatusCode::CONFLICT
            }
            OrderError::EmptyItems
            | OrderError::InvalidQuantity(_)
            | OrderError::InconsistentTotals => StatusCode::BAD_REQUEST,
            OrderError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Storage detail stays in the logs; callers get a generic message.
        if let OrderError::Store(source) = self {
            tracing::error!(error = %source, "Storage failure while handling request");
            return HttpResponse::InternalServerError().json(ApiResponse::failure(
                "Something went wrong, please try again later",
            ));
        }

        HttpResponse::build(self.status_code()).json(ApiResponse::failure(self.to_string()))
    }
}

/// Returned by the requester extractor when the subject header is absent.
#[derive(Debug, thiserror::Error)]
#[error("Missing or invalid X-User-Id header")]
pub struct AuthRequired;

impl ResponseError for AuthRequired {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Unauthorized().json(ApiResponse::failure(self.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderStatus;
    use crate::store::StoreError;

    #[test]
    fn test_success_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::ok("Order cancelled", 42)).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Order cancelled");
        assert_eq!(body["data"], 42);
    }

    #[test]
    fn test_failure_envelope_has_null_data() {
        let body = serde_json::to_value(ApiResponse::failure("Order not found")).unwrap();
        assert_eq!(body["success"], false);
        assert!(body["data"].is_null());
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(OrderError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            OrderError::CannotCancel(OrderStatus::Shipped).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            OrderError::InvalidTransition {
                from: OrderStatus::Confirmed,
                to: OrderStatus::Delivered,
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            OrderError::Store(StoreError::Unavailable("down".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
