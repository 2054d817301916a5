use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;

// ============================================================================
// Shop Error - one tagged failure type shared by all workflows
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ShopError {
    /// An id (customer, product, order, wishlist pair) did not resolve.
    #[error("{0}")]
    NotFound(String),

    /// Current state contradicts the request, e.g. a duplicate wishlist
    /// entry or move-to-cart on a pair that is not saved.
    #[error("{0}")]
    Conflict(String),

    /// The request as posed cannot be fulfilled, e.g. checkout on an
    /// empty cart or an unparseable `userId` header.
    #[error("{0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ShopError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

// Every route surfaces failures the same way: a status derived from the
// error tag and a JSON body of the shape {"error": "<message>"}.
impl ResponseError for ShopError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            // Clients get a generic message, the log gets the cause.
            Self::Database(e) => {
                tracing::error!(error = %e, "storage failure");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_tag() {
        assert_eq!(
            ShopError::not_found("Customer not found.").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ShopError::conflict("Product already in wishlist").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ShopError::validation("Cart is empty; cannot create order.").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ShopError::Database(sqlx::Error::PoolClosed).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn message_is_carried_through_display() {
        let err = ShopError::conflict("Product already in wishlist");
        assert_eq!(err.to_string(), "Product already in wishlist");
    }

    #[test]
    fn database_errors_do_not_leak_details() {
        let body = ShopError::Database(sqlx::Error::PoolClosed).error_response();
        assert_eq!(body.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
