use actix_web::HttpResponse;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::StockShortage;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Insufficient stock")]
    InsufficientStock(Vec<StockShortage>),

    #[error("Insufficient stock (recheck failed). Please try again.")]
    StockConflict { product_id: Uuid, requested: i32 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(msg) => AppError::BadRequest(msg),
            DomainError::NotFound(msg) => AppError::NotFound(msg),
            DomainError::InsufficientStock(insufficient) => AppError::InsufficientStock(insufficient),
            DomainError::StockConflict { product_id, requested } => {
                AppError::StockConflict { product_id, requested }
            }
            DomainError::Store(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::BadRequest(_) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::NotFound(_) => HttpResponse::NotFound().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::InsufficientStock(insufficient) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": self.to_string(),
                "insufficient": insufficient
                    .iter()
                    .map(|s| serde_json::json!({
                        "product_id": s.product_id,
                        "requested": s.requested,
                        "available": s.available,
                    }))
                    .collect::<Vec<_>>()
            })),
            AppError::StockConflict { product_id, requested } => {
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": self.to_string(),
                    "insufficient": [{
                        "product_id": product_id,
                        "requested": requested,
                    }]
                }))
            }
            AppError::Internal(_) => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    fn shortage() -> StockShortage {
        StockShortage { product_id: Uuid::new_v4(), requested: 3, available: 1 }
    }

    #[test]
    fn bad_request_returns_400() {
        let resp = AppError::BadRequest("name is required".to_string()).error_response();
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_returns_404() {
        let resp = AppError::NotFound("Order not found".to_string()).error_response();
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn insufficient_stock_returns_400() {
        let resp = AppError::InsufficientStock(vec![shortage()]).error_response();
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn stock_conflict_returns_400() {
        let err = AppError::StockConflict { product_id: Uuid::new_v4(), requested: 5 };
        assert_eq!(err.error_response().status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_error_returns_500() {
        let err = AppError::Internal("something went wrong".to_string());
        assert_eq!(
            err.error_response().status(),
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn insufficient_stock_display() {
        assert_eq!(AppError::InsufficientStock(vec![]).to_string(), "Insufficient stock");
    }

    #[test]
    fn stock_conflict_display_tells_the_caller_to_retry() {
        let err = AppError::StockConflict { product_id: Uuid::new_v4(), requested: 2 };
        assert_eq!(err.to_string(), "Insufficient stock (recheck failed). Please try again.");
    }

    #[test]
    fn domain_validation_maps_to_bad_request() {
        let app_err: AppError = DomainError::validation("bad value").into();
        assert!(matches!(app_err, AppError::BadRequest(_)));
    }

    #[test]
    fn domain_not_found_maps_to_app_not_found() {
        let app_err: AppError = DomainError::not_found("Order not found").into();
        assert!(matches!(app_err, AppError::NotFound(_)));
    }

    #[test]
    fn domain_shortages_map_to_insufficient_stock() {
        let app_err: AppError = DomainError::InsufficientStock(vec![shortage()]).into();
        assert!(matches!(app_err, AppError::InsufficientStock(ref v) if v.len() == 1));
    }

    #[test]
    fn domain_store_maps_to_app_internal() {
        let app_err: AppError = DomainError::Store("oops".to_string()).into();
        assert!(matches!(app_err, AppError::Internal(_)));
    }
}
