use crate::models::AvailabilityReport;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// 核对计算中唯一的硬错误, 其余问题都作为数据返回
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReconcileError {
    #[error("Ingredient '{ingredient}' is used with mixed units: {units:?}")]
    MixedUnits { ingredient: String, units: Vec<String> },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Order {order_id} rejected: stock unavailable")]
    OrderRejected {
        order_id: String,
        report: Box<AvailabilityReport>,
    },

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Internal error: {0}")]
    InternalError(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            AppError::OrderRejected { .. } | AppError::Reconcile(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(_) | AppError::Csv(_) | AppError::InternalError(_) => {
                tracing::error!("{}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = match &self {
            AppError::OrderRejected { report, .. } => json!({
                "success": false,
                "message": self.to_string(),
                "report": report,
            }),
            _ => json!({
                "success": false,
                "message": self.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}
