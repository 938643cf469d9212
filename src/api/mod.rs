pub mod handlers;

pub use handlers::*;

use crate::service::{InventoryService, Reconciler};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// 无状态核对接口: 目录由请求体提供
pub fn reconcile_routes(reconciler: Reconciler) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/reconcile/requirements", post(requirements))
        .route("/api/reconcile/availability", post(availability))
        .route("/api/reconcile/deltas", post(deltas))
        .route("/api/reconcile/deltas/csv", post(deltas_csv))
        .route("/api/reconcile/plan", post(plan))
        .route("/api/reconcile/plan/csv", post(plan_csv))
        .with_state(reconciler)
}

/// 订单接口: 目录从数据库加载
pub fn order_routes(service: Arc<InventoryService>) -> Router {
    Router::new()
        .route("/api/orders/save", post(save_order))
        .route("/api/orders/:order_id/movements", get(order_movements))
        .with_state(service)
}
