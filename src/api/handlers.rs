use crate::error::AppError;
use crate::models::{
    menu_catalog, stock_catalog, AvailabilityReport, IngredientRequirement, MenuItem, OrderLineItem,
    SavedQuantities, StockDelta, StockItem, StockMovement, StockUpdatePlan,
};
use crate::service::export::{write_deltas_csv, write_updates_csv};
use crate::service::{aggregate_requirements, compute_deltas, InventoryService, Reconciler, SaveOrderOutcome};
use axum::{
    extract::{Json, Path, State},
    http::header,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 请求体: 订单明细 + 调用方提供的目录 (数组顺序即目录顺序)
#[derive(Debug, Deserialize)]
pub struct ReconcileRequest {
    pub line_items: Vec<OrderLineItem>,
    #[serde(default)]
    pub menu_items: Vec<MenuItem>,
    #[serde(default)]
    pub stock_items: Vec<StockItem>,
    #[serde(default)]
    pub saved_quantities: SavedQuantities,
}

#[derive(Debug, Serialize)]
pub struct RequirementsResponse {
    pub requirements: Vec<IngredientRequirement>,
}

#[derive(Debug, Serialize)]
pub struct DeltasResponse {
    pub deltas: Vec<StockDelta>,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub report: AvailabilityReport,
    pub deltas: Vec<StockDelta>,
    pub plan: StockUpdatePlan,
}

#[derive(Debug, Deserialize)]
pub struct SaveOrderRequest {
    pub order_id: String,
    pub line_items: Vec<OrderLineItem>,
    #[serde(default = "default_allow_warnings")]
    pub allow_warnings: bool,
}

fn default_allow_warnings() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct SaveOrderResponse {
    pub success: bool,
    pub message: String,
    pub outcome: SaveOrderOutcome,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 需求汇总
pub async fn requirements(Json(req): Json<ReconcileRequest>) -> Json<RequirementsResponse> {
    let menu = menu_catalog(req.menu_items);
    let requirements = aggregate_requirements(&req.line_items, &menu);
    Json(RequirementsResponse {
        requirements: requirements.into_values().collect(),
    })
}

/// 可用性检查
pub async fn availability(
    State(reconciler): State<Reconciler>,
    Json(req): Json<ReconcileRequest>,
) -> Json<AvailabilityReport> {
    let menu = menu_catalog(req.menu_items);
    let stock = stock_catalog(req.stock_items);
    Json(reconciler.check_order(&req.line_items, &menu, &stock))
}

/// 增量计算
pub async fn deltas(Json(req): Json<ReconcileRequest>) -> Result<Json<DeltasResponse>, AppError> {
    let menu = menu_catalog(req.menu_items);
    let deltas = compute_deltas(&req.line_items, &menu, &req.saved_quantities)?;
    Ok(Json(DeltasResponse { deltas }))
}

/// 增量计算, 以 CSV 返回
pub async fn deltas_csv(Json(req): Json<ReconcileRequest>) -> Result<impl IntoResponse, AppError> {
    let menu = menu_catalog(req.menu_items);
    let deltas = compute_deltas(&req.line_items, &menu, &req.saved_quantities)?;

    let mut buf = Vec::new();
    write_deltas_csv(&deltas, &mut buf)?;
    let body = String::from_utf8(buf).map_err(|e| AppError::InternalError(Box::new(e)))?;

    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], body))
}

/// 完整核对: 可用性 + 增量 + 扣减计划 (不写库)
pub async fn plan(
    State(reconciler): State<Reconciler>,
    Json(req): Json<ReconcileRequest>,
) -> Result<Json<PlanResponse>, AppError> {
    let menu = menu_catalog(req.menu_items);
    let stock = stock_catalog(req.stock_items);

    let report = reconciler.check_order(&req.line_items, &menu, &stock);
    let deltas = compute_deltas(&req.line_items, &menu, &req.saved_quantities)?;
    let plan = reconciler.plan_stock_updates(&deltas, &stock);

    Ok(Json(PlanResponse { report, deltas, plan }))
}

/// 扣减计划导出为 CSV (不写库)
pub async fn plan_csv(
    State(reconciler): State<Reconciler>,
    Json(req): Json<ReconcileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let menu = menu_catalog(req.menu_items);
    let stock = stock_catalog(req.stock_items);

    let deltas = compute_deltas(&req.line_items, &menu, &req.saved_quantities)?;
    let plan = reconciler.plan_stock_updates(&deltas, &stock);

    let mut buf = Vec::new();
    write_updates_csv(&plan.updates, &mut buf)?;
    let body = String::from_utf8(buf).map_err(|e| AppError::InternalError(Box::new(e)))?;

    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], body))
}

/// 保存订单并扣减库存
pub async fn save_order(
    State(service): State<Arc<InventoryService>>,
    Json(req): Json<SaveOrderRequest>,
) -> Result<Json<SaveOrderResponse>, AppError> {
    let outcome = service
        .save_order(&req.order_id, &req.line_items, req.allow_warnings)
        .await?;

    Ok(Json(SaveOrderResponse {
        success: true,
        message: format!(
            "Order {} saved, {} stock items deducted",
            outcome.order_id,
            outcome.plan.updates.len()
        ),
        outcome,
    }))
}

/// 订单库存流水
pub async fn order_movements(
    State(service): State<Arc<InventoryService>>,
    Path(order_id): Path<String>,
) -> Result<Json<Vec<StockMovement>>, AppError> {
    Ok(Json(service.movements(&order_id).await?))
}
