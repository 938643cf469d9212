use super::reconcile::{compute_deltas, next_saved_quantities, Reconciler};
use crate::db::queries;
use crate::error::AppError;
use crate::models::{
    AvailabilityReport, MenuCatalog, OrderLineItem, StockCatalog, StockDelta, StockMovement, StockUpdatePlan,
};
use serde::Serialize;
use sqlx::PgPool;
use std::time::{Duration, Instant};

/// 扣减事务的超时时间
const DEDUCT_TIMEOUT: Duration = Duration::from_secs(30);

/// 保存订单的结果
#[derive(Debug, Clone, Serialize)]
pub struct SaveOrderOutcome {
    pub order_id: String,
    pub report: AvailabilityReport,
    pub deltas: Vec<StockDelta>,
    pub plan: StockUpdatePlan,
    pub rows_affected: u64,
}

/// 订单保存流程: 检查可用性 -> 计算增量 -> 生成计划 -> 事务扣减
pub struct InventoryService {
    pool: PgPool,
    reconciler: Reconciler,
}

impl InventoryService {
    pub fn new(pool: PgPool, reconciler: Reconciler) -> Self {
        Self { pool, reconciler }
    }

    /// 保存订单并扣减库存
    ///
    /// 有 error 时拒绝; allow_warnings 为 false 时有 warning 也拒绝。
    pub async fn save_order(
        &self,
        order_id: &str,
        line_items: &[OrderLineItem],
        allow_warnings: bool,
    ) -> Result<SaveOrderOutcome, AppError> {
        if order_id.trim().is_empty() {
            return Err(AppError::MalformedPayload("order_id must not be empty".to_string()));
        }

        // 1. 加载目录
        let menu = queries::list_menu_items(&self.pool).await?;
        let stock = queries::list_stock_items(&self.pool).await?;
        tracing::info!(
            "订单 {}: {} 行, 菜单 {} 项, 库存 {} 项",
            order_id, line_items.len(), menu.len(), stock.len()
        );

        // 2. 可用性检查 (按当前总份数)
        let report = self.reconciler.check_order(line_items, &menu, &stock);
        let blocked = !report.is_valid || (!allow_warnings && !report.warnings.is_empty());
        if blocked {
            tracing::warn!(
                "订单 {} 被拒绝: {} 个错误, {} 个警告",
                order_id, report.errors.len(), report.warnings.len()
            );
            return Err(AppError::OrderRejected {
                order_id: order_id.to_string(),
                report: Box::new(report),
            });
        }

        // 3. 加锁后读取已扣减份数, 计算增量并在同一事务写入
        let start_time = Instant::now();
        let result = tokio::time::timeout(
            DEDUCT_TIMEOUT,
            self.deduct_in_transaction(order_id, line_items, &menu, &stock),
        )
        .await;

        let (deltas, plan, rows_affected) = match result {
            Ok(Ok(applied)) => {
                tracing::info!(
                    "订单 {} 扣减完成, 更新 {} 个库存项, 耗时: {:?}",
                    order_id, applied.2, start_time.elapsed()
                );
                applied
            }
            Ok(Err(e)) => {
                tracing::error!("订单 {} 扣减失败, 耗时: {:?}, 错误: {:?}", order_id, start_time.elapsed(), e);
                return Err(e);
            }
            Err(_) => {
                tracing::error!("订单 {} 扣减超时 (>{:?})!", order_id, DEDUCT_TIMEOUT);
                return Err(AppError::Database(sqlx::Error::PoolTimedOut));
            }
        };

        tracing::info!(
            "订单 {} 保存完成: 增量 {} 条, 扣减 {} 个库存项, 警告 {} 条",
            order_id, deltas.len(), plan.updates.len(), report.warnings.len()
        );

        Ok(SaveOrderOutcome {
            order_id: order_id.to_string(),
            report,
            deltas,
            plan,
            rows_affected,
        })
    }

    /// 事务内: 订单咨询锁 -> 读已扣减份数 -> 增量与计划 -> 扣减、流水、快照 -> 提交
    ///
    /// 同一订单的并发保存在锁上排队, 后到者读到先到者提交的快照, 不会重复扣减。
    async fn deduct_in_transaction(
        &self,
        order_id: &str,
        line_items: &[OrderLineItem],
        menu: &MenuCatalog,
        stock: &StockCatalog,
    ) -> Result<(Vec<StockDelta>, StockUpdatePlan, u64), AppError> {
        let mut tx = self.pool.begin().await?;
        queries::lock_order(&mut tx, order_id).await?;

        let saved = queries::load_saved_quantities(&mut tx, order_id).await?;
        let deltas = compute_deltas(line_items, menu, &saved)?;
        let plan = self.reconciler.plan_stock_updates(&deltas, stock);
        if !plan.unmatched.is_empty() {
            tracing::warn!("订单 {}: {} 个增量没有对应库存项", order_id, plan.unmatched.len());
        }
        if !plan.incompatible.is_empty() {
            tracing::warn!("订单 {}: {} 个增量单位无法换算, 未扣减", order_id, plan.incompatible.len());
        }

        let snapshot = next_saved_quantities(line_items, &saved);
        let rows_affected = queries::apply_stock_plan(&mut tx, order_id, &plan, &snapshot).await?;

        tx.commit().await?;
        Ok((deltas, plan, rows_affected))
    }

    pub async fn movements(&self, order_id: &str) -> Result<Vec<StockMovement>, AppError> {
        Ok(queries::list_movements(&self.pool, order_id).await?)
    }
}
