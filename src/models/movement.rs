use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 库存流水 (pos_stock_movement), 每次保存订单时每个扣减一条
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StockMovement {
    pub order_id: String,
    pub stock_item_id: String,
    pub ingredient: String,
    pub quantity: BigDecimal,
    pub unit: Option<String>,
    pub moved_at: DateTime<Utc>,
}
