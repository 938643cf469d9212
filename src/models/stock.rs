use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 库存目录: 库存项ID -> 库存项 (保持插入顺序, 匹配时按此顺序扫描)
pub type StockCatalog = IndexMap<String, StockItem>;

/// 库存项 (pos_stock_item)
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct StockItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub stock_quantity: BigDecimal,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl StockItem {
    pub fn new(id: &str, name: &str, stock_quantity: BigDecimal, unit: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            stock_quantity,
            unit: unit.map(str::to_string),
            is_active: true,
        }
    }
}

/// 按给定顺序构建库存目录; 重复ID保留最后一条, 位置不变
pub fn stock_catalog(items: impl IntoIterator<Item = StockItem>) -> StockCatalog {
    items.into_iter().map(|item| (item.id.clone(), item)).collect()
}
