use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 已扣减数量: 菜品ID -> 上一次保存时已扣减的份数
pub type SavedQuantities = HashMap<String, BigDecimal>;

/// 订单明细行; quantity 是订单上的当前累计份数, 不是增量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub menu_item_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity: BigDecimal,
}

impl OrderLineItem {
    pub fn new(menu_item_id: &str, name: &str, quantity: BigDecimal) -> Self {
        Self {
            menu_item_id: menu_item_id.to_string(),
            name: name.to_string(),
            quantity,
        }
    }
}
