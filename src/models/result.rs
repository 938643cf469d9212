use super::StockItem;
use bigdecimal::BigDecimal;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// 原料匹配结果 (不持久化)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientMatch {
    pub stock_item: StockItem,
    /// 匹配置信度, 取值 [0, 1]
    pub confidence: f64,
    pub exact_match: bool,
}

/// 汇总需求表: 小写原料名 -> 需求 (按首次出现顺序)
pub type Requirements = IndexMap<String, IngredientRequirement>;

/// 单个原料在整张订单上的汇总需求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientRequirement {
    /// 归一化后的原料名 (去空格+小写), 汇总键
    pub key: String,
    /// 首次出现时的原始名称, 用于展示
    pub name: String,
    pub total_required: BigDecimal,
    pub contributing_menu_items: Vec<String>,
    /// 该原料出现过的归一化单位 ("" 表示未指定)
    pub units: IndexSet<String>,
}

impl IngredientRequirement {
    /// 单一单位时返回该单位; 无单位或单位混用时返回 None
    pub fn single_unit(&self) -> Option<&str> {
        match self.units.len() {
            1 => self.units.first().map(String::as_str).filter(|u| !u.is_empty()),
            _ => None,
        }
    }

    pub fn has_mixed_units(&self) -> bool {
        self.units.len() > 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// 目录中找不到对应库存项
    NotFound,
    /// 库存为零
    OutOfStock,
    /// 有库存但不足
    Insufficient,
    /// 同一原料在不同配方中使用了不同单位
    MixedUnits,
    /// 需求单位与库存单位之间没有换算关系
    IncompatibleUnits,
}

/// 可用性检查中的一条问题记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityIssue {
    pub ingredient: String,
    pub kind: IssueKind,
    pub required: BigDecimal,
    pub available: BigDecimal,
    pub unit: Option<String>,
    pub stock_item_id: Option<String>,
    pub contributing_menu_items: Vec<String>,
}

/// 可用性检查结果; 只有 errors 会使订单无效, warnings 仅提示
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AvailabilityReport {
    pub is_valid: bool,
    pub warnings: Vec<AvailabilityIssue>,
    pub errors: Vec<AvailabilityIssue>,
}

/// 待扣减的原料增量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockDelta {
    pub name: String,
    pub required_qty: BigDecimal,
    pub unit: Option<String>,
}

/// 单个库存项的扣减计划
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockUpdate {
    pub stock_item_id: String,
    pub stock_name: String,
    pub ingredient: String,
    pub previous_quantity: BigDecimal,
    /// 已换算为库存项单位的扣减数量
    pub deduct_quantity: BigDecimal,
    pub unit: Option<String>,
    pub projected_quantity: BigDecimal,
    /// 库存不足导致被截断为零的部分
    pub shortfall: BigDecimal,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StockUpdatePlan {
    pub updates: Vec<StockUpdate>,
    /// 没有找到库存项的增量, 不会被应用
    pub unmatched: Vec<StockDelta>,
    /// 命中库存项但单位无法换算的增量, 不会被应用
    pub incompatible: Vec<StockDelta>,
}
