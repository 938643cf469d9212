use super::matcher::{normalize_name, IngredientMatcher};
use super::units::{convert_quantity, normalize_unit, units_compatible};
use crate::error::ReconcileError;
use crate::models::{
    AvailabilityIssue, AvailabilityReport, IngredientRequirement, IssueKind, MenuCatalog, MenuItem,
    OrderLineItem, Requirements, SavedQuantities, StockCatalog, StockDelta, StockUpdate,
    StockUpdatePlan,
};
use bigdecimal::{BigDecimal, Zero};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;

/// 库存核对: 需求汇总、可用性检查、增量扣减计算
///
/// 所有方法都是纯计算, 不修改输入, 目录由调用方显式传入。
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler {
    matcher: IngredientMatcher,
}

impl Reconciler {
    pub fn new(matcher: IngredientMatcher) -> Self {
        Self { matcher }
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self::new(IngredientMatcher::new(threshold))
    }

    /// 可用性检查
    ///
    /// - 找不到库存项: error (available = 0)
    /// - 库存为零: error
    /// - 0 < 库存 < 需求: warning
    /// - 同一原料单位混用: error
    /// - 需求单位无法换算到库存单位 (如 pcs 对 kg): error, 不比较数值
    ///
    /// 需求只有一个单位且库存项有单位时, 先把需求换算到库存单位再比较。
    pub fn validate_availability(&self, requirements: &Requirements, stock: &StockCatalog) -> AvailabilityReport {
        let mut warnings = Vec::new();
        let mut errors = Vec::new();

        for requirement in requirements.values() {
            let matched = self.matcher.find_best_match(&requirement.name, stock);

            if requirement.has_mixed_units() {
                tracing::warn!(
                    "原料 '{}' 在不同配方中使用了不同单位: {:?}",
                    requirement.name, requirement.units
                );
                errors.push(issue(
                    requirement,
                    IssueKind::MixedUnits,
                    requirement.total_required.clone(),
                    matched.as_ref().map(|m| m.stock_item.stock_quantity.clone()).unwrap_or_else(BigDecimal::zero),
                    None,
                    matched.as_ref().map(|m| m.stock_item.id.clone()),
                ));
                continue;
            }

            let Some(matched) = matched else {
                errors.push(issue(
                    requirement,
                    IssueKind::NotFound,
                    requirement.total_required.clone(),
                    BigDecimal::zero(),
                    requirement.single_unit().map(str::to_string),
                    None,
                ));
                continue;
            };

            let item = &matched.stock_item;
            let stock_unit = normalize_unit(item.unit.as_deref().unwrap_or_default());
            if let Some(unit) = requirement.single_unit() {
                if !units_compatible(unit, &stock_unit) {
                    tracing::warn!(
                        "原料 '{}' 单位 {} 无法换算到库存项 {} 的单位 {}",
                        requirement.name, unit, item.id, stock_unit
                    );
                    errors.push(issue(
                        requirement,
                        IssueKind::IncompatibleUnits,
                        requirement.total_required.clone(),
                        item.stock_quantity.clone(),
                        Some(unit.to_string()),
                        Some(item.id.clone()),
                    ));
                    continue;
                }
            }
            let required = match requirement.single_unit() {
                Some(unit) => convert_quantity(&requirement.total_required, unit, &stock_unit),
                None => requirement.total_required.clone(),
            };
            let available = item.stock_quantity.clone();

            if available >= required {
                continue;
            }

            let unit = if stock_unit.is_empty() {
                requirement.single_unit().map(str::to_string)
            } else {
                Some(stock_unit)
            };
            let kind = if available <= BigDecimal::zero() {
                IssueKind::OutOfStock
            } else {
                IssueKind::Insufficient
            };
            let entry = issue(requirement, kind, required, available, unit, Some(item.id.clone()));
            match kind {
                IssueKind::Insufficient => warnings.push(entry),
                _ => errors.push(entry),
            }
        }

        AvailabilityReport {
            is_valid: errors.is_empty(),
            warnings,
            errors,
        }
    }

    /// 把增量分配到库存项, 换算到库存单位并推算扣减后的库存
    ///
    /// 多个增量命中同一库存项时按顺序累计扣减; 推算库存不低于零, 不足部分记为 shortfall。
    /// 单位无法换算的增量放入 incompatible, 不参与扣减。
    pub fn plan_stock_updates(&self, deltas: &[StockDelta], stock: &StockCatalog) -> StockUpdatePlan {
        let mut plan = StockUpdatePlan::default();
        let mut running: HashMap<String, BigDecimal> = HashMap::new();

        for delta in deltas {
            let Some(matched) = self.matcher.find_best_match(&delta.name, stock) else {
                tracing::warn!("增量 '{}' 没有对应的库存项, 跳过", delta.name);
                plan.unmatched.push(delta.clone());
                continue;
            };

            let item = &matched.stock_item;
            let stock_unit = item.unit.as_deref().unwrap_or_default();
            let delta_unit = delta.unit.as_deref().unwrap_or_default();
            if !units_compatible(delta_unit, stock_unit) {
                tracing::warn!(
                    "增量 '{}' 单位 {} 无法换算到库存项 {} 的单位 {}, 跳过",
                    delta.name, delta_unit, item.id, stock_unit
                );
                plan.incompatible.push(delta.clone());
                continue;
            }
            let deduct = convert_quantity(&delta.required_qty, delta_unit, stock_unit);

            let previous = running
                .get(&item.id)
                .cloned()
                .unwrap_or_else(|| item.stock_quantity.clone());
            let remaining = &previous - &deduct;
            let (projected, shortfall) = if remaining < BigDecimal::zero() {
                (BigDecimal::zero(), remaining.abs())
            } else {
                (remaining, BigDecimal::zero())
            };
            running.insert(item.id.clone(), projected.clone());

            plan.updates.push(StockUpdate {
                stock_item_id: item.id.clone(),
                stock_name: item.name.clone(),
                ingredient: delta.name.clone(),
                previous_quantity: previous,
                deduct_quantity: deduct,
                unit: item.unit.clone(),
                projected_quantity: projected,
                shortfall,
                confidence: matched.confidence,
            });
        }

        plan
    }

    /// 汇总需求并检查可用性
    pub fn check_order(&self, line_items: &[OrderLineItem], menu: &MenuCatalog, stock: &StockCatalog) -> AvailabilityReport {
        self.validate_availability(&aggregate_requirements(line_items, menu), stock)
    }
}

fn issue(
    requirement: &IngredientRequirement,
    kind: IssueKind,
    required: BigDecimal,
    available: BigDecimal,
    unit: Option<String>,
    stock_item_id: Option<String>,
) -> AvailabilityIssue {
    AvailabilityIssue {
        ingredient: requirement.name.clone(),
        kind,
        required,
        available,
        unit,
        stock_item_id,
        contributing_menu_items: requirement.contributing_menu_items.clone(),
    }
}

fn display_name(menu_item: &MenuItem, line: &OrderLineItem) -> String {
    if menu_item.name.trim().is_empty() {
        line.name.clone()
    } else {
        menu_item.name.clone()
    }
}

/// 需求汇总: 按当前累计份数计算每种原料的总需求
///
/// 找不到菜品、没有配方、原料名为空、需求量非正的条目直接跳过。
pub fn aggregate_requirements(line_items: &[OrderLineItem], menu: &MenuCatalog) -> Requirements {
    let mut requirements = Requirements::new();

    for line in line_items {
        let Some(menu_item) = menu.get(&line.menu_item_id) else {
            tracing::debug!("菜品 {} 不在菜单目录中, 跳过", line.menu_item_id);
            continue;
        };

        for ingredient in &menu_item.ingredients {
            let key = normalize_name(&ingredient.name);
            if key.is_empty() {
                continue;
            }
            let required = &ingredient.quantity * &line.quantity;
            if required <= BigDecimal::zero() {
                continue;
            }

            let entry = requirements
                .entry(key.clone())
                .or_insert_with(|| IngredientRequirement {
                    key,
                    name: ingredient.name.trim().to_string(),
                    total_required: BigDecimal::zero(),
                    contributing_menu_items: Vec::new(),
                    units: IndexSet::new(),
                });
            entry.total_required += required;
            entry.units.insert(normalize_unit(ingredient.unit.as_deref().unwrap_or_default()));

            let contributor = display_name(menu_item, line);
            if !entry.contributing_menu_items.contains(&contributor) {
                entry.contributing_menu_items.push(contributor);
            }
        }
    }

    requirements
}

/// 订单当前份数: 菜品ID -> 各行份数之和 (份数非正的行跳过)
pub fn snapshot_quantities(line_items: &[OrderLineItem]) -> SavedQuantities {
    let mut saved = SavedQuantities::new();
    for line in line_items {
        if line.quantity <= BigDecimal::zero() {
            continue;
        }
        *saved
            .entry(line.menu_item_id.clone())
            .or_insert_with(BigDecimal::zero) += &line.quantity;
    }
    saved
}

/// 保存成功后要持久化的已扣减份数
///
/// 份数减少不会回补库存, 所以每个菜品取 max(已扣减, 当前); 已从订单删除的菜品保留原值。
pub fn next_saved_quantities(line_items: &[OrderLineItem], saved: &SavedQuantities) -> SavedQuantities {
    let mut next = saved.clone();
    for (menu_item_id, quantity) in snapshot_quantities(line_items) {
        let entry = next.entry(menu_item_id).or_insert_with(BigDecimal::zero);
        if quantity > *entry {
            *entry = quantity;
        }
    }
    next
}

/// 增量扣减计算
///
/// 每个菜品的增量份数 = max(0, 当前份数 - 已扣减份数), 再乘以配方用量, 按小写原料名汇总。
/// 与逐行相减不同, 同一菜品出现在多行时先合并各行份数再减去已扣减份数
/// (已扣减份数按菜品ID记录, 逐行相减会重复扣除或漏算); 份数非正的行跳过。
/// 同一原料出现不同单位时返回 MixedUnits, 不做换算。
pub fn compute_deltas(
    line_items: &[OrderLineItem],
    menu: &MenuCatalog,
    saved: &SavedQuantities,
) -> Result<Vec<StockDelta>, ReconcileError> {
    let current = snapshot_quantities(line_items);
    let mut ordered_ids: IndexSet<&str> = IndexSet::new();
    for line in line_items {
        ordered_ids.insert(line.menu_item_id.as_str());
    }

    // 小写原料名 -> (增量, 归一化单位)
    let mut aggregated: IndexMap<String, (StockDelta, String)> = IndexMap::new();

    for menu_item_id in ordered_ids {
        let quantity = current.get(menu_item_id).cloned().unwrap_or_else(BigDecimal::zero);
        let previous = saved.get(menu_item_id).cloned().unwrap_or_else(BigDecimal::zero);
        let delta_qty = &quantity - &previous;
        if delta_qty <= BigDecimal::zero() {
            continue;
        }

        let Some(menu_item) = menu.get(menu_item_id) else {
            tracing::debug!("菜品 {} 不在菜单目录中, 跳过", menu_item_id);
            continue;
        };

        for ingredient in &menu_item.ingredients {
            let key = normalize_name(&ingredient.name);
            if key.is_empty() {
                continue;
            }
            let required = &ingredient.quantity * &delta_qty;
            if required <= BigDecimal::zero() {
                continue;
            }
            let unit = normalize_unit(ingredient.unit.as_deref().unwrap_or_default());

            match aggregated.get_mut(&key) {
                Some((delta, existing_unit)) => {
                    if *existing_unit != unit {
                        return Err(ReconcileError::MixedUnits {
                            ingredient: delta.name.clone(),
                            units: vec![existing_unit.clone(), unit],
                        });
                    }
                    delta.required_qty += required;
                }
                None => {
                    let delta = StockDelta {
                        name: ingredient.name.trim().to_string(),
                        required_qty: required,
                        unit: Some(unit.clone()).filter(|u| !u.is_empty()),
                    };
                    aggregated.insert(key, (delta, unit));
                }
            }
        }
    }

    Ok(aggregated.into_values().map(|(delta, _)| delta).collect())
}

/// 使用默认匹配阈值的可用性检查
pub fn validate_availability(requirements: &Requirements, stock: &StockCatalog) -> AvailabilityReport {
    Reconciler::default().validate_availability(requirements, stock)
}

/// 使用默认匹配阈值的扣减计划
pub fn plan_stock_updates(deltas: &[StockDelta], stock: &StockCatalog) -> StockUpdatePlan {
    Reconciler::default().plan_stock_updates(deltas, stock)
}
