use crate::models::{IngredientMatch, StockCatalog, StockItem};

/// 部分匹配的最低置信度 (严格大于)
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.7;

/// 名称归一化: 去首尾空格 + 小写
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// 原料匹配器: 配方原料名 -> 库存项
///
/// 1. 先按目录顺序找归一化后完全相同的库存项, 第一个命中即返回 (置信度 1.0);
///    目录里有重名库存项时, 结果取决于目录顺序。
/// 2. 否则收集互为子串的候选, 置信度 = min(原料长度/库存长度, 库存长度/原料长度),
///    稳定排序后取最高者, 且必须大于阈值。
#[derive(Debug, Clone, Copy)]
pub struct IngredientMatcher {
    threshold: f64,
}

impl IngredientMatcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn find_best_match(&self, ingredient_name: &str, catalog: &StockCatalog) -> Option<IngredientMatch> {
        let target = normalize_name(ingredient_name);
        if target.is_empty() || catalog.is_empty() {
            return None;
        }

        // 精确匹配
        if let Some(item) = catalog.values().find(|item| normalize_name(&item.name) == target) {
            tracing::debug!("原料 '{}' 精确匹配库存项 {} ({})", ingredient_name, item.id, item.name);
            return Some(IngredientMatch {
                stock_item: item.clone(),
                confidence: 1.0,
                exact_match: true,
            });
        }

        // 部分匹配
        let target_len = target.chars().count() as f64;
        let mut candidates: Vec<(&StockItem, f64)> = catalog
            .values()
            .filter_map(|item| {
                let stock = normalize_name(&item.name);
                if stock.is_empty() {
                    return None;
                }
                if !target.contains(stock.as_str()) && !stock.contains(target.as_str()) {
                    return None;
                }
                let stock_len = stock.chars().count() as f64;
                Some((item, (target_len / stock_len).min(stock_len / target_len)))
            })
            .collect();

        // sort_by 是稳定排序, 同分时保留目录顺序
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

        let (item, confidence) = candidates.into_iter().next()?;
        if confidence > self.threshold {
            tracing::debug!(
                "原料 '{}' 部分匹配库存项 {} ({}), 置信度 {:.3}",
                ingredient_name, item.id, item.name, confidence
            );
            Some(IngredientMatch {
                stock_item: item.clone(),
                confidence,
                exact_match: false,
            })
        } else {
            tracing::debug!(
                "原料 '{}' 最佳候选 '{}' 置信度 {:.3} 未达阈值 {}",
                ingredient_name, item.name, confidence, self.threshold
            );
            None
        }
    }
}

impl Default for IngredientMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_THRESHOLD)
    }
}

/// 使用默认阈值匹配
pub fn find_best_match(ingredient_name: &str, catalog: &StockCatalog) -> Option<IngredientMatch> {
    IngredientMatcher::default().find_best_match(ingredient_name, catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::stock_catalog;
    use bigdecimal::BigDecimal;

    fn item(id: &str, name: &str) -> StockItem {
        StockItem::new(id, name, BigDecimal::from(10), Some("g"))
    }

    #[test]
    fn test_exact_match_case_insensitive() {
        let catalog = stock_catalog(vec![item("s1", "Tomato Sauce"), item("s2", "Mozzarella")]);
        let m = find_best_match("  mozzarella ", &catalog).unwrap();
        assert_eq!(m.stock_item.id, "s2");
        assert!(m.exact_match);
        assert_eq!(m.confidence, 1.0);
    }

    #[test]
    fn test_exact_match_beats_better_partial() {
        let catalog = stock_catalog(vec![item("s1", "Tomatoes"), item("s2", "tomato")]);
        let m = find_best_match("Tomato", &catalog).unwrap();
        assert_eq!(m.stock_item.id, "s2");
        assert!(m.exact_match);
    }

    #[test]
    fn test_duplicate_exact_names_resolve_to_first() {
        let catalog = stock_catalog(vec![item("b", "Basil"), item("a", "BASIL")]);
        assert_eq!(find_best_match("basil", &catalog).unwrap().stock_item.id, "b");
    }

    #[test]
    fn test_partial_match_both_directions() {
        let catalog = stock_catalog(vec![item("s1", "Tomato")]);
        let m = find_best_match("Tomatoes", &catalog).unwrap();
        assert!(!m.exact_match);
        assert!((m.confidence - 0.75).abs() < 1e-9);

        let catalog = stock_catalog(vec![item("s1", "Onions")]);
        let m = find_best_match("Onion", &catalog).unwrap();
        assert!((m.confidence - 5.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_weak_partial_rejected() {
        let catalog = stock_catalog(vec![item("s1", "Mozzarella")]);
        assert!(find_best_match("Mozzarella Cheese Block", &catalog).is_none());
    }

    #[test]
    fn test_threshold_is_strict() {
        // 7 / 10 == 0.7
        let catalog = stock_catalog(vec![item("s1", "abcdefg")]);
        assert!(find_best_match("abcdefghij", &catalog).is_none());

        let loose = IngredientMatcher::new(0.5);
        assert!(loose.find_best_match("abcdefghij", &catalog).is_some());
    }

    #[test]
    fn test_best_candidate_wins_and_ties_keep_order() {
        let catalog = stock_catalog(vec![
            item("s1", "Chili"),
            item("s2", "Chili Flake"),
            item("s3", "Chili Flakes X"),
        ]);
        // "chili flakes" (12): s2 -> 11/12, s3 -> 12/14
        let m = find_best_match("Chili Flakes", &catalog).unwrap();
        assert_eq!(m.stock_item.id, "s2");

        let catalog = stock_catalog(vec![item("x", "Salt A"), item("y", "Salt B")]);
        // "salt" 与两者同分 4/6, 未达阈值; 放宽阈值后取目录中第一个
        let loose = IngredientMatcher::new(0.5);
        assert_eq!(loose.find_best_match("Salt", &catalog).unwrap().stock_item.id, "x");
    }

    #[test]
    fn test_empty_inputs() {
        let catalog = stock_catalog(vec![item("s1", "Flour")]);
        assert!(find_best_match("", &catalog).is_none());
        assert!(find_best_match("   ", &catalog).is_none());
        assert!(find_best_match("Flour", &StockCatalog::new()).is_none());
    }

    #[test]
    fn test_blank_stock_names_never_match() {
        let catalog = stock_catalog(vec![item("s1", "  ")]);
        assert!(IngredientMatcher::new(0.0).find_best_match("Flour", &catalog).is_none());
    }

    #[test]
    fn test_never_returns_low_confidence() {
        let catalog = stock_catalog(vec![
            item("s1", "Oil"),
            item("s2", "Olive Oil"),
            item("s3", "Extra Virgin Olive Oil"),
            item("s4", "Garlic"),
        ]);
        for name in ["olive oil extra", "oil", "garlic clove", "virgin olive oil", "garlic powder", "olive"] {
            if let Some(m) = find_best_match(name, &catalog) {
                assert!(m.confidence > DEFAULT_MATCH_THRESHOLD, "{name}: {}", m.confidence);
            }
        }
    }
}
