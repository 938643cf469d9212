use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 菜单目录: 菜品ID -> 菜品
pub type MenuCatalog = IndexMap<String, MenuItem>;

/// 配方原料 (每售出一份菜品消耗的原料数量)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity: BigDecimal,
    #[serde(default)]
    pub unit: Option<String>,
}

impl RecipeIngredient {
    pub fn new(name: &str, quantity: BigDecimal, unit: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            quantity,
            unit: unit.map(str::to_string),
        }
    }
}

/// 菜品; 没有配方的菜品 ingredients 为空
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredient>,
}

impl MenuItem {
    pub fn new(id: &str, name: &str, ingredients: Vec<RecipeIngredient>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            ingredients,
        }
    }
}

pub fn menu_catalog(items: impl IntoIterator<Item = MenuItem>) -> MenuCatalog {
    items.into_iter().map(|item| (item.id.clone(), item)).collect()
}
