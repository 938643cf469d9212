pub mod menu;
pub mod movement;
pub mod order;
pub mod result;
pub mod stock;

pub use menu::{menu_catalog, MenuCatalog, MenuItem, RecipeIngredient};
pub use movement::StockMovement;
pub use order::{OrderLineItem, SavedQuantities};
pub use result::{
    AvailabilityIssue, AvailabilityReport, IngredientMatch, IngredientRequirement, IssueKind,
    Requirements, StockDelta, StockUpdate, StockUpdatePlan,
};
pub use stock::{stock_catalog, StockCatalog, StockItem};
