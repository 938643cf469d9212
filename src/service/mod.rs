pub mod export;
pub mod inventory;
pub mod matcher;
pub mod reconcile;
pub mod units;

pub use inventory::{InventoryService, SaveOrderOutcome};
pub use matcher::{find_best_match, IngredientMatcher};
pub use reconcile::{
    aggregate_requirements, compute_deltas, next_saved_quantities, plan_stock_updates,
    snapshot_quantities, validate_availability, Reconciler,
};
pub use units::{convert_quantity, normalize_unit, unit_class, units_compatible, UnitClass};
