use crate::models::{
    MenuCatalog, MenuItem, RecipeIngredient, SavedQuantities, StockCatalog, StockItem,
    StockMovement, StockUpdatePlan,
};
use bigdecimal::BigDecimal;
use chrono::Utc;
use sqlx::{FromRow, PgConnection, PgPool, Postgres, Transaction};

/// 菜品与配方原料的 LEFT JOIN 行
#[derive(Debug, FromRow)]
struct MenuIngredientRow {
    menu_item_id: String,
    menu_item_name: String,
    ingredient_name: Option<String>,
    quantity: Option<BigDecimal>,
    unit: Option<String>,
}

/// 查询库存目录 (按创建顺序, 决定匹配时的扫描顺序)
pub async fn list_stock_items(pool: &PgPool) -> Result<StockCatalog, sqlx::Error> {
    let items = sqlx::query_as::<_, StockItem>(
        r#"
        SELECT id, name, stock_quantity, unit, is_active
        FROM pos_stock_item
        ORDER BY created_at, id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(crate::models::stock_catalog(items))
}

/// 查询菜单目录及配方
pub async fn list_menu_items(pool: &PgPool) -> Result<MenuCatalog, sqlx::Error> {
    let rows = sqlx::query_as::<_, MenuIngredientRow>(
        r#"
        SELECT m.id AS menu_item_id,
               m.name AS menu_item_name,
               i.name AS ingredient_name,
               i.quantity,
               i.unit
        FROM pos_menu_item m
        LEFT JOIN pos_menu_ingredient i ON i.menu_item_id = m.id
        ORDER BY m.created_at, m.id, i.seq
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut catalog = MenuCatalog::new();
    for row in rows {
        let item = catalog
            .entry(row.menu_item_id.clone())
            .or_insert_with(|| MenuItem::new(&row.menu_item_id, &row.menu_item_name, Vec::new()));

        // 没有配方的菜品只有一行且原料列为空
        if let Some(name) = row.ingredient_name {
            item.ingredients.push(RecipeIngredient {
                name,
                quantity: row.quantity.unwrap_or_default(),
                unit: row.unit,
            });
        }
    }

    Ok(catalog)
}

/// 对订单加事务级咨询锁, 同一订单的保存在事务提交前串行执行
pub async fn lock_order(tx: &mut Transaction<'_, Postgres>, order_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(order_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// 查询订单上一次保存时的已扣减份数
///
/// 保存流程中须在持有 lock_order 的事务内调用。
pub async fn load_saved_quantities(conn: &mut PgConnection, order_id: &str) -> Result<SavedQuantities, sqlx::Error> {
    let rows = sqlx::query_as::<_, (String, BigDecimal)>(
        r#"
        SELECT menu_item_id, quantity
        FROM pos_order_saved_quantity
        WHERE order_id = $1
        "#,
    )
    .bind(order_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().collect())
}

/// 查询订单的库存流水
pub async fn list_movements(pool: &PgPool, order_id: &str) -> Result<Vec<StockMovement>, sqlx::Error> {
    sqlx::query_as::<_, StockMovement>(
        r#"
        SELECT order_id, stock_item_id, ingredient, quantity, unit, moved_at
        FROM pos_stock_movement
        WHERE order_id = $1
        ORDER BY moved_at, stock_item_id
        "#,
    )
    .bind(order_id)
    .fetch_all(pool)
    .await
}

/// 在调用方的事务中应用扣减计划: 相对扣减库存、写流水、替换已扣减快照
///
/// 不提交事务; 返回被更新的库存行数。
pub async fn apply_stock_plan(
    tx: &mut Transaction<'_, Postgres>,
    order_id: &str,
    plan: &StockUpdatePlan,
    snapshot: &SavedQuantities,
) -> Result<u64, sqlx::Error> {
    let mut rows_affected = 0;

    for update in &plan.updates {
        // 相对扣减, 并发保存不会互相覆盖
        let result = sqlx::query(
            r#"
            UPDATE pos_stock_item
            SET stock_quantity = GREATEST(stock_quantity - $1, 0),
                updated_at = now()
            WHERE id = $2
            "#,
        )
        .bind(&update.deduct_quantity)
        .bind(&update.stock_item_id)
        .execute(&mut **tx)
        .await?;
        rows_affected += result.rows_affected();
    }

    insert_movements(tx, order_id, plan).await?;
    replace_snapshot(tx, order_id, snapshot).await?;

    Ok(rows_affected)
}

async fn insert_movements(
    tx: &mut Transaction<'_, Postgres>,
    order_id: &str,
    plan: &StockUpdatePlan,
) -> Result<(), sqlx::Error> {
    if plan.updates.is_empty() {
        return Ok(());
    }

    let moved_at = Utc::now();
    let mut query_builder = sqlx::QueryBuilder::new(
        "INSERT INTO pos_stock_movement (order_id, stock_item_id, ingredient, quantity, unit, moved_at) ",
    );
    query_builder.push_values(&plan.updates, |mut b, update| {
        b.push_bind(order_id)
            .push_bind(&update.stock_item_id)
            .push_bind(&update.ingredient)
            .push_bind(update.deduct_quantity.clone())
            .push_bind(update.unit.clone())
            .push_bind(moved_at);
    });

    query_builder.build().execute(&mut **tx).await?;
    Ok(())
}

async fn replace_snapshot(
    tx: &mut Transaction<'_, Postgres>,
    order_id: &str,
    snapshot: &SavedQuantities,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM pos_order_saved_quantity WHERE order_id = $1")
        .bind(order_id)
        .execute(&mut **tx)
        .await?;

    if snapshot.is_empty() {
        return Ok(());
    }

    let mut query_builder = sqlx::QueryBuilder::new(
        "INSERT INTO pos_order_saved_quantity (order_id, menu_item_id, quantity) ",
    );
    query_builder.push_values(snapshot.iter(), |mut b, (menu_item_id, quantity)| {
        b.push_bind(order_id)
            .push_bind(menu_item_id)
            .push_bind(quantity.clone());
    });

    query_builder.build().execute(&mut **tx).await?;
    Ok(())
}
