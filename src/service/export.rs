use crate::models::{StockDelta, StockUpdate};
use std::io::Write;

/// 导出增量列表为 CSV (带表头)
pub fn write_deltas_csv<W: Write>(deltas: &[StockDelta], writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(["name", "required_qty", "unit"])?;

    for delta in deltas {
        writer.write_record([
            delta.name.clone(),
            delta.required_qty.to_string(),
            delta.unit.clone().unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// 导出扣减计划为 CSV (带表头)
pub fn write_updates_csv<W: Write>(updates: &[StockUpdate], writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record([
        "stock_item_id",
        "stock_name",
        "ingredient",
        "previous_quantity",
        "deduct_quantity",
        "unit",
        "projected_quantity",
        "shortfall",
    ])?;

    for update in updates {
        writer.write_record([
            update.stock_item_id.clone(),
            update.stock_name.clone(),
            update.ingredient.clone(),
            update.previous_quantity.to_string(),
            update.deduct_quantity.to_string(),
            update.unit.clone().unwrap_or_default(),
            update.projected_quantity.to_string(),
            update.shortfall.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    #[test]
    fn test_deltas_csv() {
        let deltas = vec![
            StockDelta {
                name: "Mozzarella".to_string(),
                required_qty: BigDecimal::from(300),
                unit: Some("g".to_string()),
            },
            StockDelta {
                name: "Basil, fresh".to_string(),
                required_qty: BigDecimal::from(2),
                unit: None,
            },
        ];

        let mut out = Vec::new();
        write_deltas_csv(&deltas, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "name,required_qty,unit\nMozzarella,300,g\n\"Basil, fresh\",2,\n");
    }
}
