use bigdecimal::BigDecimal;

/// 单位类别; 只有同一类别内定义了换算关系的单位才能互相换算
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitClass {
    Mass,
    Volume,
    Count,
    /// 空单位 (未指定)
    Unspecified,
    /// 无法识别的单位, 自成一类
    Other,
}

/// 单位归一化: 去空格、小写, 同义词映射到标准写法
///
/// 无法识别的单位原样返回 (已去空格、小写), 空输入返回空字符串。
/// 可选单位用 `unit.as_deref().unwrap_or_default()` 传入。
pub fn normalize_unit(raw: &str) -> String {
    let unit = raw.trim().to_lowercase();

    let canonical = match unit.as_str() {
        "g" | "gm" | "gms" | "gram" | "grams" => "g",
        "kg" | "kgs" | "kilogram" | "kilograms" => "kg",
        "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => "ml",
        "l" | "lt" | "liter" | "liters" | "litre" | "litres" => "l",
        "pc" | "pcs" | "piece" | "pieces" | "unit" | "units" => "pcs",
        _ => return unit,
    };
    canonical.to_string()
}

pub fn unit_class(raw: &str) -> UnitClass {
    match normalize_unit(raw).as_str() {
        "" => UnitClass::Unspecified,
        "g" | "kg" => UnitClass::Mass,
        "ml" | "l" => UnitClass::Volume,
        "pcs" => UnitClass::Count,
        _ => UnitClass::Other,
    }
}

/// 两个单位之间的数量能否直接比较 (相同、任一为空, 或存在换算关系)
pub fn units_compatible(a: &str, b: &str) -> bool {
    let from = normalize_unit(a);
    let to = normalize_unit(b);
    from.is_empty() || to.is_empty() || from == to || conversion_factor(&from, &to).is_some()
}

/// 数量换算
///
/// 单位相同或任一为空时原样返回; 只定义了 g<->kg 与 ml<->l (因子 1000)。
/// 其他单位组合同样原样返回, 不做任何缩放, 调用方不能据此认为两个数量可比。
pub fn convert_quantity(qty: &BigDecimal, from_unit: &str, to_unit: &str) -> BigDecimal {
    let from = normalize_unit(from_unit);
    let to = normalize_unit(to_unit);

    if from.is_empty() || to.is_empty() || from == to {
        return qty.clone();
    }

    match conversion_factor(&from, &to) {
        Some(factor) => qty * &factor,
        None => qty.clone(),
    }
}

/// 已归一化单位之间的乘法因子
fn conversion_factor(from: &str, to: &str) -> Option<BigDecimal> {
    match (from, to) {
        ("kg", "g") | ("l", "ml") => Some(BigDecimal::from(1000)),
        // 1 * 10^-3, 精确表示
        ("g", "kg") | ("ml", "l") => Some(BigDecimal::new(1i64.into(), 3)),
        _ => None,
    }
}
