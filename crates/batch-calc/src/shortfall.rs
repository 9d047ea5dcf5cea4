//! 庫存不足評估（僅提示，不阻擋提交）

use batch_core::MaterialRequirement;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 單項材料的庫存評估
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shortfall {
    /// 材料ID
    pub material_id: String,
    /// 材料名稱
    pub name: String,
    /// 現有庫存
    pub stock: Decimal,
    /// 投入量
    pub required_quantity: Decimal,
    /// 是否不足
    pub is_short: bool,
    /// 不足數量
    pub shortage: Decimal,
}

/// 庫存不足評估器
pub struct ShortfallEvaluator;

impl ShortfallEvaluator {
    /// 逐項評估：庫存 < 投入量 即為不足
    pub fn evaluate(requirements: &[MaterialRequirement]) -> Vec<Shortfall> {
        requirements
            .iter()
            .map(|req| {
                let status = Shortfall {
                    material_id: req.material_id.clone(),
                    name: req.name.clone(),
                    stock: req.stock,
                    required_quantity: req.required_quantity,
                    is_short: req.is_short(),
                    shortage: req.shortage(),
                };
                if status.is_short {
                    tracing::warn!(
                        "材料庫存不足: {} (需要: {}, 現有: {})",
                        status.name,
                        status.required_quantity,
                        status.stock
                    );
                }
                status
            })
            .collect()
    }

    /// 僅列出不足的材料
    pub fn shortfalls(requirements: &[MaterialRequirement]) -> Vec<Shortfall> {
        Self::evaluate(requirements)
            .into_iter()
            .filter(|s| s.is_short)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use batch_core::ProductCategory;

    #[test]
    fn test_evaluate_flags_deficit() {
        let requirements = vec![
            MaterialRequirement::new(
                "MUSH-RAW",
                "生香菇",
                ProductCategory::RawMaterial,
                Decimal::ONE,
                Decimal::from(14),
            )
            .with_stock(Decimal::from(5)),
            MaterialRequirement::new(
                "BOX-S",
                "小紙箱",
                ProductCategory::AuxiliaryMaterial,
                Decimal::ONE,
                Decimal::from(15),
            )
            .with_stock(Decimal::from(15)),
        ];

        let statuses = ShortfallEvaluator::evaluate(&requirements);

        assert_eq!(statuses.len(), 2);
        assert!(statuses[0].is_short);
        assert_eq!(statuses[0].shortage, Decimal::from(9));
        // 庫存剛好等於投入量不算不足
        assert!(!statuses[1].is_short);

        let short = ShortfallEvaluator::shortfalls(&requirements);
        assert_eq!(short.len(), 1);
        assert_eq!(short[0].material_id, "MUSH-RAW");
    }

    #[test]
    fn test_evaluate_uses_overridden_quantity() {
        let requirements = vec![MaterialRequirement::new(
            "BOX-S",
            "小紙箱",
            ProductCategory::AuxiliaryMaterial,
            Decimal::ONE,
            Decimal::from(10),
        )
        .with_stock(Decimal::from(10))
        .with_required_quantity(Decimal::from(12))];

        assert!(ShortfallEvaluator::evaluate(&requirements)[0].is_short);
    }
}
