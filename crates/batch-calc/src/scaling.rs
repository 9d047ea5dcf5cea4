//! 基準材料縮放

use batch_core::{MaterialRequirement, ProductionTarget};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// 修改投入量後的處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleDecision {
    /// 依倍率等比例調整全部生產目標
    Rescale { factor: Decimal },
    /// 僅覆寫該材料的投入量
    Override,
}

/// 縮放控制器
pub struct ScalingController;

impl ScalingController {
    /// 判斷修改投入量時是否觸發全批縮放
    ///
    /// 只有基準材料、原總需求 > 0、新值 > 0 且與原總需求不同，
    /// 並且 |倍率 - 1| 超過門檻時才縮放。
    pub fn decide(
        requirement: &MaterialRequirement,
        is_primary: bool,
        new_value: Decimal,
        epsilon: Decimal,
    ) -> ScaleDecision {
        if !is_primary
            || requirement.total_required <= Decimal::ZERO
            || new_value <= Decimal::ZERO
            || new_value == requirement.total_required
        {
            return ScaleDecision::Override;
        }

        match new_value.checked_div(requirement.total_required) {
            Some(factor) if (factor - Decimal::ONE).abs() > epsilon => {
                ScaleDecision::Rescale { factor }
            }
            _ => ScaleDecision::Override,
        }
    }

    /// 計算預先指定的基準材料（尚無總需求）在首次彙總時的倍率
    ///
    /// 例如從原物料開啟作業，操作員先輸入要投入的原物料量，
    /// 選好成品後依首次彙總的總需求反推生產數量。
    pub fn seeded_factor(
        seeded: &MaterialRequirement,
        fresh_total: Decimal,
        epsilon: Decimal,
    ) -> Option<Decimal> {
        if !seeded.total_required.is_zero()
            || seeded.required_quantity <= Decimal::ZERO
            || fresh_total <= Decimal::ZERO
        {
            return None;
        }

        seeded
            .required_quantity
            .checked_div(fresh_total)
            .filter(|factor| *factor > epsilon)
    }

    /// 縮放後的生產數量：四捨五入（.5 進位），下限為 1
    pub fn scaled_quantity(quantity: u32, factor: Decimal) -> u32 {
        let scaled = match Decimal::from(quantity).checked_mul(factor) {
            Some(value) => value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
            None => return u32::MAX,
        };

        match scaled.to_u32() {
            Some(value) => value.max(1),
            None if scaled.is_sign_positive() => u32::MAX,
            None => 1,
        }
    }

    /// 依倍率調整全部生產目標，返回是否有任何數量改變
    pub fn rescale_targets(targets: &mut [ProductionTarget], factor: Decimal) -> bool {
        let mut changed = false;
        for target in targets.iter_mut() {
            let quantity = Self::scaled_quantity(target.quantity, factor);
            if quantity != target.quantity {
                tracing::debug!(
                    "目標 {} 數量 {} → {}（倍率 {}）",
                    target.id,
                    target.quantity,
                    quantity,
                    factor
                );
                target.quantity = quantity;
                changed = true;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use batch_core::ProductCategory;
    use rstest::rstest;

    fn requirement(total: i64) -> MaterialRequirement {
        MaterialRequirement::new(
            "MUSH-RAW",
            "生香菇",
            ProductCategory::RawMaterial,
            Decimal::ONE,
            Decimal::from(total),
        )
    }

    fn epsilon() -> Decimal {
        Decimal::new(1, 3)
    }

    #[test]
    fn test_primary_edit_rescales() {
        let decision = ScalingController::decide(&requirement(14), true, Decimal::from(28), epsilon());
        assert_eq!(
            decision,
            ScaleDecision::Rescale {
                factor: Decimal::from(2)
            }
        );
    }

    #[test]
    fn test_non_primary_edit_overrides() {
        let decision = ScalingController::decide(&requirement(14), false, Decimal::from(28), epsilon());
        assert_eq!(decision, ScaleDecision::Override);
    }

    #[rstest]
    #[case(0, 10)]
    #[case(14, 0)]
    #[case(14, -3)]
    #[case(14, 14)]
    fn test_primary_edit_without_scaling(#[case] total: i64, #[case] new_value: i64) {
        let decision =
            ScalingController::decide(&requirement(total), true, Decimal::from(new_value), epsilon());
        assert_eq!(decision, ScaleDecision::Override);
    }

    #[test]
    fn test_negligible_factor_overrides() {
        // 10000.5 / 10000 = 1.00005，低於門檻
        let decision =
            ScalingController::decide(&requirement(10000), true, Decimal::new(100005, 1), epsilon());
        assert_eq!(decision, ScaleDecision::Override);
    }

    #[rstest]
    #[case(10, Decimal::from(2), 20)]
    #[case(5, Decimal::new(5, 1), 3)]
    #[case(3, Decimal::new(5, 1), 2)]
    #[case(1, Decimal::new(1, 1), 1)]
    #[case(7, Decimal::new(1, 2), 1)]
    #[case(4, Decimal::new(125, 2), 5)]
    fn test_scaled_quantity(#[case] quantity: u32, #[case] factor: Decimal, #[case] expected: u32) {
        assert_eq!(ScalingController::scaled_quantity(quantity, factor), expected);
    }

    #[test]
    fn test_rescale_targets() {
        let mut targets = vec![
            ProductionTarget::for_product("PRODUCT-A", 10),
            ProductionTarget::for_product("PRODUCT-B", 5),
        ];

        assert!(ScalingController::rescale_targets(&mut targets, Decimal::from(2)));
        assert_eq!(targets[0].quantity, 20);
        assert_eq!(targets[1].quantity, 10);

        // 倍率 1 不改變任何數量
        assert!(!ScalingController::rescale_targets(&mut targets, Decimal::ONE));
    }

    #[test]
    fn test_seeded_factor() {
        let seeded = requirement(0).with_required_quantity(Decimal::from(22));

        assert_eq!(
            ScalingController::seeded_factor(&seeded, Decimal::from(11), epsilon()),
            Some(Decimal::from(2))
        );
        assert_eq!(
            ScalingController::seeded_factor(&seeded, Decimal::ZERO, epsilon()),
            None
        );
        assert_eq!(
            ScalingController::seeded_factor(&requirement(11), Decimal::from(11), epsilon()),
            None
        );
    }
}
