//! 生產目標模型

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 生產目標：本批次要生產的一個（成品，數量）
///
/// 數量以「成品件數」計，恆為正整數。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionTarget {
    /// 本地ID（僅在生產作業期間有效）
    pub id: Uuid,

    /// 成品ID（操作員尚未選擇時為空）
    pub product_id: Option<String>,

    /// 生產數量（≥ 1）
    pub quantity: u32,
}

impl ProductionTarget {
    /// 創建新的生產目標，數量下限為 1
    pub fn new(product_id: Option<String>, quantity: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            quantity: quantity.max(1),
        }
    }

    /// 創建指定成品的生產目標
    pub fn for_product(product_id: impl Into<String>, quantity: u32) -> Self {
        Self::new(Some(product_id.into()), quantity)
    }

    /// 空白目標（尚未選擇成品，數量 1）
    pub fn blank() -> Self {
        Self::new(None, 1)
    }

    /// 設置數量，下限為 1
    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity.max(1);
    }

    /// 是否已選擇成品
    pub fn has_product(&self) -> bool {
        self.product_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_target() {
        let target = ProductionTarget::for_product("SLICED-500", 10);

        assert_eq!(target.product_id.as_deref(), Some("SLICED-500"));
        assert_eq!(target.quantity, 10);
        assert!(target.has_product());
    }

    #[test]
    fn test_quantity_floor() {
        let mut target = ProductionTarget::for_product("SLICED-500", 0);
        assert_eq!(target.quantity, 1);

        target.set_quantity(0);
        assert_eq!(target.quantity, 1);

        target.set_quantity(7);
        assert_eq!(target.quantity, 7);
    }

    #[test]
    fn test_blank_target() {
        let target = ProductionTarget::blank();
        assert!(!target.has_product());
        assert_eq!(target.quantity, 1);

        let empty_id = ProductionTarget::new(Some(String::new()), 3);
        assert!(!empty_id.has_product());
    }
}
