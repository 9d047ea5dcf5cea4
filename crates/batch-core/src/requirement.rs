//! 材料需求模型（彙總結果）

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::product::ProductCategory;

/// 材料需求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRequirement {
    /// 材料ID
    pub material_id: String,

    /// 材料名稱
    pub name: String,

    /// 現有庫存（彙總當下）
    pub stock: Decimal,

    /// 計量單位
    pub unit: Option<String>,

    /// 配方比例（衝突時以最後看到的為準）
    pub ratio: Decimal,

    /// 彙總總需求 = Σ ceil(目標數量 × 比例)
    pub total_required: Decimal,

    /// 實際投入量（預設等於總需求，可手動覆寫）
    pub required_quantity: Decimal,

    /// 分類
    pub category: ProductCategory,
}

impl MaterialRequirement {
    /// 創建新的材料需求，投入量預設等於總需求
    pub fn new(
        material_id: impl Into<String>,
        name: impl Into<String>,
        category: ProductCategory,
        ratio: Decimal,
        total_required: Decimal,
    ) -> Self {
        Self {
            material_id: material_id.into(),
            name: name.into(),
            stock: Decimal::ZERO,
            unit: None,
            ratio,
            total_required,
            required_quantity: total_required,
            category,
        }
    }

    /// 建構器模式：設置庫存
    pub fn with_stock(mut self, stock: Decimal) -> Self {
        self.stock = stock;
        self
    }

    /// 建構器模式：設置計量單位
    pub fn with_unit(mut self, unit: Option<String>) -> Self {
        self.unit = unit;
        self
    }

    /// 建構器模式：設置投入量
    pub fn with_required_quantity(mut self, quantity: Decimal) -> Self {
        self.required_quantity = quantity;
        self
    }

    /// 投入量是否被手動覆寫
    pub fn is_overridden(&self) -> bool {
        self.required_quantity != self.total_required
    }

    /// 庫存是否不足
    pub fn is_short(&self) -> bool {
        self.stock < self.required_quantity
    }

    /// 不足數量
    pub fn shortage(&self) -> Decimal {
        if self.is_short() {
            self.required_quantity - self.stock
        } else {
            Decimal::ZERO
        }
    }
}
