//! 配方（BOM）模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::product::{unit_of_measure, ProductCategory};

/// 配方明細：生產一單位成品所需的某項材料用量
///
/// 除了比例本身，也帶回配方查詢時聯結到的材料名稱、規格、庫存與分類，
/// 讓彙總時不必再逐一查詢目錄。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeLine {
    /// 成品ID
    pub product_id: String,

    /// 材料ID
    pub material_id: String,

    /// 每單位成品的材料用量
    pub ratio: Decimal,

    /// 材料名稱
    pub material_name: String,

    /// 材料規格
    pub material_specification: Option<String>,

    /// 材料現有庫存（查詢當下）
    pub material_stock: Decimal,

    /// 材料分類
    pub material_category: ProductCategory,
}

impl RecipeLine {
    /// 創建新的配方明細
    pub fn new(
        product_id: impl Into<String>,
        material_id: impl Into<String>,
        ratio: Decimal,
        material_name: impl Into<String>,
        material_category: ProductCategory,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            material_id: material_id.into(),
            ratio,
            material_name: material_name.into(),
            material_specification: None,
            material_stock: Decimal::ZERO,
            material_category,
        }
    }

    /// 建構器模式：設置材料規格
    pub fn with_material_specification(mut self, specification: impl Into<String>) -> Self {
        self.material_specification = Some(specification.into());
        self
    }

    /// 建構器模式：設置材料庫存
    pub fn with_material_stock(mut self, stock: Decimal) -> Self {
        self.material_stock = stock;
        self
    }

    /// 材料計量單位
    pub fn material_unit(&self) -> Option<String> {
        self.material_specification
            .as_deref()
            .and_then(unit_of_measure)
    }

    /// 生產指定數量成品所需的材料量（無條件進位）
    pub fn required_for(&self, quantity: u32) -> Decimal {
        (Decimal::from(quantity) * self.ratio).ceil()
    }
}
