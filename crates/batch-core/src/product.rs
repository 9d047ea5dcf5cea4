//! 品項模型（由目錄提供，引擎唯讀）

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 品項分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    /// 成品（也可能作為下游生產的材料）
    Finished,
    /// 原物料（農產品原物，例如鮮菇）
    RawMaterial,
    /// 副資材（包材、標籤、箱子）
    AuxiliaryMaterial,
}

impl ProductCategory {
    /// 由舊版 item_type 字串解析分類
    ///
    /// - `harvest_item` → 原物料
    /// - `aux_material` / `raw_material` / `material` → 副資材
    /// - 其他（含空字串、`product`）→ 成品
    pub fn from_legacy_item_type(item_type: &str) -> Self {
        match item_type {
            "harvest_item" => ProductCategory::RawMaterial,
            "aux_material" | "raw_material" | "material" => ProductCategory::AuxiliaryMaterial,
            _ => ProductCategory::Finished,
        }
    }

    /// 是否為材料類（原物料或副資材）
    pub fn is_material(&self) -> bool {
        matches!(
            self,
            ProductCategory::RawMaterial | ProductCategory::AuxiliaryMaterial
        )
    }
}

/// 品項狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// 販售/使用中
    Active,
    /// 已停產
    Discontinued,
}

/// 品項
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// 品項ID
    pub id: String,

    /// 顯示名稱
    pub name: String,

    /// 規格（自由文字，例如 "500g"、"10kg"）
    pub specification: Option<String>,

    /// 現有庫存（原物料重量可為小數）
    pub stock: Decimal,

    /// 分類
    pub category: ProductCategory,

    /// 狀態
    pub status: ProductStatus,
}

impl Product {
    /// 創建新的品項
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: ProductCategory) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            specification: None,
            stock: Decimal::ZERO,
            category,
            status: ProductStatus::Active,
        }
    }

    /// 建構器模式：設置規格
    pub fn with_specification(mut self, specification: impl Into<String>) -> Self {
        self.specification = Some(specification.into());
        self
    }

    /// 建構器模式：設置庫存
    pub fn with_stock(mut self, stock: Decimal) -> Self {
        self.stock = stock;
        self
    }

    /// 建構器模式：設置狀態
    pub fn with_status(mut self, status: ProductStatus) -> Self {
        self.status = status;
        self
    }

    /// 由規格推導的計量單位
    pub fn unit(&self) -> Option<String> {
        self.specification.as_deref().and_then(unit_of_measure)
    }

    /// 是否可作為生產目標
    pub fn is_producible(&self) -> bool {
        self.category == ProductCategory::Finished && self.status == ProductStatus::Active
    }
}

/// 從規格字串推導計量單位：去除數字與小數點後修剪空白
///
/// `"10kg"` → `Some("kg")`，`"500"` → `None`
pub fn unit_of_measure(specification: &str) -> Option<String> {
    let unit: String = specification
        .chars()
        .filter(|c| !c.is_ascii_digit() && *c != '.')
        .collect();
    let unit = unit.trim();
    if unit.is_empty() {
        None
    } else {
        Some(unit.to_string())
    }
}
