//! 引擎配置

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::product::Product;

/// 批次生產引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 觸發等比例縮放的最小 |倍率 - 1|
    pub scale_epsilon: Decimal,

    /// 提交遇到暫時性失敗時的最大嘗試次數（含第一次）
    pub commit_max_attempts: u32,

    /// 單次刷新內，彙總與基準材料縮放互相觸發的最大輪數
    pub max_rescale_passes: u32,

    /// 操作員未填寫時使用的備註
    pub default_note: String,

    /// 材料的預設計量單位
    pub material_default_unit: String,

    /// 成品的預設計量單位
    pub finished_default_unit: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scale_epsilon: Decimal::new(1, 3),
            commit_max_attempts: 3,
            max_rescale_passes: 4,
            default_note: "batch production".to_string(),
            material_default_unit: "kg".to_string(),
            finished_default_unit: "ea".to_string(),
        }
    }
}

impl EngineConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 JSON 載入配置，未指定的欄位使用預設值
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 建構器模式：設置縮放門檻
    pub fn with_scale_epsilon(mut self, epsilon: Decimal) -> Self {
        self.scale_epsilon = epsilon;
        self
    }

    /// 建構器模式：設置提交嘗試次數
    pub fn with_commit_max_attempts(mut self, attempts: u32) -> Self {
        self.commit_max_attempts = attempts;
        self
    }

    /// 建構器模式：設置最大縮放輪數
    pub fn with_max_rescale_passes(mut self, passes: u32) -> Self {
        self.max_rescale_passes = passes;
        self
    }

    /// 建構器模式：設置預設備註
    pub fn with_default_note(mut self, note: impl Into<String>) -> Self {
        self.default_note = note.into();
        self
    }

    /// 品項的計量單位：優先由規格推導，否則依分類使用預設單位
    pub fn unit_for(&self, product: &Product) -> String {
        product.unit().unwrap_or_else(|| {
            if product.category.is_material() {
                self.material_default_unit.clone()
            } else {
                self.finished_default_unit.clone()
            }
        })
    }

    /// 檢查配置是否合理
    pub fn validate(&self) -> crate::Result<()> {
        if self.scale_epsilon < Decimal::ZERO {
            return Err(crate::BatchError::InvalidConfig(format!(
                "scale_epsilon 不可為負: {}",
                self.scale_epsilon
            )));
        }
        if self.commit_max_attempts == 0 {
            return Err(crate::BatchError::InvalidConfig(
                "commit_max_attempts 至少為 1".to_string(),
            ));
        }
        Ok(())
    }
}
