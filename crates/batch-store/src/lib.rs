//! # Batch Store
//!
//! 記憶體內的目錄、配方庫與庫存異動服務（參考實作，供整合測試與示範使用）

pub mod ledger;
pub mod memory;

// Re-export 主要類型
pub use ledger::{FailureMode, InventoryLogEntry};
pub use memory::InMemoryInventory;

use serde::{Deserialize, Serialize};

/// 儲存配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// 是否允許提交後庫存為負
    /// - true: 庫存不足僅為提示，批次照常套用（預設）
    /// - false: 任一品項會變成負庫存時整批拒絕
    pub allow_negative_stock: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            allow_negative_stock: true,
        }
    }
}

impl StoreConfig {
    /// 建構器模式：設置是否允許負庫存
    pub fn with_allow_negative_stock(mut self, allow: bool) -> Self {
        self.allow_negative_stock = allow;
        self
    }
}
