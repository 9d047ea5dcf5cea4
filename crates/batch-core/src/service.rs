//! 外部協作者介面：目錄查詢、配方庫、庫存異動服務

use uuid::Uuid;

use crate::batch::{CommitReceipt, ProductionBatch};
use crate::product::Product;
use crate::recipe::RecipeLine;

/// 查詢失敗（傳輸或查詢層錯誤；單純沒有配方不算失敗）
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("找不到品項: {0}")]
    NotFound(String),

    #[error("查詢服務無法使用: {0}")]
    Unavailable(String),
}

/// 提交失敗（服務端回報的原因，原樣傳回操作員）
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommitError {
    #[error("批次已提交過: {0}")]
    DuplicateBatch(Uuid),

    #[error("找不到品項: {0}")]
    UnknownProduct(String),

    #[error("庫存不足: {product_id} (需要: {required}, 現有: {available})")]
    InsufficientStock {
        product_id: String,
        required: String,
        available: String,
    },

    #[error("並行修改衝突: {0}")]
    Conflict(String),

    #[error("提交逾時: {0}")]
    Timeout(String),

    #[error("服務無法使用: {0}")]
    Unavailable(String),

    #[error("服務拒絕: {0}")]
    Rejected(String),
}

impl CommitError {
    /// 是否為可重試的暫時性失敗
    pub fn is_transient(&self) -> bool {
        matches!(self, CommitError::Timeout(_) | CommitError::Unavailable(_))
    }
}

/// 目錄查詢
pub trait CatalogLookup: Send + Sync {
    /// 查詢品項
    fn get_product(&self, product_id: &str) -> Result<Product, LookupError>;
}

/// 配方庫
pub trait RecipeStore: Send + Sync {
    /// 查詢成品配方；沒有配方時回傳空列表
    fn get_recipe(&self, product_id: &str) -> Result<Vec<RecipeLine>, LookupError>;
}

/// 庫存異動服務
///
/// 實作必須保證整批原子性：全部套用並記錄，或全部不套用。
/// 同一個批次ID重複提交時必須回傳 [`CommitError::DuplicateBatch`]。
pub trait InventoryMutationService: Send + Sync {
    /// 提交生產批次
    fn commit_production_batch(&self, batch: &ProductionBatch)
        -> Result<CommitReceipt, CommitError>;
}
