//! # Batch Core
//!
//! 批次生產的核心資料模型、外部介面與錯誤類型

pub mod batch;
pub mod config;
pub mod product;
pub mod recipe;
pub mod requirement;
pub mod service;
pub mod target;

// Re-export 主要類型
pub use batch::{AuditEntry, CommitReceipt, InventoryMutation, MutationReason, ProductionBatch};
pub use config::EngineConfig;
pub use product::{unit_of_measure, Product, ProductCategory, ProductStatus};
pub use recipe::RecipeLine;
pub use requirement::MaterialRequirement;
pub use service::{CatalogLookup, CommitError, InventoryMutationService, LookupError, RecipeStore};
pub use target::ProductionTarget;

/// 批次生產錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("找不到生產目標: {0}")]
    TargetNotFound(uuid::Uuid),

    #[error("找不到材料需求: {0}")]
    MaterialNotFound(String),

    #[error("沒有可生產的品項")]
    NoProductionTargets,

    #[error("品項不可生產: {0}")]
    NotProducible(String),

    #[error("品項查詢失敗: {0}")]
    Lookup(#[from] LookupError),

    #[error("提交失敗: {0}")]
    Commit(#[from] CommitError),

    #[error("配置錯誤: {0}")]
    InvalidConfig(String),

    #[error("配置解析錯誤: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BatchError>;
