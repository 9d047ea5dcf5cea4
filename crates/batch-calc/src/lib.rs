//! # Batch Calculation Engine
//!
//! 配方彙總、基準材料縮放、庫存不足評估與批次提交

pub mod aggregation;
pub mod commit;
pub mod scaling;
pub mod session;
pub mod shortfall;

// Re-export 主要類型
pub use aggregation::{AggregationRequest, AggregationResult, RequirementAggregator};
pub use commit::{CommitBuilder, CommitExecutor};
pub use scaling::{ScaleDecision, ScalingController};
pub use session::{ApplyOutcome, EditOutcome, ProductionSession};
pub use shortfall::{Shortfall, ShortfallEvaluator};

use serde::{Deserialize, Serialize};

/// 彙總警告
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationWarning {
    pub product_id: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl AggregationWarning {
    pub fn new(product_id: String, message: String, severity: WarningSeverity) -> Self {
        Self {
            product_id,
            message,
            severity,
        }
    }

    pub fn info(product_id: String, message: String) -> Self {
        Self::new(product_id, message, WarningSeverity::Info)
    }

    pub fn warning(product_id: String, message: String) -> Self {
        Self::new(product_id, message, WarningSeverity::Warning)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningSeverity {
    Info,
    Warning,
}
