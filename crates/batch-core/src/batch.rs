//! 生產批次模型（提交給庫存異動服務的內容）

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 異動原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationReason {
    /// 材料消耗（出庫）
    MaterialConsumption,
    /// 生產入庫
    ProductionReceipt,
}

/// 單筆庫存異動
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryMutation {
    /// 品項ID
    pub product_id: String,

    /// 異動數量（消耗為負、入庫為正）
    pub quantity: Decimal,

    /// 異動原因
    pub reason: MutationReason,

    /// 所屬批次
    pub batch_id: Uuid,

    /// 備註
    pub note: Option<String>,
}

impl InventoryMutation {
    /// 材料消耗：數量取負值
    pub fn consumption(product_id: impl Into<String>, magnitude: Decimal, batch_id: Uuid) -> Self {
        Self {
            product_id: product_id.into(),
            quantity: -magnitude.abs(),
            reason: MutationReason::MaterialConsumption,
            batch_id,
            note: None,
        }
    }

    /// 生產入庫：數量為正值
    pub fn receipt(product_id: impl Into<String>, quantity: u32, batch_id: Uuid) -> Self {
        Self {
            product_id: product_id.into(),
            quantity: Decimal::from(quantity),
            reason: MutationReason::ProductionReceipt,
            batch_id,
            note: None,
        }
    }

    /// 建構器模式：設置備註
    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }

    /// 是否為材料消耗
    pub fn is_consumption(&self) -> bool {
        self.reason == MutationReason::MaterialConsumption
    }
}

/// 稽核紀錄（整批一筆，與異動同交易寫入）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// 批次ID
    pub batch_id: Uuid,

    /// 作業類型
    pub work_type: String,

    /// 作業者
    pub worker: String,

    /// 內容
    pub content: String,

    /// 建立時間
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    /// 生產批次的自動稽核紀錄
    pub fn for_batch(batch_id: Uuid, note: &str) -> Self {
        Self {
            batch_id,
            work_type: "process".to_string(),
            worker: "system".to_string(),
            content: format!("batch production completed - {}", note),
            recorded_at: Utc::now(),
        }
    }
}

/// 生產批次：一次提交的全部異動
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionBatch {
    /// 批次ID（重試時沿用，服務端據此拒絕重複提交）
    pub batch_id: Uuid,

    /// 材料消耗明細
    pub deductions: Vec<InventoryMutation>,

    /// 成品入庫明細
    pub receipts: Vec<InventoryMutation>,

    /// 備註
    pub note: String,

    /// 稽核紀錄
    pub audit: AuditEntry,
}

impl ProductionBatch {
    /// 全部異動（先入庫、後消耗）
    pub fn mutations(&self) -> impl Iterator<Item = &InventoryMutation> {
        self.receipts.iter().chain(self.deductions.iter())
    }

    /// 異動筆數
    pub fn line_count(&self) -> usize {
        self.deductions.len() + self.receipts.len()
    }
}

/// 提交成功回執
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitReceipt {
    /// 批次ID
    pub batch_id: Uuid,

    /// 已套用的異動筆數
    pub applied_lines: usize,

    /// 提交時間
    pub committed_at: DateTime<Utc>,
}
