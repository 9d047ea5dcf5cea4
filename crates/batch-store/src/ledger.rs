//! 庫存異動服務：整批原子套用

use batch_core::{
    CommitError, CommitReceipt, InventoryMutationService, MutationReason, ProductionBatch,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::memory::InMemoryInventory;

/// 注入失敗的時機
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// 套用前失敗（不會有任何異動）
    BeforeApply,
    /// 套用後才回報失敗（模擬回應遺失的逾時）
    AfterApply,
}

/// 庫存異動紀錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryLogEntry {
    /// 品項ID
    pub product_id: String,
    /// 品項名稱
    pub product_name: String,
    /// 異動數量
    pub change_quantity: Decimal,
    /// 異動後庫存
    pub resulting_stock: Decimal,
    /// 異動原因
    pub reason: MutationReason,
    /// 批次ID
    pub batch_id: Uuid,
    /// 備註
    pub memo: Option<String>,
    /// 紀錄時間
    pub recorded_at: DateTime<Utc>,
}

impl InventoryMutationService for InMemoryInventory {
    fn commit_production_batch(
        &self,
        batch: &ProductionBatch,
    ) -> Result<CommitReceipt, CommitError> {
        let mut state = self.state.lock();

        let reply_failure = match state.injected_failures.pop_front() {
            Some((FailureMode::BeforeApply, error)) => {
                tracing::warn!("批次 {} 提交失敗（套用前）: {}", batch.batch_id, error);
                return Err(error);
            }
            Some((FailureMode::AfterApply, error)) => Some(error),
            None => None,
        };

        if state.committed_batches.contains(&batch.batch_id) {
            return Err(CommitError::DuplicateBatch(batch.batch_id));
        }

        // 先在暫存表上計算全部結果，全部通過才寫入
        let mut staged: HashMap<&str, Decimal> = HashMap::new();
        for mutation in batch.mutations() {
            let current = match staged.get(mutation.product_id.as_str()) {
                Some(stock) => *stock,
                None => state
                    .products
                    .get(&mutation.product_id)
                    .map(|p| p.stock)
                    .ok_or_else(|| CommitError::UnknownProduct(mutation.product_id.clone()))?,
            };
            let next = current + mutation.quantity;

            if !self.config.allow_negative_stock && next < Decimal::ZERO {
                return Err(CommitError::InsufficientStock {
                    product_id: mutation.product_id.clone(),
                    required: mutation.quantity.abs().to_string(),
                    available: current.to_string(),
                });
            }
            staged.insert(mutation.product_id.as_str(), next);
        }

        let now = Utc::now();
        let mut logs = Vec::with_capacity(batch.line_count());
        let mut running: HashMap<&str, Decimal> = HashMap::new();
        for mutation in batch.mutations() {
            let Some(product) = state.products.get(&mutation.product_id) else {
                continue;
            };
            let stock = running
                .entry(mutation.product_id.as_str())
                .or_insert(product.stock);
            *stock += mutation.quantity;
            logs.push(InventoryLogEntry {
                product_id: mutation.product_id.clone(),
                product_name: product.name.clone(),
                change_quantity: mutation.quantity,
                resulting_stock: *stock,
                reason: mutation.reason,
                batch_id: batch.batch_id,
                memo: mutation.note.clone(),
                recorded_at: now,
            });
        }

        for (product_id, stock) in staged {
            if let Some(product) = state.products.get_mut(product_id) {
                product.stock = stock;
            }
        }
        state.logs.extend(logs);
        state.audit.push(batch.audit.clone());
        state.committed_batches.insert(batch.batch_id);

        tracing::info!(
            "批次 {} 已套用：異動 {} 筆",
            batch.batch_id,
            batch.line_count()
        );

        if let Some(error) = reply_failure {
            tracing::warn!("批次 {} 已套用但回報失敗: {}", batch.batch_id, error);
            return Err(error);
        }

        Ok(CommitReceipt {
            batch_id: batch.batch_id,
            applied_lines: batch.line_count(),
            committed_at: now,
        })
    }
}
