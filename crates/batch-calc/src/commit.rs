//! 批次提交：組裝異動並交由庫存異動服務原子套用

use batch_core::{
    AuditEntry, BatchError, CommitError, CommitReceipt, EngineConfig, InventoryMutation,
    InventoryMutationService, MaterialRequirement, ProductionBatch, ProductionTarget,
};
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

/// 批次組裝器
pub struct CommitBuilder;

impl CommitBuilder {
    /// 組裝生產批次
    ///
    /// 未選擇成品的目標與投入量 ≤ 0 的材料不列入批次；
    /// 材料扣除量取畫面上的投入量，不論是否為手動覆寫。
    pub fn build(
        batch_id: Uuid,
        targets: &[ProductionTarget],
        requirements: &[MaterialRequirement],
        note: &str,
        config: &EngineConfig,
    ) -> batch_core::Result<ProductionBatch> {
        let note = if note.trim().is_empty() {
            config.default_note.clone()
        } else {
            note.trim().to_string()
        };

        let receipts: Vec<InventoryMutation> = targets
            .iter()
            .filter(|t| t.has_product() && t.quantity > 0)
            .filter_map(|t| {
                t.product_id.as_ref().map(|product_id| {
                    InventoryMutation::receipt(product_id.clone(), t.quantity, batch_id)
                        .with_note(Some(note.clone()))
                })
            })
            .collect();

        if receipts.is_empty() {
            return Err(BatchError::NoProductionTargets);
        }

        let deductions: Vec<InventoryMutation> = requirements
            .iter()
            .filter(|r| r.required_quantity > Decimal::ZERO)
            .map(|r| {
                InventoryMutation::consumption(r.material_id.clone(), r.required_quantity, batch_id)
                    .with_note(Some(note.clone()))
            })
            .collect();

        tracing::debug!(
            "組裝批次 {}：入庫 {} 筆，消耗 {} 筆",
            batch_id,
            receipts.len(),
            deductions.len()
        );

        Ok(ProductionBatch {
            batch_id,
            audit: AuditEntry::for_batch(batch_id, &note),
            deductions,
            receipts,
            note,
        })
    }
}

/// 批次提交執行器
pub struct CommitExecutor;

impl CommitExecutor {
    /// 提交批次；暫時性失敗以相同批次ID重試，最多 `max_attempts` 次
    ///
    /// 服務回報本批次ID已存在時，代表先前某次提交（可能是上一次作業層級的重試）
    /// 已套用但回應遺失，視為成功。
    pub fn submit(
        service: &dyn InventoryMutationService,
        batch: &ProductionBatch,
        max_attempts: u32,
    ) -> Result<CommitReceipt, CommitError> {
        let max_attempts = max_attempts.max(1);
        let mut attempt = 1;

        loop {
            tracing::info!(
                "提交批次 {}（第 {}/{} 次），異動 {} 筆",
                batch.batch_id,
                attempt,
                max_attempts,
                batch.line_count()
            );

            match service.commit_production_batch(batch) {
                Ok(receipt) => {
                    tracing::info!("批次 {} 提交成功", batch.batch_id);
                    return Ok(receipt);
                }
                Err(CommitError::DuplicateBatch(id)) if id == batch.batch_id => {
                    tracing::info!("批次 {} 已由先前的嘗試套用", batch.batch_id);
                    return Ok(CommitReceipt {
                        batch_id: batch.batch_id,
                        applied_lines: batch.line_count(),
                        committed_at: Utc::now(),
                    });
                }
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    tracing::warn!("批次 {} 提交暫時失敗，重試: {}", batch.batch_id, err);
                    attempt += 1;
                }
                Err(err) => {
                    tracing::warn!("批次 {} 提交失敗: {}", batch.batch_id, err);
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use batch_core::{MutationReason, ProductCategory};
    use std::sync::Mutex;

    fn requirements() -> Vec<MaterialRequirement> {
        vec![
            MaterialRequirement::new(
                "MUSH-RAW",
                "生香菇",
                ProductCategory::RawMaterial,
                Decimal::new(11, 1),
                Decimal::from(14),
            )
            .with_stock(Decimal::from(5)),
            MaterialRequirement::new(
                "BOX-S",
                "小紙箱",
                ProductCategory::AuxiliaryMaterial,
                Decimal::ONE,
                Decimal::from(15),
            )
            .with_required_quantity(Decimal::ZERO),
        ]
    }

    /// 依序回傳預先排好的結果
    struct ScriptedService {
        script: Mutex<Vec<Result<(), CommitError>>>,
        calls: Mutex<Vec<Uuid>>,
    }

    impl ScriptedService {
        fn new(mut script: Vec<Result<(), CommitError>>) -> Self {
            script.reverse();
            Self {
                script: Mutex::new(script),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl InventoryMutationService for ScriptedService {
        fn commit_production_batch(
            &self,
            batch: &ProductionBatch,
        ) -> Result<CommitReceipt, CommitError> {
            self.calls.lock().unwrap().push(batch.batch_id);
            let next = self.script.lock().unwrap().pop().unwrap_or(Ok(()));
            next.map(|_| CommitReceipt {
                batch_id: batch.batch_id,
                applied_lines: batch.line_count(),
                committed_at: Utc::now(),
            })
        }
    }

    #[test]
    fn test_build_batch_lines() {
        let batch_id = Uuid::new_v4();
        let targets = vec![
            ProductionTarget::for_product("PRODUCT-A", 10),
            ProductionTarget::blank(),
            ProductionTarget::for_product("PRODUCT-B", 5),
        ];

        let batch = CommitBuilder::build(
            batch_id,
            &targets,
            &requirements(),
            "  ",
            &EngineConfig::default(),
        )
        .unwrap();

        assert_eq!(batch.receipts.len(), 2);
        assert_eq!(batch.receipts[0].quantity, Decimal::from(10));
        assert_eq!(batch.receipts[0].reason, MutationReason::ProductionReceipt);

        // 投入量為 0 的材料不列入
        assert_eq!(batch.deductions.len(), 1);
        assert_eq!(batch.deductions[0].quantity, Decimal::from(-14));
        assert_eq!(batch.deductions[0].reason, MutationReason::MaterialConsumption);

        assert!(batch.mutations().all(|m| m.batch_id == batch_id));
        assert_eq!(batch.note, "batch production");
        assert_eq!(batch.audit.batch_id, batch_id);
    }

    #[test]
    fn test_build_rejects_no_targets() {
        let result = CommitBuilder::build(
            Uuid::new_v4(),
            &[ProductionTarget::blank()],
            &requirements(),
            "",
            &EngineConfig::default(),
        );

        assert!(matches!(result, Err(BatchError::NoProductionTargets)));
    }

    #[test]
    fn test_submit_retries_transient_with_same_batch_id() {
        let service = ScriptedService::new(vec![
            Err(CommitError::Timeout("5s".to_string())),
            Ok(()),
        ]);
        let batch = CommitBuilder::build(
            Uuid::new_v4(),
            &[ProductionTarget::for_product("PRODUCT-A", 1)],
            &[],
            "retry",
            &EngineConfig::default(),
        )
        .unwrap();

        let receipt = CommitExecutor::submit(&service, &batch, 3).unwrap();

        let calls = service.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|id| *id == batch.batch_id));
        assert_eq!(receipt.batch_id, batch.batch_id);
    }

    #[test]
    fn test_submit_gives_up_after_max_attempts() {
        let service = ScriptedService::new(vec![
            Err(CommitError::Unavailable("db".to_string())),
            Err(CommitError::Unavailable("db".to_string())),
            Err(CommitError::Unavailable("db".to_string())),
        ]);
        let batch = CommitBuilder::build(
            Uuid::new_v4(),
            &[ProductionTarget::for_product("PRODUCT-A", 1)],
            &[],
            "",
            &EngineConfig::default(),
        )
        .unwrap();

        let result = CommitExecutor::submit(&service, &batch, 2);

        assert!(matches!(result, Err(CommitError::Unavailable(_))));
        assert_eq!(service.calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_submit_does_not_retry_rejection() {
        let service = ScriptedService::new(vec![Err(CommitError::Conflict(
            "stock changed".to_string(),
        ))]);
        let batch = CommitBuilder::build(
            Uuid::new_v4(),
            &[ProductionTarget::for_product("PRODUCT-A", 1)],
            &[],
            "",
            &EngineConfig::default(),
        )
        .unwrap();

        let result = CommitExecutor::submit(&service, &batch, 3);

        assert_eq!(
            result.unwrap_err(),
            CommitError::Conflict("stock changed".to_string())
        );
        assert_eq!(service.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_after_timeout_is_success() {
        let batch = CommitBuilder::build(
            Uuid::new_v4(),
            &[ProductionTarget::for_product("PRODUCT-A", 1)],
            &[],
            "",
            &EngineConfig::default(),
        )
        .unwrap();
        let service = ScriptedService::new(vec![
            Err(CommitError::Timeout("lost reply".to_string())),
            Err(CommitError::DuplicateBatch(batch.batch_id)),
        ]);

        let receipt = CommitExecutor::submit(&service, &batch, 3).unwrap();
        assert_eq!(receipt.applied_lines, 1);
    }

    #[test]
    fn test_duplicate_on_first_attempt_confirms_commit() {
        let batch = CommitBuilder::build(
            Uuid::new_v4(),
            &[ProductionTarget::for_product("PRODUCT-A", 1)],
            &[],
            "",
            &EngineConfig::default(),
        )
        .unwrap();
        let service = ScriptedService::new(vec![Err(CommitError::DuplicateBatch(batch.batch_id))]);

        let receipt = CommitExecutor::submit(&service, &batch, 1).unwrap();

        assert_eq!(receipt.batch_id, batch.batch_id);
        assert_eq!(service.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_of_other_batch_is_error() {
        let batch = CommitBuilder::build(
            Uuid::new_v4(),
            &[ProductionTarget::for_product("PRODUCT-A", 1)],
            &[],
            "",
            &EngineConfig::default(),
        )
        .unwrap();
        let other = Uuid::new_v4();
        let service = ScriptedService::new(vec![Err(CommitError::DuplicateBatch(other))]);

        let result = CommitExecutor::submit(&service, &batch, 3);
        assert_eq!(result.unwrap_err(), CommitError::DuplicateBatch(other));
    }
}
