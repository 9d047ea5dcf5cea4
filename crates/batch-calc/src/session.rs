//! 生產作業（單一操作員的一次批次生產輸入）

use batch_core::{
    BatchError, CatalogLookup, CommitReceipt, EngineConfig, InventoryMutationService,
    MaterialRequirement, Product, ProductionBatch, ProductionTarget,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::aggregation::{AggregationRequest, AggregationResult, RequirementAggregator};
use crate::commit::{CommitBuilder, CommitExecutor};
use crate::scaling::{ScaleDecision, ScalingController};
use crate::shortfall::{Shortfall, ShortfallEvaluator};
use crate::AggregationWarning;

/// 套用彙總結果的結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// 已套用
    Applied,
    /// 已套用，且預先指定的基準材料觸發了目標縮放，需要再彙總一次
    Rescaled { factor: Decimal },
    /// 結果世代已過期，捨棄
    Discarded,
}

/// 修改投入量的結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// 全部生產目標已依倍率縮放，需要重新彙總
    Rescaled { factor: Decimal },
    /// 僅覆寫該材料的投入量
    Overridden,
}

/// 生產作業
///
/// 每次修改生產目標都會遞增世代；彙總結果只有在世代相符時才會套用。
#[derive(Debug, Clone)]
pub struct ProductionSession {
    /// 批次ID（提交重試沿用）
    batch_id: Uuid,

    /// 生產目標
    targets: Vec<ProductionTarget>,

    /// 材料需求
    requirements: Vec<MaterialRequirement>,

    /// 基準材料
    primary_material_id: Option<String>,

    /// 備註
    note: String,

    /// 目前世代
    generation: u64,

    /// 最後套用的彙總世代
    applied_generation: u64,

    /// 最後一次彙總的警告
    warnings: Vec<AggregationWarning>,

    /// 引擎配置
    config: EngineConfig,
}

impl ProductionSession {
    /// 創建空的生產作業
    pub fn new(config: EngineConfig) -> Self {
        Self {
            batch_id: Uuid::new_v4(),
            targets: Vec::new(),
            requirements: Vec::new(),
            primary_material_id: None,
            note: String::new(),
            generation: 0,
            applied_generation: 0,
            warnings: Vec::new(),
            config,
        }
    }

    /// 從品項開啟生產作業
    ///
    /// - 成品：建立一筆數量 1 的生產目標
    /// - 材料：設為基準材料，投入量 1、尚無總需求；選好成品後依此反推生產數量
    pub fn open_for_product(config: EngineConfig, product: &Product) -> batch_core::Result<Self> {
        let mut session = Self::new(config);

        if product.category.is_material() {
            tracing::info!("以材料 {} 為基準開啟生產作業", product.id);
            let unit = session.config.unit_for(product);
            session.requirements.push(
                MaterialRequirement::new(
                    product.id.clone(),
                    product.name.clone(),
                    product.category,
                    Decimal::ZERO,
                    Decimal::ZERO,
                )
                .with_stock(product.stock)
                .with_unit(Some(unit))
                .with_required_quantity(Decimal::ONE),
            );
            session.primary_material_id = Some(product.id.clone());
            session.targets.push(ProductionTarget::blank());
        } else {
            if !product.is_producible() {
                return Err(BatchError::NotProducible(product.id.clone()));
            }
            tracing::info!("以成品 {} 開啟生產作業", product.id);
            session
                .targets
                .push(ProductionTarget::for_product(product.id.clone(), 1));
        }

        session.touch();
        Ok(session)
    }

    /// 從目錄查詢品項後開啟生產作業
    pub fn open_from_catalog(
        config: EngineConfig,
        catalog: &dyn CatalogLookup,
        product_id: &str,
    ) -> batch_core::Result<Self> {
        let product = catalog.get_product(product_id)?;
        Self::open_for_product(config, &product)
    }

    pub fn batch_id(&self) -> Uuid {
        self.batch_id
    }

    pub fn targets(&self) -> &[ProductionTarget] {
        &self.targets
    }

    pub fn requirements(&self) -> &[MaterialRequirement] {
        &self.requirements
    }

    pub fn requirement(&self, material_id: &str) -> Option<&MaterialRequirement> {
        self.requirements
            .iter()
            .find(|r| r.material_id == material_id)
    }

    pub fn primary_material_id(&self) -> Option<&str> {
        self.primary_material_id.as_deref()
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn set_note(&mut self, note: impl Into<String>) {
        self.note = note.into();
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn warnings(&self) -> &[AggregationWarning] {
        &self.warnings
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 生產目標變更後是否尚未重新彙總
    pub fn is_stale(&self) -> bool {
        self.applied_generation != self.generation
    }

    /// 新增生產目標，返回本地ID
    pub fn add_target(&mut self, product_id: Option<String>, quantity: u32) -> Uuid {
        let target = ProductionTarget::new(product_id, quantity);
        let id = target.id;
        self.targets.push(target);
        self.touch();
        id
    }

    /// 移除生產目標
    pub fn remove_target(&mut self, target_id: Uuid) -> batch_core::Result<ProductionTarget> {
        let index = self
            .targets
            .iter()
            .position(|t| t.id == target_id)
            .ok_or(BatchError::TargetNotFound(target_id))?;
        let removed = self.targets.remove(index);
        self.touch();
        Ok(removed)
    }

    /// 變更生產目標的成品
    pub fn set_target_product(
        &mut self,
        target_id: Uuid,
        product_id: Option<String>,
    ) -> batch_core::Result<()> {
        self.target_mut(target_id)?.product_id = product_id;
        self.touch();
        Ok(())
    }

    /// 變更生產目標的數量（下限 1）
    pub fn set_target_quantity(&mut self, target_id: Uuid, quantity: u32) -> batch_core::Result<()> {
        self.target_mut(target_id)?.set_quantity(quantity);
        self.touch();
        Ok(())
    }

    /// 指定基準材料；不會回溯縮放任何數量
    pub fn set_primary_material(&mut self, material_id: &str) -> batch_core::Result<()> {
        if self.requirement(material_id).is_none() {
            return Err(BatchError::MaterialNotFound(material_id.to_string()));
        }
        tracing::debug!("基準材料設為 {}", material_id);
        self.primary_material_id = Some(material_id.to_string());
        Ok(())
    }

    /// 修改材料投入量
    ///
    /// 基準材料且倍率有意義時，全部生產目標等比例縮放（需重新彙總）；
    /// 否則只覆寫該材料，其他材料與目標不受影響。
    pub fn edit_required_quantity(
        &mut self,
        material_id: &str,
        new_value: Decimal,
    ) -> batch_core::Result<EditOutcome> {
        let index = self
            .requirements
            .iter()
            .position(|r| r.material_id == material_id)
            .ok_or_else(|| BatchError::MaterialNotFound(material_id.to_string()))?;

        let is_primary = self.primary_material_id.as_deref() == Some(material_id);
        let decision = ScalingController::decide(
            &self.requirements[index],
            is_primary,
            new_value,
            self.config.scale_epsilon,
        );

        if let ScaleDecision::Rescale { factor } = decision {
            if ScalingController::rescale_targets(&mut self.targets, factor) {
                tracing::info!("基準材料 {} 改為 {}，目標縮放倍率 {}", material_id, new_value, factor);
                self.touch();
                return Ok(EditOutcome::Rescaled { factor });
            }
            tracing::debug!("倍率 {} 未改變任何目標數量，改為覆寫", factor);
        }

        self.requirements[index].required_quantity = new_value;
        Ok(EditOutcome::Overridden)
    }

    /// 建立目前世代的彙總請求
    pub fn begin_aggregation(&self) -> AggregationRequest {
        AggregationRequest {
            generation: self.generation,
            targets: self.targets.clone(),
        }
    }

    /// 套用彙總結果
    ///
    /// 世代不符時捨棄。總需求未變的材料保留手動覆寫，否則重設為新的總需求。
    pub fn apply_aggregation(&mut self, result: AggregationResult) -> ApplyOutcome {
        if result.generation != self.generation {
            tracing::warn!(
                "捨棄過期的彙總結果：結果世代 {}，目前世代 {}",
                result.generation,
                self.generation
            );
            return ApplyOutcome::Discarded;
        }

        self.warnings = result.warnings;
        self.applied_generation = result.generation;

        if !result.has_targets {
            // 尚未選擇任何成品：只保留預先指定的基準材料
            self.requirements.retain(|r| r.total_required.is_zero());
            return ApplyOutcome::Applied;
        }

        let mut rescale = None;
        let mut next = result.requirements;

        for fresh in next.iter_mut() {
            let Some(existing) = self
                .requirements
                .iter()
                .find(|r| r.material_id == fresh.material_id)
            else {
                continue;
            };

            let is_primary = self.primary_material_id.as_deref() == Some(fresh.material_id.as_str());
            if is_primary && existing.total_required.is_zero() {
                if let Some(factor) = ScalingController::seeded_factor(
                    existing,
                    fresh.total_required,
                    self.config.scale_epsilon,
                ) {
                    fresh.required_quantity = existing.required_quantity;
                    rescale = Some(factor);
                }
                continue;
            }

            if existing.total_required == fresh.total_required {
                fresh.required_quantity = existing.required_quantity;
            }
        }

        self.requirements = next;
        self.ensure_primary();

        if let Some(factor) = rescale {
            if ScalingController::rescale_targets(&mut self.targets, factor) {
                tracing::info!("依預先指定的基準材料縮放目標，倍率 {}", factor);
                self.touch();
                return ApplyOutcome::Rescaled { factor };
            }
        }

        ApplyOutcome::Applied
    }

    /// 同步刷新：彙總並套用，直到不再觸發縮放
    pub fn refresh(&mut self, aggregator: &RequirementAggregator<'_>) -> ApplyOutcome {
        let mut outcome = ApplyOutcome::Applied;
        for _ in 0..self.config.max_rescale_passes.max(1) {
            let request = self.begin_aggregation();
            let result = aggregator.run(&request);
            outcome = self.apply_aggregation(result);
            if !matches!(outcome, ApplyOutcome::Rescaled { .. }) {
                return outcome;
            }
        }
        tracing::warn!("刷新達到最大縮放輪數 {}", self.config.max_rescale_passes);
        outcome
    }

    /// 庫存評估（僅提示）
    pub fn shortfalls(&self) -> Vec<Shortfall> {
        ShortfallEvaluator::evaluate(&self.requirements)
    }

    /// 依目前畫面上的數值組裝批次
    pub fn build_batch(&self) -> batch_core::Result<ProductionBatch> {
        CommitBuilder::build(
            self.batch_id,
            &self.targets,
            &self.requirements,
            &self.note,
            &self.config,
        )
    }

    /// 提交批次
    ///
    /// 成功後清空作業並換發新的批次ID；失敗時作業內容完全不變，可直接重試。
    pub fn commit(
        &mut self,
        service: &dyn InventoryMutationService,
    ) -> batch_core::Result<CommitReceipt> {
        let batch = self.build_batch()?;
        let receipt = CommitExecutor::submit(service, &batch, self.config.commit_max_attempts)?;
        self.reset();
        Ok(receipt)
    }

    /// 取消作業
    pub fn discard(self) {
        tracing::debug!("取消生產作業 {}", self.batch_id);
    }

    fn target_mut(&mut self, target_id: Uuid) -> batch_core::Result<&mut ProductionTarget> {
        self.targets
            .iter_mut()
            .find(|t| t.id == target_id)
            .ok_or(BatchError::TargetNotFound(target_id))
    }

    /// 沒有基準材料（或已不在需求表中）時自動選擇，優先原物料
    fn ensure_primary(&mut self) {
        let present = self
            .primary_material_id
            .as_deref()
            .is_some_and(|id| self.requirements.iter().any(|r| r.material_id == id));
        if present {
            return;
        }

        let chosen = self
            .requirements
            .iter()
            .find(|r| r.category == batch_core::ProductCategory::RawMaterial)
            .or_else(|| self.requirements.first())
            .map(|r| r.material_id.clone());

        if let Some(id) = &chosen {
            tracing::debug!("自動選擇基準材料 {}", id);
        }
        self.primary_material_id = chosen;
    }

    fn touch(&mut self) {
        self.generation += 1;
    }

    fn reset(&mut self) {
        self.batch_id = Uuid::new_v4();
        self.targets.clear();
        self.requirements.clear();
        self.primary_material_id = None;
        self.note.clear();
        self.warnings.clear();
        self.touch();
        self.applied_generation = self.generation;
    }
}
