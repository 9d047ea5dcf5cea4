//! 材料需求彙總

use batch_core::{EngineConfig, MaterialRequirement, ProductionTarget, RecipeLine, RecipeStore};
use rayon::prelude::*;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::AggregationWarning;

/// 彙總請求：某一代的生產目標快照
#[derive(Debug, Clone)]
pub struct AggregationRequest {
    /// 發出請求時的世代
    pub generation: u64,

    /// 生產目標快照
    pub targets: Vec<ProductionTarget>,
}

/// 彙總結果
#[derive(Debug, Clone)]
pub struct AggregationResult {
    /// 對應請求的世代
    pub generation: u64,

    /// 材料需求表（依材料ID排序）
    pub requirements: Vec<MaterialRequirement>,

    /// 警告信息
    pub warnings: Vec<AggregationWarning>,

    /// 請求中是否有已選擇成品的目標
    pub has_targets: bool,
}

/// 材料需求彙總器
pub struct RequirementAggregator<'a> {
    /// 配方庫
    recipe_store: &'a dyn RecipeStore,

    /// 引擎配置
    config: &'a EngineConfig,
}

impl<'a> RequirementAggregator<'a> {
    /// 創建新的彙總器
    pub fn new(recipe_store: &'a dyn RecipeStore, config: &'a EngineConfig) -> Self {
        Self {
            recipe_store,
            config,
        }
    }

    /// 執行彙總：平行查詢配方後計算需求表
    pub fn run(&self, request: &AggregationRequest) -> AggregationResult {
        tracing::info!(
            "開始材料彙總：世代 {}，生產目標 {} 筆",
            request.generation,
            request.targets.len()
        );

        let has_targets = request.targets.iter().any(ProductionTarget::has_product);
        if !has_targets {
            tracing::debug!("沒有已選擇成品的目標，跳過彙總");
            return AggregationResult {
                generation: request.generation,
                requirements: Vec::new(),
                warnings: Vec::new(),
                has_targets,
            };
        }

        let (recipes, warnings) = self.fetch_recipes(&request.targets);
        let requirements = aggregate(
            &request.targets,
            &recipes,
            &self.config.material_default_unit,
        );

        tracing::info!(
            "材料彙總完成：世代 {}，材料 {} 項，警告 {} 筆",
            request.generation,
            requirements.len(),
            warnings.len()
        );

        AggregationResult {
            generation: request.generation,
            requirements,
            warnings,
            has_targets,
        }
    }

    /// 查詢每個不重複成品的配方（平行查詢，全部完成後才返回）
    ///
    /// 查詢失敗的成品視為沒有配方，只記錄警告。
    pub fn fetch_recipes(
        &self,
        targets: &[ProductionTarget],
    ) -> (HashMap<String, Vec<RecipeLine>>, Vec<AggregationWarning>) {
        let product_ids: Vec<&str> = targets
            .iter()
            .filter(|t| t.has_product())
            .filter_map(|t| t.product_id.as_deref())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        tracing::debug!("查詢配方：不重複成品 {} 項", product_ids.len());

        let fetched: Vec<_> = product_ids
            .par_iter()
            .map(|&product_id| (product_id, self.recipe_store.get_recipe(product_id)))
            .collect();

        let mut recipes = HashMap::new();
        let mut warnings = Vec::new();

        for (product_id, outcome) in fetched {
            match outcome {
                Ok(lines) => {
                    if lines.is_empty() {
                        tracing::debug!("成品 {} 沒有配方", product_id);
                        warnings.push(AggregationWarning::info(
                            product_id.to_string(),
                            "沒有配方，不消耗任何材料".to_string(),
                        ));
                    }
                    recipes.insert(product_id.to_string(), lines);
                }
                Err(err) => {
                    tracing::warn!("成品 {} 配方查詢失敗，視為無配方: {}", product_id, err);
                    warnings.push(AggregationWarning::warning(
                        product_id.to_string(),
                        format!("配方查詢失敗: {}", err),
                    ));
                    recipes.insert(product_id.to_string(), Vec::new());
                }
            }
        }

        (recipes, warnings)
    }
}

/// 由生產目標與配方計算材料需求表
///
/// 每項材料的總需求 = Σ ceil(目標數量 × 比例)。同一材料出現在多份配方且比例不同時，
/// 以最後看到的比例為準；名稱、庫存、分類取自第一筆。
/// 結果依材料ID排序，相同輸入恆得相同輸出。
pub fn aggregate(
    targets: &[ProductionTarget],
    recipes: &HashMap<String, Vec<RecipeLine>>,
    default_unit: &str,
) -> Vec<MaterialRequirement> {
    let mut table: BTreeMap<String, MaterialRequirement> = BTreeMap::new();

    for target in targets {
        let Some(product_id) = target.product_id.as_deref() else {
            continue;
        };
        let Some(lines) = recipes.get(product_id) else {
            continue;
        };

        for line in lines {
            let entry = table.entry(line.material_id.clone()).or_insert_with(|| {
                MaterialRequirement::new(
                    line.material_id.clone(),
                    line.material_name.clone(),
                    line.material_category,
                    line.ratio,
                    Decimal::ZERO,
                )
                .with_stock(line.material_stock)
                .with_unit(Some(
                    line.material_unit()
                        .unwrap_or_else(|| default_unit.to_string()),
                ))
            });

            if entry.ratio != line.ratio {
                tracing::debug!(
                    "材料 {} 比例衝突：{} → {}（以最後為準）",
                    line.material_id,
                    entry.ratio,
                    line.ratio
                );
            }
            entry.ratio = line.ratio;
            entry.total_required += line.required_for(target.quantity);
        }
    }

    table
        .into_values()
        .map(|mut req| {
            req.required_quantity = req.total_required;
            req
        })
        .collect()
}
