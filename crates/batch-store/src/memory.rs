//! 記憶體內目錄與配方庫

use batch_core::{
    AuditEntry, CatalogLookup, CommitError, LookupError, Product, RecipeLine, RecipeStore,
};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet, VecDeque};
use uuid::Uuid;

use crate::ledger::{FailureMode, InventoryLogEntry};
use crate::StoreConfig;

/// 配方明細（僅存比例，查詢時再聯結材料資料）
#[derive(Debug, Clone)]
pub(crate) struct StoredRecipeLine {
    pub material_id: String,
    pub ratio: Decimal,
}

#[derive(Debug, Default)]
pub(crate) struct StoreState {
    pub products: HashMap<String, Product>,
    pub recipes: HashMap<String, Vec<StoredRecipeLine>>,
    pub logs: Vec<InventoryLogEntry>,
    pub audit: Vec<AuditEntry>,
    pub committed_batches: HashSet<Uuid>,
    pub injected_failures: VecDeque<(FailureMode, CommitError)>,
    pub unavailable_recipes: HashSet<String>,
}

/// 記憶體內庫存
pub struct InMemoryInventory {
    pub(crate) config: StoreConfig,
    pub(crate) state: Mutex<StoreState>,
}

impl InMemoryInventory {
    /// 創建空的庫存
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            state: Mutex::new(StoreState::default()),
        }
    }

    /// 新增或取代品項
    pub fn insert_product(&self, product: Product) {
        self.state.lock().products.insert(product.id.clone(), product);
    }

    /// 設定成品配方（取代原有配方）
    pub fn set_recipe<I, S>(&self, product_id: &str, lines: I)
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: Into<String>,
    {
        let lines = lines
            .into_iter()
            .map(|(material_id, ratio)| StoredRecipeLine {
                material_id: material_id.into(),
                ratio,
            })
            .collect();
        self.state.lock().recipes.insert(product_id.to_string(), lines);
    }

    /// 目前庫存
    pub fn stock(&self, product_id: &str) -> Option<Decimal> {
        self.state.lock().products.get(product_id).map(|p| p.stock)
    }

    /// 全部庫存異動紀錄
    pub fn logs(&self) -> Vec<InventoryLogEntry> {
        self.state.lock().logs.clone()
    }

    /// 全部稽核紀錄
    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.state.lock().audit.clone()
    }

    /// 讓下一次提交以指定方式失敗
    pub fn fail_next_commit(&self, mode: FailureMode, error: CommitError) {
        self.state.lock().injected_failures.push_back((mode, error));
    }

    /// 讓指定成品的配方查詢失敗
    pub fn fail_recipe_lookup(&self, product_id: &str) {
        self.state
            .lock()
            .unavailable_recipes
            .insert(product_id.to_string());
    }
}

impl Default for InMemoryInventory {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl CatalogLookup for InMemoryInventory {
    fn get_product(&self, product_id: &str) -> Result<Product, LookupError> {
        self.state
            .lock()
            .products
            .get(product_id)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(product_id.to_string()))
    }
}

impl RecipeStore for InMemoryInventory {
    fn get_recipe(&self, product_id: &str) -> Result<Vec<RecipeLine>, LookupError> {
        let state = self.state.lock();
        if state.unavailable_recipes.contains(product_id) {
            return Err(LookupError::Unavailable(format!(
                "配方服務無回應: {}",
                product_id
            )));
        }

        let Some(lines) = state.recipes.get(product_id) else {
            return Ok(Vec::new());
        };

        // 與目錄聯結；找不到的材料不列出
        Ok(lines
            .iter()
            .filter_map(|line| {
                let material = state.products.get(&line.material_id)?;
                let mut recipe_line = RecipeLine::new(
                    product_id,
                    material.id.clone(),
                    line.ratio,
                    material.name.clone(),
                    material.category,
                )
                .with_material_stock(material.stock);
                recipe_line.material_specification = material.specification.clone();
                Some(recipe_line)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use batch_core::ProductCategory;

    fn inventory() -> InMemoryInventory {
        let inventory = InMemoryInventory::default();
        inventory.insert_product(
            Product::new("MUSH-RAW", "生香菇", ProductCategory::RawMaterial)
                .with_specification("1kg")
                .with_stock(Decimal::from(40)),
        );
        inventory.insert_product(Product::new("SLICED-500", "香菇切片", ProductCategory::Finished));
        inventory.set_recipe(
            "SLICED-500",
            [("MUSH-RAW", Decimal::new(55, 2)), ("GHOST", Decimal::ONE)],
        );
        inventory
    }

    #[test]
    fn test_get_recipe_joins_catalog() {
        let inventory = inventory();

        let lines = inventory.get_recipe("SLICED-500").unwrap();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].material_id, "MUSH-RAW");
        assert_eq!(lines[0].ratio, Decimal::new(55, 2));
        assert_eq!(lines[0].material_stock, Decimal::from(40));
        assert_eq!(lines[0].material_unit().as_deref(), Some("kg"));
    }

    #[test]
    fn test_missing_recipe_is_empty() {
        let inventory = inventory();
        assert!(inventory.get_recipe("MUSH-RAW").unwrap().is_empty());
    }

    #[test]
    fn test_recipe_lookup_failure() {
        let inventory = inventory();
        inventory.fail_recipe_lookup("SLICED-500");

        assert!(matches!(
            inventory.get_recipe("SLICED-500"),
            Err(LookupError::Unavailable(_))
        ));
    }

    #[test]
    fn test_get_product() {
        let inventory = inventory();

        assert_eq!(inventory.get_product("MUSH-RAW").unwrap().name, "生香菇");
        assert_eq!(
            inventory.get_product("NOPE").unwrap_err(),
            LookupError::NotFound("NOPE".to_string())
        );
    }
}
