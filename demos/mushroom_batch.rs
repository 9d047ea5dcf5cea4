//! 香菇加工批次生產示例

use anyhow::Result;
use batchprod::core::{CatalogLookup, Product, ProductCategory};
use batchprod::{EngineConfig, InMemoryInventory, ProductionSession, RequirementAggregator, StoreConfig};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== 香菇加工批次生產示例 ===\n");

    // 建立目錄與配方
    let inventory = InMemoryInventory::new(StoreConfig::default());
    inventory.insert_product(
        Product::new("MUSH-RAW", "生香菇", ProductCategory::RawMaterial)
            .with_specification("1kg")
            .with_stock(Decimal::from(5)),
    );
    inventory.insert_product(
        Product::new("BOX-S", "小紙箱", ProductCategory::AuxiliaryMaterial)
            .with_stock(Decimal::from(100)),
    );
    inventory.insert_product(Product::new("SLICED-500", "香菇切片 500g", ProductCategory::Finished));
    inventory.set_recipe(
        "SLICED-500",
        [("MUSH-RAW", Decimal::new(11, 1)), ("BOX-S", Decimal::ONE)],
    );

    let config = EngineConfig::default();
    let aggregator = RequirementAggregator::new(&inventory, &config);

    // 創建生產作業
    let mut session = ProductionSession::new(config.clone());
    session.add_target(Some("SLICED-500".to_string()), 10);
    session.refresh(&aggregator);
    print_requirements("初始彙總", &session);

    // 修改基準材料投入量：全部目標等比例縮放
    session.edit_required_quantity("MUSH-RAW", Decimal::from(28))?;
    session.refresh(&aggregator);
    println!("\n基準材料改為 28 後的生產目標:");
    for target in session.targets() {
        let Some(product_id) = target.product_id.as_deref() else {
            continue;
        };
        let product = inventory.get_product(product_id)?;
        println!(
            "  - 成品: {}, 數量: {} {}",
            product.name,
            target.quantity,
            config.unit_for(&product)
        );
    }
    print_requirements("縮放後彙總", &session);

    // 庫存評估
    println!("\n庫存評估:");
    for shortfall in session.shortfalls() {
        if shortfall.is_short {
            println!(
                "  ⚠ {} 不足 {}（庫存 {}，投入 {}）",
                shortfall.name, shortfall.shortage, shortfall.stock, shortfall.required_quantity
            );
        } else {
            println!("  ✓ {} 足夠", shortfall.name);
        }
    }

    // 提交
    session.set_note("早班切片");
    let receipt = session.commit(&inventory)?;
    println!(
        "\n✅ 批次 {} 已提交，共 {} 筆異動",
        receipt.batch_id, receipt.applied_lines
    );

    println!("\n庫存異動紀錄:");
    for log in inventory.logs() {
        println!(
            "  - {}: {} → {}",
            log.product_name, log.change_quantity, log.resulting_stock
        );
    }

    Ok(())
}

fn print_requirements(title: &str, session: &ProductionSession) {
    println!("\n{}:", title);
    for req in session.requirements() {
        let marker = if session.primary_material_id() == Some(req.material_id.as_str()) {
            "★"
        } else {
            " "
        };
        println!(
            "  {} {} ({}): 總需求 {}, 投入 {} {}",
            marker,
            req.name,
            req.material_id,
            req.total_required,
            req.required_quantity,
            req.unit.as_deref().unwrap_or("")
        );
    }
}
