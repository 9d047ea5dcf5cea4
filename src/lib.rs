//! # Batch Production
//!
//! 配方驅動的批次生產對帳引擎
//!
//! - [`core`]：資料模型、外部介面、錯誤類型
//! - [`calc`]：材料彙總、基準材料縮放、庫存評估、批次提交
//! - [`store`]：記憶體內參考實作

pub use batch_calc as calc;
pub use batch_core as core;
pub use batch_store as store;

pub use batch_calc::{ProductionSession, RequirementAggregator};
pub use batch_core::{BatchError, EngineConfig, Result};
pub use batch_store::{InMemoryInventory, StoreConfig};
