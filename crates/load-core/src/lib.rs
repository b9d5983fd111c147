//! # Load Core
//!
//! 裝載分配的核心資料模型與類型定義

pub mod config;
pub mod demand;
pub mod inventory;
pub mod plan;

// Re-export 主要類型
pub use config::AllocConfig;
pub use demand::{DemandLine, LineId, OrderLine};
pub use inventory::{CasePackTable, QuantityUnit, StockRecord};
pub use plan::{Load, PlacementEntry, TransferEntry, UnallocatedEntry, UnallocatedReason};

use rust_decimal::Decimal;

/// 裝載分配錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum AllocError {
    /// 物料不在箱規表中，無法換算棧板數
    #[error("找不到物料箱規: {item_id}")]
    MissingCasePackSize { item_id: String },

    #[error("無效的箱規: 物料 {item_id} 每板箱數 {cases_per_pallet}")]
    InvalidCasePackSize { item_id: String, cases_per_pallet: u32 },

    /// 扣減量超過儲位可用量（裝載器內部錯誤）
    #[error("庫存不足：物料 {item_id} 儲位 {location} 需要 {requested}, 可用 {available}")]
    InsufficientStock {
        item_id: String,
        location: String,
        requested: Decimal,
        available: Decimal,
    },

    /// 迴圈判定可裝滿一車，但實際無法裝滿
    #[error("分配不一致（車次 {load_id}）: {message}")]
    AllocationInconsistency { load_id: u32, message: String },

    #[error("訂單中有 {count} 筆水品項 {item_id} 的明細")]
    DuplicateWaterLine { item_id: String, count: usize },

    #[error("無效的配置: {0}")]
    InvalidConfig(String),

    #[error("配置解析錯誤: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AllocError>;
