//! # Load Allocation Engine
//!
//! 核心裝載分配引擎：把訂單需求分配到固定容量的車次

pub mod allocator;
pub mod conversion;
pub mod ledger;
pub mod packer;
pub mod pending;
pub mod prioritizer;
pub mod report;
pub mod screening;

// Re-export 主要類型
pub use allocator::LoadAllocator;
pub use conversion::PalletConverter;
pub use ledger::StockLedger;
pub use prioritizer::{AnchorChoice, AnchorReason, LocationPrioritizer};
pub use report::AllocationSummary;

use load_core::{DemandLine, Load, PlacementEntry, TransferEntry, UnallocatedEntry};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// 裝載分配結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationResult {
    /// 車次（依車次編號排序）
    pub loads: Vec<Load>,

    /// 調撥明細
    pub transfers: Vec<TransferEntry>,

    /// 未分配明細（短缺與不足一車的剩餘）
    pub unallocated: Vec<UnallocatedEntry>,

    /// 輸入的訂單明細
    pub demands: Vec<DemandLine>,

    /// 分配後的庫存帳
    pub final_ledger: StockLedger,

    /// 警告信息
    pub warnings: Vec<AllocWarning>,

    /// 是否在完成前被取消
    pub cancelled: bool,
}

impl AllocationResult {
    /// 創建空的分配結果
    pub fn empty() -> Self {
        Self {
            loads: Vec::new(),
            transfers: Vec::new(),
            unallocated: Vec::new(),
            demands: Vec::new(),
            final_ledger: StockLedger::new(),
            warnings: Vec::new(),
            cancelled: false,
        }
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: AllocWarning) {
        self.warnings.push(warning);
    }

    /// 車次數
    pub fn num_loads(&self) -> usize {
        self.loads.len()
    }

    /// 全部裝載明細（依車次順序）
    pub fn placements(&self) -> impl Iterator<Item = &PlacementEntry> + '_ {
        self.loads.iter().flat_map(|load| load.placements.iter())
    }

    /// 已裝載總棧板數
    pub fn total_allocated(&self) -> Decimal {
        self.placements().map(|placement| placement.pallets).sum()
    }

    /// 某訂單明細的已裝載棧板數
    pub fn allocated_for(&self, demand_id: Uuid) -> Decimal {
        self.placements()
            .filter(|placement| placement.demand_id == demand_id)
            .map(|placement| placement.pallets)
            .sum()
    }

    /// 某訂單明細的未分配記錄
    pub fn unallocated_for(&self, demand_id: Uuid) -> Option<&UnallocatedEntry> {
        self.unallocated
            .iter()
            .find(|entry| entry.demand.id == demand_id)
    }
}

/// 分配警告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocWarning {
    pub item_id: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl AllocWarning {
    pub fn new(item_id: String, message: String, severity: WarningSeverity) -> Self {
        Self {
            item_id,
            message,
            severity,
        }
    }

    pub fn info(item_id: String, message: String) -> Self {
        Self::new(item_id, message, WarningSeverity::Info)
    }

    pub fn warning(item_id: String, message: String) -> Self {
        Self::new(item_id, message, WarningSeverity::Warning)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningSeverity {
    Info,
    Warning,
}
