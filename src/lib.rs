//! # Truckload
//!
//! 採購單裝載分配：把訂單需求（棧板）分配到固定容量的車次，
//! 自多儲位庫存取貨、儘量減少儲位間調撥，並回報短缺。

pub use load_calc::{
    report, AllocWarning, AllocationResult, AllocationSummary, AnchorChoice, AnchorReason,
    LoadAllocator, LocationPrioritizer, PalletConverter, StockLedger, WarningSeverity,
};
pub use load_core::{
    AllocConfig, AllocError, CasePackTable, DemandLine, Load, OrderLine, PlacementEntry,
    QuantityUnit, Result, StockRecord, TransferEntry, UnallocatedEntry, UnallocatedReason,
};
