//! 裝載計劃模型（分配結果）

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AllocConfig, DemandLine, OrderLine};

/// 裝載明細：某物料自某儲位裝上某車次的棧板數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementEntry {
    /// 車次
    pub load_id: u32,

    /// 來源訂單明細ID
    pub demand_id: Uuid,

    /// 物料編號
    pub item_id: String,

    /// 來源儲位
    pub source_location: String,

    /// 裝載棧板數
    pub pallets: Decimal,

    /// 調撥目的儲位（來源儲位不是錨定儲位時才有）
    pub transfer_to: Option<String>,
}

impl PlacementEntry {
    /// 檢查是否為調撥
    pub fn is_transfer(&self) -> bool {
        self.transfer_to.is_some()
    }

    /// 調撥明細（非調撥時為 None）
    pub fn as_transfer(&self) -> Option<TransferEntry> {
        self.transfer_to.as_ref().map(|to| TransferEntry {
            load_id: self.load_id,
            demand_id: self.demand_id,
            item_id: self.item_id.clone(),
            transfer_from: self.source_location.clone(),
            transfer_to: to.clone(),
            pallets: self.pallets,
        })
    }
}

/// 調撥明細
///
/// 僅供報表使用，庫存已在對應的裝載明細中扣減。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferEntry {
    pub load_id: u32,
    pub demand_id: Uuid,
    pub item_id: String,
    pub transfer_from: String,
    pub transfer_to: String,
    pub pallets: Decimal,
}

/// 車次
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Load {
    /// 車次編號（從 1 起算）
    pub id: u32,

    /// 錨定儲位
    pub anchor_location: String,

    /// 裝載明細
    pub placements: Vec<PlacementEntry>,

    /// 已裝水棧板數
    pub water_pallets: Decimal,

    /// 已裝其他品項棧板數
    pub other_pallets: Decimal,
}

impl Load {
    /// 創建空車次
    pub fn new(id: u32, anchor_location: impl Into<String>) -> Self {
        Self {
            id,
            anchor_location: anchor_location.into(),
            placements: Vec::new(),
            water_pallets: Decimal::ZERO,
            other_pallets: Decimal::ZERO,
        }
    }

    /// 已裝總棧板數
    pub fn total_pallets(&self) -> Decimal {
        self.water_pallets + self.other_pallets
    }

    /// 目前適用的裝載上限：水重載時為水的每車棧板數
    pub fn envelope(&self, config: &AllocConfig) -> Decimal {
        if config.is_water_laden(self.water_pallets) {
            config.water_pallets_per_load
        } else {
            config.standard_pallets_per_load
        }
    }

    /// 剩餘空間
    pub fn remaining_space(&self, config: &AllocConfig) -> Decimal {
        (self.envelope(config) - self.total_pallets()).max(Decimal::ZERO)
    }

    /// 某品項此刻最多可再裝的棧板數
    ///
    /// 水有兩種可行的裝法，取較大者：
    /// - 水累計不超過門檻，沿用一般上限；
    /// - 水累計超過門檻，整車總數不得超過水的每車棧板數。
    pub fn capacity_for(&self, is_water: bool, config: &AllocConfig) -> Decimal {
        if !is_water {
            return self.remaining_space(config);
        }

        let total = self.total_pallets();
        let standard_room = (config.standard_pallets_per_load - total).max(Decimal::ZERO);
        let below_threshold = if config.is_water_laden(self.water_pallets) {
            Decimal::ZERO
        } else {
            standard_room.min(config.water_load_threshold - self.water_pallets)
        };

        let water_room = (config.water_pallets_per_load - total).max(Decimal::ZERO);
        let laden = if config.is_water_laden(self.water_pallets + water_room) {
            water_room
        } else {
            Decimal::ZERO
        };

        below_threshold.max(laden)
    }

    /// 登記裝載明細
    pub fn record(&mut self, placement: PlacementEntry, is_water: bool) {
        if is_water {
            self.water_pallets += placement.pallets;
        } else {
            self.other_pallets += placement.pallets;
        }
        self.placements.push(placement);
    }

    /// 本車次的調撥明細
    pub fn transfers(&self) -> impl Iterator<Item = TransferEntry> + '_ {
        self.placements.iter().filter_map(PlacementEntry::as_transfer)
    }

    /// 是否符合裝載上限
    pub fn within_capacity(&self, config: &AllocConfig) -> bool {
        self.total_pallets() <= self.envelope(config)
    }
}

/// 未分配原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnallocatedReason {
    /// 全部儲位的庫存不足
    #[serde(rename = "short")]
    Short,
    /// 庫存足夠，但剩餘量不足一車
    #[serde(rename = "unallocated-leftover")]
    Leftover,
    /// 找不到箱規，無法換算棧板數；整筆視為短缺
    #[serde(rename = "short-missing-case-pack")]
    MissingCasePackSize,
}

/// 未分配明細
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnallocatedEntry {
    pub demand: DemandLine,

    /// 有庫存但未裝載的棧板數
    pub unallocated_pallets: Decimal,

    /// 短缺棧板數
    pub short_pallets: Decimal,

    pub reason: UnallocatedReason,
}

impl UnallocatedEntry {
    /// 依分配結束時的訂單明細產生未分配記錄；完全裝載的明細回傳 None
    pub fn from_order_line(line: &OrderLine) -> Option<Self> {
        let reason = if line.short_pallets > Decimal::ZERO {
            UnallocatedReason::Short
        } else if line.remaining_pallets > Decimal::ZERO {
            UnallocatedReason::Leftover
        } else {
            return None;
        };

        Some(Self {
            demand: line.demand.clone(),
            unallocated_pallets: line.remaining_pallets,
            short_pallets: line.short_pallets,
            reason,
        })
    }

    /// 缺少箱規的明細
    pub fn missing_case_pack(demand: DemandLine) -> Self {
        Self {
            demand,
            unallocated_pallets: Decimal::ZERO,
            short_pallets: Decimal::ZERO,
            reason: UnallocatedReason::MissingCasePackSize,
        }
    }

    /// 是否視為短缺（缺箱規的明細整筆視為短缺）
    pub fn is_short(&self) -> bool {
        matches!(
            self.reason,
            UnallocatedReason::Short | UnallocatedReason::MissingCasePackSize
        )
    }
}
