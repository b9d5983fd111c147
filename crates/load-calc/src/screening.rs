//! 短缺篩選

use std::collections::HashMap;

use load_core::{AllocConfig, AllocError, LineId, OrderLine, Result};
use rust_decimal::Decimal;

use crate::ledger::StockLedger;

/// 篩選結果
#[derive(Debug, Clone)]
pub struct Screening {
    /// 全部訂單明細（含完全短缺者）
    pub lines: Vec<OrderLine>,

    /// 水品項明細
    pub water_line: Option<LineId>,
}

impl Screening {
    /// 可參與裝載的明細
    pub fn eligible(&self) -> impl Iterator<Item = LineId> + '_ {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.is_pending())
            .map(|(id, _)| id)
    }

    /// 有短缺的明細
    pub fn shorted(&self) -> impl Iterator<Item = &OrderLine> + '_ {
        self.lines
            .iter()
            .filter(|line| line.short_pallets > Decimal::ZERO)
    }
}

/// 短缺篩選器
///
/// 依總庫存把需求拆成短缺與可裝載兩部分。同物料的多筆明細依輸入順序
/// 共用可用量，確保每種物料的待裝量合計不超過庫存。
pub struct ShortageScreener;

impl ShortageScreener {
    pub fn screen(
        mut lines: Vec<OrderLine>,
        ledger: &StockLedger,
        config: &AllocConfig,
    ) -> Result<Screening> {
        let water_line = Self::find_water_line(&lines, config)?;
        let mut claimed: HashMap<String, Decimal> = HashMap::new();

        for line in &mut lines {
            let item_id = line.item_id().to_string();

            if !ledger.contains_item(&item_id) {
                line.short_pallets = line.demand_pallets;
                line.remaining_pallets = Decimal::ZERO;
                tracing::debug!("物料 {} 無庫存，全數短缺 {}", item_id, line.demand_pallets);
                continue;
            }

            let taken = claimed.entry(item_id.clone()).or_insert(Decimal::ZERO);
            let available = (ledger.total_available(&item_id) - *taken).max(Decimal::ZERO);

            if line.demand_pallets > available {
                line.short_pallets = line.demand_pallets - available;
                line.remaining_pallets = available;
                tracing::debug!(
                    "物料 {} 庫存不足：需求 {}, 可用 {}",
                    item_id,
                    line.demand_pallets,
                    available
                );
            } else {
                line.short_pallets = Decimal::ZERO;
                line.remaining_pallets = line.demand_pallets;
            }

            *taken += line.remaining_pallets;
            line.location_stock = ledger.snapshot(&item_id);
        }

        Ok(Screening { lines, water_line })
    }

    /// 找出唯一的水品項明細，多於一筆視為輸入錯誤
    fn find_water_line(lines: &[OrderLine], config: &AllocConfig) -> Result<Option<LineId>> {
        let water: Vec<LineId> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| config.is_water(line.item_id()))
            .map(|(id, _)| id)
            .collect();

        match water.as_slice() {
            [] => Ok(None),
            [id] => Ok(Some(*id)),
            _ => Err(AllocError::DuplicateWaterLine {
                item_id: config.water_item_id.clone().unwrap_or_default(),
                count: water.len(),
            }),
        }
    }
}
