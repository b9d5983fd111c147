//! 輸出報表
//!
//! 把分配結果攤平成帶有原訂單欄位的列，供外部寫出為表格檔。

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use load_core::{DemandLine, UnallocatedReason};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::AllocationResult;

/// 未調撥時「Transfer to」欄的值
pub const NOT_TRANSFERRED: &str = "N/A";

/// 原訂單欄位
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandFields {
    #[serde(rename = "Purchase Order")]
    pub purchase_order: Option<String>,
    #[serde(rename = "Item Number")]
    pub item_number: Option<String>,
    #[serde(rename = "Material")]
    pub material: String,
    #[serde(rename = "Quantity")]
    pub quantity: u64,
    #[serde(rename = "Unit of Measure")]
    pub unit_of_measure: Option<String>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Date")]
    pub date: Option<NaiveDate>,
}

impl From<&DemandLine> for DemandFields {
    fn from(demand: &DemandLine) -> Self {
        Self {
            purchase_order: demand.purchase_order.clone(),
            item_number: demand.item_number.clone(),
            material: demand.item_id.clone(),
            quantity: demand.case_quantity,
            unit_of_measure: demand.unit_of_measure.clone(),
            description: demand.description.clone(),
            date: demand.order_date,
        }
    }
}

/// 已分配列
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocatedRow {
    #[serde(flatten)]
    pub demand: DemandFields,
    #[serde(rename = "Load")]
    pub load: u32,
    #[serde(rename = "Storage Location")]
    pub storage_location: String,
    #[serde(rename = "Allocated Pallets")]
    pub allocated_pallets: Decimal,
    #[serde(rename = "Transfer to")]
    pub transfer_to: String,
}

/// 調撥列
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferRow {
    #[serde(flatten)]
    pub demand: DemandFields,
    #[serde(rename = "Load")]
    pub load: u32,
    #[serde(rename = "Transfer from")]
    pub transfer_from: String,
    #[serde(rename = "Transfer to")]
    pub transfer_to: String,
    #[serde(rename = "Transfer Pallets")]
    pub transfer_pallets: Decimal,
}

/// 未分配列
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnallocatedRow {
    #[serde(flatten)]
    pub demand: DemandFields,
    #[serde(rename = "Unallocated Pallets")]
    pub unallocated_pallets: Decimal,
    #[serde(rename = "Short")]
    pub short: Decimal,
    /// 缺箱規的明細棧板數無法換算，兩個棧板欄皆為 0，以此欄區分
    #[serde(rename = "Reason")]
    pub reason: UnallocatedReason,
}

fn demand_index(result: &AllocationResult) -> HashMap<Uuid, &DemandLine> {
    result
        .demands
        .iter()
        .map(|demand| (demand.id, demand))
        .collect()
}

/// 已分配列（依車次順序）
pub fn allocated_rows(result: &AllocationResult) -> Vec<AllocatedRow> {
    let demands = demand_index(result);
    result
        .placements()
        .filter_map(|placement| {
            let demand = demands.get(&placement.demand_id)?;
            Some(AllocatedRow {
                demand: DemandFields::from(*demand),
                load: placement.load_id,
                storage_location: placement.source_location.clone(),
                allocated_pallets: placement.pallets,
                transfer_to: placement
                    .transfer_to
                    .clone()
                    .unwrap_or_else(|| NOT_TRANSFERRED.to_string()),
            })
        })
        .collect()
}

/// 調撥列
pub fn transfer_rows(result: &AllocationResult) -> Vec<TransferRow> {
    let demands = demand_index(result);
    result
        .transfers
        .iter()
        .filter_map(|transfer| {
            let demand = demands.get(&transfer.demand_id)?;
            Some(TransferRow {
                demand: DemandFields::from(*demand),
                load: transfer.load_id,
                transfer_from: transfer.transfer_from.clone(),
                transfer_to: transfer.transfer_to.clone(),
                transfer_pallets: transfer.pallets,
            })
        })
        .collect()
}

/// 未分配列
pub fn unallocated_rows(result: &AllocationResult) -> Vec<UnallocatedRow> {
    result
        .unallocated
        .iter()
        .map(|entry| UnallocatedRow {
            demand: DemandFields::from(&entry.demand),
            unallocated_pallets: entry.unallocated_pallets,
            short: entry.short_pallets,
            reason: entry.reason,
        })
        .collect()
}

/// 分配摘要
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AllocationSummary {
    pub num_loads: usize,
    pub allocated_items: usize,
    pub transfers: usize,
    pub unallocated_items: usize,
}

impl From<&AllocationResult> for AllocationSummary {
    fn from(result: &AllocationResult) -> Self {
        Self {
            num_loads: result.num_loads(),
            allocated_items: result.placements().count(),
            transfers: result.transfers.len(),
            unallocated_items: result.unallocated.len(),
        }
    }
}

impl fmt::Display for AllocationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "車次數: {}", self.num_loads)?;
        writeln!(f, "已分配明細: {}", self.allocated_items)?;
        writeln!(f, "調撥: {}", self.transfers)?;
        write!(f, "未分配明細: {}", self.unallocated_items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use load_core::{AllocConfig, CasePackTable, StockRecord};

    use crate::LoadAllocator;

    fn transfer_result() -> AllocationResult {
        let table = CasePackTable::from_pairs([("C", 10), ("D", 10), ("X", 10)]).unwrap();
        let allocator = LoadAllocator::new(AllocConfig::default(), table);
        let demands = vec![
            DemandLine::new("C", 200)
                .with_purchase_order("PO-1")
                .with_order_date(NaiveDate::from_ymd_opt(2025, 11, 3).unwrap()),
            DemandLine::new("D", 100).with_purchase_order("PO-1"),
            DemandLine::new("X", 50).with_purchase_order("PO-1"),
        ];
        let stock = vec![
            StockRecord::cases("C", "L1", Decimal::from(200)),
            StockRecord::cases("D", "L2", Decimal::from(200)),
        ];
        allocator.allocate(demands, &stock).unwrap()
    }

    #[test]
    fn test_allocated_rows() {
        let result = transfer_result();
        let rows = allocated_rows(&result);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].demand.material, "C");
        assert_eq!(rows[0].storage_location, "L1");
        assert_eq!(rows[0].transfer_to, NOT_TRANSFERRED);
        assert_eq!(rows[1].demand.material, "D");
        assert_eq!(rows[1].transfer_to, "L1");
        assert_eq!(rows[1].allocated_pallets, Decimal::from(6));
    }

    #[test]
    fn test_transfer_and_unallocated_rows() {
        let result = transfer_result();

        let transfers = transfer_rows(&result);
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].transfer_from, "L2");
        assert_eq!(transfers[0].transfer_to, "L1");

        let unallocated = unallocated_rows(&result);
        assert_eq!(unallocated.len(), 2);
        let x = unallocated.iter().find(|row| row.demand.material == "X").unwrap();
        assert_eq!(x.short, Decimal::from(5));
        assert_eq!(x.unallocated_pallets, Decimal::ZERO);
        assert_eq!(x.reason, UnallocatedReason::Short);
        let d = unallocated.iter().find(|row| row.demand.material == "D").unwrap();
        assert_eq!(d.unallocated_pallets, Decimal::from(4));
        assert_eq!(d.reason, UnallocatedReason::Leftover);
    }

    #[test]
    fn test_row_headers() {
        let result = transfer_result();
        let row = serde_json::to_value(&allocated_rows(&result)[0]).unwrap();

        for header in [
            "Purchase Order",
            "Material",
            "Quantity",
            "Date",
            "Load",
            "Storage Location",
            "Allocated Pallets",
            "Transfer to",
        ] {
            assert!(row.get(header).is_some(), "missing header {header}");
        }
        assert_eq!(row["Transfer to"], "N/A");

        let rows: Vec<_> = unallocated_rows(&result)
            .iter()
            .map(|row| serde_json::to_value(row).unwrap())
            .collect();
        for row in &rows {
            for header in ["Material", "Unallocated Pallets", "Short", "Reason"] {
                assert!(row.get(header).is_some(), "missing header {header}");
            }
        }
        let reasons: Vec<_> = rows.iter().map(|row| row["Reason"].clone()).collect();
        assert!(reasons.contains(&serde_json::json!("short")));
        assert!(reasons.contains(&serde_json::json!("unallocated-leftover")));
    }

    #[test]
    fn test_missing_case_pack_row_is_tagged_short() {
        let table = CasePackTable::from_pairs([("C", 10)]).unwrap();
        let allocator = LoadAllocator::new(AllocConfig::default(), table);
        let result = allocator
            .allocate(vec![DemandLine::new("Z", 120)], &[])
            .unwrap();

        let rows = unallocated_rows(&result);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].reason, UnallocatedReason::MissingCasePackSize);

        let row = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(row["Material"], "Z");
        assert_eq!(row["Quantity"], 120);
        assert_eq!(row["Reason"], "short-missing-case-pack");
    }

    #[test]
    fn test_summary() {
        let summary = AllocationSummary::from(&transfer_result());

        assert_eq!(
            summary,
            AllocationSummary {
                num_loads: 1,
                allocated_items: 2,
                transfers: 1,
                unallocated_items: 2,
            }
        );
        assert!(summary.to_string().contains("車次數: 1"));
    }
}
