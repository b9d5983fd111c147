//! 簡單裝載分配示例

use chrono::NaiveDate;
use load_calc::{report, AllocationSummary, LoadAllocator};
use load_core::{AllocConfig, CasePackTable, DemandLine, StockRecord};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== 簡單裝載分配示例 ===\n");

    // 裝載參數（可由 JSON 覆寫）
    let config = AllocConfig::from_json(r#"{ "water_item_id": "2558" }"#)?;

    // 箱規表
    let case_packs = CasePackTable::from_pairs([("2558", 60), ("1001", 80), ("1002", 50)])?;

    // 採購單
    let date = NaiveDate::from_ymd_opt(2025, 11, 1);
    let demands: Vec<DemandLine> = [("10", "2558", 2400), ("20", "1001", 1200), ("30", "1002", 400)]
        .into_iter()
        .map(|(item_number, item_id, cases)| {
            let line = DemandLine::new(item_id, cases)
                .with_purchase_order("PO-56527656")
                .with_item_number(item_number)
                .with_unit_of_measure("CS");
            match date {
                Some(date) => line.with_order_date(date),
                None => line,
            }
        })
        .collect();

    // 儲位庫存（箱）
    let stock = vec![
        StockRecord::cases("2558", "PREM01", Decimal::from(1500)),
        StockRecord::cases("2558", "PREM02", Decimal::from(1200)),
        StockRecord::cases("1001", "PREM02", Decimal::from(1600)),
        StockRecord::cases("1002", "PREM03", Decimal::from(250)),
        StockRecord::cases("1002", "", Decimal::ZERO),
    ];

    let allocator = LoadAllocator::new(config, case_packs);
    let result = allocator.allocate(demands, &stock)?;

    println!("已分配:");
    for row in report::allocated_rows(&result) {
        println!(
            "  - 車次 {} 物料 {} 儲位 {} 棧板 {} 調撥至 {}",
            row.load, row.demand.material, row.storage_location, row.allocated_pallets, row.transfer_to
        );
    }

    println!("\n未分配:");
    for row in report::unallocated_rows(&result) {
        println!("  - {}", serde_json::to_string(&row)?);
    }

    println!("\n---------- 摘要 ----------");
    println!("{}", AllocationSummary::from(&result));

    Ok(())
}
