//! 裝載分配主流程

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use load_core::{
    AllocConfig, AllocError, CasePackTable, DemandLine, OrderLine, Result, StockRecord,
    UnallocatedEntry,
};
use rust_decimal::Decimal;

use crate::conversion::PalletConverter;
use crate::ledger::StockLedger;
use crate::packer::LoadPacker;
use crate::pending::PackingState;
use crate::prioritizer::LocationPrioritizer;
use crate::screening::ShortageScreener;
use crate::{AllocWarning, AllocationResult};

/// 小數棧板累加的容許誤差
const PALLET_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 9);

/// 裝載分配器
pub struct LoadAllocator {
    /// 裝載參數
    config: AllocConfig,

    /// 箱規表
    case_packs: CasePackTable,

    /// 取消旗標（每車次開始前檢查）
    cancelled: Option<Arc<AtomicBool>>,
}

impl LoadAllocator {
    /// 創建新的分配器
    pub fn new(config: AllocConfig, case_packs: CasePackTable) -> Self {
        Self {
            config,
            case_packs,
            cancelled: None,
        }
    }

    /// 建構器模式：設置取消旗標
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancelled = Some(flag);
        self
    }

    /// 主分配入口
    pub fn allocate(&self, demands: Vec<DemandLine>, stock: &[StockRecord]) -> Result<AllocationResult> {
        self.config.validate()?;

        tracing::info!(
            "開始裝載分配：訂單明細 {} 筆，庫存記錄 {} 筆",
            demands.len(),
            stock.len()
        );
        let start_time = std::time::Instant::now();

        // Step 1: 建立庫存帳
        let converter = PalletConverter::new(&self.case_packs);
        let ledger = StockLedger::from_records(stock, &converter);

        // Step 2: 換算棧板
        let mut result = AllocationResult::empty();
        result.demands = demands.clone();
        let mut lines = Vec::with_capacity(demands.len());
        for demand in demands {
            match converter.demand_pallets(&demand) {
                Ok(pallets) => lines.push(OrderLine::new(demand, pallets)),
                Err(AllocError::MissingCasePackSize { item_id }) => {
                    tracing::warn!("物料 {} 沒有箱規，整筆列為短缺", item_id);
                    result.add_warning(AllocWarning::warning(
                        item_id,
                        "找不到箱規，無法換算棧板數".to_string(),
                    ));
                    result
                        .unallocated
                        .push(UnallocatedEntry::missing_case_pack(demand));
                }
                Err(e) => return Err(e),
            }
        }

        // Step 3: 短缺篩選
        let screening = ShortageScreener::screen(lines, &ledger, &self.config)?;
        tracing::debug!(
            "可裝載明細 {} 筆，短缺明細 {} 筆",
            screening.eligible().count(),
            screening.shorted().count()
        );

        // Step 4: 逐車次裝載
        let mut state = PackingState::new(screening, ledger);
        let packer = LoadPacker::new(&self.config);
        let mut load_id = 0u32;

        loop {
            let threshold = self.config.dispatch_threshold(state.water_remaining());
            if state.remaining_total() < threshold {
                break;
            }

            if self.is_cancelled() {
                tracing::warn!("分配已取消，已完成 {} 車次", load_id);
                result.cancelled = true;
                break;
            }

            load_id += 1;
            let anchor = LocationPrioritizer::select_anchor(&mut state).ok_or_else(|| {
                AllocError::AllocationInconsistency {
                    load_id,
                    message: format!(
                        "待裝量 {} 已達派車門檻 {}，但沒有可錨定的儲位",
                        state.remaining_total(),
                        threshold
                    ),
                }
            })?;
            tracing::info!("車次 {} 錨定儲位 {}", load_id, anchor.location);

            let load = packer.pack(load_id, &anchor.location, &mut state)?;
            if threshold - load.total_pallets() > PALLET_TOLERANCE {
                return Err(AllocError::AllocationInconsistency {
                    load_id,
                    message: format!(
                        "派車門檻 {}，實際只裝載 {} 板",
                        threshold,
                        load.total_pallets()
                    ),
                });
            }

            result.transfers.extend(load.transfers());
            result.loads.push(load);
        }

        // Step 5: 彙整未分配明細
        let (lines, ledger) = state.into_parts();
        result
            .unallocated
            .extend(lines.iter().filter_map(UnallocatedEntry::from_order_line));
        result.final_ledger = ledger;

        tracing::info!("裝載分配完成，耗時 {:?}", start_time.elapsed());
        tracing::info!(
            "車次 {}，裝載明細 {} 筆，調撥 {} 筆，未分配 {} 筆",
            result.num_loads(),
            result.placements().count(),
            result.transfers.len(),
            result.unallocated.len()
        );

        Ok(result)
    }

    /// 獲取裝載參數
    pub fn config(&self) -> &AllocConfig {
        &self.config
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use load_core::UnallocatedReason;
    use rstest::rstest;

    fn pallets_table(items: &[&str]) -> CasePackTable {
        CasePackTable::from_pairs(items.iter().map(|item| (*item, 1))).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AllocConfig::default().with_water_load_threshold(Decimal::from(30));
        let allocator = LoadAllocator::new(config, CasePackTable::new());

        assert!(matches!(
            allocator.allocate(Vec::new(), &[]),
            Err(AllocError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_case_pack_reported() {
        let allocator = LoadAllocator::new(AllocConfig::default(), pallets_table(&["A"]));
        let demands = vec![DemandLine::new("A", 30), DemandLine::new("Z", 12)];
        let stock = vec![StockRecord::pallets("A", "L1", Decimal::from(30))];

        let result = allocator.allocate(demands, &stock).unwrap();

        assert_eq!(result.num_loads(), 1);
        assert_eq!(result.warnings.len(), 1);
        let missing: Vec<_> = result
            .unallocated
            .iter()
            .filter(|entry| entry.reason == UnallocatedReason::MissingCasePackSize)
            .collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].demand.item_id, "Z");
    }

    #[test]
    fn test_cancelled_before_first_load() {
        let flag = Arc::new(AtomicBool::new(true));
        let allocator = LoadAllocator::new(AllocConfig::default(), pallets_table(&["A"]))
            .with_cancel_flag(flag);
        let stock = vec![StockRecord::pallets("A", "L1", Decimal::from(60))];

        let result = allocator.allocate(vec![DemandLine::new("A", 60)], &stock).unwrap();

        assert!(result.cancelled);
        assert_eq!(result.num_loads(), 0);
        assert_eq!(result.unallocated.len(), 1);
        assert_eq!(result.unallocated[0].reason, UnallocatedReason::Leftover);
        assert_eq!(result.unallocated[0].unallocated_pallets, Decimal::from(60));
    }

    #[test]
    fn test_duplicate_water_line_is_fatal() {
        let allocator = LoadAllocator::new(AllocConfig::default(), pallets_table(&["2558"]));
        let stock = vec![StockRecord::pallets("2558", "L1", Decimal::from(60))];
        let demands = vec![DemandLine::new("2558", 30), DemandLine::new("2558", 10)];

        assert!(matches!(
            allocator.allocate(demands, &stock),
            Err(AllocError::DuplicateWaterLine { .. })
        ));
    }

    #[test]
    fn test_multiple_loads_until_below_threshold() {
        let allocator = LoadAllocator::new(AllocConfig::default(), pallets_table(&["A"]));
        let stock = vec![
            StockRecord::pallets("A", "L1", Decimal::from(40)),
            StockRecord::pallets("A", "L2", Decimal::from(30)),
        ];

        let result = allocator.allocate(vec![DemandLine::new("A", 70)], &stock).unwrap();

        assert_eq!(result.num_loads(), 2);
        assert_eq!(result.total_allocated(), Decimal::from(52));
        assert_eq!(result.unallocated[0].unallocated_pallets, Decimal::from(18));
        assert!(result.loads.iter().all(|load| load.total_pallets() == Decimal::from(26)));
    }

    #[rstest]
    // 18 板水未超過門檻：一般上限 26 板
    #[case(18, 26, 2)]
    // 19 板水超過門檻：整車 22 板
    #[case(19, 22, 7)]
    fn test_water_threshold_boundary(
        #[case] water: u64,
        #[case] load_total: i64,
        #[case] leftover: i64,
    ) {
        let allocator = LoadAllocator::new(AllocConfig::default(), pallets_table(&["2558", "A"]));
        let stock = vec![
            StockRecord::pallets("2558", "L1", Decimal::from(40)),
            StockRecord::pallets("A", "L1", Decimal::from(10)),
        ];
        let demands = vec![DemandLine::new("2558", water), DemandLine::new("A", 10)];

        let result = allocator.allocate(demands, &stock).unwrap();

        assert_eq!(result.num_loads(), 1);
        assert_eq!(result.loads[0].water_pallets, Decimal::from(water));
        assert_eq!(result.loads[0].total_pallets(), Decimal::from(load_total));
        assert_eq!(result.unallocated.len(), 1);
        assert_eq!(result.unallocated[0].demand.item_id, "A");
        assert_eq!(result.unallocated[0].unallocated_pallets, Decimal::from(leftover));
    }
}
