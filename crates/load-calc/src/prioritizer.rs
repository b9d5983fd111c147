//! 錨定儲位選擇

use rust_decimal::Decimal;

use crate::pending::PackingState;

/// 選擇錨定儲位的依據
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorReason {
    /// 沒有單一儲位能滿足水的待裝量，選水最多的儲位
    WaterMaxStock,
    /// 關鍵度最高（僅此儲位有庫存的物料最多）
    Criticality,
    /// 沒有關鍵物料，選待裝物料種類最多的儲位
    MostPendingItems,
}

/// 錨定儲位
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorChoice {
    pub location: String,
    pub reason: AnchorReason,
}

/// 錨定儲位選擇器
///
/// 平手時一律取儲位編號最小者，確保結果可重現。
pub struct LocationPrioritizer;

impl LocationPrioritizer {
    /// 選擇下一車次的錨定儲位，並重排各儲位的裝載順序
    pub fn select_anchor(state: &mut PackingState) -> Option<AnchorChoice> {
        state.reorder_pending();

        let candidates: Vec<String> = match state.pending_water() {
            Some(water) => {
                let remaining = state.line(water).remaining_pallets;
                let stocks: Vec<(&str, Decimal)> =
                    state.ledger().locations(state.line(water).item_id()).collect();

                let richest = first_max_by_key(stocks.iter().copied(), |(_, pallets)| *pallets);
                if let Some(((location, _), max_stock)) = richest {
                    if max_stock < remaining {
                        tracing::debug!(
                            "水待裝 {} 超過單一儲位最大庫存 {}，錨定 {}",
                            remaining,
                            max_stock,
                            location
                        );
                        return Some(AnchorChoice {
                            location: location.to_string(),
                            reason: AnchorReason::WaterMaxStock,
                        });
                    }
                }

                stocks
                    .iter()
                    .filter(|(_, pallets)| *pallets >= remaining)
                    .map(|(location, _)| location.to_string())
                    .collect()
            }
            None => state
                .pending()
                .locations()
                .map(|(location, _)| location.to_string())
                .collect(),
        };

        let scored = first_max_by_key(candidates.iter(), |location| {
            Self::criticality(state, location)
        });
        if let Some((location, score)) = scored {
            if score > Decimal::ZERO {
                tracing::debug!("關鍵度最高儲位 {}（{}）", location, score);
                return Some(AnchorChoice {
                    location: location.clone(),
                    reason: AnchorReason::Criticality,
                });
            }
        }

        first_max_by_key(candidates.iter(), |location| {
            state.pending().items_at(location).len()
        })
        .map(|(location, count)| {
            tracing::debug!("無關鍵物料，選待裝物料最多的儲位 {}（{} 種）", location, count);
            AnchorChoice {
                location: location.clone(),
                reason: AnchorReason::MostPendingItems,
            }
        })
    }

    /// 關鍵度：僅在此儲位有庫存的物料，其 min(待裝量, 儲位庫存) 之和
    pub fn criticality(state: &PackingState, location: &str) -> Decimal {
        state
            .pending()
            .items_at(location)
            .iter()
            .map(|id| state.line(*id))
            .filter(|line| line.is_single_sourced())
            .map(|line| {
                line.remaining_pallets
                    .min(state.ledger().available_pallets(line.item_id(), location))
            })
            .sum()
    }
}

/// 取鍵值最大者；平手保留最先出現者（候選已依儲位編號排序）
fn first_max_by_key<T, K, I, F>(items: I, mut key: F) -> Option<(T, K)>
where
    I: IntoIterator<Item = T>,
    K: PartialOrd,
    F: FnMut(&T) -> K,
{
    let mut best: Option<(T, K)> = None;
    for item in items {
        let value = key(&item);
        match &best {
            Some((_, current)) if value <= *current => {}
            _ => best = Some((item, value)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use load_core::{AllocConfig, DemandLine, OrderLine};

    use crate::ledger::StockLedger;
    use crate::screening::ShortageScreener;

    fn state(lines: Vec<(&str, i64)>, ledger: StockLedger) -> PackingState {
        let lines = lines
            .into_iter()
            .map(|(item, pallets)| OrderLine::new(DemandLine::new(item, 0), Decimal::from(pallets)))
            .collect();
        let screening = ShortageScreener::screen(lines, &ledger, &AllocConfig::default()).unwrap();
        PackingState::new(screening, ledger)
    }

    #[test]
    fn test_water_exceeds_every_location() {
        let ledger = StockLedger::new()
            .with_stock("2558", "L1", Decimal::from(25))
            .with_stock("2558", "L2", Decimal::from(20));
        let mut state = state(vec![("2558", 40)], ledger);

        let choice = LocationPrioritizer::select_anchor(&mut state).unwrap();
        assert_eq!(choice.location, "L1");
        assert_eq!(choice.reason, AnchorReason::WaterMaxStock);
    }

    #[test]
    fn test_water_restricts_candidates() {
        // L1 的關鍵度較高，但只有 L2 的水足以滿足待裝量
        let ledger = StockLedger::new()
            .with_stock("2558", "L1", Decimal::from(5))
            .with_stock("2558", "L2", Decimal::from(30))
            .with_stock("A", "L1", Decimal::from(20))
            .with_stock("B", "L2", Decimal::from(2));
        let mut state = state(vec![("2558", 20), ("A", 20), ("B", 2)], ledger);

        let choice = LocationPrioritizer::select_anchor(&mut state).unwrap();
        assert_eq!(choice.location, "L2");
        assert_eq!(choice.reason, AnchorReason::Criticality);
    }

    #[test]
    fn test_criticality_picks_single_sourced_location() {
        let ledger = StockLedger::new()
            .with_stock("C", "L1", Decimal::from(20))
            .with_stock("D", "L2", Decimal::from(20));
        let mut state = state(vec![("C", 20), ("D", 10)], ledger);

        assert_eq!(LocationPrioritizer::criticality(&state, "L1"), Decimal::from(20));
        assert_eq!(LocationPrioritizer::criticality(&state, "L2"), Decimal::from(10));

        let choice = LocationPrioritizer::select_anchor(&mut state).unwrap();
        assert_eq!(choice.location, "L1");
    }

    #[test]
    fn test_tie_breaks_on_location_id() {
        let ledger = StockLedger::new()
            .with_stock("C", "L2", Decimal::from(15))
            .with_stock("D", "L1", Decimal::from(15));
        let mut state = state(vec![("C", 15), ("D", 15)], ledger);

        let choice = LocationPrioritizer::select_anchor(&mut state).unwrap();
        assert_eq!(choice.location, "L1");
    }

    #[test]
    fn test_fallback_to_most_pending_items() {
        // 所有物料都有兩個儲位：關鍵度皆為零
        let ledger = StockLedger::new()
            .with_stock("A", "L1", Decimal::from(10))
            .with_stock("A", "L2", Decimal::from(10))
            .with_stock("B", "L1", Decimal::from(10))
            .with_stock("B", "L3", Decimal::from(10))
            .with_stock("C", "L2", Decimal::from(10))
            .with_stock("C", "L3", Decimal::from(10))
            .with_stock("D", "L3", Decimal::from(10))
            .with_stock("D", "L4", Decimal::from(10));
        let mut state = state(vec![("A", 10), ("B", 10), ("C", 10), ("D", 10)], ledger);

        let choice = LocationPrioritizer::select_anchor(&mut state).unwrap();
        assert_eq!(choice.location, "L3");
        assert_eq!(choice.reason, AnchorReason::MostPendingItems);
    }

    #[test]
    fn test_no_candidates() {
        let mut state = state(vec![("A", 5)], StockLedger::new());
        assert!(LocationPrioritizer::select_anchor(&mut state).is_none());
    }
}
