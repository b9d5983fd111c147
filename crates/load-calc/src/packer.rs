//! 單車次裝載

use load_core::{AllocConfig, LineId, Load, PlacementEntry, Result};
use rust_decimal::Decimal;

use crate::pending::PackingState;

/// 裝載器：以錨定儲位為主、必要時自其他儲位調撥，裝滿一個車次
pub struct LoadPacker<'a> {
    config: &'a AllocConfig,
}

impl<'a> LoadPacker<'a> {
    pub fn new(config: &'a AllocConfig) -> Self {
        Self { config }
    }

    /// 裝載一個車次，直到沒有空間或沒有可裝的物料
    pub fn pack(&self, load_id: u32, anchor: &str, state: &mut PackingState) -> Result<Load> {
        let mut load = Load::new(load_id, anchor);

        // 水優先自錨定儲位裝載
        if let Some(water) = state.pending_water() {
            if state.available_at(water, anchor) > Decimal::ZERO {
                self.place(&mut load, state, water, anchor)?;
            }
        }

        while load.remaining_space(self.config) > Decimal::ZERO {
            let Some((line, source)) = self.next_pick(&load, state) else {
                break;
            };
            self.place(&mut load, state, line, &source)?;
        }

        Ok(load)
    }

    /// 本次可裝的棧板數：min(待裝量, 車次空間, 儲位庫存)
    pub fn placeable(&self, load: &Load, state: &PackingState, line: LineId, source: &str) -> Decimal {
        let order_line = state.line(line);
        let capacity = load.capacity_for(self.config.is_water(order_line.item_id()), self.config);
        order_line
            .remaining_pallets
            .min(capacity)
            .min(state.available_at(line, source))
            .max(Decimal::ZERO)
    }

    /// 下一個要裝的明細與來源儲位
    ///
    /// 錨定儲位有可裝物料時取其裝載順序第一者；否則自待裝量最少的其他儲位調撥。
    fn next_pick(&self, load: &Load, state: &PackingState) -> Option<(LineId, String)> {
        let anchor = load.anchor_location.as_str();
        if let Some(line) = self.first_placeable(load, state, anchor) {
            return Some((line, anchor.to_string()));
        }

        let mut best: Option<(Decimal, &str, LineId)> = None;
        for (location, _) in state.pending().locations() {
            if location == anchor {
                continue;
            }
            let Some(line) = self.first_placeable(load, state, location) else {
                continue;
            };
            let pallets = state.pending_pallets_at(location);
            if best.map_or(true, |(current, _, _)| pallets < current) {
                best = Some((pallets, location, line));
            }
        }

        best.map(|(_, location, line)| (line, location.to_string()))
    }

    fn first_placeable(&self, load: &Load, state: &PackingState, location: &str) -> Option<LineId> {
        state
            .pending()
            .items_at(location)
            .iter()
            .copied()
            .find(|line| self.placeable(load, state, *line, location) > Decimal::ZERO)
    }

    fn place(&self, load: &mut Load, state: &mut PackingState, line: LineId, source: &str) -> Result<()> {
        let pallets = self.placeable(load, state, line, source);
        if pallets <= Decimal::ZERO {
            return Ok(());
        }

        let order_line = state.line(line);
        let is_water = self.config.is_water(order_line.item_id());
        let transfer_to = (source != load.anchor_location).then(|| load.anchor_location.clone());
        let placement = PlacementEntry {
            load_id: load.id,
            demand_id: order_line.demand.id,
            item_id: order_line.item_id().to_string(),
            source_location: source.to_string(),
            pallets,
            transfer_to,
        };

        state.place(line, source, pallets)?;

        match &placement.transfer_to {
            Some(to) => tracing::debug!(
                "車次 {}: 物料 {} 裝載 {} 板，自 {} 調撥至 {}",
                load.id,
                placement.item_id,
                pallets,
                source,
                to
            ),
            None => tracing::debug!(
                "車次 {}: 物料 {} 裝載 {} 板（{}）",
                load.id,
                placement.item_id,
                pallets,
                source
            ),
        }

        load.record(placement, is_water);
        Ok(())
    }
}
