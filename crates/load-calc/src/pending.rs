//! 待裝載索引與分配狀態

use std::cmp::Ordering;
use std::collections::BTreeMap;

use load_core::{LineId, OrderLine, Result};
use rust_decimal::Decimal;

use crate::ledger::StockLedger;
use crate::screening::Screening;

/// 儲位 → 待裝載明細索引
///
/// 明細只在「仍有待裝量」且「該儲位帳上仍有此物料」時出現在儲位清單中。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingIndex {
    by_location: BTreeMap<String, Vec<LineId>>,
}

impl PendingIndex {
    /// 依明細與庫存帳建立索引
    pub fn build(lines: &[OrderLine], ledger: &StockLedger) -> Self {
        let mut by_location: BTreeMap<String, Vec<LineId>> = BTreeMap::new();
        for (id, line) in lines.iter().enumerate() {
            if !line.is_pending() {
                continue;
            }
            for (location, _) in ledger.locations(line.item_id()) {
                by_location.entry(location.to_string()).or_default().push(id);
            }
        }
        Self { by_location }
    }

    /// 儲位上的待裝載明細（依裝載順序）
    pub fn items_at(&self, location: &str) -> &[LineId] {
        self.by_location
            .get(location)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 有待裝載明細的儲位（依儲位編號排序）
    pub fn locations(&self) -> impl Iterator<Item = (&str, &[LineId])> + '_ {
        self.by_location
            .iter()
            .map(|(location, ids)| (location.as_str(), ids.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.by_location.is_empty()
    }

    /// 明細是否仍在任一儲位清單中
    pub fn contains(&self, line: LineId) -> bool {
        self.by_location.values().any(|ids| ids.contains(&line))
    }

    /// 明細已全數裝載：自所有儲位移除
    pub fn retire_line(&mut self, line: LineId) {
        self.by_location.retain(|_, ids| {
            ids.retain(|id| *id != line);
            !ids.is_empty()
        });
    }

    /// 儲位的某物料已用罄：自該儲位移除此物料的所有明細
    pub fn retire_source(&mut self, lines: &[OrderLine], item_id: &str, location: &str) {
        if let Some(ids) = self.by_location.get_mut(location) {
            ids.retain(|id| lines[*id].item_id() != item_id);
            if ids.is_empty() {
                self.by_location.remove(location);
            }
        }
    }

    /// 重排每個儲位的裝載順序：供應儲位少者優先，其次待裝量多者優先
    pub fn reorder(&mut self, lines: &[OrderLine]) {
        for ids in self.by_location.values_mut() {
            ids.sort_by(|a, b| pick_order(&lines[*a], &lines[*b]).then(a.cmp(b)));
        }
    }
}

fn pick_order(a: &OrderLine, b: &OrderLine) -> Ordering {
    a.source_count()
        .cmp(&b.source_count())
        .then_with(|| b.remaining_pallets.cmp(&a.remaining_pallets))
        .then_with(|| a.item_id().cmp(b.item_id()))
}

/// 分配狀態：明細 arena、庫存帳與待裝載索引
///
/// 所有對需求與庫存的修改都經由 [`PackingState::place`]。
#[derive(Debug, Clone)]
pub struct PackingState {
    lines: Vec<OrderLine>,
    ledger: StockLedger,
    pending: PendingIndex,
    water_line: Option<LineId>,
}

impl PackingState {
    pub fn new(screening: Screening, ledger: StockLedger) -> Self {
        let pending = PendingIndex::build(&screening.lines, &ledger);
        Self {
            lines: screening.lines,
            ledger,
            pending,
            water_line: screening.water_line,
        }
    }

    pub fn line(&self, id: LineId) -> &OrderLine {
        &self.lines[id]
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn ledger(&self) -> &StockLedger {
        &self.ledger
    }

    pub fn pending(&self) -> &PendingIndex {
        &self.pending
    }

    /// 重排裝載順序
    pub fn reorder_pending(&mut self) {
        self.pending.reorder(&self.lines);
    }

    /// 全部明細的待裝量合計
    pub fn remaining_total(&self) -> Decimal {
        self.lines.iter().map(|line| line.remaining_pallets).sum()
    }

    /// 仍有待裝量且仍有供應儲位的水品項明細
    pub fn pending_water(&self) -> Option<LineId> {
        self.water_line
            .filter(|id| self.lines[*id].is_pending() && self.pending.contains(*id))
    }

    /// 水品項的待裝量
    pub fn water_remaining(&self) -> Decimal {
        self.water_line
            .map(|id| self.lines[id].remaining_pallets)
            .unwrap_or(Decimal::ZERO)
    }

    /// 儲位上的待裝量合計
    pub fn pending_pallets_at(&self, location: &str) -> Decimal {
        self.pending
            .items_at(location)
            .iter()
            .map(|id| self.lines[*id].remaining_pallets)
            .sum()
    }

    /// 儲位上此明細物料的可用量
    pub fn available_at(&self, id: LineId, location: &str) -> Decimal {
        self.ledger
            .available_pallets(self.lines[id].item_id(), location)
    }

    /// 自儲位裝載明細：扣減庫存與待裝量，並維護索引
    pub fn place(&mut self, id: LineId, location: &str, pallets: Decimal) -> Result<()> {
        let item_id = self.lines[id].item_id().to_string();
        self.ledger.consume(&item_id, location, pallets)?;

        let line = &mut self.lines[id];
        line.remaining_pallets -= pallets;
        if !line.is_pending() {
            self.pending.retire_line(id);
        }

        if self.ledger.available_pallets(&item_id, location) <= Decimal::ZERO {
            self.pending.retire_source(&self.lines, &item_id, location);
            if self.ledger.total_available(&item_id) <= Decimal::ZERO {
                self.strand_item(&item_id);
            }
        }
        Ok(())
    }

    /// 物料在所有儲位都已用罄：仍有待裝量的明細改記為短缺
    fn strand_item(&mut self, item_id: &str) {
        for (id, line) in self.lines.iter_mut().enumerate() {
            if line.item_id() != item_id || !line.is_pending() {
                continue;
            }
            tracing::warn!(
                "物料 {} 已無庫存，待裝量 {} 改記為短缺",
                item_id,
                line.remaining_pallets
            );
            line.short_pallets += line.remaining_pallets;
            line.remaining_pallets = Decimal::ZERO;
            self.pending.retire_line(id);
        }
    }

    pub fn into_parts(self) -> (Vec<OrderLine>, StockLedger) {
        (self.lines, self.ledger)
    }
}
