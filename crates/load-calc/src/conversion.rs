//! 棧板換算

use load_core::{CasePackTable, DemandLine, Result};
use rust_decimal::Decimal;

/// 棧板數的小數位數
///
/// 換算結果一律進位到此位數，之後的加減都是精確的，
/// 各儲位庫存加總不會因有效位數溢出而再次捨入。
pub const PALLET_SCALE: u32 = 9;

/// 把棧板數規整到 [`PALLET_SCALE`]
pub fn normalize_pallets(pallets: Decimal) -> Decimal {
    pallets.round_dp(PALLET_SCALE).normalize()
}

/// 棧板換算器：以每板箱數把箱數換算為棧板數（允許小數棧板）
pub struct PalletConverter<'a> {
    case_packs: &'a CasePackTable,
}

impl<'a> PalletConverter<'a> {
    pub fn new(case_packs: &'a CasePackTable) -> Self {
        Self { case_packs }
    }

    /// 箱數換算為棧板數
    pub fn cases_to_pallets(&self, item_id: &str, cases: Decimal) -> Result<Decimal> {
        let cases_per_pallet = self.case_packs.cases_per_pallet(item_id)?;
        Ok(normalize_pallets(cases / Decimal::from(cases_per_pallet)))
    }

    /// 訂單明細的需求棧板數
    pub fn demand_pallets(&self, demand: &DemandLine) -> Result<Decimal> {
        self.cases_to_pallets(&demand.item_id, Decimal::from(demand.case_quantity))
    }

    pub fn knows(&self, item_id: &str) -> bool {
        self.case_packs.contains(item_id)
    }
}
