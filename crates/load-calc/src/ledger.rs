//! 庫存帳

use std::collections::BTreeMap;

use load_core::{AllocError, QuantityUnit, Result, StockRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::conversion::{normalize_pallets, PalletConverter};

/// 庫存帳：物料 → (儲位 → 可用棧板數)
///
/// 分配期間唯一的庫存來源，所有扣減都經過 [`StockLedger::consume`]，
/// 因此可用量永不為負。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockLedger {
    stock: BTreeMap<String, BTreeMap<String, Decimal>>,
}

impl StockLedger {
    /// 創建空的庫存帳
    pub fn new() -> Self {
        Self::default()
    }

    /// 由儲位庫存記錄建帳
    ///
    /// 丟棄空白儲位、非正庫存與沒有箱規的物料；同物料同儲位的記錄加總。
    pub fn from_records(records: &[StockRecord], converter: &PalletConverter<'_>) -> Self {
        let mut ledger = Self::new();
        let mut dropped = 0usize;

        for record in records {
            if !record.is_usable() || !converter.knows(&record.item_id) {
                dropped += 1;
                continue;
            }

            let pallets = match record.unit {
                QuantityUnit::Pallets => normalize_pallets(record.on_hand),
                QuantityUnit::Cases => {
                    match converter.cases_to_pallets(&record.item_id, record.on_hand) {
                        Ok(pallets) => pallets,
                        Err(_) => {
                            dropped += 1;
                            continue;
                        }
                    }
                }
            };

            ledger.add(&record.item_id, &record.location, pallets);
        }

        tracing::debug!(
            "建立庫存帳：物料 {} 種，丟棄記錄 {} 筆",
            ledger.stock.len(),
            dropped
        );

        ledger
    }

    /// 增加儲位庫存（非正數量忽略）
    pub fn add(&mut self, item_id: &str, location: &str, pallets: Decimal) {
        if pallets <= Decimal::ZERO {
            return;
        }
        *self
            .stock
            .entry(item_id.to_string())
            .or_default()
            .entry(location.to_string())
            .or_insert(Decimal::ZERO) += pallets;
    }

    /// 建構器模式：增加儲位庫存
    pub fn with_stock(mut self, item_id: &str, location: &str, pallets: Decimal) -> Self {
        self.add(item_id, location, pallets);
        self
    }

    /// 物料是否在帳上
    pub fn contains_item(&self, item_id: &str) -> bool {
        self.stock.contains_key(item_id)
    }

    /// 某儲位的可用棧板數
    pub fn available_pallets(&self, item_id: &str, location: &str) -> Decimal {
        self.stock
            .get(item_id)
            .and_then(|locations| locations.get(location))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// 全部儲位的可用棧板數
    pub fn total_available(&self, item_id: &str) -> Decimal {
        self.stock
            .get(item_id)
            .map(|locations| locations.values().copied().sum())
            .unwrap_or(Decimal::ZERO)
    }

    /// 有可用庫存的儲位（依儲位編號排序）
    pub fn locations(&self, item_id: &str) -> impl Iterator<Item = (&str, Decimal)> + '_ {
        self.stock
            .get(item_id)
            .into_iter()
            .flat_map(|locations| locations.iter())
            .filter(|(_, pallets)| **pallets > Decimal::ZERO)
            .map(|(location, pallets)| (location.as_str(), *pallets))
    }

    /// 物料各儲位庫存快照
    pub fn snapshot(&self, item_id: &str) -> BTreeMap<String, Decimal> {
        self.locations(item_id)
            .map(|(location, pallets)| (location.to_string(), pallets))
            .collect()
    }

    /// 扣減庫存，超過可用量時失敗
    pub fn consume(&mut self, item_id: &str, location: &str, pallets: Decimal) -> Result<()> {
        let available = self.available_pallets(item_id, location);
        if pallets > available || pallets < Decimal::ZERO {
            return Err(AllocError::InsufficientStock {
                item_id: item_id.to_string(),
                location: location.to_string(),
                requested: pallets,
                available,
            });
        }

        if let Some(slot) = self
            .stock
            .get_mut(item_id)
            .and_then(|locations| locations.get_mut(location))
        {
            *slot -= pallets;
        }
        Ok(())
    }

    /// 所有 (物料, 儲位, 可用量)
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, Decimal)> + '_ {
        self.stock.iter().flat_map(|(item_id, locations)| {
            locations
                .iter()
                .map(move |(location, pallets)| (item_id.as_str(), location.as_str(), *pallets))
        })
    }
}
