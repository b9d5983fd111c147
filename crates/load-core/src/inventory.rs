//! 庫存與箱規模型

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AllocError, Result};

/// 庫存數量單位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuantityUnit {
    /// 箱（需以箱規換算）
    Cases,
    /// 棧板
    Pallets,
}

/// 儲位庫存記錄（輸入）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    /// 物料編號
    pub item_id: String,

    /// 儲位（可能為空白，空白記錄在建帳時丟棄）
    pub location: String,

    /// 現有庫存
    pub on_hand: Decimal,

    /// 數量單位
    pub unit: QuantityUnit,
}

impl StockRecord {
    /// 以箱為單位的庫存記錄
    pub fn cases(item_id: impl Into<String>, location: impl Into<String>, on_hand: Decimal) -> Self {
        Self {
            item_id: item_id.into(),
            location: location.into(),
            on_hand,
            unit: QuantityUnit::Cases,
        }
    }

    /// 以棧板為單位的庫存記錄
    pub fn pallets(
        item_id: impl Into<String>,
        location: impl Into<String>,
        on_hand: Decimal,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            location: location.into(),
            on_hand,
            unit: QuantityUnit::Pallets,
        }
    }

    /// 是否有可用的儲位與正庫存
    pub fn is_usable(&self) -> bool {
        !self.location.trim().is_empty() && self.on_hand > Decimal::ZERO
    }
}

/// 箱規表：物料 → 每板箱數
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CasePackTable {
    cases_per_pallet: HashMap<String, u32>,
}

impl CasePackTable {
    /// 創建空的箱規表
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 (物料, 每板箱數) 建立箱規表
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (item_id, cases_per_pallet) in pairs {
            table.insert(item_id, cases_per_pallet)?;
        }
        Ok(table)
    }

    /// 登記物料箱規，每板箱數必須為正
    pub fn insert(&mut self, item_id: impl Into<String>, cases_per_pallet: u32) -> Result<()> {
        let item_id = item_id.into();
        if cases_per_pallet == 0 {
            return Err(AllocError::InvalidCasePackSize {
                item_id,
                cases_per_pallet,
            });
        }
        self.cases_per_pallet.insert(item_id, cases_per_pallet);
        Ok(())
    }

    /// 查詢每板箱數
    pub fn cases_per_pallet(&self, item_id: &str) -> Result<u32> {
        self.cases_per_pallet
            .get(item_id)
            .copied()
            .ok_or_else(|| AllocError::MissingCasePackSize {
                item_id: item_id.to_string(),
            })
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.cases_per_pallet.contains_key(item_id)
    }

    pub fn len(&self) -> usize {
        self.cases_per_pallet.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases_per_pallet.is_empty()
    }
}
