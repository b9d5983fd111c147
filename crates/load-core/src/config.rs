//! 裝載分配配置模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AllocError, Result};

/// 裝載分配參數配置
///
/// 這些常數描述車隊與特定品項（水）的實體裝載限制，
/// 因此由外部提供，不寫死在引擎中。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocConfig {
    /// 水品項的物料編號（None 表示停用水的裝載規則）
    pub water_item_id: Option<String>,

    /// 水重載時每車棧板數
    pub water_pallets_per_load: Decimal,

    /// 水重載門檻：單車水棧板數超過此值即改用水的裝載上限
    pub water_load_threshold: Decimal,

    /// 一般每車棧板數
    pub standard_pallets_per_load: Decimal,
}

impl Default for AllocConfig {
    fn default() -> Self {
        Self {
            water_item_id: Some("2558".to_string()),
            water_pallets_per_load: Decimal::from(22),
            water_load_threshold: Decimal::from(18),
            standard_pallets_per_load: Decimal::from(26),
        }
    }
}

impl AllocConfig {
    /// 從 JSON 讀取配置，未提供的欄位使用預設值
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AllocConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 建構器模式：設置水品項物料編號
    pub fn with_water_item_id(mut self, item_id: impl Into<String>) -> Self {
        self.water_item_id = Some(item_id.into());
        self
    }

    /// 建構器模式：停用水的裝載規則
    pub fn without_water_item(mut self) -> Self {
        self.water_item_id = None;
        self
    }

    /// 建構器模式：設置水重載時每車棧板數
    pub fn with_water_pallets_per_load(mut self, pallets: Decimal) -> Self {
        self.water_pallets_per_load = pallets;
        self
    }

    /// 建構器模式：設置水重載門檻
    pub fn with_water_load_threshold(mut self, pallets: Decimal) -> Self {
        self.water_load_threshold = pallets;
        self
    }

    /// 建構器模式：設置一般每車棧板數
    pub fn with_standard_pallets_per_load(mut self, pallets: Decimal) -> Self {
        self.standard_pallets_per_load = pallets;
        self
    }

    /// 檢查物料是否為水品項
    pub fn is_water(&self, item_id: &str) -> bool {
        self.water_item_id.as_deref() == Some(item_id)
    }

    /// 單車水棧板數是否已進入重載狀態（嚴格大於門檻）
    pub fn is_water_laden(&self, water_pallets: Decimal) -> bool {
        water_pallets > self.water_load_threshold
    }

    /// 派車門檻：剩餘水需求重載時為水的每車棧板數，否則為一般每車棧板數
    pub fn dispatch_threshold(&self, water_remaining: Decimal) -> Decimal {
        if self.is_water_laden(water_remaining) {
            self.water_pallets_per_load
        } else {
            self.standard_pallets_per_load
        }
    }

    /// 驗證配置
    pub fn validate(&self) -> Result<()> {
        if self.standard_pallets_per_load <= Decimal::ZERO
            || self.water_pallets_per_load <= Decimal::ZERO
            || self.water_load_threshold <= Decimal::ZERO
        {
            return Err(AllocError::InvalidConfig(
                "每車棧板數與門檻必須為正數".to_string(),
            ));
        }

        if self.water_load_threshold >= self.water_pallets_per_load {
            return Err(AllocError::InvalidConfig(format!(
                "水重載門檻 {} 必須小於水的每車棧板數 {}",
                self.water_load_threshold, self.water_pallets_per_load
            )));
        }

        if self.water_pallets_per_load > self.standard_pallets_per_load {
            return Err(AllocError::InvalidConfig(format!(
                "水的每車棧板數 {} 不可大於一般每車棧板數 {}",
                self.water_pallets_per_load, self.standard_pallets_per_load
            )));
        }

        if matches!(self.water_item_id.as_deref(), Some(id) if id.trim().is_empty()) {
            return Err(AllocError::InvalidConfig("水品項編號不可為空白".to_string()));
        }

        Ok(())
    }
}
