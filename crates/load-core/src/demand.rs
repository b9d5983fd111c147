//! 需求模型

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 訂單明細在分配過程中的索引（arena 下標）
pub type LineId = usize;

/// 採購訂單明細（輸入）
///
/// 除物料與箱數外，其餘欄位原樣帶入輸出報表。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandLine {
    /// 明細ID
    pub id: Uuid,

    /// 物料編號
    pub item_id: String,

    /// 訂購箱數
    pub case_quantity: u64,

    /// 採購單號
    pub purchase_order: Option<String>,

    /// 訂單項次
    pub item_number: Option<String>,

    /// 單位
    pub unit_of_measure: Option<String>,

    /// 品名
    pub description: Option<String>,

    /// 訂單日期
    pub order_date: Option<NaiveDate>,
}

impl DemandLine {
    /// 創建新的訂單明細
    pub fn new(item_id: impl Into<String>, case_quantity: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            item_id: item_id.into(),
            case_quantity,
            purchase_order: None,
            item_number: None,
            unit_of_measure: None,
            description: None,
            order_date: None,
        }
    }

    /// 建構器模式：設置採購單號
    pub fn with_purchase_order(mut self, purchase_order: impl Into<String>) -> Self {
        self.purchase_order = Some(purchase_order.into());
        self
    }

    /// 建構器模式：設置訂單項次
    pub fn with_item_number(mut self, item_number: impl Into<String>) -> Self {
        self.item_number = Some(item_number.into());
        self
    }

    /// 建構器模式：設置單位
    pub fn with_unit_of_measure(mut self, unit: impl Into<String>) -> Self {
        self.unit_of_measure = Some(unit.into());
        self
    }

    /// 建構器模式：設置品名
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// 建構器模式：設置訂單日期
    pub fn with_order_date(mut self, date: NaiveDate) -> Self {
        self.order_date = Some(date);
        self
    }
}

/// 換算成棧板後、參與分配的訂單明細
///
/// 不變量：`short_pallets + remaining_pallets + 已裝載 == demand_pallets`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// 原始明細
    pub demand: DemandLine,

    /// 需求棧板數（可為小數）
    pub demand_pallets: Decimal,

    /// 短缺棧板數
    pub short_pallets: Decimal,

    /// 尚未裝載的棧板數
    pub remaining_pallets: Decimal,

    /// 篩選時各儲位的庫存快照
    pub location_stock: BTreeMap<String, Decimal>,
}

impl OrderLine {
    /// 創建新的訂單明細（尚未篩選）
    pub fn new(demand: DemandLine, demand_pallets: Decimal) -> Self {
        Self {
            demand,
            demand_pallets,
            short_pallets: Decimal::ZERO,
            remaining_pallets: demand_pallets,
            location_stock: BTreeMap::new(),
        }
    }

    pub fn item_id(&self) -> &str {
        &self.demand.item_id
    }

    /// 已裝載棧板數
    pub fn packed_pallets(&self) -> Decimal {
        self.demand_pallets - self.short_pallets - self.remaining_pallets
    }

    /// 是否尚有待裝載需求
    pub fn is_pending(&self) -> bool {
        self.remaining_pallets > Decimal::ZERO
    }

    /// 篩選時有庫存的儲位數（越少越稀缺）
    pub fn source_count(&self) -> usize {
        self.location_stock.len()
    }

    /// 是否僅單一儲位有庫存
    pub fn is_single_sourced(&self) -> bool {
        self.source_count() == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_demand_line() {
        let line = DemandLine::new("1001", 120)
            .with_purchase_order("PO-56527656")
            .with_item_number("10")
            .with_unit_of_measure("CS")
            .with_description("Sparkling 24x375ml")
            .with_order_date(NaiveDate::from_ymd_opt(2025, 11, 1).unwrap());

        assert_eq!(line.item_id, "1001");
        assert_eq!(line.case_quantity, 120);
        assert_eq!(line.purchase_order.as_deref(), Some("PO-56527656"));
        assert_eq!(line.unit_of_measure.as_deref(), Some("CS"));
        assert!(line.order_date.is_some());
    }

    #[test]
    fn test_order_line_bookkeeping() {
        let mut line = OrderLine::new(DemandLine::new("1001", 300), Decimal::from(30));
        assert!(line.is_pending());
        assert_eq!(line.packed_pallets(), Decimal::ZERO);

        line.short_pallets = Decimal::from(5);
        line.remaining_pallets = Decimal::from(15);
        assert_eq!(line.packed_pallets(), Decimal::from(10));

        line.location_stock.insert("L1".to_string(), Decimal::from(25));
        assert!(line.is_single_sourced());
        line.location_stock.insert("L2".to_string(), Decimal::from(3));
        assert_eq!(line.source_count(), 2);
    }
}
