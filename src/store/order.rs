use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Bon de Sortie: full and empty bottles handed to a driver for a client.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SupplyOrder {
    pub id: String,
    pub number: String,
    pub date: NaiveDate,
    pub driver_id: String,
    pub client_id: String,
    pub items: Vec<SupplyOrderItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SupplyOrderItem {
    pub bottle_type_id: String,
    pub bottle_type_name: String,
    pub full_quantity: u32,
    pub empty_quantity: u32,
    pub unit_price: f64,
    pub tax_rate: f64,
    /// unit_price x full_quantity; empties carry no charge.
    pub amount: f64,
}

/// Bon de Retour: reconciliation of a supply order when the driver comes back.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReturnOrder {
    pub id: String,
    pub number: String,
    pub date: NaiveDate,
    pub supply_order_id: String,
    pub driver_id: String,
    pub items: Vec<ReturnOrderItem>,
    pub total_sales: f64,
    pub total_expenses: f64,
    pub total_consigned: f64,
    pub net_sales: f64,
    pub driver_debt_change: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReturnOrderItem {
    pub bottle_type_id: String,
    pub bottle_type_name: String,
    pub returned_full: u32,
    pub returned_empty: u32,
    pub consigned: u32,
    pub foreign: u32,
    pub defective: u32,
    pub lost: u32,
    pub unit_price: f64,
    /// A bottle counts as sold when its empty shell comes back or when it
    /// was left on consignment: returned_empty + consigned.
    pub sold_quantity: u32,
    pub sales_amount: f64,
}

impl ReturnOrderItem {
    /// Bottles accounted against the quantity issued on the supply order.
    /// Foreign bottles are extraneous collections and do not count.
    pub fn accounted(&self) -> u32 {
        self.returned_full + self.returned_empty + self.consigned + self.defective + self.lost
    }
}
