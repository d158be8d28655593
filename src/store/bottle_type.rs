use serde::{Deserialize, Serialize};

/// A cylinder model handled by the depot (e.g. butane 12kg).
///
/// `remaining_quantity` is always re-derived as `total_quantity -
/// distributed_quantity`; callers never set it directly.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BottleType {
    pub id: String,
    pub name: String,
    pub capacity_kg: f64,
    pub total_quantity: u32,
    pub distributed_quantity: u32,
    pub remaining_quantity: u32,
    pub unit_price: f64,
    /// Fractional tax rate, e.g. 0.19 for 19%.
    pub tax_rate: f64,
}

impl BottleType {
    pub fn sync_remaining(&mut self) {
        self.remaining_quantity = self.total_quantity - self.distributed_quantity;
    }
}
