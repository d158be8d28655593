use serde::{Deserialize, Serialize};

/// A delivery driver. `balance` is always re-derived as `debt - advances`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Driver {
    pub id: String,
    pub name: String,
    pub debt: f64,
    pub advances: f64,
    pub balance: f64,
}

impl Driver {
    pub fn sync_balance(&mut self) {
        self.balance = self.debt - self.advances;
    }
}
