mod bottle_type;
mod client;
mod driver;
mod foreign;
mod order;
mod transaction;

pub use bottle_type::BottleType;
pub use client::Client;
pub use driver::Driver;
pub use foreign::ForeignBottle;
pub use order::{ReturnOrder, ReturnOrderItem, SupplyOrder, SupplyOrderItem};
pub use transaction::{BottleStatus, Section, Transaction, TransactionLine, TxKind, TxSource};

use crate::config::format_order_number;
use crate::error::{DepotError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// The whole operational state of the depot, persisted as one JSON document.
///
/// Every mutation goes through a method on this type; callers never write
/// `state.json` themselves. Commands mutate in memory and persist with a
/// single `save_store` at the end, so a rejected submit leaves the file
/// untouched.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Store {
    #[serde(default)]
    pub bottle_types: Vec<BottleType>,
    #[serde(default)]
    pub drivers: Vec<Driver>,
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub supply_orders: Vec<SupplyOrder>,
    #[serde(default)]
    pub return_orders: Vec<ReturnOrder>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub foreign_bottles: Vec<ForeignBottle>,
    /// Empty shells held at the depot, keyed by bottle type id.
    #[serde(default)]
    pub empty_stock: BTreeMap<String, u32>,
    #[serde(default)]
    pub counters: Counters,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Counters {
    /// Monotonic source for entity ids.
    pub ids: u64,
    pub supply: YearCounter,
    pub returns: YearCounter,
}

/// Per-year sequence, reset when the year rolls over.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct YearCounter {
    pub last_year: u32,
    pub last_number: u32,
}

impl YearCounter {
    fn bump(&mut self, year: u32) -> u32 {
        let seq = if self.last_year == year {
            self.last_number + 1
        } else {
            1 // Reset for new year
        };
        self.last_year = year;
        self.last_number = seq;
        seq
    }

    pub fn next(&self, year: u32) -> u32 {
        if self.last_year == year {
            self.last_number + 1
        } else {
            1
        }
    }
}

/// Load state.json (creates default if missing)
pub fn load_store(config_dir: &PathBuf) -> Result<Store> {
    let path = config_dir.join("state.json");
    if !path.exists() {
        return Ok(Store::default());
    }
    let content = fs::read_to_string(&path)?;
    serde_json::from_str(&content).map_err(|e| DepotError::StateParse { path, source: e })
}

/// Save state.json atomically: write a sibling temp file, then rename over.
pub fn save_store(config_dir: &PathBuf, store: &Store) -> Result<()> {
    let path = config_dir.join("state.json");
    let tmp = config_dir.join("state.json.tmp");
    let content = serde_json::to_string_pretty(store).map_err(|e| {
        DepotError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })?;
    fs::write(&tmp, content)?;
    fs::rename(&tmp, &path)?;
    Ok(())
}

/// Patch for `update_bottle_type`; `None` fields are left unchanged.
#[derive(Debug, Default)]
pub struct BottleTypePatch {
    pub name: Option<String>,
    pub total_quantity: Option<u32>,
    pub unit_price: Option<f64>,
    pub tax_rate: Option<f64>,
}

impl Store {
    fn mint(&mut self, prefix: &str) -> String {
        self.counters.ids += 1;
        format!("{}-{}", prefix, self.counters.ids)
    }

    pub fn next_supply_number(&mut self, format: &str, date: NaiveDate) -> String {
        let year = date.year() as u32;
        let seq = self.counters.supply.bump(year);
        format_order_number(format, year, seq)
    }

    pub fn next_return_number(&mut self, format: &str, date: NaiveDate) -> String {
        let year = date.year() as u32;
        let seq = self.counters.returns.bump(year);
        format_order_number(format, year, seq)
    }

    // --- bottle types ---

    pub fn add_bottle_type(
        &mut self,
        name: &str,
        capacity_kg: f64,
        total_quantity: u32,
        unit_price: f64,
        tax_rate: f64,
    ) -> Result<&BottleType> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DepotError::EmptyName);
        }
        if self.bottle_types.iter().any(|b| b.name == name) {
            return Err(DepotError::DuplicateBottleType(name.to_string()));
        }
        if unit_price <= 0.0 {
            return Err(DepotError::InvalidPrice);
        }
        if !(0.0..=1.0).contains(&tax_rate) {
            return Err(DepotError::InvalidTaxRate(tax_rate));
        }

        let id = self.mint("bt");
        self.bottle_types.push(BottleType {
            id,
            name: name.to_string(),
            capacity_kg,
            total_quantity,
            distributed_quantity: 0,
            remaining_quantity: total_quantity,
            unit_price,
            tax_rate,
        });
        Ok(self.bottle_types.last().unwrap())
    }

    pub fn update_bottle_type(
        &mut self,
        reference: &str,
        patch: BottleTypePatch,
    ) -> Result<&BottleType> {
        if let Some(rate) = patch.tax_rate {
            if !(0.0..=1.0).contains(&rate) {
                return Err(DepotError::InvalidTaxRate(rate));
            }
        }
        if let Some(price) = patch.unit_price {
            if price <= 0.0 {
                return Err(DepotError::InvalidPrice);
            }
        }

        let idx = self.bottle_type_index(reference)?;

        if let Some(ref name) = patch.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(DepotError::EmptyName);
            }
            if self
                .bottle_types
                .iter()
                .enumerate()
                .any(|(i, b)| i != idx && b.name == name)
            {
                return Err(DepotError::DuplicateBottleType(name.to_string()));
            }
        }

        let bt = &mut self.bottle_types[idx];
        if let Some(total) = patch.total_quantity {
            if total < bt.distributed_quantity {
                return Err(DepotError::TotalBelowDistributed {
                    name: bt.name.clone(),
                    total,
                    distributed: bt.distributed_quantity,
                });
            }
            bt.total_quantity = total;
        }
        if let Some(name) = patch.name {
            bt.name = name.trim().to_string();
        }
        if let Some(price) = patch.unit_price {
            bt.unit_price = price;
        }
        if let Some(rate) = patch.tax_rate {
            bt.tax_rate = rate;
        }
        bt.sync_remaining();
        Ok(&self.bottle_types[idx])
    }

    fn bottle_type_index(&self, reference: &str) -> Result<usize> {
        self.bottle_types
            .iter()
            .position(|b| b.id == reference || b.name == reference)
            .ok_or_else(|| DepotError::BottleTypeNotFound(reference.to_string()))
    }

    pub fn bottle_type(&self, reference: &str) -> Result<&BottleType> {
        self.bottle_type_index(reference)
            .map(|i| &self.bottle_types[i])
    }

    pub fn bottle_type_by_id(&self, id: &str) -> Result<&BottleType> {
        self.bottle_types
            .iter()
            .find(|b| b.id == id)
            .ok_or_else(|| DepotError::BottleTypeNotFound(id.to_string()))
    }

    fn bottle_type_by_id_mut(&mut self, id: &str) -> Result<&mut BottleType> {
        self.bottle_types
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| DepotError::BottleTypeNotFound(id.to_string()))
    }

    /// Move `quantity` full bottles out to a driver.
    pub fn distribute(&mut self, bottle_type_id: &str, quantity: u32) -> Result<()> {
        let bt = self.bottle_type_by_id_mut(bottle_type_id)?;
        if quantity > bt.remaining_quantity {
            return Err(DepotError::InsufficientStock {
                name: bt.name.clone(),
                requested: quantity,
                available: bt.remaining_quantity,
            });
        }
        bt.distributed_quantity += quantity;
        bt.sync_remaining();
        Ok(())
    }

    /// Settle distributed bottles on a return: `recovered` shells stay in the
    /// fleet, `written_off` shells left it (consigned, defective, lost).
    pub fn settle_distributed(
        &mut self,
        bottle_type_id: &str,
        recovered: u32,
        written_off: u32,
    ) -> Result<()> {
        let bt = self.bottle_type_by_id_mut(bottle_type_id)?;
        bt.distributed_quantity -= recovered + written_off;
        bt.total_quantity -= written_off;
        bt.sync_remaining();
        Ok(())
    }

    // --- drivers & clients ---

    pub fn add_driver(&mut self, name: &str) -> Result<&Driver> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DepotError::EmptyName);
        }
        let id = self.mint("drv");
        self.drivers.push(Driver {
            id,
            name: name.to_string(),
            debt: 0.0,
            advances: 0.0,
            balance: 0.0,
        });
        Ok(self.drivers.last().unwrap())
    }

    pub fn driver(&self, reference: &str) -> Result<&Driver> {
        self.drivers
            .iter()
            .find(|d| d.id == reference || d.name == reference)
            .ok_or_else(|| DepotError::DriverNotFound(reference.to_string()))
    }

    pub fn driver_mut(&mut self, reference: &str) -> Result<&mut Driver> {
        self.drivers
            .iter_mut()
            .find(|d| d.id == reference || d.name == reference)
            .ok_or_else(|| DepotError::DriverNotFound(reference.to_string()))
    }

    pub fn record_advance(&mut self, reference: &str, amount: f64) -> Result<&Driver> {
        if amount <= 0.0 {
            return Err(DepotError::InvalidAmount);
        }
        let driver = self.driver_mut(reference)?;
        driver.advances += amount;
        driver.sync_balance();
        Ok(driver)
    }

    pub fn charge_driver(&mut self, reference: &str, amount: f64) -> Result<&Driver> {
        let driver = self.driver_mut(reference)?;
        driver.debt += amount;
        driver.sync_balance();
        Ok(driver)
    }

    pub fn add_client(&mut self, name: &str) -> Result<&Client> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DepotError::EmptyName);
        }
        let id = self.mint("cli");
        self.clients.push(Client {
            id,
            name: name.to_string(),
        });
        Ok(self.clients.last().unwrap())
    }

    pub fn client(&self, reference: &str) -> Result<&Client> {
        self.clients
            .iter()
            .find(|c| c.id == reference || c.name == reference)
            .ok_or_else(|| DepotError::ClientNotFound(reference.to_string()))
    }

    // --- empty shell stock ---

    pub fn empty_stock_for(&self, bottle_type_id: &str) -> u32 {
        self.empty_stock.get(bottle_type_id).copied().unwrap_or(0)
    }

    pub fn set_empty_stock(&mut self, reference: &str, quantity: u32) -> Result<()> {
        let id = self.bottle_type(reference)?.id.clone();
        self.empty_stock.insert(id, quantity);
        Ok(())
    }

    pub fn adjust_empty_stock(&mut self, reference: &str, delta: i64) -> Result<u32> {
        let bt = self.bottle_type(reference)?;
        let (id, name) = (bt.id.clone(), bt.name.clone());
        let current = self.empty_stock_for(&id);
        let next = current as i64 + delta;
        if next < 0 {
            return Err(DepotError::NegativeEmptyStock {
                name,
                available: current,
                removing: delta.unsigned_abs() as u32,
            });
        }
        self.empty_stock.insert(id, next as u32);
        Ok(next as u32)
    }

    // --- foreign bottles ---

    #[allow(clippy::too_many_arguments)]
    pub fn add_foreign_bottle(
        &mut self,
        date: NaiveDate,
        brand: &str,
        capacity_kg: f64,
        quantity: u32,
        driver_id: Option<String>,
        note: Option<String>,
    ) -> Result<&ForeignBottle> {
        if quantity == 0 {
            return Err(DepotError::InvalidAmount);
        }
        let id = self.mint("fb");
        self.foreign_bottles.push(ForeignBottle {
            id,
            date,
            brand: brand.to_string(),
            capacity_kg,
            quantity,
            driver_id,
            note,
        });
        Ok(self.foreign_bottles.last().unwrap())
    }

    // --- orders ---

    /// Resolve a supply order reference to its index in `supply_orders`.
    /// Accepts either a 1-based index from 'orders' (newest first) or the
    /// full B.S number.
    pub fn resolve_supply_order(&self, reference: &str) -> Result<usize> {
        if let Ok(idx) = reference.parse::<usize>() {
            if idx == 0 || idx > self.supply_orders.len() {
                return Err(DepotError::InvalidOrderIndex(reference.to_string()));
            }
            return Ok(self.supply_orders.len() - idx);
        }

        self.supply_orders
            .iter()
            .position(|o| o.number == reference)
            .ok_or_else(|| DepotError::OrderNotFound(reference.to_string()))
    }

    /// The return order settling a supply order, if one exists.
    pub fn return_for(&self, supply_order_id: &str) -> Option<&ReturnOrder> {
        self.return_orders
            .iter()
            .find(|r| r.supply_order_id == supply_order_id)
    }

    pub fn mint_supply_order_id(&mut self) -> String {
        self.mint("so")
    }

    pub fn mint_return_order_id(&mut self) -> String {
        self.mint("ro")
    }

    /// Total outstanding driver debt across the fleet.
    pub fn outstanding_debt(&self) -> f64 {
        self.drivers.iter().map(|d| d.balance.max(0.0)).sum()
    }
}
