use chrono::NaiveDate;

use crate::config::Config;
use crate::error::{DepotError, Result};
use crate::ledger;
use crate::store::{Store, SupplyOrder, SupplyOrderItem};

const SUPPLY_ITEM_FORMAT: &str = "type:full[:empty]";

/// Upper bound on any single quantity field. Keeps disposition sums well
/// inside u32 range (at most six fields per item) and catches typos like a
/// pasted timestamp long before stock checks run.
pub(super) const MAX_ITEM_QUANTITY: u32 = 1_000_000;

/// One `--item` argument of the supply command, before catalog lookup.
#[derive(Debug, PartialEq, Eq)]
pub struct SupplyItemInput {
    pub bottle_type: String,
    pub full: u32,
    pub empty: u32,
}

/// Parse item input like "butane-12:5:3" into type + full/empty quantities.
/// The empty-bottle count may be omitted.
pub fn parse_supply_item(input: &str) -> Result<SupplyItemInput> {
    let parts: Vec<&str> = input.split(':').collect();
    if parts.len() != 2 && parts.len() != 3 {
        return Err(DepotError::InvalidItemFormat(
            input.to_string(),
            SUPPLY_ITEM_FORMAT,
        ));
    }

    let bottle_type = parts[0].to_string();
    let full = parse_quantity(&bottle_type, parts[1])?;
    let empty = if parts.len() == 3 {
        parse_quantity(&bottle_type, parts[2])?
    } else {
        0
    };

    Ok(SupplyItemInput {
        bottle_type,
        full,
        empty,
    })
}

pub(super) fn parse_quantity(item: &str, qty_str: &str) -> Result<u32> {
    let qty: u32 = qty_str.parse().map_err(|_| DepotError::InvalidQuantity {
        item: item.to_string(),
        qty: qty_str.to_string(),
        reason: "must be a whole number".to_string(),
    })?;
    if qty > MAX_ITEM_QUANTITY {
        return Err(DepotError::InvalidQuantity {
            item: item.to_string(),
            qty: qty_str.to_string(),
            reason: format!("must be {} or less", MAX_ITEM_QUANTITY),
        });
    }
    Ok(qty)
}

/// Create a Bon de Sortie and everything that hangs off it: the order record,
/// one journal entry per non-zero quantity bucket, and the stock moves.
///
/// All effects land on the in-memory store; the caller persists with a single
/// save, so any error here leaves the state file untouched.
pub fn create_supply_order(
    config: &Config,
    store: &mut Store,
    driver_ref: &str,
    client_ref: &str,
    inputs: &[String],
    date: NaiveDate,
) -> Result<SupplyOrder> {
    if inputs.is_empty() {
        return Err(DepotError::NoItems);
    }

    let driver_id = store.driver(driver_ref)?.id.clone();
    let client_id = store.client(client_ref)?.id.clone();

    // Parse, look up and filter line items. Items with both quantities at
    // zero are dropped before anything is recorded.
    let mut items: Vec<SupplyOrderItem> = Vec::new();
    for input in inputs {
        let parsed = parse_supply_item(input)?;
        if parsed.full == 0 && parsed.empty == 0 {
            continue;
        }

        let bt = store.bottle_type(&parsed.bottle_type)?;
        if parsed.full > bt.remaining_quantity {
            return Err(DepotError::InsufficientStock {
                name: bt.name.clone(),
                requested: parsed.full,
                available: bt.remaining_quantity,
            });
        }
        let empty_available = store.empty_stock_for(&bt.id);
        if parsed.empty > empty_available {
            return Err(DepotError::InsufficientEmptyStock {
                name: bt.name.clone(),
                requested: parsed.empty,
                available: empty_available,
            });
        }

        let amount = bt.unit_price * parsed.full as f64;
        items.push(SupplyOrderItem {
            bottle_type_id: bt.id.clone(),
            bottle_type_name: bt.name.clone(),
            full_quantity: parsed.full,
            empty_quantity: parsed.empty,
            unit_price: bt.unit_price,
            tax_rate: bt.tax_rate,
            amount,
        });
    }

    if items.is_empty() {
        return Err(DepotError::EmptyOrder);
    }

    let subtotal: f64 = items.iter().map(|i| i.amount).sum();
    let tax: f64 = items.iter().map(|i| i.amount * i.tax_rate).sum();
    let total = subtotal + tax;

    let number = store.next_supply_number(&config.billing.supply_number_format, date);
    let id = store.mint_supply_order_id();

    let order = SupplyOrder {
        id,
        number,
        date,
        driver_id,
        client_id,
        items,
        subtotal,
        tax,
        total,
    };

    // Apply: order record, journal entries, stock moves. One logical submit.
    let txs = ledger::supply_transactions(&order);
    for item in &order.items {
        if item.full_quantity > 0 {
            store.distribute(&item.bottle_type_id, item.full_quantity)?;
        }
        if item.empty_quantity > 0 {
            store.adjust_empty_stock(&item.bottle_type_id, -(item.empty_quantity as i64))?;
        }
    }
    store.transactions.extend(txs);
    store.supply_orders.push(order.clone());

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::BottleStatus;

    fn test_config() -> Config {
        toml::from_str(crate::config::CONFIG_TEMPLATE).unwrap()
    }

    fn seeded_store() -> Store {
        let mut store = Store::default();
        store
            .add_bottle_type("Butane 12kg", 12.0, 100, 200.0, 0.19)
            .unwrap();
        store
            .add_bottle_type("Propane 35kg", 35.0, 40, 500.0, 0.19)
            .unwrap();
        store.set_empty_stock("Butane 12kg", 10).unwrap();
        store.add_driver("Karim").unwrap();
        store.add_client("Cafe du Port").unwrap();
        store
    }

    #[test]
    fn parse_accepts_two_or_three_fields() {
        assert_eq!(
            parse_supply_item("butane:5:3").unwrap(),
            SupplyItemInput {
                bottle_type: "butane".into(),
                full: 5,
                empty: 3
            }
        );
        assert_eq!(parse_supply_item("butane:5").unwrap().empty, 0);
        assert!(matches!(
            parse_supply_item("butane"),
            Err(DepotError::InvalidItemFormat(..))
        ));
        assert!(matches!(
            parse_supply_item("butane:x"),
            Err(DepotError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn quantities_beyond_the_cap_are_rejected() {
        assert_eq!(
            parse_quantity("butane", "1000000").unwrap(),
            MAX_ITEM_QUANTITY
        );
        assert!(matches!(
            parse_quantity("butane", "1000001"),
            Err(DepotError::InvalidQuantity { .. })
        ));
        // u32::MAX parses but must not get through
        assert!(matches!(
            parse_supply_item("butane:4294967295"),
            Err(DepotError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn order_emits_two_entries_per_mixed_item() {
        let config = test_config();
        let mut store = seeded_store();

        let order = create_supply_order(
            &config,
            &mut store,
            "Karim",
            "Cafe du Port",
            &["Butane 12kg:5:3".to_string()],
            chrono::NaiveDate::from_ymd_opt(2026, 2, 14).unwrap(),
        )
        .unwrap();

        assert_eq!(order.number, "BS-2026-0001");
        assert_eq!(store.transactions.len(), 2);
        assert_eq!(store.transactions[0].lines[0].status, BottleStatus::Unsold);
        assert_eq!(store.transactions[0].lines[0].quantity, 5);
        assert_eq!(store.transactions[1].lines[0].status, BottleStatus::Empty);
        assert_eq!(store.transactions[1].lines[0].quantity, 3);

        // stock moved in the same submit
        let bt = store.bottle_type("Butane 12kg").unwrap();
        assert_eq!(bt.distributed_quantity, 5);
        assert_eq!(bt.remaining_quantity, 95);
        assert_eq!(store.empty_stock_for(&bt.id), 7);
    }

    #[test]
    fn zero_quantity_items_are_filtered() {
        let config = test_config();
        let mut store = seeded_store();

        let order = create_supply_order(
            &config,
            &mut store,
            "Karim",
            "Cafe du Port",
            &[
                "Butane 12kg:0:0".to_string(),
                "Propane 35kg:2".to_string(),
            ],
            chrono::NaiveDate::from_ymd_opt(2026, 2, 14).unwrap(),
        )
        .unwrap();

        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].bottle_type_name, "Propane 35kg");
        assert_eq!(store.transactions.len(), 1);
    }

    #[test]
    fn all_zero_order_is_rejected() {
        let config = test_config();
        let mut store = seeded_store();

        let err = create_supply_order(
            &config,
            &mut store,
            "Karim",
            "Cafe du Port",
            &["Butane 12kg:0:0".to_string()],
            chrono::NaiveDate::from_ymd_opt(2026, 2, 14).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, DepotError::EmptyOrder));
        assert!(store.supply_orders.is_empty());
        assert!(store.transactions.is_empty());
    }

    #[test]
    fn totals_use_per_item_tax_rates() {
        let config = test_config();
        let mut store = seeded_store();

        let order = create_supply_order(
            &config,
            &mut store,
            "Karim",
            "Cafe du Port",
            &[
                "Butane 12kg:5".to_string(),
                "Propane 35kg:2".to_string(),
            ],
            chrono::NaiveDate::from_ymd_opt(2026, 2, 14).unwrap(),
        )
        .unwrap();

        // 5 x 200 + 2 x 500 = 2000, tax 19% = 380
        assert!((order.subtotal - 2000.0).abs() < 1e-9);
        assert!((order.tax - 380.0).abs() < 1e-9);
        assert!((order.total - 2380.0).abs() < 1e-9);
    }

    #[test]
    fn oversupply_is_rejected_before_recording() {
        let config = test_config();
        let mut store = seeded_store();

        let err = create_supply_order(
            &config,
            &mut store,
            "Karim",
            "Cafe du Port",
            &["Propane 35kg:41".to_string()],
            chrono::NaiveDate::from_ymd_opt(2026, 2, 14).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, DepotError::InsufficientStock { .. }));
        assert!(store.supply_orders.is_empty());
        assert!(store.transactions.is_empty());
    }

    #[test]
    fn empties_beyond_stock_are_rejected() {
        let config = test_config();
        let mut store = seeded_store();

        let err = create_supply_order(
            &config,
            &mut store,
            "Karim",
            "Cafe du Port",
            &["Butane 12kg:1:11".to_string()],
            chrono::NaiveDate::from_ymd_opt(2026, 2, 14).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, DepotError::InsufficientEmptyStock { .. }));
    }

    #[test]
    fn unknown_driver_or_client_is_rejected() {
        let config = test_config();
        let mut store = seeded_store();
        let date = chrono::NaiveDate::from_ymd_opt(2026, 2, 14).unwrap();

        assert!(matches!(
            create_supply_order(
                &config,
                &mut store,
                "ghost",
                "Cafe du Port",
                &["Butane 12kg:1".to_string()],
                date
            ),
            Err(DepotError::DriverNotFound(_))
        ));
        assert!(matches!(
            create_supply_order(
                &config,
                &mut store,
                "Karim",
                "ghost",
                &["Butane 12kg:1".to_string()],
                date
            ),
            Err(DepotError::ClientNotFound(_))
        ));
    }
}
