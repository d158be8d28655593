use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::config::Config;
use crate::error::{DepotError, Result};
use crate::ledger;
use crate::store::{ReturnOrder, ReturnOrderItem, Store};

const RETURN_ITEM_FORMAT: &str = "type:full:empty:consigned:foreign:defective:lost";

/// Brand label used for foreign bottles collected on a return when the
/// driver could not identify the brand.
const UNKNOWN_BRAND: &str = "inconnu";

/// One `--item` argument of the return command: the full disposition of a
/// bottle type issued on the supply order.
#[derive(Debug, PartialEq, Eq)]
pub struct ReturnItemInput {
    pub bottle_type: String,
    pub returned_full: u32,
    pub returned_empty: u32,
    pub consigned: u32,
    pub foreign: u32,
    pub defective: u32,
    pub lost: u32,
}

impl ReturnItemInput {
    fn is_zero(&self) -> bool {
        self.returned_full
            + self.returned_empty
            + self.consigned
            + self.foreign
            + self.defective
            + self.lost
            == 0
    }
}

/// Parse item input like "butane-12:1:6:2:0:0:1" into a full disposition.
/// All six quantity fields are required so omissions are always deliberate.
pub fn parse_return_item(input: &str) -> Result<ReturnItemInput> {
    let parts: Vec<&str> = input.split(':').collect();
    if parts.len() != 7 {
        return Err(DepotError::InvalidItemFormat(
            input.to_string(),
            RETURN_ITEM_FORMAT,
        ));
    }

    let bottle_type = parts[0].to_string();
    let qty = |s: &str| super::supply::parse_quantity(&bottle_type, s);

    Ok(ReturnItemInput {
        returned_full: qty(parts[1])?,
        returned_empty: qty(parts[2])?,
        consigned: qty(parts[3])?,
        foreign: qty(parts[4])?,
        defective: qty(parts[5])?,
        lost: qty(parts[6])?,
        bottle_type,
    })
}

/// Record a Bon de Retour against a supply order: the return record, the
/// journal entries (pleins, vides, ventes, etranger, casse/perte), the stock
/// settlement, any foreign-bottle records and the driver debt change.
///
/// Like supply creation, every effect lands on the in-memory store and the
/// caller persists once at the end.
#[allow(clippy::too_many_arguments)]
pub fn record_return(
    config: &Config,
    store: &mut Store,
    order_ref: &str,
    inputs: &[String],
    expenses: f64,
    brand: Option<&str>,
    date: NaiveDate,
) -> Result<ReturnOrder> {
    if inputs.is_empty() {
        return Err(DepotError::NoItems);
    }
    if expenses < 0.0 {
        return Err(DepotError::InvalidAmount);
    }
    if let Some(b) = brand {
        if !config.brands.iter().any(|known| known == b) {
            return Err(DepotError::UnknownBrand(b.to_string()));
        }
    }

    let order_idx = store.resolve_supply_order(order_ref)?;
    let order = store.supply_orders[order_idx].clone();

    if let Some(existing) = store.return_for(&order.id) {
        return Err(DepotError::OrderAlreadySettled(
            order.number.clone(),
            existing.number.clone(),
        ));
    }

    // Build return items against the order's own line items, pricing at the
    // rates the bottles actually went out at.
    let mut items: Vec<ReturnOrderItem> = Vec::new();
    for input in inputs {
        let parsed = parse_return_item(input)?;
        if parsed.is_zero() {
            continue;
        }

        let bt = store.bottle_type(&parsed.bottle_type)?;
        let issued = order
            .items
            .iter()
            .find(|i| i.bottle_type_id == bt.id)
            .ok_or_else(|| {
                DepotError::ItemNotOnOrder(bt.name.clone(), order.number.clone())
            })?;

        let sold_quantity = parsed.returned_empty + parsed.consigned;
        items.push(ReturnOrderItem {
            bottle_type_id: bt.id.clone(),
            bottle_type_name: bt.name.clone(),
            returned_full: parsed.returned_full,
            returned_empty: parsed.returned_empty,
            consigned: parsed.consigned,
            foreign: parsed.foreign,
            defective: parsed.defective,
            lost: parsed.lost,
            unit_price: issued.unit_price,
            sold_quantity,
            sales_amount: issued.unit_price * sold_quantity as f64,
        });
    }

    if items.is_empty() {
        return Err(DepotError::EmptyOrder);
    }

    // Dispositions summed per type must fit within what the B.S issued.
    // Foreign bottles are extraneous and do not count against the order.
    let mut accounted: BTreeMap<&str, u32> = BTreeMap::new();
    for item in &items {
        *accounted.entry(item.bottle_type_id.as_str()).or_default() += item.accounted();
    }
    for (type_id, returned) in accounted {
        let issued = order
            .items
            .iter()
            .find(|i| i.bottle_type_id == type_id)
            .map(|i| i.full_quantity)
            .unwrap_or(0);
        if returned > issued {
            let name = store.bottle_type_by_id(type_id)?.name.clone();
            return Err(DepotError::ReturnExceedsIssued {
                name,
                returned,
                issued,
                order: order.number.clone(),
            });
        }
    }

    let total_sales: f64 = items.iter().map(|i| i.sales_amount).sum();
    let total_consigned: f64 = items
        .iter()
        .map(|i| i.unit_price * i.consigned as f64)
        .sum();
    let net_sales = total_sales - expenses;
    let driver_debt_change = net_sales;

    let number = store.next_return_number(&config.billing.return_number_format, date);
    let id = store.mint_return_order_id();

    let ret = ReturnOrder {
        id,
        number,
        date,
        supply_order_id: order.id.clone(),
        driver_id: order.driver_id.clone(),
        items,
        total_sales,
        total_expenses: expenses,
        total_consigned,
        net_sales,
        driver_debt_change,
    };

    // Apply: journal entries, stock settlement, foreign records, driver debt.
    let txs = ledger::return_transactions(&ret, &order.number);
    for item in &ret.items {
        let recovered = item.returned_full + item.returned_empty;
        let written_off = item.consigned + item.defective + item.lost;
        store.settle_distributed(&item.bottle_type_id, recovered, written_off)?;
        if item.returned_empty > 0 {
            store.adjust_empty_stock(&item.bottle_type_id, item.returned_empty as i64)?;
        }
        if item.foreign > 0 {
            let capacity = store.bottle_type_by_id(&item.bottle_type_id)?.capacity_kg;
            store.add_foreign_bottle(
                date,
                brand.unwrap_or(UNKNOWN_BRAND),
                capacity,
                item.foreign,
                Some(ret.driver_id.clone()),
                Some(format!("Collecte {}", ret.number)),
            )?;
        }
    }
    store.charge_driver(&ret.driver_id, driver_debt_change)?;
    store.transactions.extend(txs);
    store.return_orders.push(ret.clone());

    Ok(ret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::create_supply_order;
    use crate::store::BottleStatus;

    fn test_config() -> Config {
        toml::from_str(crate::config::CONFIG_TEMPLATE).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 14).unwrap()
    }

    /// Store with one issued order: 10 full + 2 empty Butane 12kg.
    fn store_with_order(config: &Config) -> Store {
        let mut store = Store::default();
        store
            .add_bottle_type("Butane 12kg", 12.0, 100, 200.0, 0.19)
            .unwrap();
        store.set_empty_stock("Butane 12kg", 5).unwrap();
        store.add_driver("Karim").unwrap();
        store.add_client("Cafe du Port").unwrap();
        create_supply_order(
            config,
            &mut store,
            "Karim",
            "Cafe du Port",
            &["Butane 12kg:10:2".to_string()],
            date(),
        )
        .unwrap();
        store
    }

    #[test]
    fn parse_requires_all_seven_fields() {
        let item = parse_return_item("butane:1:6:2:0:0:1").unwrap();
        assert_eq!(item.returned_full, 1);
        assert_eq!(item.returned_empty, 6);
        assert_eq!(item.consigned, 2);
        assert_eq!(item.lost, 1);
        assert!(matches!(
            parse_return_item("butane:1:6"),
            Err(DepotError::InvalidItemFormat(..))
        ));
    }

    #[test]
    fn sold_is_empties_plus_consigned() {
        let config = test_config();
        let mut store = store_with_order(&config);
        let tx_before = store.transactions.len();

        let ret = record_return(
            &config,
            &mut store,
            "BS-2026-0001",
            &["Butane 12kg:0:2:1:0:0:0".to_string()],
            0.0,
            None,
            date(),
        )
        .unwrap();

        assert_eq!(ret.items[0].sold_quantity, 3);
        assert!((ret.total_sales - 600.0).abs() < 1e-9);
        assert!((ret.total_consigned - 200.0).abs() < 1e-9);

        let new_txs = &store.transactions[tx_before..];
        let sold: Vec<_> = new_txs
            .iter()
            .filter(|t| t.lines[0].status == BottleStatus::Sold)
            .collect();
        assert_eq!(sold.len(), 1);
        assert_eq!(sold[0].lines[0].quantity, 3);
        assert!(!new_txs.iter().any(|t| t.lines.iter().any(|l| matches!(
            l.status,
            BottleStatus::Foreign | BottleStatus::Defective | BottleStatus::Lost
        ))));
    }

    #[test]
    fn full_disposition_settles_stock_and_debt() {
        let config = test_config();
        let mut store = store_with_order(&config);

        // 10 issued: 1 back full, 6 sold shells back, 2 consigned, 1 lost
        let ret = record_return(
            &config,
            &mut store,
            "1",
            &["Butane 12kg:1:6:2:0:0:1".to_string()],
            100.0,
            None,
            date(),
        )
        .unwrap();

        assert_eq!(ret.number, "BR-2026-0001");
        assert_eq!(ret.items[0].sold_quantity, 8);
        // 8 sold x 200 - 100 expenses
        assert!((ret.net_sales - 1500.0).abs() < 1e-9);
        assert!((ret.driver_debt_change - 1500.0).abs() < 1e-9);

        let bt = store.bottle_type("Butane 12kg").unwrap();
        // consigned + lost left the fleet
        assert_eq!(bt.total_quantity, 97);
        assert_eq!(bt.distributed_quantity, 0);
        assert_eq!(bt.remaining_quantity, 97);
        // 5 seeded - 2 issued + 6 back
        assert_eq!(store.empty_stock_for(&bt.id), 9);

        let driver = store.driver("Karim").unwrap();
        assert!((driver.debt - 1500.0).abs() < 1e-9);
        assert!((driver.balance - 1500.0).abs() < 1e-9);
    }

    #[test]
    fn foreign_bottles_get_their_own_record() {
        let config = test_config();
        let mut store = store_with_order(&config);

        record_return(
            &config,
            &mut store,
            "1",
            &["Butane 12kg:10:0:0:3:0:0".to_string()],
            0.0,
            Some("Naftal"),
            date(),
        )
        .unwrap();

        assert_eq!(store.foreign_bottles.len(), 1);
        let fb = &store.foreign_bottles[0];
        assert_eq!(fb.brand, "Naftal");
        assert_eq!(fb.quantity, 3);
        assert_eq!(fb.driver_id.as_deref(), Some("drv-2"));
    }

    #[test]
    fn unknown_brand_is_rejected() {
        let config = test_config();
        let mut store = store_with_order(&config);

        let err = record_return(
            &config,
            &mut store,
            "1",
            &["Butane 12kg:10:0:0:3:0:0".to_string()],
            0.0,
            Some("NoSuchBrand"),
            date(),
        )
        .unwrap_err();
        assert!(matches!(err, DepotError::UnknownBrand(_)));
        assert!(store.return_orders.is_empty());
    }

    #[test]
    fn oversized_disposition_is_a_typed_error() {
        let config = test_config();
        let mut store = store_with_order(&config);

        // u32::MAX would overflow the disposition sum if it got past parsing
        let err = record_return(
            &config,
            &mut store,
            "1",
            &["Butane 12kg:4294967295:0:2:0:0:0".to_string()],
            0.0,
            None,
            date(),
        )
        .unwrap_err();
        assert!(matches!(err, DepotError::InvalidQuantity { .. }));
        assert!(store.return_orders.is_empty());
        assert_eq!(store.transactions.len(), 2); // only the supply entries
    }

    #[test]
    fn disposition_beyond_issued_is_rejected() {
        let config = test_config();
        let mut store = store_with_order(&config);

        let err = record_return(
            &config,
            &mut store,
            "1",
            &["Butane 12kg:5:5:1:0:0:0".to_string()],
            0.0,
            None,
            date(),
        )
        .unwrap_err();
        assert!(matches!(err, DepotError::ReturnExceedsIssued { .. }));
        assert!(store.return_orders.is_empty());
    }

    #[test]
    fn settled_order_cannot_be_returned_twice() {
        let config = test_config();
        let mut store = store_with_order(&config);
        let items = vec!["Butane 12kg:10:0:0:0:0:0".to_string()];

        record_return(&config, &mut store, "1", &items, 0.0, None, date()).unwrap();
        let err = record_return(&config, &mut store, "1", &items, 0.0, None, date())
            .unwrap_err();
        assert!(matches!(err, DepotError::OrderAlreadySettled(..)));
    }

    #[test]
    fn type_not_on_order_is_rejected() {
        let config = test_config();
        let mut store = store_with_order(&config);
        store
            .add_bottle_type("Propane 35kg", 35.0, 40, 500.0, 0.19)
            .unwrap();

        let err = record_return(
            &config,
            &mut store,
            "1",
            &["Propane 35kg:1:0:0:0:0:0".to_string()],
            0.0,
            None,
            date(),
        )
        .unwrap_err();
        assert!(matches!(err, DepotError::ItemNotOnOrder(..)));
    }
}
