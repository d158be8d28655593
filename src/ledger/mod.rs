//! Builds inventory journal entries from orders.
//!
//! Emission rules, per order item:
//! - supply: one `unsold` entry if full bottles left the depot, then one
//!   `empty` entry if empty shells did.
//! - return: fixed sequence pleins, vides, ventes, etranger, casse/perte.
//!   The last entry combines a `defective` line and a `lost` line so both
//!   write-offs settle in one journal entry.

use crate::store::{
    BottleStatus, ReturnOrder, Section, SupplyOrder, Transaction, TransactionLine, TxKind,
    TxSource,
};

fn single_line(
    kind: TxKind,
    source: TxSource,
    order_number: &str,
    driver_id: &str,
    client_id: Option<&str>,
    date: chrono::NaiveDate,
    bottle_type_id: &str,
    quantity: u32,
    status: BottleStatus,
    description: String,
) -> Transaction {
    Transaction {
        date,
        kind,
        section: Section::default(),
        source,
        order_number: order_number.to_string(),
        driver_id: driver_id.to_string(),
        client_id: client_id.map(str::to_string),
        lines: vec![TransactionLine {
            bottle_type_id: bottle_type_id.to_string(),
            quantity,
            status,
        }],
        description,
    }
}

/// Journal entries for a Bon de Sortie, in item order.
pub fn supply_transactions(order: &SupplyOrder) -> Vec<Transaction> {
    let mut txs = Vec::new();

    for item in &order.items {
        if item.full_quantity > 0 {
            txs.push(single_line(
                TxKind::Supply,
                TxSource::Depot,
                &order.number,
                &order.driver_id,
                Some(&order.client_id),
                order.date,
                &item.bottle_type_id,
                item.full_quantity,
                BottleStatus::Unsold,
                format!(
                    "Sortie pleins: {} x {} ({})",
                    item.full_quantity, item.bottle_type_name, order.number
                ),
            ));
        }
        if item.empty_quantity > 0 {
            txs.push(single_line(
                TxKind::Supply,
                TxSource::Depot,
                &order.number,
                &order.driver_id,
                Some(&order.client_id),
                order.date,
                &item.bottle_type_id,
                item.empty_quantity,
                BottleStatus::Empty,
                format!(
                    "Sortie vides: {} x {} ({})",
                    item.empty_quantity, item.bottle_type_name, order.number
                ),
            ));
        }
    }

    txs
}

/// Journal entries for a Bon de Retour, in item order. `supply_number` is the
/// settled B.S, kept in the descriptions for traceability.
pub fn return_transactions(ret: &ReturnOrder, supply_number: &str) -> Vec<Transaction> {
    let mut txs = Vec::new();

    for item in &ret.items {
        if item.returned_full > 0 {
            txs.push(single_line(
                TxKind::Return,
                TxSource::SupplyReturn,
                &ret.number,
                &ret.driver_id,
                None,
                ret.date,
                &item.bottle_type_id,
                item.returned_full,
                BottleStatus::Unsold,
                format!(
                    "Retour pleins: {} x {} ({} sur {})",
                    item.returned_full, item.bottle_type_name, ret.number, supply_number
                ),
            ));
        }
        if item.returned_empty > 0 {
            txs.push(single_line(
                TxKind::Return,
                TxSource::SupplyReturn,
                &ret.number,
                &ret.driver_id,
                None,
                ret.date,
                &item.bottle_type_id,
                item.returned_empty,
                BottleStatus::Empty,
                format!(
                    "Retour vides: {} x {} ({} sur {})",
                    item.returned_empty, item.bottle_type_name, ret.number, supply_number
                ),
            ));
        }
        if item.sold_quantity > 0 {
            txs.push(single_line(
                TxKind::Return,
                TxSource::SupplyReturn,
                &ret.number,
                &ret.driver_id,
                None,
                ret.date,
                &item.bottle_type_id,
                item.sold_quantity,
                BottleStatus::Sold,
                format!(
                    "Ventes: {} x {} dont {} en consigne ({})",
                    item.sold_quantity, item.bottle_type_name, item.consigned, ret.number
                ),
            ));
        }
        if item.foreign > 0 {
            txs.push(single_line(
                TxKind::Return,
                TxSource::SupplyReturn,
                &ret.number,
                &ret.driver_id,
                None,
                ret.date,
                &item.bottle_type_id,
                item.foreign,
                BottleStatus::Foreign,
                format!(
                    "Bouteilles etrangeres: {} x {} ({})",
                    item.foreign, item.bottle_type_name, ret.number
                ),
            ));
        }
        if item.defective + item.lost > 0 {
            let mut lines = Vec::new();
            if item.defective > 0 {
                lines.push(TransactionLine {
                    bottle_type_id: item.bottle_type_id.clone(),
                    quantity: item.defective,
                    status: BottleStatus::Defective,
                });
            }
            if item.lost > 0 {
                lines.push(TransactionLine {
                    bottle_type_id: item.bottle_type_id.clone(),
                    quantity: item.lost,
                    status: BottleStatus::Lost,
                });
            }
            txs.push(Transaction {
                date: ret.date,
                kind: TxKind::Return,
                section: Section::default(),
                source: TxSource::SupplyReturn,
                order_number: ret.number.clone(),
                driver_id: ret.driver_id.clone(),
                client_id: None,
                lines,
                description: format!(
                    "Casse et pertes: {} defectueuse(s), {} perdue(s) x {} ({})",
                    item.defective, item.lost, item.bottle_type_name, ret.number
                ),
            });
        }
    }

    txs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ReturnOrderItem, SupplyOrderItem};
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 14).unwrap()
    }

    fn supply_order(items: Vec<SupplyOrderItem>) -> SupplyOrder {
        SupplyOrder {
            id: "so-9".into(),
            number: "BS-2026-0009".into(),
            date: date(),
            driver_id: "drv-1".into(),
            client_id: "cli-1".into(),
            items,
            subtotal: 0.0,
            tax: 0.0,
            total: 0.0,
        }
    }

    fn supply_item(full: u32, empty: u32) -> SupplyOrderItem {
        SupplyOrderItem {
            bottle_type_id: "b1".into(),
            bottle_type_name: "Butane 12kg".into(),
            full_quantity: full,
            empty_quantity: empty,
            unit_price: 200.0,
            tax_rate: 0.19,
            amount: 200.0 * full as f64,
        }
    }

    fn return_order(items: Vec<ReturnOrderItem>) -> ReturnOrder {
        ReturnOrder {
            id: "ro-3".into(),
            number: "BR-2026-0003".into(),
            date: date(),
            supply_order_id: "so-9".into(),
            driver_id: "drv-1".into(),
            items,
            total_sales: 0.0,
            total_expenses: 0.0,
            total_consigned: 0.0,
            net_sales: 0.0,
            driver_debt_change: 0.0,
        }
    }

    fn return_item(
        full: u32,
        empty: u32,
        consigned: u32,
        foreign: u32,
        defective: u32,
        lost: u32,
    ) -> ReturnOrderItem {
        ReturnOrderItem {
            bottle_type_id: "b1".into(),
            bottle_type_name: "Butane 12kg".into(),
            returned_full: full,
            returned_empty: empty,
            consigned,
            foreign,
            defective,
            lost,
            unit_price: 200.0,
            sold_quantity: empty + consigned,
            sales_amount: 200.0 * (empty + consigned) as f64,
        }
    }

    #[test]
    fn supply_item_emits_unsold_then_empty() {
        let order = supply_order(vec![supply_item(5, 3)]);
        let txs = supply_transactions(&order);

        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].lines.len(), 1);
        assert_eq!(txs[0].lines[0].status, BottleStatus::Unsold);
        assert_eq!(txs[0].lines[0].quantity, 5);
        assert_eq!(txs[1].lines[0].status, BottleStatus::Empty);
        assert_eq!(txs[1].lines[0].quantity, 3);
        assert!(txs.iter().all(|t| t.kind == TxKind::Supply));
        assert!(txs.iter().all(|t| t.source == TxSource::Depot));
        assert!(txs.iter().all(|t| t.order_number == "BS-2026-0009"));
    }

    #[test]
    fn supply_item_with_only_fulls_emits_one_entry() {
        let order = supply_order(vec![supply_item(4, 0)]);
        let txs = supply_transactions(&order);
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].lines[0].status, BottleStatus::Unsold);
    }

    #[test]
    fn sold_entry_covers_empties_and_consigned() {
        let ret = return_order(vec![return_item(0, 2, 1, 0, 0, 0)]);
        let txs = return_transactions(&ret, "BS-2026-0009");

        // one empty entry plus one sold entry, nothing else
        assert_eq!(txs.len(), 2);
        let sold: Vec<_> = txs
            .iter()
            .filter(|t| t.lines[0].status == BottleStatus::Sold)
            .collect();
        assert_eq!(sold.len(), 1);
        assert_eq!(sold[0].lines[0].quantity, 3);
        assert!(!txs.iter().any(|t| t
            .lines
            .iter()
            .any(|l| matches!(
                l.status,
                BottleStatus::Foreign | BottleStatus::Defective | BottleStatus::Lost
            ))));
    }

    #[test]
    fn return_emission_order_is_fixed() {
        let ret = return_order(vec![return_item(1, 2, 1, 3, 2, 1)]);
        let txs = return_transactions(&ret, "BS-2026-0009");

        let statuses: Vec<BottleStatus> = txs.iter().map(|t| t.lines[0].status).collect();
        assert_eq!(
            statuses,
            vec![
                BottleStatus::Unsold,
                BottleStatus::Empty,
                BottleStatus::Sold,
                BottleStatus::Foreign,
                BottleStatus::Defective,
            ]
        );
        // the final entry carries the lost line after the defective one
        let last = txs.last().unwrap();
        assert_eq!(last.lines.len(), 2);
        assert_eq!(last.lines[1].status, BottleStatus::Lost);
        assert_eq!(last.lines[1].quantity, 1);
        assert!(txs.iter().all(|t| t.kind == TxKind::Return));
        assert!(txs.iter().all(|t| t.source == TxSource::SupplyReturn));
    }

    #[test]
    fn defective_only_settles_without_lost_line() {
        let ret = return_order(vec![return_item(0, 0, 0, 0, 2, 0)]);
        let txs = return_transactions(&ret, "BS-2026-0009");
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].lines.len(), 1);
        assert_eq!(txs[0].lines[0].status, BottleStatus::Defective);
    }

    #[test]
    fn all_zero_item_emits_nothing() {
        let ret = return_order(vec![return_item(0, 0, 0, 0, 0, 0)]);
        assert!(return_transactions(&ret, "BS-2026-0009").is_empty());
    }
}
