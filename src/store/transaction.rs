use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An inventory ledger entry. One entry is written per quantity bucket of an
/// order item (full bottles out, empties out, sales, foreign collections,
/// breakage and losses), never mixed across buckets except for the combined
/// defective/lost entry which carries one line per status.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Transaction {
    pub date: NaiveDate,
    pub kind: TxKind,
    pub section: Section,
    pub source: TxSource,
    pub order_number: String,
    pub driver_id: String,
    #[serde(default)]
    pub client_id: Option<String>,
    pub lines: Vec<TransactionLine>,
    pub description: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TransactionLine {
    pub bottle_type_id: String,
    pub quantity: u32,
    pub status: BottleStatus,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Supply,
    Return,
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxKind::Supply => write!(f, "supply"),
            TxKind::Return => write!(f, "return"),
        }
    }
}

/// Ledger section. Only the inventory journal exists today.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    #[serde(rename = "inventaire")]
    Inventaire,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum TxSource {
    /// Written when stock leaves the depot on a Bon de Sortie.
    #[serde(rename = "allogaz")]
    Depot,
    /// Written when a Bon de Retour reconciles a supply order.
    #[serde(rename = "supply-return")]
    SupplyReturn,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BottleStatus {
    /// Full bottle out with a driver (or back unsold).
    Unsold,
    /// Empty shell moved.
    Empty,
    /// Sold: empty shell returned or bottle left on consignment.
    Sold,
    /// Competitor-brand bottle collected by a driver.
    Foreign,
    Defective,
    Lost,
}

impl fmt::Display for BottleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BottleStatus::Unsold => "unsold",
            BottleStatus::Empty => "empty",
            BottleStatus::Sold => "sold",
            BottleStatus::Foreign => "foreign",
            BottleStatus::Defective => "defective",
            BottleStatus::Lost => "lost",
        };
        write!(f, "{s}")
    }
}
