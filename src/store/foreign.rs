use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A competitor-brand bottle taken in by the depot.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ForeignBottle {
    pub id: String,
    pub date: NaiveDate,
    pub brand: String,
    pub capacity_kg: f64,
    pub quantity: u32,
    #[serde(default)]
    pub driver_id: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}
