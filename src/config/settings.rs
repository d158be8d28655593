use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub depot: Depot,
    pub billing: BillingSettings,
    /// Competitor brands accepted when recording foreign bottles.
    #[serde(default)]
    pub brands: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Depot {
    pub name: String,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct BillingSettings {
    /// Bon de Sortie number template, e.g. "BS-{year}-{seq:04}"
    pub supply_number_format: String,
    /// Bon de Retour number template, e.g. "BR-{year}-{seq:04}"
    pub return_number_format: String,
    pub currency: String,
    pub currency_symbol: String,
    /// Default fractional tax rate applied to new bottle types.
    #[serde(default)]
    pub default_tax_rate: f64,
}
