pub mod config;
pub mod error;
pub mod ledger;
pub mod order;
pub mod store;

pub use config::Config;
pub use error::{DepotError, Result};
pub use order::{create_supply_order, record_return};
pub use store::Store;
