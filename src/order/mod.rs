mod returns;
mod supply;

pub use returns::{parse_return_item, record_return, ReturnItemInput};
pub use supply::{create_supply_order, parse_supply_item, SupplyItemInput};
