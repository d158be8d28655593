use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DepotError {
    #[error("Config directory not found at {0}. Run 'gasdepot init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to parse state file {path}: {source}")]
    StateParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Bottle type '{0}' not found")]
    BottleTypeNotFound(String),

    #[error("Bottle type '{0}' already exists")]
    DuplicateBottleType(String),

    #[error("Driver '{0}' not found")]
    DriverNotFound(String),

    #[error("Client '{0}' not found")]
    ClientNotFound(String),

    #[error("Supply order '{0}' not found")]
    OrderNotFound(String),

    #[error("Invalid order index '{0}'. Use 'gasdepot orders' to see available orders.")]
    InvalidOrderIndex(String),

    #[error("Supply order {0} has already been settled by return order {1}")]
    OrderAlreadySettled(String, String),

    #[error("Invalid item format '{0}'. Expected '{1}'")]
    InvalidItemFormat(String, &'static str),

    #[error("Invalid quantity '{qty}' for '{item}': {reason}")]
    InvalidQuantity {
        item: String,
        qty: String,
        reason: String,
    },

    #[error("No items specified. Use --item to add line items.")]
    NoItems,

    #[error("All items have zero quantities; nothing to record")]
    EmptyOrder,

    #[error("Not enough full bottles of '{name}': requested {requested}, {available} remaining")]
    InsufficientStock {
        name: String,
        requested: u32,
        available: u32,
    },

    #[error("Not enough empty bottles of '{name}' in stock: requested {requested}, {available} available")]
    InsufficientEmptyStock {
        name: String,
        requested: u32,
        available: u32,
    },

    #[error("Bottle type '{0}' is not on supply order {1}")]
    ItemNotOnOrder(String, String),

    #[error("Return of {returned} bottles of '{name}' exceeds the {issued} issued on {order}")]
    ReturnExceedsIssued {
        name: String,
        returned: u32,
        issued: u32,
        order: String,
    },

    #[error("Total quantity {total} is below the {distributed} currently distributed for '{name}'")]
    TotalBelowDistributed {
        name: String,
        total: u32,
        distributed: u32,
    },

    #[error("Empty stock for '{name}' cannot go below zero (have {available}, removing {removing})")]
    NegativeEmptyStock {
        name: String,
        available: u32,
        removing: u32,
    },

    #[error("Unknown brand '{0}'. Add it to the [brands] list in config.toml.")]
    UnknownBrand(String),

    #[error("Name must not be empty")]
    EmptyName,

    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Unit price must be greater than zero")]
    InvalidPrice,

    #[error("Invalid tax rate {0}; expected a fraction between 0 and 1 (e.g. 0.19)")]
    InvalidTaxRate(f64),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DepotError>;
