mod config;
mod error;
mod ledger;
mod order;
mod store;

use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};

use crate::config::{config_dir, format_order_number, load_config, Config, CONFIG_TEMPLATE};
use crate::error::{DepotError, Result};
use crate::order::{create_supply_order, record_return};
use crate::store::{load_store, save_store, BottleTypePatch, Store};

#[derive(Parser)]
#[command(name = "gasdepot")]
#[command(version, about = "Gas-cylinder distribution depot management", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.gasdepot or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config.toml
    Init,

    /// Register a new bottle type
    AddBottleType {
        /// Display name, e.g. "Butane 12kg"
        #[arg(short, long)]
        name: String,

        /// Capacity in kilograms
        #[arg(short, long)]
        capacity: f64,

        /// Total shells owned
        #[arg(short, long)]
        quantity: u32,

        /// Unit price of a full bottle
        #[arg(short, long)]
        price: f64,

        /// Fractional tax rate (default: billing.default_tax_rate)
        #[arg(long)]
        tax_rate: Option<f64>,
    },

    /// Edit a bottle type (only the given fields change)
    EditBottleType {
        /// Bottle type id or name
        bottle_type: String,

        #[arg(long)]
        name: Option<String>,

        /// New total shell count; remaining moves by the same delta
        #[arg(long)]
        total: Option<u32>,

        #[arg(long)]
        price: Option<f64>,

        #[arg(long)]
        tax_rate: Option<f64>,
    },

    /// List bottle types with stock counts
    BottleTypes,

    /// Register a new driver
    AddDriver {
        #[arg(short, long)]
        name: String,
    },

    /// List drivers with debt, advances and balance
    Drivers,

    /// Record a cash advance paid to a driver
    Advance {
        /// Driver id or name
        driver: String,

        /// Advance amount
        amount: f64,
    },

    /// Register a new client
    AddClient {
        #[arg(short, long)]
        name: String,
    },

    /// List clients
    Clients,

    /// Create a supply order (Bon de Sortie) for a driver and client
    Supply {
        /// Driver id or name
        #[arg(short, long)]
        driver: String,

        /// Client id or name
        #[arg(short, long)]
        client: String,

        /// Line items in format "type:full[:empty]" (can be repeated)
        #[arg(short, long, value_name = "TYPE:FULL[:EMPTY]")]
        item: Vec<String>,

        /// Order date (default: today)
        #[arg(long)]
        date: Option<String>,
    },

    /// List supply orders
    Orders {
        /// Number of orders to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show one supply order with its line items
    ShowOrder {
        /// Order number or index from 'orders' (e.g., 1 or BS-2026-0001)
        order: String,
    },

    /// Record a return (Bon de Retour) against a supply order
    Return {
        /// Order number or index from 'orders' (e.g., 1 or BS-2026-0001)
        #[arg(short, long)]
        order: String,

        /// Per-type disposition "type:full:empty:consigned:foreign:defective:lost"
        #[arg(short, long, value_name = "TYPE:F:E:C:FO:D:L")]
        item: Vec<String>,

        /// Route expenses deducted from the driver's sales
        #[arg(long, default_value_t = 0.0)]
        expenses: f64,

        /// Brand of any foreign bottles collected (default: inconnu)
        #[arg(long)]
        brand: Option<String>,

        /// Return date (default: today)
        #[arg(long)]
        date: Option<String>,
    },

    /// List return orders
    Returns {
        /// Number of returns to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show the inventory journal
    Ledger {
        /// Number of entries to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Set the empty-shell stock for a bottle type
    SetStock {
        /// Bottle type id or name
        bottle_type: String,

        quantity: u32,
    },

    /// Add (or with a negative delta, remove) empty shells for a bottle type
    AddStock {
        /// Bottle type id or name
        bottle_type: String,

        /// Signed shell count, e.g. 12 or -3
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },

    /// List empty-shell stock per bottle type
    Stock,

    /// Record foreign bottles taken in at the depot
    AddForeign {
        /// Competitor brand from config.toml [brands]
        #[arg(short, long)]
        brand: String,

        /// Capacity in kilograms
        #[arg(short, long)]
        capacity: f64,

        /// Number of bottles
        #[arg(short, long)]
        quantity: u32,

        /// Driver who brought them in, if any
        #[arg(short, long)]
        driver: Option<String>,

        #[arg(long)]
        note: Option<String>,

        /// Record date (default: today)
        #[arg(long)]
        date: Option<String>,
    },

    /// List foreign bottle records
    Foreigns,

    /// Show depot status and next order numbers
    Status,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::AddBottleType {
            name,
            capacity,
            quantity,
            price,
            tax_rate,
        } => cmd_add_bottle_type(&cfg_dir, &name, capacity, quantity, price, tax_rate),
        Commands::EditBottleType {
            bottle_type,
            name,
            total,
            price,
            tax_rate,
        } => cmd_edit_bottle_type(&cfg_dir, &bottle_type, name, total, price, tax_rate),
        Commands::BottleTypes => cmd_bottle_types(&cfg_dir),
        Commands::AddDriver { name } => cmd_add_driver(&cfg_dir, &name),
        Commands::Drivers => cmd_drivers(&cfg_dir),
        Commands::Advance { driver, amount } => cmd_advance(&cfg_dir, &driver, amount),
        Commands::AddClient { name } => cmd_add_client(&cfg_dir, &name),
        Commands::Clients => cmd_clients(&cfg_dir),
        Commands::Supply {
            driver,
            client,
            item,
            date,
        } => cmd_supply(&cfg_dir, &driver, &client, &item, date),
        Commands::Orders { limit } => cmd_orders(&cfg_dir, limit),
        Commands::ShowOrder { order } => cmd_show_order(&cfg_dir, &order),
        Commands::Return {
            order,
            item,
            expenses,
            brand,
            date,
        } => cmd_return(&cfg_dir, &order, &item, expenses, brand, date),
        Commands::Returns { limit } => cmd_returns(&cfg_dir, limit),
        Commands::Ledger { limit } => cmd_ledger(&cfg_dir, limit),
        Commands::SetStock {
            bottle_type,
            quantity,
        } => cmd_set_stock(&cfg_dir, &bottle_type, quantity),
        Commands::AddStock { bottle_type, delta } => cmd_add_stock(&cfg_dir, &bottle_type, delta),
        Commands::Stock => cmd_stock(&cfg_dir),
        Commands::AddForeign {
            brand,
            capacity,
            quantity,
            driver,
            note,
            date,
        } => cmd_add_foreign(&cfg_dir, &brand, capacity, quantity, driver, note, date),
        Commands::Foreigns => cmd_foreigns(&cfg_dir),
        Commands::Status => cmd_status(&cfg_dir),
    }
}

/// Initialize config directory with a template config.toml
fn cmd_init(cfg_dir: &PathBuf) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(DepotError::AlreadyInitialized(cfg_dir.clone()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;

    println!("Initialized gasdepot config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit your depot details:    $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Register your bottle types: gasdepot add-bottle-type --help");
    println!("  3. Register drivers & clients: gasdepot add-driver / add-client");
    println!();
    println!("Then issue your first supply order:");
    println!("  gasdepot supply --driver <driver> --client <client> --item <type>:<full>:<empty>");

    Ok(())
}

/// Load config + store, failing early when the directory was never initialized.
fn open(cfg_dir: &PathBuf) -> Result<(Config, Store)> {
    if !cfg_dir.exists() {
        return Err(DepotError::ConfigNotFound(cfg_dir.clone()));
    }
    let config = load_config(cfg_dir)?;
    let store = load_store(cfg_dir)?;
    Ok((config, store))
}

fn parse_date(date: Option<String>) -> Result<NaiveDate> {
    match date {
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map_err(|_| DepotError::InvalidDate(s)),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

// Table row structs for tabled
#[derive(Tabled)]
struct BottleTypeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "KG")]
    capacity: String,
    #[tabled(rename = "TOTAL")]
    total: u32,
    #[tabled(rename = "OUT")]
    distributed: u32,
    #[tabled(rename = "REMAINING")]
    remaining: u32,
    #[tabled(rename = "PRICE")]
    price: String,
    #[tabled(rename = "TAX")]
    tax: String,
}

#[derive(Tabled)]
struct DriverRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "DEBT")]
    debt: String,
    #[tabled(rename = "ADVANCES")]
    advances: String,
    #[tabled(rename = "BALANCE")]
    balance: String,
}

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
}

#[derive(Tabled)]
struct OrderRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "DRIVER")]
    driver: String,
    #[tabled(rename = "CLIENT")]
    client: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

#[derive(Tabled)]
struct ReturnRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "B.S")]
    supply: String,
    #[tabled(rename = "SALES")]
    sales: String,
    #[tabled(rename = "EXPENSES")]
    expenses: String,
    #[tabled(rename = "NET")]
    net: String,
}

#[derive(Tabled)]
struct LedgerRow {
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "KIND")]
    kind: String,
    #[tabled(rename = "ORDER")]
    order: String,
    #[tabled(rename = "LINES")]
    lines: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
}

#[derive(Tabled)]
struct StockRow {
    #[tabled(rename = "TYPE")]
    bottle_type: String,
    #[tabled(rename = "EMPTY SHELLS")]
    empties: u32,
}

#[derive(Tabled)]
struct ForeignRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "BRAND")]
    brand: String,
    #[tabled(rename = "KG")]
    capacity: String,
    #[tabled(rename = "QTY")]
    quantity: u32,
    #[tabled(rename = "DRIVER")]
    driver: String,
}

fn format_grouped_int(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    let mut grouped: String = out.chars().rev().collect();
    if negative {
        grouped.insert(0, '-');
    }
    grouped
}

/// Format a money amount with two decimal places and thousands separators
fn format_amount(value: f64) -> String {
    let rounded = format!("{:.2}", value);
    let parts: Vec<&str> = rounded.split('.').collect();
    let whole = parts[0];
    let frac = parts[1];

    let negative = whole.starts_with('-');
    let digits = if negative { &whole[1..] } else { whole };
    let grouped = format_grouped_int(digits.parse::<i64>().unwrap_or(0));

    if negative {
        format!("-{}.{}", grouped, frac)
    } else {
        format!("{}.{}", grouped, frac)
    }
}

fn format_money(value: f64, currency_symbol: &str) -> String {
    format!("{}{}", currency_symbol, format_amount(value))
}

/// Register a new bottle type
fn cmd_add_bottle_type(
    cfg_dir: &PathBuf,
    name: &str,
    capacity: f64,
    quantity: u32,
    price: f64,
    tax_rate: Option<f64>,
) -> Result<()> {
    let (config, mut store) = open(cfg_dir)?;
    let tax_rate = tax_rate.unwrap_or(config.billing.default_tax_rate);

    let bt = store.add_bottle_type(name, capacity, quantity, price, tax_rate)?;
    let summary = format!(
        "Added bottle type {} ({}, {}kg)\n  Stock: {} shells\n  Price: {} (+{:.0}% tax)",
        bt.id,
        bt.name,
        bt.capacity_kg,
        bt.total_quantity,
        format_money(bt.unit_price, &config.billing.currency_symbol),
        bt.tax_rate * 100.0,
    );

    save_store(cfg_dir, &store)?;
    println!("{summary}");
    Ok(())
}

/// Edit a bottle type
fn cmd_edit_bottle_type(
    cfg_dir: &PathBuf,
    reference: &str,
    name: Option<String>,
    total: Option<u32>,
    price: Option<f64>,
    tax_rate: Option<f64>,
) -> Result<()> {
    let (_config, mut store) = open(cfg_dir)?;

    let bt = store.update_bottle_type(
        reference,
        BottleTypePatch {
            name,
            total_quantity: total,
            unit_price: price,
            tax_rate,
        },
    )?;
    let summary = format!(
        "Updated {} ({})\n  Total: {}  Out: {}  Remaining: {}",
        bt.id, bt.name, bt.total_quantity, bt.distributed_quantity, bt.remaining_quantity
    );

    save_store(cfg_dir, &store)?;
    println!("{summary}");
    Ok(())
}

/// List bottle types
fn cmd_bottle_types(cfg_dir: &PathBuf) -> Result<()> {
    let (config, store) = open(cfg_dir)?;

    if store.bottle_types.is_empty() {
        println!("No bottle types registered.");
        println!("Add one with: gasdepot add-bottle-type --name <name> --capacity <kg> --quantity <n> --price <p>");
        return Ok(());
    }

    let rows: Vec<BottleTypeRow> = store
        .bottle_types
        .iter()
        .map(|bt| BottleTypeRow {
            id: bt.id.clone(),
            name: bt.name.clone(),
            capacity: format!("{}", bt.capacity_kg),
            total: bt.total_quantity,
            distributed: bt.distributed_quantity,
            remaining: bt.remaining_quantity,
            price: format_money(bt.unit_price, &config.billing.currency_symbol),
            tax: format!("{:.0}%", bt.tax_rate * 100.0),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// Register a new driver
fn cmd_add_driver(cfg_dir: &PathBuf, name: &str) -> Result<()> {
    let (_config, mut store) = open(cfg_dir)?;
    let driver = store.add_driver(name)?;
    let summary = format!("Added driver {} ({})", driver.id, driver.name);
    save_store(cfg_dir, &store)?;
    println!("{summary}");
    Ok(())
}

/// List drivers with balances
fn cmd_drivers(cfg_dir: &PathBuf) -> Result<()> {
    let (config, store) = open(cfg_dir)?;

    if store.drivers.is_empty() {
        println!("No drivers registered.");
        return Ok(());
    }

    let sym = &config.billing.currency_symbol;
    let rows: Vec<DriverRow> = store
        .drivers
        .iter()
        .map(|d| DriverRow {
            id: d.id.clone(),
            name: d.name.clone(),
            debt: format_money(d.debt, sym),
            advances: format_money(d.advances, sym),
            balance: format_money(d.balance, sym),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!(
        "Outstanding: {}",
        format_money(store.outstanding_debt(), sym)
    );

    Ok(())
}

/// Record a cash advance for a driver
fn cmd_advance(cfg_dir: &PathBuf, driver_ref: &str, amount: f64) -> Result<()> {
    let (config, mut store) = open(cfg_dir)?;

    let driver = store.record_advance(driver_ref, amount)?;
    let summary = format!(
        "Recorded {} advance for {} (balance {})",
        format_money(amount, &config.billing.currency_symbol),
        driver.name,
        format_money(driver.balance, &config.billing.currency_symbol)
    );

    save_store(cfg_dir, &store)?;
    println!("{summary}");
    Ok(())
}

/// Register a new client
fn cmd_add_client(cfg_dir: &PathBuf, name: &str) -> Result<()> {
    let (_config, mut store) = open(cfg_dir)?;
    let client = store.add_client(name)?;
    let summary = format!("Added client {} ({})", client.id, client.name);
    save_store(cfg_dir, &store)?;
    println!("{summary}");
    Ok(())
}

/// List clients
fn cmd_clients(cfg_dir: &PathBuf) -> Result<()> {
    let (_config, store) = open(cfg_dir)?;

    if store.clients.is_empty() {
        println!("No clients registered.");
        return Ok(());
    }

    let rows: Vec<ClientRow> = store
        .clients
        .iter()
        .map(|c| ClientRow {
            id: c.id.clone(),
            name: c.name.clone(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// Create a supply order
fn cmd_supply(
    cfg_dir: &PathBuf,
    driver_ref: &str,
    client_ref: &str,
    items: &[String],
    date: Option<String>,
) -> Result<()> {
    let (config, mut store) = open(cfg_dir)?;
    let date = parse_date(date)?;

    let order = create_supply_order(&config, &mut store, driver_ref, client_ref, items, date)?;
    save_store(cfg_dir, &store)?;

    let sym = &config.billing.currency_symbol;
    println!("Issued {}", order.number);
    for item in &order.items {
        println!(
            "  {}: {} full, {} empty",
            item.bottle_type_name, item.full_quantity, item.empty_quantity
        );
    }
    println!("  Subtotal: {}", format_money(order.subtotal, sym));
    println!("  Tax:      {}", format_money(order.tax, sym));
    println!("  Total:    {}", format_money(order.total, sym));

    Ok(())
}

fn driver_name<'a>(store: &'a Store, id: &'a str) -> &'a str {
    store
        .drivers
        .iter()
        .find(|d| d.id == id)
        .map(|d| d.name.as_str())
        .unwrap_or(id)
}

fn client_name<'a>(store: &'a Store, id: &'a str) -> &'a str {
    store
        .clients
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.name.as_str())
        .unwrap_or(id)
}

/// List supply orders, newest first
fn cmd_orders(cfg_dir: &PathBuf, limit: Option<usize>) -> Result<()> {
    let (config, store) = open(cfg_dir)?;

    if store.supply_orders.is_empty() {
        println!("No supply orders issued yet.");
        return Ok(());
    }

    let orders: Vec<_> = store.supply_orders.iter().rev().enumerate().collect();
    let orders = match limit {
        Some(n) => &orders[..n.min(orders.len())],
        None => &orders[..],
    };

    let sym = &config.billing.currency_symbol;
    let rows: Vec<OrderRow> = orders
        .iter()
        .map(|(idx, o)| OrderRow {
            index: idx + 1,
            number: o.number.clone(),
            date: o.date.to_string(),
            driver: driver_name(&store, &o.driver_id).to_string(),
            client: client_name(&store, &o.client_id).to_string(),
            total: format_money(o.total, sym),
            status: match store.return_for(&o.id) {
                Some(r) => format!("SETTLED ({})", r.number),
                None => "OPEN".to_string(),
            },
        })
        .collect();

    let shown_total: f64 = orders.iter().map(|(_, o)| o.total).sum();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!();
    println!("Total: {} orders", store.supply_orders.len());
    println!("Shown total: {}", format_money(shown_total, sym));
    println!("Use index number with show-order/return (e.g., 'gasdepot return --order 1 ...')");

    Ok(())
}

/// Show one supply order
fn cmd_show_order(cfg_dir: &PathBuf, order_ref: &str) -> Result<()> {
    let (config, store) = open(cfg_dir)?;

    let idx = store.resolve_supply_order(order_ref)?;
    let order = &store.supply_orders[idx];
    let sym = &config.billing.currency_symbol;

    println!("{} ({})", order.number, order.date);
    println!("  Driver: {}", driver_name(&store, &order.driver_id));
    println!("  Client: {}", client_name(&store, &order.client_id));
    println!();
    for item in &order.items {
        println!(
            "  {:<20} {:>4} full  {:>4} empty  @ {}  = {}",
            item.bottle_type_name,
            item.full_quantity,
            item.empty_quantity,
            format_money(item.unit_price, sym),
            format_money(item.amount, sym),
        );
    }
    println!();
    println!("  Subtotal: {}", format_money(order.subtotal, sym));
    println!("  Tax:      {}", format_money(order.tax, sym));
    println!("  Total:    {}", format_money(order.total, sym));

    match store.return_for(&order.id) {
        Some(r) => println!(
            "  Settled by {} on {} (net sales {})",
            r.number,
            r.date,
            format_money(r.net_sales, sym)
        ),
        None => println!("  Status: OPEN"),
    }

    Ok(())
}

/// Record a return against a supply order
fn cmd_return(
    cfg_dir: &PathBuf,
    order_ref: &str,
    items: &[String],
    expenses: f64,
    brand: Option<String>,
    date: Option<String>,
) -> Result<()> {
    let (config, mut store) = open(cfg_dir)?;
    let date = parse_date(date)?;

    let ret = record_return(
        &config,
        &mut store,
        order_ref,
        items,
        expenses,
        brand.as_deref(),
        date,
    )?;
    save_store(cfg_dir, &store)?;

    let sym = &config.billing.currency_symbol;
    println!("Recorded {}", ret.number);
    for item in &ret.items {
        println!(
            "  {}: {} full, {} empty, {} consigned, {} foreign, {} defective, {} lost (sold {})",
            item.bottle_type_name,
            item.returned_full,
            item.returned_empty,
            item.consigned,
            item.foreign,
            item.defective,
            item.lost,
            item.sold_quantity,
        );
    }
    println!("  Sales:     {}", format_money(ret.total_sales, sym));
    println!("  Expenses:  {}", format_money(ret.total_expenses, sym));
    println!("  Consigned: {}", format_money(ret.total_consigned, sym));
    println!("  Net sales: {}", format_money(ret.net_sales, sym));
    println!(
        "  Driver debt change: {}",
        format_money(ret.driver_debt_change, sym)
    );

    Ok(())
}

/// List return orders, newest first
fn cmd_returns(cfg_dir: &PathBuf, limit: Option<usize>) -> Result<()> {
    let (config, store) = open(cfg_dir)?;

    if store.return_orders.is_empty() {
        println!("No returns recorded yet.");
        return Ok(());
    }

    let returns: Vec<_> = store.return_orders.iter().rev().enumerate().collect();
    let returns = match limit {
        Some(n) => &returns[..n.min(returns.len())],
        None => &returns[..],
    };

    let sym = &config.billing.currency_symbol;
    let rows: Vec<ReturnRow> = returns
        .iter()
        .map(|(idx, r)| {
            let supply = store
                .supply_orders
                .iter()
                .find(|o| o.id == r.supply_order_id)
                .map(|o| o.number.clone())
                .unwrap_or_else(|| r.supply_order_id.clone());
            ReturnRow {
                index: idx + 1,
                number: r.number.clone(),
                date: r.date.to_string(),
                supply,
                sales: format_money(r.total_sales, sym),
                expenses: format_money(r.total_expenses, sym),
                net: format_money(r.net_sales, sym),
            }
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// Show the inventory journal, newest first
fn cmd_ledger(cfg_dir: &PathBuf, limit: Option<usize>) -> Result<()> {
    let (_config, store) = open(cfg_dir)?;

    if store.transactions.is_empty() {
        println!("The inventory journal is empty.");
        return Ok(());
    }

    let entries: Vec<_> = store.transactions.iter().rev().collect();
    let entries = match limit {
        Some(n) => &entries[..n.min(entries.len())],
        None => &entries[..],
    };

    let rows: Vec<LedgerRow> = entries
        .iter()
        .map(|t| LedgerRow {
            date: t.date.to_string(),
            kind: t.kind.to_string(),
            order: t.order_number.clone(),
            lines: t
                .lines
                .iter()
                .map(|l| format!("{} {}", l.quantity, l.status))
                .collect::<Vec<_>>()
                .join(", "),
            description: t.description.clone(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!();
    println!("Total: {} entries", store.transactions.len());

    Ok(())
}

/// Set empty-shell stock for a bottle type
fn cmd_set_stock(cfg_dir: &PathBuf, reference: &str, quantity: u32) -> Result<()> {
    let (_config, mut store) = open(cfg_dir)?;

    store.set_empty_stock(reference, quantity)?;
    let name = store.bottle_type(reference)?.name.clone();

    save_store(cfg_dir, &store)?;
    println!("Set empty stock for {} to {}", name, quantity);
    Ok(())
}

/// Adjust empty-shell stock for a bottle type
fn cmd_add_stock(cfg_dir: &PathBuf, reference: &str, delta: i64) -> Result<()> {
    let (_config, mut store) = open(cfg_dir)?;

    let next = store.adjust_empty_stock(reference, delta)?;
    let name = store.bottle_type(reference)?.name.clone();

    save_store(cfg_dir, &store)?;
    println!("Empty stock for {} is now {}", name, next);
    Ok(())
}

/// List empty-shell stock
fn cmd_stock(cfg_dir: &PathBuf) -> Result<()> {
    let (_config, store) = open(cfg_dir)?;

    if store.bottle_types.is_empty() {
        println!("No bottle types registered.");
        return Ok(());
    }

    let rows: Vec<StockRow> = store
        .bottle_types
        .iter()
        .map(|bt| StockRow {
            bottle_type: bt.name.clone(),
            empties: store.empty_stock_for(&bt.id),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// Record foreign bottles
fn cmd_add_foreign(
    cfg_dir: &PathBuf,
    brand: &str,
    capacity: f64,
    quantity: u32,
    driver: Option<String>,
    note: Option<String>,
    date: Option<String>,
) -> Result<()> {
    let (config, mut store) = open(cfg_dir)?;
    let date = parse_date(date)?;

    if !config.brands.iter().any(|known| known == brand) {
        return Err(DepotError::UnknownBrand(brand.to_string()));
    }
    let driver_id = match driver {
        Some(ref d) => Some(store.driver(d)?.id.clone()),
        None => None,
    };

    let record = store.add_foreign_bottle(date, brand, capacity, quantity, driver_id, note)?;
    let summary = format!(
        "Recorded {} x {} {}kg foreign bottle(s) ({})",
        record.quantity, record.brand, record.capacity_kg, record.id
    );

    save_store(cfg_dir, &store)?;
    println!("{summary}");
    Ok(())
}

/// List foreign bottle records
fn cmd_foreigns(cfg_dir: &PathBuf) -> Result<()> {
    let (_config, store) = open(cfg_dir)?;

    if store.foreign_bottles.is_empty() {
        println!("No foreign bottles recorded.");
        return Ok(());
    }

    let rows: Vec<ForeignRow> = store
        .foreign_bottles
        .iter()
        .map(|fb| ForeignRow {
            id: fb.id.clone(),
            date: fb.date.to_string(),
            brand: fb.brand.clone(),
            capacity: format!("{}", fb.capacity_kg),
            quantity: fb.quantity,
            driver: fb
                .driver_id
                .as_deref()
                .map(|id| driver_name(&store, id).to_string())
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// Show depot status
fn cmd_status(cfg_dir: &PathBuf) -> Result<()> {
    let (config, store) = open(cfg_dir)?;

    let current_year = chrono::Local::now().year() as u32;
    let next_supply = format_order_number(
        &config.billing.supply_number_format,
        current_year,
        store.counters.supply.next(current_year),
    );
    let next_return = format_order_number(
        &config.billing.return_number_format,
        current_year,
        store.counters.returns.next(current_year),
    );

    println!("Depot Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", cfg_dir.display());
    println!("Depot:            {}", config.depot.name);
    println!("Bottle types:     {}", store.bottle_types.len());
    println!("Drivers:          {}", store.drivers.len());
    println!("Clients:          {}", store.clients.len());
    println!("Supply orders:    {}", store.supply_orders.len());
    println!("Returns:          {}", store.return_orders.len());
    println!("Journal entries:  {}", store.transactions.len());
    println!("Next B.S:         {}", next_supply);
    println!("Next B.R:         {}", next_return);
    println!(
        "Outstanding debt: {}",
        format_money(
            store.outstanding_debt(),
            &config.billing.currency_symbol
        )
    );

    if !store.supply_orders.is_empty() {
        println!();
        println!("Recent orders:");
        for order in store.supply_orders.iter().rev().take(5) {
            println!(
                "  {} - {} - {}",
                order.number,
                client_name(&store, &order.client_id),
                format_money(order.total, &config.billing.currency_symbol)
            );
        }
    }

    Ok(())
}
