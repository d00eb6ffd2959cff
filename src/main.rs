use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use secure_acceptance::application::processor::ResponseProcessor;
use secure_acceptance::application::request::{RequestBuilder, RequestContext};
use secure_acceptance::config::GatewayConfig;
use secure_acceptance::domain::order::{Order, OrderId};
use secure_acceptance::domain::ports::OrderStoreBox;
use secure_acceptance::error::GatewayError;
use secure_acceptance::infrastructure::in_memory::InMemoryOrderStore;
#[cfg(feature = "storage-rocksdb")]
use secure_acceptance::infrastructure::rocksdb::RocksDBStore;
use secure_acceptance::infrastructure::storefront::StaticStorefront;
use secure_acceptance::interfaces::csv::field_reader::FieldReader;
use secure_acceptance::interfaces::csv::field_writer::FieldWriter;
use secure_acceptance::interfaces::csv::order_reader::OrderReader;
use secure_acceptance::interfaces::csv::order_writer::OrderWriter;
use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Gateway configuration file (JSON)
    #[arg(long)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the signature of a name,value CSV over its own signed_field_names
    Sign {
        /// Field set CSV
        fields: PathBuf,
    },
    /// Check the signature carried by a name,value CSV
    Verify {
        /// Field set CSV
        fields: PathBuf,
    },
    /// Build the signed payment request for an order
    Request {
        /// Orders CSV
        #[arg(long)]
        orders: PathBuf,

        #[arg(long)]
        order_id: OrderId,

        #[arg(long, default_value = "")]
        customer_ip: String,
    },
    /// Apply a processor response to the orders and print the outcome
    Respond {
        /// Orders CSV
        #[arg(long)]
        orders: PathBuf,

        /// Path to persistent database (optional). If provided, uses RocksDB.
        #[arg(long)]
        db_path: Option<PathBuf>,

        /// Response payload as a name,value CSV
        payload: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();

    let cli = Cli::parse();
    let config = GatewayConfig::from_path(&cli.config).into_diagnostic()?;

    match cli.command {
        Command::Sign { fields } => {
            let fields = FieldReader::new(File::open(fields).into_diagnostic()?)
                .read_fields()
                .into_diagnostic()?;
            let signature = config
                .signer()
                .and_then(|signer| signer.sign_declared(&fields))
                .into_diagnostic()?;
            println!("{signature}");
        }
        Command::Verify { fields } => {
            let fields = FieldReader::new(File::open(fields).into_diagnostic()?)
                .read_fields()
                .into_diagnostic()?;
            let signer = config.signer().into_diagnostic()?;
            if signer.verify_declared(&fields) {
                println!("valid");
            } else {
                println!("invalid");
            }
        }
        Command::Request {
            orders,
            order_id,
            customer_ip,
        } => {
            let order = read_orders(&orders)?
                .into_iter()
                .find(|order| order.id == order_id)
                .ok_or(GatewayError::OrderNotFound(order_id))
                .into_diagnostic()?;

            let builder = RequestBuilder::new(config).into_diagnostic()?;
            let request = builder
                .build(&order, &RequestContext::now(customer_ip))
                .into_diagnostic()?;
            info!(action_url = %request.action_url, "Post these fields to the processor");

            let stdout = io::stdout();
            FieldWriter::new(stdout.lock())
                .write_fields(&request.fields)
                .into_diagnostic()?;
        }
        Command::Respond {
            orders,
            db_path,
            payload,
        } => {
            let store = open_store(db_path)?;
            for order in read_orders(&orders)? {
                // Persisted orders win over the seed file.
                if store.get(order.id).await.into_diagnostic()?.is_none() {
                    store.store(order).await.into_diagnostic()?;
                }
            }

            let storefront = StaticStorefront::new(config.store_url.as_str());
            let processor =
                ResponseProcessor::new(config, store, Box::new(storefront)).into_diagnostic()?;

            let payload = FieldReader::new(File::open(payload).into_diagnostic()?)
                .read_fields()
                .into_diagnostic()?;
            let outcome = processor.handle_response(&payload).await.into_diagnostic()?;
            println!("{}", serde_json::to_string(&outcome).into_diagnostic()?);

            let orders = processor.into_orders().await.into_diagnostic()?;
            let stdout = io::stdout();
            OrderWriter::new(stdout.lock())
                .write_orders(orders)
                .into_diagnostic()?;
        }
    }

    Ok(())
}

/// Reads every well-formed order from `path`, reporting and skipping bad rows.
fn read_orders(path: &Path) -> Result<Vec<Order>> {
    let file = File::open(path).into_diagnostic()?;
    let mut orders = Vec::new();
    for order in OrderReader::new(file).orders() {
        match order {
            Ok(order) => orders.push(order),
            Err(e) => warn!("Error reading order: {}", e),
        }
    }
    Ok(orders)
}

#[cfg(feature = "storage-rocksdb")]
fn open_store(db_path: Option<PathBuf>) -> Result<OrderStoreBox> {
    match db_path {
        Some(db_path) => {
            let store = RocksDBStore::open(db_path).into_diagnostic()?;
            Ok(Box::new(store))
        }
        None => Ok(Box::new(InMemoryOrderStore::new())),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(db_path: Option<PathBuf>) -> Result<OrderStoreBox> {
    if db_path.is_some() {
        warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(Box::new(InMemoryOrderStore::new()))
}
