use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Signed field `{0}` has no value")]
    MissingField(String),
    #[error("Response signature verification failed")]
    SignatureInvalid,
    #[error("Malformed reference number: {0:?}")]
    MalformedReference(String),
    #[error("Gateway configuration incomplete: {0} is not set")]
    ConfigurationIncomplete(&'static str),
    #[error("Order {0} not found")]
    OrderNotFound(u64),
    #[error("Order {0} kept changing status while a response was being applied")]
    ConcurrentModification(u64),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
