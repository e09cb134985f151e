pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown transaction type: {0}")]
    UnknownTransactionType(String),

    #[error("Unknown currency type: {0}")]
    UnknownCurrency(String),
}
