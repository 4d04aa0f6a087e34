use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewWallet, Wallet};

pub mod postgres;

pub use postgres::PgWalletRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No row matches the requested id or uid.
    #[error("no matching wallet row")]
    NotFound,

    /// A write hit zero rows after an existence check had already passed.
    #[error("record not updated")]
    RecordNotUpdated,

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Raw persistence contract for wallet records. Concrete implementations are
/// supplied by construction; the ledger only ever sees this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletRepository: Send + Sync {
    /// Inserts a new record and returns it with the store-assigned id.
    async fn create(&self, wallet: NewWallet) -> Result<Wallet, RepositoryError>;

    async fn get(&self, id: i64) -> Result<Wallet, RepositoryError>;

    async fn get_by_uid(&self, uid: &str) -> Result<Wallet, RepositoryError>;

    /// Overwrites `uid` and `amount` for the row matching `wallet.id`.
    /// The id itself is never altered.
    async fn update(&self, wallet: &Wallet) -> Result<(), RepositoryError>;

    async fn delete(&self, id: i64) -> Result<(), RepositoryError>;

    async fn get_all(&self) -> Result<Vec<Wallet>, RepositoryError>;

    /// Applies `amount = amount + delta` as a single server-side statement and
    /// returns the updated record. Concurrent increments on the same uid both
    /// land; neither can overwrite the other.
    async fn increment(&self, uid: &str, delta: i64) -> Result<Wallet, RepositoryError>;
}
