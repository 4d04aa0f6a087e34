use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewWallet, Wallet};
use crate::repository::{RepositoryError, WalletRepository};

#[derive(Debug, Error)]
pub enum LedgerError {
    /// The referenced wallet does not exist.
    #[error("wallet not found")]
    NotFound,

    /// The store reported a failure other than absence.
    #[error("{op}: {source}")]
    Storage {
        op: &'static str,
        #[source]
        source: RepositoryError,
    },

    /// Malformed input rejected before any mutation was attempted.
    #[error("{0}")]
    Validation(String),
}

impl LedgerError {
    /// Attaches the failing operation while keeping the failure kind:
    /// store-reported absence stays NotFound, everything else is a storage
    /// failure.
    fn wrap(op: &'static str, err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => LedgerError::NotFound,
            source => LedgerError::Storage { op, source },
        }
    }
}

/// Use-case layer over the wallet store: existence checks before mutation and
/// the deposit/withdraw arithmetic. Stateless and reentrant; safe to share
/// across concurrent requests.
#[async_trait]
pub trait WalletLedger: Send + Sync {
    async fn create(&self, wallet: NewWallet) -> Result<Wallet, LedgerError>;

    async fn get(&self, id: i64) -> Result<Wallet, LedgerError>;

    async fn get_by_uid(&self, uid: &str) -> Result<Wallet, LedgerError>;

    async fn update(&self, wallet: Wallet) -> Result<Wallet, LedgerError>;

    async fn delete(&self, id: i64) -> Result<(), LedgerError>;

    async fn get_all(&self) -> Result<Vec<Wallet>, LedgerError>;

    /// Applies a signed delta to the wallet named by `uid`. Positive for
    /// deposit, negative for withdraw; the sign is fixed by the caller.
    async fn change_amount(&self, uid: &str, delta: i64) -> Result<Wallet, LedgerError>;
}

pub struct LedgerService {
    repository: Arc<dyn WalletRepository>,
}

impl LedgerService {
    pub fn new(repository: Arc<dyn WalletRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl WalletLedger for LedgerService {
    async fn create(&self, wallet: NewWallet) -> Result<Wallet, LedgerError> {
        // No existence precondition: the store rejects duplicate uids itself.
        self.repository
            .create(wallet)
            .await
            .map_err(|e| LedgerError::wrap("create wallet", e))
    }

    async fn get(&self, id: i64) -> Result<Wallet, LedgerError> {
        self.repository
            .get(id)
            .await
            .map_err(|e| LedgerError::wrap("get wallet", e))
    }

    async fn get_by_uid(&self, uid: &str) -> Result<Wallet, LedgerError> {
        self.repository
            .get_by_uid(uid)
            .await
            .map_err(|e| LedgerError::wrap("get wallet by uid", e))
    }

    async fn update(&self, wallet: Wallet) -> Result<Wallet, LedgerError> {
        // Existence check first; a missing wallet never reaches the write
        // path. The check and the write are separate store calls, so a
        // concurrent delete in between surfaces from the write as a storage
        // failure rather than being swallowed.
        self.repository
            .get(wallet.id)
            .await
            .map_err(|e| LedgerError::wrap("update wallet: existence check", e))?;

        self.repository
            .update(&wallet)
            .await
            .map_err(|e| LedgerError::wrap("update wallet", e))?;

        Ok(wallet)
    }

    async fn delete(&self, id: i64) -> Result<(), LedgerError> {
        self.repository
            .get(id)
            .await
            .map_err(|e| LedgerError::wrap("delete wallet: existence check", e))?;

        self.repository
            .delete(id)
            .await
            .map_err(|e| LedgerError::wrap("delete wallet", e))
    }

    async fn get_all(&self) -> Result<Vec<Wallet>, LedgerError> {
        self.repository
            .get_all()
            .await
            .map_err(|e| LedgerError::wrap("get all wallets", e))
    }

    async fn change_amount(&self, uid: &str, delta: i64) -> Result<Wallet, LedgerError> {
        // Single server-side increment instead of read-then-write, so two
        // concurrent deltas on the same uid both take effect. No balance
        // floor: withdrawals may push the amount below zero.
        self.repository
            .increment(uid, delta)
            .await
            .map_err(|e| LedgerError::wrap("change amount", e))
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::repository::MockWalletRepository;

    fn wallet(id: i64, uid: &str, amount: i64) -> Wallet {
        Wallet {
            id,
            uid: uid.to_string(),
            amount,
        }
    }

    fn ledger(repo: MockWalletRepository) -> LedgerService {
        LedgerService::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn create_returns_store_assigned_id() {
        let mut repo = MockWalletRepository::new();
        repo.expect_create()
            .with(eq(NewWallet {
                uid: "abc".to_string(),
                amount: 20,
            }))
            .returning(|w| {
                Ok(Wallet {
                    id: 1,
                    uid: w.uid,
                    amount: w.amount,
                })
            });

        let created = ledger(repo)
            .create(NewWallet {
                uid: "abc".to_string(),
                amount: 20,
            })
            .await
            .unwrap();

        assert_eq!(created, wallet(1, "abc", 20));
    }

    #[tokio::test]
    async fn create_insert_rejection_is_a_storage_failure() {
        let mut repo = MockWalletRepository::new();
        repo.expect_create()
            .returning(|_| Err(RepositoryError::Db(sqlx::Error::PoolClosed)));

        let err = ledger(repo)
            .create(NewWallet {
                uid: "abc".to_string(),
                amount: 0,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::Storage { op: "create wallet", .. }));
    }

    #[tokio::test]
    async fn get_returns_record_unmodified() {
        let mut repo = MockWalletRepository::new();
        repo.expect_get()
            .with(eq(1))
            .returning(|_| Ok(wallet(1, "abc", 20)));

        let found = ledger(repo).get(1).await.unwrap();

        assert_eq!(found, wallet(1, "abc", 20));
    }

    #[tokio::test]
    async fn get_missing_wallet_is_not_found() {
        let mut repo = MockWalletRepository::new();
        repo.expect_get().returning(|_| Err(RepositoryError::NotFound));

        let err = ledger(repo).get(404).await.unwrap_err();

        assert!(matches!(err, LedgerError::NotFound));
    }

    #[tokio::test]
    async fn get_by_uid_returns_record_unmodified() {
        let mut repo = MockWalletRepository::new();
        repo.expect_get_by_uid()
            .withf(|uid| uid == "abc")
            .returning(|_| Ok(wallet(1, "abc", 20)));

        let found = ledger(repo).get_by_uid("abc").await.unwrap();

        assert_eq!(found, wallet(1, "abc", 20));
    }

    #[tokio::test]
    async fn get_by_uid_missing_wallet_is_not_found() {
        let mut repo = MockWalletRepository::new();
        repo.expect_get_by_uid()
            .returning(|_| Err(RepositoryError::NotFound));

        let err = ledger(repo).get_by_uid("missing-uid").await.unwrap_err();

        assert!(matches!(err, LedgerError::NotFound));
    }

    #[tokio::test]
    async fn get_all_passes_the_list_through() {
        let mut repo = MockWalletRepository::new();
        repo.expect_get_all()
            .returning(|| Ok(vec![wallet(1, "a", 10), wallet(2, "b", -5)]));

        let wallets = ledger(repo).get_all().await.unwrap();

        assert_eq!(wallets, vec![wallet(1, "a", 10), wallet(2, "b", -5)]);
    }

    #[tokio::test]
    async fn get_all_store_error_is_a_storage_failure() {
        let mut repo = MockWalletRepository::new();
        repo.expect_get_all()
            .returning(|| Err(RepositoryError::Db(sqlx::Error::PoolClosed)));

        let err = ledger(repo).get_all().await.unwrap_err();

        assert!(matches!(err, LedgerError::Storage { .. }));
    }

    #[tokio::test]
    async fn update_overwrites_an_existing_wallet() {
        let mut repo = MockWalletRepository::new();
        repo.expect_get()
            .with(eq(1))
            .returning(|_| Ok(wallet(1, "abc", 20)));
        repo.expect_update()
            .withf(|w| *w == Wallet {
                id: 1,
                uid: "def".to_string(),
                amount: 50,
            })
            .returning(|_| Ok(()));

        let updated = ledger(repo).update(wallet(1, "def", 50)).await.unwrap();

        assert_eq!(updated, wallet(1, "def", 50));
    }

    #[tokio::test]
    async fn update_missing_wallet_never_reaches_the_write_path() {
        let mut repo = MockWalletRepository::new();
        repo.expect_get().returning(|_| Err(RepositoryError::NotFound));
        repo.expect_update().never();

        let err = ledger(repo).update(wallet(404, "abc", 20)).await.unwrap_err();

        assert!(matches!(err, LedgerError::NotFound));
    }

    #[tokio::test]
    async fn update_write_failure_after_check_is_a_storage_failure() {
        // Concurrent delete between the existence check and the write: the
        // store reports a zero-row update and it must not be swallowed.
        let mut repo = MockWalletRepository::new();
        repo.expect_get()
            .returning(|_| Ok(wallet(1, "abc", 20)));
        repo.expect_update()
            .returning(|_| Err(RepositoryError::RecordNotUpdated));

        let err = ledger(repo).update(wallet(1, "abc", 50)).await.unwrap_err();

        assert!(matches!(err, LedgerError::Storage { op: "update wallet", .. }));
    }

    #[tokio::test]
    async fn delete_removes_an_existing_wallet() {
        let mut repo = MockWalletRepository::new();
        repo.expect_get()
            .with(eq(1))
            .returning(|_| Ok(wallet(1, "abc", 20)));
        repo.expect_delete().with(eq(1)).returning(|_| Ok(()));

        ledger(repo).delete(1).await.unwrap();
    }

    #[tokio::test]
    async fn delete_missing_wallet_performs_no_deletion() {
        let mut repo = MockWalletRepository::new();
        repo.expect_get().returning(|_| Err(RepositoryError::NotFound));
        repo.expect_delete().never();

        let err = ledger(repo).delete(404).await.unwrap_err();

        assert!(matches!(err, LedgerError::NotFound));
    }

    #[tokio::test]
    async fn change_amount_applies_the_signed_delta() {
        let mut repo = MockWalletRepository::new();
        repo.expect_increment()
            .withf(|uid, delta| uid == "abc" && *delta == -30)
            .returning(|_, _| Ok(wallet(1, "abc", -10)));

        let updated = ledger(repo).change_amount("abc", -30).await.unwrap();

        // Withdrawing past zero is allowed; there is no balance floor.
        assert_eq!(updated.amount, -10);
    }

    #[tokio::test]
    async fn change_amount_unknown_uid_is_not_found() {
        let mut repo = MockWalletRepository::new();
        repo.expect_increment()
            .returning(|_, _| Err(RepositoryError::NotFound));
        repo.expect_update().never();

        let err = ledger(repo).change_amount("missing-uid", 10).await.unwrap_err();

        assert!(matches!(err, LedgerError::NotFound));
    }

    #[tokio::test]
    async fn deposit_then_equal_withdraw_restores_the_balance() {
        let mut repo = MockWalletRepository::new();
        repo.expect_increment()
            .withf(|uid, delta| uid == "abc" && *delta == 1000)
            .returning(|_, _| Ok(wallet(1, "abc", 1020)));
        repo.expect_increment()
            .withf(|uid, delta| uid == "abc" && *delta == -1000)
            .returning(|_, _| Ok(wallet(1, "abc", 20)));

        let svc = ledger(repo);
        let after_deposit = svc.change_amount("abc", 1000).await.unwrap();
        let after_withdraw = svc.change_amount("abc", -1000).await.unwrap();

        assert_eq!(after_deposit.amount, 1020);
        assert_eq!(after_withdraw.amount, 20);
    }
}
