use async_trait::async_trait;
use sqlx::Row;

use super::{RepositoryError, WalletRepository};
use crate::database::DatabasePool;
use crate::models::{NewWallet, Wallet};

pub struct PgWalletRepository {
    pool: DatabasePool,
}

impl PgWalletRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn map_wallet(row: sqlx::postgres::PgRow) -> Wallet {
    Wallet {
        id: row.get("id"),
        uid: row.get("uid"),
        amount: row.get("amount"),
    }
}

#[async_trait]
impl WalletRepository for PgWalletRepository {
    async fn create(&self, wallet: NewWallet) -> Result<Wallet, RepositoryError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO wallets (uid, amount)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(&wallet.uid)
        .bind(wallet.amount)
        .fetch_one(&*self.pool)
        .await?;

        Ok(Wallet {
            id,
            uid: wallet.uid,
            amount: wallet.amount,
        })
    }

    async fn get(&self, id: i64) -> Result<Wallet, RepositoryError> {
        sqlx::query("SELECT id, uid, amount FROM wallets WHERE id = $1")
            .bind(id)
            .map(map_wallet)
            .fetch_optional(&*self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn get_by_uid(&self, uid: &str) -> Result<Wallet, RepositoryError> {
        sqlx::query("SELECT id, uid, amount FROM wallets WHERE uid = $1")
            .bind(uid)
            .map(map_wallet)
            .fetch_optional(&*self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn update(&self, wallet: &Wallet) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE wallets SET uid = $1, amount = $2 WHERE id = $3")
            .bind(&wallet.uid)
            .bind(wallet.amount)
            .bind(wallet.id)
            .execute(&*self.pool)
            .await?;

        // The row can vanish between the caller's existence check and this
        // write; that must not pass silently.
        if result.rows_affected() == 0 {
            return Err(RepositoryError::RecordNotUpdated);
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM wallets WHERE id = $1")
            .bind(id)
            .execute(&*self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::RecordNotUpdated);
        }

        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<Wallet>, RepositoryError> {
        let wallets = sqlx::query("SELECT id, uid, amount FROM wallets")
            .map(map_wallet)
            .fetch_all(&*self.pool)
            .await?;

        Ok(wallets)
    }

    async fn increment(&self, uid: &str, delta: i64) -> Result<Wallet, RepositoryError> {
        sqlx::query(
            r#"
            UPDATE wallets
            SET amount = amount + $1
            WHERE uid = $2
            RETURNING id, uid, amount
            "#,
        )
        .bind(delta)
        .bind(uid)
        .map(map_wallet)
        .fetch_optional(&*self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
