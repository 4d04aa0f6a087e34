use serde::{Deserialize, Serialize};

/// A balance-holding account. `id` is assigned by the store and never changes;
/// `uid` is the caller-supplied external identifier, unique across wallets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: i64,
    pub uid: String,
    pub amount: i64,
}

/// Insert payload: everything but the store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWallet {
    pub uid: String,
    pub amount: i64,
}
