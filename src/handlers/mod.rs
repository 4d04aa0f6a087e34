pub mod wallets;

pub use wallets::{
    change_amount, create_wallet, delete_wallet, get_wallet, get_wallet_by_uid, list_wallets,
    update_wallet, ChangeAmountRequest, CreateWalletRequest, OperationType, UpdateWalletRequest,
};
