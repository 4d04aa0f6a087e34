pub mod wallet;

pub use wallet::{NewWallet, Wallet};
