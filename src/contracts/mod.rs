//! Contract bindings for the vault diamond and its asset token

pub mod diamond;
pub mod erc20;
pub mod vault;

pub use diamond::*;
pub use erc20::*;
pub use vault::*;
