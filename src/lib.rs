pub mod config;
pub mod enums;
pub mod error;
pub mod crypto;
pub mod providers;
pub mod chains;
pub mod contracts;
pub mod operations;
pub mod rpc;
pub mod services;
pub mod users;
pub mod api;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
pub use enums::{ Asset, ChainId, OperationKind };
pub use error::{ AppError, Result };
pub use operations::{ Operation, TransactionResult };
