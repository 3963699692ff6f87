pub mod chain_transport;

pub use chain_transport::{ ChainTransport, ContractCall, SendError, TxOptions };
