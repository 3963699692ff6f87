pub mod client;
pub mod registry;

pub use client::{ ChainClient, ClientSettings, HistoryEntry };
pub use registry::{ ChainContracts, ChainEntry, ChainRegistry };
