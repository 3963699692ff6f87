pub mod deployments;
pub mod provider;
pub mod wallet;

pub use provider::EvmProvider;
