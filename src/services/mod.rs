pub mod mediator;
pub mod wallet_service;

pub use mediator::{ BridgeOutcome, Mediator, SagaState };
pub use wallet_service::{ Positions, SwapQuote, WalletService };
