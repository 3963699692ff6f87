pub mod abi;
pub mod bridgeable_token;
pub mod erc20;
pub mod pool;
pub mod router;

pub use bridgeable_token::BridgeableToken;
pub use erc20::Erc20Token;
pub use pool::LiquidityPool;
pub use router::SwapRouter;

use ethers::abi::{ Abi, Token };
use ethers::types::{ Address, U256 };

use crate::error::{ AppError, Result };
use crate::providers::ContractCall;
use crate::rpc::ChainClient;

/// Read a view method whose outputs are all integers.
pub(crate) async fn read_uints(
    client: &ChainClient,
    address: Address,
    abi: &Abi,
    method: &str,
    args: Vec<Token>
) -> Result<Vec<U256>> {
    let call = ContractCall::new(address, abi, method, args)?;
    let outputs = client.call(&call).await?;

    outputs
        .into_iter()
        .map(|token| {
            token
                .into_uint()
                .ok_or_else(|| AppError::Chain(format!("{} returned a non-integer value", method)))
        })
        .collect()
}

pub(crate) async fn read_uint(
    client: &ChainClient,
    address: Address,
    abi: &Abi,
    method: &str,
    args: Vec<Token>
) -> Result<U256> {
    read_uints(client, address, abi, method, args).await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Chain(format!("{} returned no value", method)))
}
