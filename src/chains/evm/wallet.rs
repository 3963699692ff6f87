use ethers::signers::{ LocalWallet, Signer };
use ethers::core::types::{ Address, H160 };

use crate::enums::ChainId;
use crate::error::{ AppError, Result };

/// Parse a hex private key (with or without `0x`) into a signer bound to `chain`.
pub fn signer_for_chain(private_key: &str, chain: ChainId) -> Result<LocalWallet> {
    let wallet: LocalWallet = private_key
        .trim()
        .trim_start_matches("0x")
        .parse()
        .map_err(|_| AppError::InvalidPrivateKey)?;

    Ok(wallet.with_chain_id(chain.evm_chain_id()))
}

pub fn parse_address(address: &str) -> Result<Address> {
    address.trim().parse::<Address>().map_err(|_| AppError::InvalidAddress)
}

pub fn validate_address(address: &str) -> bool {
    address.parse::<H160>().is_ok()
}
