use std::sync::Arc;

use ethers::signers::{ LocalWallet, Signer };
use ethers::types::{ Address, U256 };
use ethers::utils::{ format_units, parse_units };
use serde::Serialize;

use crate::chains::evm::wallet::{ parse_address, signer_for_chain };
use crate::contracts::Erc20Token;
use crate::crypto::Encryptor;
use crate::enums::{ Asset, ChainId };
use crate::error::{ AppError, Result };
use crate::operations::{ FailureKind, TransactionResult };
use crate::rpc::{ ChainEntry, ChainRegistry };
use crate::services::Mediator;
use crate::users::User;

#[derive(Debug, Clone, Serialize)]
pub struct Positions {
    pub liquidity: String,
    pub amount_clpd: String,
    pub amount_usdc: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SwapQuote {
    pub token_in: Asset,
    pub token_out: Asset,
    pub amount_in: String,
    pub amount_out: String,
    /// Price of one `token_in` in `token_out`.
    pub price: String,
}

/// User-facing wallet operations. Decrypts the user's key for the duration
/// of one call, checks balances, then hands off to the mediator.
pub struct WalletService {
    registry: Arc<ChainRegistry>,
    mediator: Arc<Mediator>,
    encryptor: Arc<Encryptor>,
    home_chain: ChainId,
}

impl WalletService {
    pub fn new(
        registry: Arc<ChainRegistry>,
        mediator: Arc<Mediator>,
        encryptor: Arc<Encryptor>,
        home_chain: ChainId
    ) -> Self {
        Self {
            registry,
            mediator,
            encryptor,
            home_chain,
        }
    }

    pub fn home_chain(&self) -> ChainId {
        self.home_chain
    }

    pub async fn get_token_balance(&self, user: &User, asset: Asset) -> Result<String> {
        let entry = self.registry.get(self.home_chain)?;
        let balance = asset_token(&entry, asset)?.balance_of(user.address).await?;

        format_amount(balance, asset)
    }

    pub async fn transfer_token(
        &self,
        user: &User,
        to: &str,
        asset: Asset,
        amount: &str
    ) -> Result<String> {
        let to = parse_address(to)?;
        let amount = parse_amount(amount, asset)?;
        let entry = self.registry.get(self.home_chain)?;
        let token = asset_token(&entry, asset)?;

        ensure_balance(token, user.address, amount, asset).await?;

        let signer = self.signer(user, self.home_chain)?;
        let result = entry.client.execute(&token.transfer(to, amount, signer)).await?;

        into_hash(result, &entry, "transfer")
    }

    /// Swap `asset_in` for its counterpart through the router.
    pub async fn swap_token(&self, user: &User, asset_in: Asset, amount: &str) -> Result<String> {
        let amount = parse_amount(amount, asset_in)?;
        let entry = self.registry.get(self.home_chain)?;
        let token_in = asset_token(&entry, asset_in)?;
        let token_out = asset_token(&entry, asset_in.counterpart())?;

        ensure_balance(token_in, user.address, amount, asset_in).await?;

        let signer = self.signer(user, self.home_chain)?;
        let result = self.mediator.execute_swap_with_approval(
            self.home_chain,
            token_in.address(),
            token_out.address(),
            amount,
            &signer
        ).await?;

        into_hash(result, &entry, "swap")
    }

    /// Router estimate for swapping `amount` of `asset_in` into its counterpart.
    pub async fn quote_swap(&self, asset_in: Asset, amount: &str) -> Result<SwapQuote> {
        let amount = parse_amount(amount, asset_in)?;
        let entry = self.registry.get(self.home_chain)?;
        let router = entry.router()?;
        let asset_out = asset_in.counterpart();
        let token_in = asset_token(&entry, asset_in)?.address();
        let token_out = asset_token(&entry, asset_out)?.address();

        let price = async {
            match asset_in {
                Asset::Clpd => router.price_of_clpd_in_usdc().await,
                Asset::Usdc => router.price_of_usdc_in_clpd().await,
            }
        };
        let (amount_out, price) = tokio::try_join!(
            router.get_amount_out(amount, token_in, token_out),
            price
        )?;

        Ok(SwapQuote {
            token_in: asset_in,
            token_out: asset_out,
            amount_in: format_amount(amount, asset_in)?,
            amount_out: format_amount(amount_out, asset_out)?,
            price: format_amount(price, asset_out)?,
        })
    }

    /// Add single-sided liquidity. CLPD is the pool's primary token.
    pub async fn invest(&self, user: &User, asset: Asset, amount: &str) -> Result<String> {
        let amount = parse_amount(amount, asset)?;
        let entry = self.registry.get(self.home_chain)?;
        let token = asset_token(&entry, asset)?;

        ensure_balance(token, user.address, amount, asset).await?;

        let signer = self.signer(user, self.home_chain)?;
        let result = self.mediator.execute_liquidity_addition_with_approval(
            self.home_chain,
            amount,
            &signer,
            asset == Asset::Clpd
        ).await?;

        into_hash(result, &entry, "invest")
    }

    /// The user's share of the pool reserves.
    pub async fn get_positions(&self, user: &User) -> Result<Positions> {
        let entry = self.registry.get(self.home_chain)?;
        let pool = entry.pool()?;

        let (liquidity, total_supply, (reserve_clpd, reserve_usdc)) = tokio::try_join!(
            pool.balance_of(user.address),
            pool.total_supply(),
            pool.reserves()
        )?;

        let (amount_clpd, amount_usdc) = if total_supply.is_zero() {
            (U256::zero(), U256::zero())
        } else {
            (
                share_of(liquidity, reserve_clpd, total_supply)?,
                share_of(liquidity, reserve_usdc, total_supply)?,
            )
        };

        Ok(Positions {
            liquidity: format_amount(liquidity, Asset::Clpd)?,
            amount_clpd: format_amount(amount_clpd, Asset::Clpd)?,
            amount_usdc: format_amount(amount_usdc, Asset::Usdc)?,
        })
    }

    /// Move CLPD from `source` to `target`. Returns the burn hash.
    pub async fn bridge_token(
        &self,
        user: &User,
        amount: &str,
        source: ChainId,
        target: ChainId
    ) -> Result<String> {
        if source == target {
            return Err(AppError::InvalidInput("Source and target chain must differ".to_string()));
        }
        let amount = parse_amount(amount, Asset::Clpd)?;
        let source_entry = self.registry.get(source)?;
        self.registry.get(target)?;

        ensure_balance(source_entry.contracts.token.as_erc20(), user.address, amount, Asset::Clpd).await?;

        let signer = self.signer(user, source)?;
        let outcome = self.mediator.bridge(source, target, amount, &signer, user.address).await;

        if !outcome.success {
            let step = outcome.failed_step.unwrap_or(outcome.reached);
            return Err(AppError::BridgeFailed {
                step: step.as_str().to_string(),
                reason: outcome.error.unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        Ok(outcome.hash)
    }

    fn signer(&self, user: &User, chain: ChainId) -> Result<LocalWallet> {
        let private_key = self.encryptor.decrypt(&user.encrypted_private_key)?;
        let signer = signer_for_chain(&private_key, chain)?;

        if signer.address() != user.address {
            tracing::error!("Stored key for user {} does not match {:?}", user.id, user.address);
            return Err(AppError::InvalidPrivateKey);
        }

        Ok(signer)
    }
}

fn asset_token(entry: &ChainEntry, asset: Asset) -> Result<&Erc20Token> {
    match asset {
        Asset::Clpd => Ok(entry.contracts.token.as_erc20()),
        Asset::Usdc => entry.usdc(),
    }
}

async fn ensure_balance(token: &Erc20Token, owner: Address, amount: U256, asset: Asset) -> Result<()> {
    let balance = token.balance_of(owner).await?;
    if balance < amount {
        return Err(AppError::InsufficientBalance {
            symbol: asset.to_string(),
            available: format_amount(balance, asset)?,
        });
    }
    Ok(())
}

fn parse_amount(amount: &str, asset: Asset) -> Result<U256> {
    let amount = amount.trim();
    if amount.starts_with('-') {
        return Err(AppError::InvalidInput("Amount must be positive".to_string()));
    }
    // parse_units truncates extra fraction digits instead of failing
    if let Some((_, fraction)) = amount.split_once('.') {
        if fraction.len() > (asset.decimals() as usize) {
            return Err(
                AppError::InvalidInput(
                    format!("{} amounts allow at most {} decimal places", asset, asset.decimals())
                )
            );
        }
    }
    let parsed: U256 = parse_units(amount, asset.decimals())
        .map_err(|e| AppError::InvalidInput(format!("Invalid {} amount {}: {}", asset, amount, e)))?
        .into();

    if parsed.is_zero() {
        return Err(AppError::InvalidInput("Amount must be positive".to_string()));
    }
    Ok(parsed)
}

fn format_amount(amount: U256, asset: Asset) -> Result<String> {
    format_units(amount, asset.decimals()).map_err(|e| AppError::Internal(e.to_string()))
}

fn share_of(liquidity: U256, reserve: U256, total_supply: U256) -> Result<U256> {
    liquidity
        .checked_mul(reserve)
        .map(|product| product / total_supply)
        .ok_or_else(|| AppError::Chain("Position overflows".to_string()))
}

fn into_hash(result: TransactionResult, entry: &ChainEntry, action: &str) -> Result<String> {
    match (result.success, result.failure) {
        (true, _) => Ok(result.hash_hex()),
        (false, Some(FailureKind::Timeout)) =>
            Err(AppError::Timeout(entry.client.settings().confirmation_timeout.as_secs())),
        (false, _) =>
            Err(AppError::TransactionFailed(format!("{}: {}", action, result.error_message()))),
    }
}
