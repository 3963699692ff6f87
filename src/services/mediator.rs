use std::sync::Arc;

use ethers::signers::{ LocalWallet, Signer };
use ethers::types::{ Address, Log, U256 };
use serde::Serialize;

use crate::contracts::Erc20Token;
use crate::enums::ChainId;
use crate::error::{ AppError, Result };
use crate::operations::TransactionResult;
use crate::rpc::{ ChainEntry, ChainRegistry };

/// Progress of one bridge run. `Failed` is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SagaState {
    Start,
    SupplyRead,
    Burned,
    Verified1,
    Minted,
    Verified2,
    Done,
    Failed,
}

impl SagaState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SagaState::Start => "start",
            SagaState::SupplyRead => "supply_read",
            SagaState::Burned => "burned",
            SagaState::Verified1 => "verified1",
            SagaState::Minted => "minted",
            SagaState::Verified2 => "verified2",
            SagaState::Done => "done",
            SagaState::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BridgeOutcome {
    pub success: bool,
    /// Burn transaction hash, empty if the burn never confirmed.
    pub hash: String,
    pub logs: Vec<Log>,
    /// Last step that completed.
    pub reached: SagaState,
    pub failed_step: Option<SagaState>,
    pub error: Option<String>,
}

impl BridgeOutcome {
    fn aborted(error: &AppError) -> Self {
        Self {
            success: false,
            hash: String::new(),
            logs: Vec::new(),
            reached: SagaState::Failed,
            failed_step: None,
            error: Some(error.to_string()),
        }
    }

    pub fn state(&self) -> SagaState {
        if self.success { SagaState::Done } else { SagaState::Failed }
    }
}

/// Accumulates logs and the burn hash while the saga advances.
struct SagaRun {
    reached: SagaState,
    hash: String,
    logs: Vec<Log>,
}

impl SagaRun {
    fn new() -> Self {
        Self { reached: SagaState::Start, hash: String::new(), logs: Vec::new() }
    }

    fn advance(&mut self, state: SagaState, logs: Vec<Log>) {
        self.reached = state;
        self.logs.extend(logs);
    }

    fn fail(self, step: SagaState, reason: String) -> BridgeOutcome {
        BridgeOutcome {
            success: false,
            hash: self.hash,
            logs: self.logs,
            reached: self.reached,
            failed_step: Some(step),
            error: Some(reason),
        }
    }

    fn finish(self) -> BridgeOutcome {
        BridgeOutcome {
            success: true,
            hash: self.hash,
            logs: self.logs,
            reached: SagaState::Done,
            failed_step: None,
            error: None,
        }
    }
}

/// Result of re-reading supplies and verifying on both chains.
struct Checkpoint {
    total: U256,
    logs: Vec<Log>,
    rejected: Option<String>,
}

/// Multi-step workflows built from single operations.
pub struct Mediator {
    registry: Arc<ChainRegistry>,
}

impl Mediator {
    pub fn new(registry: Arc<ChainRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ChainRegistry> {
        &self.registry
    }

    /// Approve the router for `token_in` if needed, then swap.
    pub async fn execute_swap_with_approval(
        &self,
        chain: ChainId,
        token_in: Address,
        token_out: Address,
        amount: U256,
        signer: &LocalWallet
    ) -> Result<TransactionResult> {
        let entry = self.registry.get(chain)?;
        let router = entry.router()?;
        let input = Erc20Token::new(token_in, entry.client.clone());

        self.ensure_allowance(&entry, &input, router.address(), amount, signer).await?;

        let swap = router.swap(token_in, token_out, amount, signer.clone());
        entry.client.execute(&swap).await
    }

    /// Approve the pool for the deposited asset if needed, then invest.
    pub async fn execute_liquidity_addition_with_approval(
        &self,
        chain: ChainId,
        amount: U256,
        signer: &LocalWallet,
        is_primary_token: bool
    ) -> Result<TransactionResult> {
        let entry = self.registry.get(chain)?;
        let pool = entry.pool()?;
        let asset = if is_primary_token { entry.contracts.token.as_erc20() } else { entry.usdc()? };

        self.ensure_allowance(&entry, asset, pool.address(), amount, signer).await?;

        let invest = pool.add_liquidity(amount, signer.clone(), is_primary_token);
        entry.client.execute(&invest).await
    }

    async fn ensure_allowance(
        &self,
        entry: &ChainEntry,
        token: &Erc20Token,
        spender: Address,
        amount: U256,
        signer: &LocalWallet
    ) -> Result<()> {
        let allowance = token.allowance(signer.address(), spender).await?;
        if allowance >= amount {
            tracing::debug!("Allowance {} covers {} for {:?}", allowance, amount, spender);
            return Ok(());
        }

        let approve = token.approve(spender, amount, signer.clone());
        let result = entry.client.execute(&approve).await?;
        if !result.success {
            return Err(
                AppError::ApprovalFailed(
                    format!("approve {:?} for {}: {}", spender, amount, result.error_message())
                )
            );
        }

        Ok(())
    }

    /// Burn on `source`, verify on both chains, mint on `target`, verify again.
    ///
    /// Never fails with `Err`: errors raised mid-run come back as an outcome
    /// with `success: false`, no hash and no logs. Nothing is compensated
    /// once the burn has confirmed.
    pub async fn bridge(
        &self,
        source: ChainId,
        target: ChainId,
        amount: U256,
        signer: &LocalWallet,
        recipient: Address
    ) -> BridgeOutcome {
        match self.run_bridge(source, target, amount, signer, recipient).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Bridge {} -> {} aborted: {}", source, target, e);
                BridgeOutcome::aborted(&e)
            }
        }
    }

    async fn run_bridge(
        &self,
        source: ChainId,
        target: ChainId,
        amount: U256,
        signer: &LocalWallet,
        recipient: Address
    ) -> Result<BridgeOutcome> {
        if source == target {
            return Err(AppError::InvalidInput("Source and target chain must differ".to_string()));
        }
        if amount.is_zero() {
            return Err(AppError::InvalidInput("Bridge amount must be positive".to_string()));
        }

        let source_entry = self.registry.get(source)?;
        let target_entry = self.registry.get(target)?;
        let mut run = SagaRun::new();

        tracing::info!("Bridging {} from {} to {} for {:?}", amount, source, target, recipient);

        let (source_supply, target_supply) = tokio::try_join!(
            source_entry.contracts.token.total_supply(),
            target_entry.contracts.token.total_supply()
        )?;
        let reference = source_supply
            .checked_add(target_supply)
            .ok_or_else(|| AppError::InvariantViolation("supply sum overflows".to_string()))?;
        run.advance(SagaState::SupplyRead, Vec::new());
        tracing::debug!("Reference balance {} ({} + {})", reference, source_supply, target_supply);

        let burn = source_entry.contracts.token.bridge_burn(amount, target, signer.clone());
        let burned = source_entry.client.execute(&burn).await?;
        if !burned.success {
            tracing::warn!("Bridge burn on {} failed: {}", source, burned.error_message());
            return Ok(run.fail(SagaState::Burned, format!("burn failed: {}", burned.error_message())));
        }
        run.hash = burned.hash_hex();
        run.advance(SagaState::Burned, burned.logs);

        let checkpoint = self.checkpoint(&source_entry, &target_entry, reference).await?;
        if let Some(reason) = checkpoint.rejected {
            tracing::error!(
                target: "invariant",
                "verify failed after burn of {} on {}: {}",
                amount,
                source,
                reason
            );
            let reason = AppError::InvariantViolation(format!("verify failed after burn: {}", reason));
            return Ok(run.fail(SagaState::Verified1, reason.to_string()));
        }
        run.advance(SagaState::Verified1, checkpoint.logs);

        let mint = target_entry.contracts.token.mint(
            vec![recipient],
            vec![amount],
            target_entry.treasury().clone()
        )?;
        let minted = target_entry.client.execute(&mint).await?;
        if !minted.success {
            tracing::error!(
                "Mint of {} on {} failed after burn {}: {}",
                amount,
                target,
                run.hash,
                minted.error_message()
            );
            return Ok(run.fail(SagaState::Minted, format!("mint failed: {}", minted.error_message())));
        }
        run.advance(SagaState::Minted, minted.logs);

        let checkpoint = self.checkpoint(&source_entry, &target_entry, reference).await?;
        if let Some(reason) = checkpoint.rejected {
            tracing::error!(target: "invariant", "verify failed after mint on {}: {}", target, reason);
            let reason = AppError::InvariantViolation(format!("verify failed after mint: {}", reason));
            return Ok(run.fail(SagaState::Verified2, reason.to_string()));
        }
        if checkpoint.total != reference {
            tracing::error!(
                target: "invariant",
                "supply {} differs from reference {} after bridging {}",
                checkpoint.total,
                reference,
                amount
            );
            let reason = AppError::InvariantViolation(
                format!("supply {} differs from reference {}", checkpoint.total, reference)
            );
            return Ok(run.fail(SagaState::Verified2, reason.to_string()));
        }
        run.advance(SagaState::Verified2, checkpoint.logs);

        tracing::info!("Bridged {} from {} to {} (burn {})", amount, source, target, run.hash);
        Ok(run.finish())
    }

    /// Re-read both supplies and have each chain's agent verify them against
    /// `reference`. Verification on the two chains runs concurrently.
    async fn checkpoint(
        &self,
        source: &ChainEntry,
        target: &ChainEntry,
        reference: U256
    ) -> Result<Checkpoint> {
        let (source_supply, target_supply) = tokio::try_join!(
            source.contracts.token.total_supply(),
            target.contracts.token.total_supply()
        )?;
        let total = source_supply
            .checked_add(target_supply)
            .ok_or_else(|| AppError::InvariantViolation("supply sum overflows".to_string()))?;

        let source_verify = source.contracts.token.verify_invariant(
            total,
            reference,
            source.treasury().clone()
        );
        let target_verify = target.contracts.token.verify_invariant(
            total,
            reference,
            target.treasury().clone()
        );
        let (source_result, target_result) = tokio::join!(
            source.client.execute(&source_verify),
            target.client.execute(&target_verify)
        );
        let (source_result, target_result) = (source_result?, target_result?);

        let mut rejected = Vec::new();
        let mut logs = Vec::new();
        for (chain, result) in [(source.chain, source_result), (target.chain, target_result)] {
            if result.success {
                logs.extend(result.logs);
            } else {
                rejected.push(format!("{}: {}", chain, result.error_message()));
            }
        }

        Ok(Checkpoint {
            total,
            logs,
            rejected: if rejected.is_empty() { None } else { Some(rejected.join("; ")) },
        })
    }
}
