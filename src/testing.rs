//! In-memory ledger standing in for a JSON-RPC endpoint in unit tests.

use std::collections::{ HashMap, HashSet };
use std::sync::{ Arc, Mutex };
use std::time::Duration;

use async_trait::async_trait;
use ethers::abi::Token;
use ethers::signers::{ LocalWallet, Signer };
use ethers::types::{ Address, Log, TransactionReceipt, H256, U256, U64 };
use ethers::utils::{ keccak256, parse_ether };

use crate::config::ContractAddresses;
use crate::enums::ChainId;
use crate::error::{ AppError, Result };
use crate::providers::{ ChainTransport, ContractCall, SendError, TxOptions };
use crate::rpc::{ ChainEntry, ClientSettings };

pub fn wallet(seed: u8) -> LocalWallet {
    LocalWallet::from_bytes(&[seed; 32]).expect("valid test key")
}

#[derive(Debug, Clone)]
pub struct SentCall {
    pub method: String,
    pub from: Address,
    pub to: Address,
}

#[derive(Default)]
struct LedgerState {
    native: HashMap<Address, U256>,
    balances: HashMap<(Address, Address), U256>,
    allowances: HashMap<(Address, Address, Address), U256>,
    supply: HashMap<Address, U256>,
    reserves: (U256, U256),
    /// Router prices: CLPD in USDC units, USDC in CLPD units.
    prices: (U256, U256),
    reverted: HashSet<String>,
    starved: HashSet<Address>,
    attempts: Vec<SentCall>,
    mined: Vec<SentCall>,
    reads: Vec<String>,
    native_transfers: Vec<(Address, U256)>,
    delay: Option<Duration>,
    nonce: u64,
}

pub struct MockLedger {
    state: Mutex<LedgerState>,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedger {
    pub fn new() -> Self {
        Self { state: Mutex::new(LedgerState::default()) }
    }

    pub fn token(&self) -> Address {
        Address::repeat_byte(0xc1)
    }

    pub fn usdc(&self) -> Address {
        Address::repeat_byte(0xc2)
    }

    pub fn pool(&self) -> Address {
        Address::repeat_byte(0xc3)
    }

    pub fn router(&self) -> Address {
        Address::repeat_byte(0xc4)
    }

    pub fn addresses(&self) -> ContractAddresses {
        ContractAddresses {
            token: self.token(),
            usdc: Some(self.usdc()),
            pool: Some(self.pool()),
            router: Some(self.router()),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut LedgerState) -> T) -> T {
        let mut state = self.state.lock().expect("ledger lock");
        f(&mut state)
    }

    pub fn set_native(&self, account: Address, amount: U256) {
        self.with_state(|s| {
            s.native.insert(account, amount);
        });
    }

    /// Credit `amount` of the bridgeable token, adjusting its total supply.
    pub fn set_balance(&self, account: Address, amount: U256) {
        let token = self.token();
        self.set_token_balance(token, account, amount);
    }

    pub fn set_token_balance(&self, token: Address, account: Address, amount: U256) {
        self.with_state(|s| {
            let previous = s.balances.insert((token, account), amount).unwrap_or_default();
            let supply = s.supply.entry(token).or_default();
            *supply = *supply + amount - previous;
        });
    }

    pub fn set_allowance(&self, token: Address, owner: Address, spender: Address, amount: U256) {
        self.with_state(|s| {
            s.allowances.insert((token, owner, spender), amount);
        });
    }

    pub fn set_reserves(&self, clpd: U256, usdc: U256) {
        self.with_state(|s| {
            s.reserves = (clpd, usdc);
        });
    }

    pub fn set_prices(&self, clpd_in_usdc: U256, usdc_in_clpd: U256) {
        self.with_state(|s| {
            s.prices = (clpd_in_usdc, usdc_in_clpd);
        });
    }

    /// Every send from `account` fails for lack of gas, even after a top-up.
    pub fn starve(&self, account: Address) {
        self.with_state(|s| {
            s.starved.insert(account);
        });
    }

    pub fn revert_method(&self, method: &str) {
        self.with_state(|s| {
            s.reverted.insert(method.to_string());
        });
    }

    pub fn set_confirmation_delay(&self, delay: Duration) {
        self.with_state(|s| {
            s.delay = Some(delay);
        });
    }

    pub fn total_supply(&self) -> U256 {
        let token = self.token();
        self.with_state(|s| s.supply.get(&token).copied().unwrap_or_default())
    }

    pub fn balance(&self, account: Address) -> U256 {
        let token = self.token();
        self.token_balance(token, account)
    }

    pub fn token_balance(&self, token: Address, account: Address) -> U256 {
        self.with_state(|s| s.balances.get(&(token, account)).copied().unwrap_or_default())
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        let token = self.token();
        self.with_state(|s| s.allowances.get(&(token, owner, spender)).copied().unwrap_or_default())
    }

    /// Every submission of `method`, including failed ones.
    pub fn send_attempts(&self, method: &str) -> usize {
        self.with_state(|s| s.attempts.iter().filter(|c| c.method == method).count())
    }

    pub fn attempted_methods(&self) -> Vec<String> {
        self.with_state(|s| s.attempts.iter().map(|c| c.method.clone()).collect())
    }

    /// Methods that were mined successfully, in order.
    pub fn mined_methods(&self) -> Vec<String> {
        self.with_state(|s| s.mined.iter().map(|c| c.method.clone()).collect())
    }

    pub fn mined_calls(&self) -> Vec<SentCall> {
        self.with_state(|s| s.mined.clone())
    }

    pub fn reads(&self) -> Vec<String> {
        self.with_state(|s| s.reads.clone())
    }

    pub fn native_transfers(&self) -> Vec<(Address, U256)> {
        self.with_state(|s| s.native_transfers.clone())
    }

    fn receipt(state: &mut LedgerState, to: Address, signature: &str) -> TransactionReceipt {
        state.nonce += 1;
        TransactionReceipt {
            transaction_hash: H256::from_low_u64_be(state.nonce),
            status: Some(U64::from(1)),
            logs: vec![Log {
                address: to,
                topics: vec![H256::from(keccak256(signature.as_bytes()))],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn apply(
        state: &mut LedgerState,
        token: Address,
        call: &ContractCall,
        from: Address
    ) -> std::result::Result<(), String> {
        let args = &call.args;
        match call.method() {
            "approve" => {
                state.allowances.insert((call.to, from, address(&args[0])), uint(&args[1]));
            }
            "transfer" => {
                debit(state, call.to, from, uint(&args[1]))?;
                credit(state, call.to, address(&args[0]), uint(&args[1]));
            }
            "swap" => {
                let (token_in, token_out, amount) = (address(&args[0]), address(&args[1]), uint(&args[2]));
                spend_allowance(state, token_in, from, call.to, amount)?;
                debit(state, token_in, from, amount)?;
                credit(state, token_out, from, amount);
            }
            "investCLPDwithoutUSDC" | "investUSDCwithoutCLPD" => {
                let asset = if call.method() == "investCLPDwithoutUSDC" {
                    token
                } else {
                    Address::repeat_byte(0xc2)
                };
                let amount = uint(&args[0]);
                spend_allowance(state, asset, from, call.to, amount)?;
                debit(state, asset, from, amount)?;
                credit(state, call.to, from, amount);
                *state.supply.entry(call.to).or_default() += amount;
            }
            "bridgeBurn" | "burnTokens" => {
                let amount = uint(&args[0]);
                let holder = if call.method() == "burnTokens" { address(&args[1]) } else { from };
                debit(state, call.to, holder, amount)?;
                *state.supply.entry(call.to).or_default() -= amount;
            }
            "verifyValueAPI" => {
                if uint(&args[0]) > uint(&args[1]) {
                    return Err("execution reverted: supply exceeds bank balance".to_string());
                }
            }
            "mintTokens" => {
                let (Token::Array(recipients), Token::Array(amounts)) = (&args[0], &args[1]) else {
                    return Err("execution reverted: bad arrays".to_string());
                };
                for (recipient, amount) in recipients.iter().zip(amounts) {
                    credit(state, call.to, address(recipient), uint(amount));
                    *state.supply.entry(call.to).or_default() += uint(amount);
                }
            }
            other => {
                return Err(format!("execution reverted: unknown method {}", other));
            }
        }
        Ok(())
    }
}

fn uint(token: &Token) -> U256 {
    token.clone().into_uint().unwrap_or_default()
}

fn address(token: &Token) -> Address {
    token.clone().into_address().unwrap_or_default()
}

fn debit(
    state: &mut LedgerState,
    token: Address,
    account: Address,
    amount: U256
) -> std::result::Result<(), String> {
    let balance = state.balances.entry((token, account)).or_default();
    if *balance < amount {
        return Err("execution reverted: transfer amount exceeds balance".to_string());
    }
    *balance -= amount;
    Ok(())
}

fn credit(state: &mut LedgerState, token: Address, account: Address, amount: U256) {
    *state.balances.entry((token, account)).or_default() += amount;
}

fn spend_allowance(
    state: &mut LedgerState,
    token: Address,
    owner: Address,
    spender: Address,
    amount: U256
) -> std::result::Result<(), String> {
    let allowance = state.allowances.entry((token, owner, spender)).or_default();
    if *allowance < amount {
        return Err("execution reverted: insufficient allowance".to_string());
    }
    *allowance -= amount;
    Ok(())
}

#[async_trait]
impl ChainTransport for MockLedger {
    async fn gas_price(&self) -> Result<U256> {
        Ok(U256::from(1_000_000_000u64))
    }

    async fn native_balance(&self, address: Address) -> Result<U256> {
        Ok(self.with_state(|s| s.native.get(&address).copied().unwrap_or_default()))
    }

    async fn call(&self, call: &ContractCall) -> Result<Vec<Token>> {
        let (token, usdc) = (self.token(), self.usdc());
        self.with_state(|s| {
            s.reads.push(call.method().to_string());
            let value = match call.method() {
                "totalSupply" => s.supply.get(&call.to).copied().unwrap_or_default(),
                "balanceOf" =>
                    s.balances
                        .get(&(call.to, address(&call.args[0])))
                        .copied()
                        .unwrap_or_default(),
                "allowance" =>
                    s.allowances
                        .get(&(call.to, address(&call.args[0]), address(&call.args[1])))
                        .copied()
                        .unwrap_or_default(),
                "decimals" => U256::from(if call.to == usdc { 6 } else { 18 }),
                "getReserves" => {
                    return Ok(vec![Token::Uint(s.reserves.0), Token::Uint(s.reserves.1)]);
                }
                "getAmountOut" => {
                    let (price, unit) = if address(&call.args[1]) == token {
                        (s.prices.0, U256::exp10(18))
                    } else {
                        (s.prices.1, U256::exp10(6))
                    };
                    (uint(&call.args[0]) * price) / unit
                }
                "getPriceOfCLPDInUSDC" => s.prices.0,
                "getPriceOfUSDCInCLPD" => s.prices.1,
                other => {
                    return Err(AppError::Chain(format!("{} call failed: unsupported", other)));
                }
            };
            Ok(vec![Token::Uint(value)])
        })
    }

    async fn send(
        &self,
        call: &ContractCall,
        signer: &LocalWallet,
        _options: &TxOptions
    ) -> std::result::Result<TransactionReceipt, SendError> {
        let from = signer.address();
        let sent = SentCall { method: call.method().to_string(), from, to: call.to };

        let delay = self.with_state(|s| {
            s.attempts.push(sent.clone());
            s.delay
        });
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let token = self.token();
        self.with_state(|s| {
            let balance = s.native.get(&from).copied().unwrap_or_default();
            if balance.is_zero() || s.starved.contains(&from) {
                return Err(
                    SendError::InsufficientFunds(
                        "insufficient funds for gas * price + value".to_string()
                    )
                );
            }
            if s.reverted.contains(call.method()) {
                return Err(SendError::Reverted {
                    hash: None,
                    reason: format!("execution reverted: {} disabled", call.method()),
                });
            }
            Self::apply(s, token, call, from).map_err(|reason| SendError::Reverted {
                hash: None,
                reason,
            })?;

            s.mined.push(sent);
            Ok(Self::receipt(s, call.to, &call.function.signature()))
        })
    }

    async fn send_native(
        &self,
        from: &LocalWallet,
        to: Address,
        value: U256
    ) -> std::result::Result<TransactionReceipt, SendError> {
        let sender = from.address();
        self.with_state(|s| {
            let balance = s.native.get(&sender).copied().unwrap_or_default();
            if balance < value {
                return Err(
                    SendError::InsufficientFunds(
                        "insufficient funds for gas * price + value".to_string()
                    )
                );
            }
            s.native.insert(sender, balance - value);
            *s.native.entry(to).or_default() += value;
            s.native_transfers.push((to, value));
            Ok(Self::receipt(s, to, "transfer()"))
        })
    }
}

/// A chain entry backed by `ledger`, with a funded treasury.
pub fn mock_entry(chain: ChainId, ledger: Arc<MockLedger>) -> ChainEntry {
    mock_entry_with_settings(chain, ledger, ClientSettings::default())
}

pub fn mock_entry_with_settings(
    chain: ChainId,
    ledger: Arc<MockLedger>,
    settings: ClientSettings
) -> ChainEntry {
    let treasury = wallet(100);
    ledger.set_native(treasury.address(), parse_ether("10").unwrap());
    let addresses = ledger.addresses();

    ChainEntry::new(chain, ledger, treasury, &addresses, settings)
}
