//! In-memory chain for unit tests
//!
//! Answers `eth_call`s from scripted responses and records every transaction the
//! client attempts to send.

use crate::client::VaultClient;
use crate::config::NetworkConfig;
use crate::signer::{ContractReader, FeeEstimate, TransactionSigner, TxConfirmation, TxRequest};
use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use eyre::{eyre, Result};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct ChainState {
    responses: HashMap<(Option<Address>, [u8; 4]), Bytes>,
    code: HashMap<Address, Bytes>,
    reverts: HashMap<[u8; 4], String>,
    failing: HashSet<[u8; 4]>,
    sent: Vec<TxRequest>,
    reads: Vec<[u8; 4]>,
    mined: HashMap<TxHash, TxConfirmation>,
    confirmations: Vec<u64>,
}

/// Scripted chain acting as both reader and signer
#[derive(Clone, Default)]
pub(crate) struct MockChain {
    state: Arc<Mutex<ChainState>>,
}

impl MockChain {
    pub const VAULT: Address = Address::repeat_byte(0x5a);
    pub const ASSET: Address = Address::repeat_byte(0xa5);
    pub const SIGNER: Address = Address::repeat_byte(0xd0);
    pub const FEES: FeeEstimate = FeeEstimate {
        max_fee_per_gas: 30_000_000_000,
        max_priority_fee_per_gas: 1_000_000_000,
    };

    pub fn new() -> Self {
        Self::default()
    }

    /// Client bound to [`Self::VAULT`] with [`Self::ASSET`] as deposit asset
    pub fn client(&self) -> VaultClient<MockChain, MockChain> {
        let config = NetworkConfig::new()
            .with_vault(Self::VAULT)
            .with_asset(Self::ASSET);
        VaultClient::with_reader(self.clone(), self.clone(), config)
    }

    /// Answer calls with this selector on any address
    pub fn respond(&self, selector: [u8; 4], data: Vec<u8>) {
        self.lock().responses.insert((None, selector), data.into());
    }

    /// Answer calls with this selector on one address; wins over [`Self::respond`]
    pub fn respond_at(&self, to: Address, selector: [u8; 4], data: Vec<u8>) {
        self.lock().responses.insert((Some(to), selector), data.into());
    }

    /// Drop a response scripted with [`Self::respond_at`]
    pub fn forget_at(&self, to: Address, selector: [u8; 4]) {
        self.lock().responses.remove(&(Some(to), selector));
    }

    pub fn set_code(&self, address: Address, code: Vec<u8>) {
        self.lock().code.insert(address, code.into());
    }

    /// Transactions with this selector fail in simulation and at submission
    pub fn revert_on(&self, selector: [u8; 4], message: &str) {
        self.lock().reverts.insert(selector, message.to_string());
    }

    /// Transactions with this selector are mined with a failed status
    pub fn fail_on_chain(&self, selector: [u8; 4]) {
        self.lock().failing.insert(selector);
    }

    /// Every attempted submission, including rejected ones
    pub fn sent(&self) -> Vec<TxRequest> {
        self.lock().sent.clone()
    }

    pub fn sent_selectors(&self) -> Vec<[u8; 4]> {
        self.lock()
            .sent
            .iter()
            .filter_map(TxRequest::selector)
            .collect()
    }

    /// Number of `eth_call`s made with this selector
    pub fn reads_of(&self, selector: [u8; 4]) -> usize {
        self.lock().reads.iter().filter(|read| **read == selector).count()
    }

    /// Confirmation depth requested by each wait, in order
    pub fn confirmations_requested(&self) -> Vec<u64> {
        self.lock().confirmations.clone()
    }

    /// Address the `index`-th contract creation (zero based) is deployed at
    pub fn deployed_address(index: usize) -> Address {
        Address::with_last_byte(0x40 + index as u8)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ChainState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn scripted_revert(&self, tx: &TxRequest) -> Option<String> {
        let selector = tx.selector()?;
        self.lock().reverts.get(&selector).cloned()
    }
}

impl ContractReader for MockChain {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let selector: [u8; 4] = data
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| eyre!("calldata too short"))?;

        let mut state = self.lock();
        state.reads.push(selector);
        state
            .responses
            .get(&(Some(to), selector))
            .or_else(|| state.responses.get(&(None, selector)))
            .cloned()
            .ok_or_else(|| {
                eyre!(
                    "no response scripted for 0x{} at {}",
                    alloy::primitives::hex::encode(selector),
                    to
                )
            })
    }

    async fn code_at(&self, address: Address) -> Result<Bytes> {
        Ok(self.lock().code.get(&address).cloned().unwrap_or_default())
    }
}

impl TransactionSigner for MockChain {
    fn address(&self) -> Address {
        Self::SIGNER
    }

    async fn simulate(&self, tx: &TxRequest) -> Result<Bytes> {
        match self.scripted_revert(tx) {
            Some(message) => Err(eyre!(message)),
            None => Ok(Bytes::new()),
        }
    }

    async fn sign_and_send(&self, tx: TxRequest) -> Result<TxHash> {
        let revert = self.scripted_revert(&tx);
        let mut state = self.lock();

        let creations = state.sent.iter().filter(|sent| sent.to.is_none()).count();
        let success = tx
            .selector()
            .map_or(true, |selector| !state.failing.contains(&selector));
        let contract_address = tx.to.is_none().then(|| Self::deployed_address(creations));

        state.sent.push(tx);
        if let Some(message) = revert {
            return Err(eyre!(message));
        }

        let nonce = state.sent.len();
        let tx_hash = B256::with_last_byte(nonce as u8);
        state.mined.insert(
            tx_hash,
            TxConfirmation {
                tx_hash,
                block_number: 100 + nonce as u64,
                success,
                contract_address,
                gas_used: 21_000,
            },
        );

        Ok(tx_hash)
    }

    async fn wait_for_confirmations(
        &self,
        tx_hash: TxHash,
        confirmations: u64,
    ) -> Result<TxConfirmation> {
        let mut state = self.lock();
        state.confirmations.push(confirmations);
        state
            .mined
            .get(&tx_hash)
            .cloned()
            .ok_or_else(|| eyre!("unknown transaction {}", tx_hash))
    }

    async fn estimate_fees(&self) -> Result<FeeEstimate> {
        Ok(Self::FEES)
    }

    async fn get_balance(&self) -> Result<U256> {
        Ok(U256::from(10u64).pow(U256::from(18u64)))
    }
}
