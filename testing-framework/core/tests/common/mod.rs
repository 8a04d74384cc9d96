#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use async_trait::async_trait;
use spark_core::{
    Address, ChainClient, ChainError, Denomination, PrivateKey, SendReceipt,
    accounts::{DEFAULT_HD_PATH, DEFAULT_MNEMONIC, derive_private_key},
    chain::derive_address,
};

pub const FUNDER_GENESIS_BALANCE: u128 = 1_000_000_000_000;

#[derive(Default)]
struct ChainState {
    credited: HashMap<Address, u128>,
    sends: Vec<(Address, u128)>,
    balance_reads: usize,
    send_script: VecDeque<bool>,
}

/// In-memory chain whose first `zero_reads` balance reads report nothing
/// mined yet. Transfers are credited immediately otherwise.
pub struct ScriptedChain {
    funder: PrivateKey,
    denomination: Denomination,
    zero_reads: usize,
    fail_reads_from: Option<usize>,
    state: Mutex<ChainState>,
}

impl ScriptedChain {
    pub fn new() -> Self {
        let funder = derive_private_key(DEFAULT_MNEMONIC, DEFAULT_HD_PATH, 0);
        let mut state = ChainState::default();
        state
            .credited
            .insert(derive_address(&funder), FUNDER_GENESIS_BALANCE);

        Self {
            funder,
            denomination: Denomination::default(),
            zero_reads: 0,
            fail_reads_from: None,
            state: Mutex::new(state),
        }
    }

    pub fn with_zero_reads(mut self, zero_reads: usize) -> Self {
        self.zero_reads = zero_reads;
        self
    }

    /// Balance read number `read` (0-based) and every later one fail.
    pub fn failing_reads_from(mut self, read: usize) -> Self {
        self.fail_reads_from = Some(read);
        self
    }

    /// Queues results for upcoming sends; once drained every send succeeds.
    pub fn with_send_results(self, results: impl IntoIterator<Item = bool>) -> Self {
        self.state.lock().unwrap().send_script.extend(results);
        self
    }

    pub fn credit(&self, address: Address, amount: u128) {
        *self
            .state
            .lock()
            .unwrap()
            .credited
            .entry(address)
            .or_default() += amount;
    }

    pub fn sends(&self) -> Vec<(Address, u128)> {
        self.state.lock().unwrap().sends.clone()
    }

    pub fn balance_reads(&self) -> usize {
        self.state.lock().unwrap().balance_reads
    }

    pub fn balance_of(&self, address: &Address) -> u128 {
        self.state
            .lock()
            .unwrap()
            .credited
            .get(address)
            .copied()
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChainClient for ScriptedChain {
    fn address_from_private_key(&self, key: &PrivateKey) -> Address {
        derive_address(key)
    }

    fn default_private_key(&self) -> &PrivateKey {
        &self.funder
    }

    fn denomination(&self) -> &Denomination {
        &self.denomination
    }

    async fn get_balance(&self, address: &Address) -> Result<u128, ChainError> {
        let mut state = self.state.lock().unwrap();
        let read = state.balance_reads;
        state.balance_reads += 1;

        if self.fail_reads_from.is_some_and(|from| read >= from) {
            return Err(ChainError::Unavailable {
                message: "connection refused".into(),
            });
        }
        if read < self.zero_reads {
            return Ok(0);
        }
        Ok(state.credited.get(address).copied().unwrap_or_default())
    }

    async fn send_transaction(
        &self,
        to: &Address,
        amount: u128,
    ) -> Result<SendReceipt, ChainError> {
        let mut state = self.state.lock().unwrap();
        if !state.send_script.pop_front().unwrap_or(true) {
            return Ok(SendReceipt::rejected());
        }

        state.sends.push((*to, amount));
        *state.credited.entry(*to).or_default() += amount;
        Ok(SendReceipt {
            result: true,
            txid: Some(format!("tx-{}", state.sends.len())),
        })
    }
}
