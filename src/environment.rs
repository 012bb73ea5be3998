use std::collections::HashMap;

use ethereum_types::{Address, U256};

/// BlockEnv: the block/transaction context visible to opcodes, threaded
/// unchanged through every frame of a state transition.
#[derive(Debug, Default, Clone)]
pub struct Environment {
    /// The outer-most caller for this transaction (ORIGIN opcode).
    pub origin: Address,
    pub coinbase: Address,
    pub number: U256,
    pub gas_limit: u64,
    pub gas_price: U256,
    pub timestamp: U256,
    pub difficulty: U256,
    pub chain_id: U256,
    pub base_fee: U256,
    /// Partial map from block-number to 32-byte hash, consulted by BLOCKHASH.
    pub block_hashes: HashMap<u64, U256>,
}

impl Environment {
    pub fn new(origin: Address) -> Self {
        Self {
            origin,
            chain_id: U256::one(),
            gas_limit: u64::MAX,
            ..Default::default()
        }
    }
}
