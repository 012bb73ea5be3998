pub mod cache;

use std::collections::HashMap;

use ethereum_types::{Address, U256};

use crate::account::Account;

pub use cache::CacheDB;

/// State queries used by external collaborators (boundary (c) in the
/// external-interfaces contract): account existence, get/set balance, code,
/// nonce, storage slot, and deep copy are all layered on top of this trait
/// plus [`CacheDB`]'s journal.
pub trait Database {
    fn get_account(&self, address: Address) -> Account;
    fn get_block_hash(&self, block_number: u64) -> Option<U256>;
}

/// A plain in-memory backing store. Production embedders swap this for a
/// disk-backed implementation; this crate's Non-goals exclude persistence,
/// so `Db` is both the reference implementation and the one used by tests.
#[derive(Debug, Default, Clone)]
pub struct Db {
    pub accounts: HashMap<Address, Account>,
    pub block_hashes: HashMap<u64, U256>,
}

impl Db {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_accounts(&mut self, accounts: impl IntoIterator<Item = (Address, Account)>) {
        self.accounts.extend(accounts);
    }

    pub fn add_block_hashes(&mut self, hashes: impl IntoIterator<Item = (u64, U256)>) {
        self.block_hashes.extend(hashes);
    }
}

impl Database for Db {
    fn get_account(&self, address: Address) -> Account {
        self.accounts.get(&address).cloned().unwrap_or_default()
    }

    fn get_block_hash(&self, block_number: u64) -> Option<U256> {
        self.block_hashes.get(&block_number).copied()
    }
}
