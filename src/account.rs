use std::{collections::HashMap, str::FromStr};

use ethereum_types::{H256, U256};
use keccak_hash::keccak;

use crate::constants::EMPTY_CODE_HASH_STR;

/// Tuple (nonce, balance, code, storage) per the data model; storage is a
/// mapping from Word to Word where absent entries are equivalent to 0.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct AccountInfo {
    pub nonce: u64,
    pub balance: U256,
    pub bytecode: Vec<u8>,
}

impl AccountInfo {
    pub fn is_empty(&self) -> bool {
        self.nonce == 0 && self.balance.is_zero() && self.bytecode.is_empty()
    }
}

#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Account {
    pub info: AccountInfo,
    pub storage: HashMap<U256, U256>,
}

impl Account {
    pub fn new(nonce: u64, balance: U256, bytecode: Vec<u8>, storage: HashMap<U256, U256>) -> Self {
        Self {
            info: AccountInfo {
                nonce,
                balance,
                bytecode,
            },
            storage,
        }
    }

    /// Account is "empty" iff nonce = 0, balance = 0, and code is empty.
    pub fn is_empty(&self) -> bool {
        self.info.is_empty()
    }

    pub fn has_code(&self) -> bool {
        if self.info.bytecode.is_empty() {
            return false;
        }
        let empty_hash = H256::from_str(EMPTY_CODE_HASH_STR).unwrap_or_default();
        self.bytecode_hash() != empty_hash
    }

    pub fn bytecode_hash(&self) -> H256 {
        keccak(self.info.bytecode.as_slice())
    }

    pub fn with_balance(mut self, balance: U256) -> Self {
        self.info.balance = balance;
        self
    }

    pub fn with_bytecode(mut self, bytecode: Vec<u8>) -> Self {
        self.info.bytecode = bytecode;
        self
    }

    pub fn with_storage(mut self, storage: HashMap<U256, U256>) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.info.nonce = nonce;
        self
    }

    /// Reads on a missing key return the default (0); implementations SHOULD
    /// delete a key written back to 0 to bound memory, hence `storage.remove`
    /// rather than inserting a literal zero.
    pub fn set_storage(&mut self, key: U256, value: U256) {
        if value.is_zero() {
            self.storage.remove(&key);
        } else {
            self.storage.insert(key, value);
        }
    }

    pub fn get_storage(&self, key: &U256) -> U256 {
        self.storage.get(key).copied().unwrap_or_default()
    }

    pub fn increment_nonce(&mut self) {
        self.info.nonce = self.info.nonce.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_account_has_no_code() {
        let account = Account::default();
        assert!(account.is_empty());
        assert!(!account.has_code());
    }

    #[test]
    fn storing_zero_deletes_the_slot() {
        let mut account = Account::default();
        account.set_storage(U256::from(1), U256::from(5));
        assert_eq!(account.storage.len(), 1);
        account.set_storage(U256::from(1), U256::zero());
        assert!(account.storage.is_empty());
        assert_eq!(account.get_storage(&U256::from(1)), U256::zero());
    }
}
