use std::collections::HashMap;
use std::sync::Arc;

use ethereum_types::{Address, U256};

use crate::account::Account;
use crate::db::Database;
use crate::errors::{InternalError, VMError};

/// One undo entry per mutating write, recording the previous value. A
/// snapshot is just the journal's current length; reverting pops and
/// replays entries in reverse. This is cheaper than a deep copy per frame
/// while matching the observable behavior of one (see the state-snapshot
/// design note).
#[derive(Debug, Clone)]
enum JournalEntry {
    Balance { address: Address, old: U256 },
    Nonce { address: Address, old: u64 },
    Code { address: Address, old: Vec<u8> },
    Storage {
        address: Address,
        key: U256,
        old: U256,
    },
}

/// Copy-on-write overlay atop a [`Database`]: reads fall through to the
/// backing store on first touch and are cached from then on; writes go only
/// to the cache and are undoable via the journal.
pub struct CacheDB {
    db: Arc<dyn Database>,
    accounts: HashMap<Address, Account>,
    journal: Vec<JournalEntry>,
}

impl CacheDB {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self {
            db,
            accounts: HashMap::new(),
            journal: Vec::new(),
        }
    }

    fn ensure_loaded(&mut self, address: Address) {
        self.accounts
            .entry(address)
            .or_insert_with(|| self.db.get_account(address));
    }

    pub fn get_account(&mut self, address: Address) -> Account {
        self.ensure_loaded(address);
        self.accounts.get(&address).cloned().unwrap_or_default()
    }

    /// `account_exists`: true iff the address is present with any
    /// non-default field.
    pub fn account_exists(&mut self, address: Address) -> bool {
        !self.get_account(address).is_empty()
    }

    pub fn get_balance(&mut self, address: Address) -> U256 {
        self.get_account(address).info.balance
    }

    pub fn get_nonce(&mut self, address: Address) -> u64 {
        self.get_account(address).info.nonce
    }

    pub fn get_code(&mut self, address: Address) -> Vec<u8> {
        self.get_account(address).info.bytecode
    }

    pub fn get_storage(&mut self, address: Address, key: U256) -> U256 {
        self.get_account(address).get_storage(&key)
    }

    pub fn get_block_hash(&self, block_number: u64) -> Option<U256> {
        self.db.get_block_hash(block_number)
    }

    pub fn set_balance(&mut self, address: Address, new: U256) {
        self.ensure_loaded(address);
        let old = self
            .accounts
            .get(&address)
            .map(|a| a.info.balance)
            .unwrap_or_default();
        if old == new {
            return;
        }
        self.journal.push(JournalEntry::Balance { address, old });
        if let Some(account) = self.accounts.get_mut(&address) {
            account.info.balance = new;
        }
    }

    pub fn increase_balance(&mut self, address: Address, amount: U256) -> Result<(), VMError> {
        let current = self.get_balance(address);
        let new = current
            .checked_add(amount)
            .ok_or(VMError::Internal(InternalError::Overflow))?;
        self.set_balance(address, new);
        Ok(())
    }

    pub fn decrease_balance(&mut self, address: Address, amount: U256) -> Result<(), VMError> {
        let current = self.get_balance(address);
        let new = current
            .checked_sub(amount)
            .ok_or(VMError::Internal(InternalError::Underflow))?;
        self.set_balance(address, new);
        Ok(())
    }

    pub fn increment_nonce(&mut self, address: Address) -> Result<(), VMError> {
        self.ensure_loaded(address);
        let old = self.get_nonce(address);
        let new = old
            .checked_add(1)
            .ok_or(VMError::Internal(InternalError::Overflow))?;
        self.journal.push(JournalEntry::Nonce { address, old });
        if let Some(account) = self.accounts.get_mut(&address) {
            account.info.nonce = new;
        }
        Ok(())
    }

    pub fn set_code(&mut self, address: Address, code: Vec<u8>) {
        self.ensure_loaded(address);
        let old = self.get_code(address);
        self.journal.push(JournalEntry::Code { address, old });
        if let Some(account) = self.accounts.get_mut(&address) {
            account.info.bytecode = code;
        }
    }

    pub fn set_storage(&mut self, address: Address, key: U256, value: U256) {
        self.ensure_loaded(address);
        let old = self.get_storage(address, key);
        if old == value {
            return;
        }
        self.journal.push(JournalEntry::Storage { address, key, old });
        if let Some(account) = self.accounts.get_mut(&address) {
            account.set_storage(key, value);
        }
    }

    /// Resets an account to empty in place, used by SELFDESTRUCT: this
    /// specification treats "marked for deletion" as "reset to empty"
    /// (full state-root accounting is out of scope).
    pub fn clear_account(&mut self, address: Address) {
        self.ensure_loaded(address);
        let balance = self.get_balance(address);
        if !balance.is_zero() {
            self.set_balance(address, U256::zero());
        }
        let code = self.get_code(address);
        if !code.is_empty() {
            self.set_code(address, Vec::new());
        }
    }

    /// A deep snapshot cheap enough to take per-frame: the journal length.
    pub fn snapshot(&self) -> usize {
        self.journal.len()
    }

    /// Undoes every write recorded since `checkpoint`, in reverse order.
    pub fn revert(&mut self, checkpoint: usize) {
        while self.journal.len() > checkpoint {
            let Some(entry) = self.journal.pop() else {
                break;
            };
            match entry {
                JournalEntry::Balance { address, old } => {
                    if let Some(account) = self.accounts.get_mut(&address) {
                        account.info.balance = old;
                    }
                }
                JournalEntry::Nonce { address, old } => {
                    if let Some(account) = self.accounts.get_mut(&address) {
                        account.info.nonce = old;
                    }
                }
                JournalEntry::Code { address, old } => {
                    if let Some(account) = self.accounts.get_mut(&address) {
                        account.info.bytecode = old;
                    }
                }
                JournalEntry::Storage { address, key, old } => {
                    if let Some(account) = self.accounts.get_mut(&address) {
                        account.set_storage(key, old);
                    }
                }
            }
        }
    }

    /// Discards undo history up to `checkpoint`: the writes are now final.
    pub fn commit(&mut self, checkpoint: usize) {
        if checkpoint == 0 {
            self.journal.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Db;

    #[test]
    fn revert_restores_balance_and_storage() {
        let db = Arc::new(Db::new());
        let mut cache = CacheDB::new(db);
        let address = Address::from_low_u64_be(1);

        let checkpoint = cache.snapshot();
        cache.increase_balance(address, U256::from(100)).unwrap();
        cache.set_storage(address, U256::from(1), U256::from(7));
        assert_eq!(cache.get_balance(address), U256::from(100));

        cache.revert(checkpoint);
        assert_eq!(cache.get_balance(address), U256::zero());
        assert_eq!(cache.get_storage(address, U256::from(1)), U256::zero());
    }

    #[test]
    fn nested_snapshot_reverts_only_inner_writes() {
        let db = Arc::new(Db::new());
        let mut cache = CacheDB::new(db);
        let address = Address::from_low_u64_be(1);

        cache.increase_balance(address, U256::from(10)).unwrap();
        let inner = cache.snapshot();
        cache.increase_balance(address, U256::from(5)).unwrap();
        cache.revert(inner);

        assert_eq!(cache.get_balance(address), U256::from(10));
    }
}
