//! Test-harness builders (C9): assemble a ready-to-run [`VM`] around a
//! contract's bytecode without hand-wiring [`Db`]/[`CacheDB`]/[`Environment`]
//! at every call site. Used by unit tests across the opcode handlers and by
//! the end-to-end scenario tests.

use std::sync::Arc;

use ethereum_types::{Address, U256};

use crate::{
    account::Account,
    db::{CacheDB, Database, Db},
    environment::Environment,
    errors::VMError,
    fork::Fork,
    operations::Operation,
    vm::VM,
};

/// The contract under test always lives at this address.
pub const CONTRACT_ADDRESS: u64 = 42;
/// The externally-owned account sending the transaction.
pub const SENDER_ADDRESS: u64 = 100;

pub fn ops_to_bytecode(operations: &[Operation]) -> Result<Vec<u8>, VMError> {
    let mut bytecode = Vec::new();
    for op in operations {
        bytecode.extend_from_slice(&op.to_bytecode()?);
    }
    Ok(bytecode)
}

pub fn new_vm_with_bytecode(bytecode: Vec<u8>) -> Result<VM, VMError> {
    new_vm_with_ops_addr_bal_db(bytecode, Address::from_low_u64_be(SENDER_ADDRESS), U256::MAX, Db::new())
}

pub fn new_vm_with_ops(operations: &[Operation]) -> Result<VM, VMError> {
    let bytecode = ops_to_bytecode(operations)?;
    new_vm_with_bytecode(bytecode)
}

pub fn new_vm_with_ops_db(operations: &[Operation], db: Db) -> Result<VM, VMError> {
    let bytecode = ops_to_bytecode(operations)?;
    new_vm_with_ops_addr_bal_db(bytecode, Address::from_low_u64_be(SENDER_ADDRESS), U256::MAX, db)
}

/// This function is for testing purposes only.
pub fn new_vm_with_ops_addr_bal_db(
    contract_bytecode: Vec<u8>,
    sender_address: Address,
    sender_balance: U256,
    mut db: Db,
) -> Result<VM, VMError> {
    let contract_address = Address::from_low_u64_be(CONTRACT_ADDRESS);

    db.add_accounts([
        (contract_address, Account::new(0, U256::MAX, contract_bytecode, Default::default())),
        (sender_address, Account::new(0, sender_balance, Vec::new(), Default::default())),
    ]);

    let db: Arc<dyn Database> = Arc::new(db);
    let cache = CacheDB::new(db.clone());
    let env = Environment::new(sender_address);

    VM::new(
        Some(contract_address),
        env,
        sender_address,
        U256::zero(),
        Vec::new(),
        1_000_000,
        U256::zero(),
        0,
        db,
        cache,
        Fork::Shanghai,
    )
}
