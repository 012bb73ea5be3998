//! End-to-end scenarios (C8/§8): each test drives a transaction through
//! [`VM::transact`] and checks the externally observable outcome — gas used,
//! balances, created addresses, logs — rather than internals.

use std::sync::Arc;

use ethereum_types::{Address, U256};

use fevm::account::Account;
use fevm::db::{CacheDB, Database, Db};
use fevm::environment::Environment;
use fevm::fork::Fork;
use fevm::vm::{calculate_create_address, VM};

fn addr(n: u64) -> Address {
    Address::from_low_u64_be(n)
}

/// Installs a `tracing` subscriber honoring `RUST_LOG`, so `cargo test -- --nocapture`
/// surfaces the frame-entry/exit and dispatch spans emitted by [`fevm::vm`].
/// Safe to call from every test: later calls after the first are no-ops.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn vm_for(
    to: Option<Address>,
    sender: Address,
    value: U256,
    data: Vec<u8>,
    gas_limit: u64,
    gas_price: U256,
    db: Db,
    fork: Fork,
) -> VM {
    let db: Arc<dyn Database> = Arc::new(db);
    let cache = CacheDB::new(db.clone());
    let env = Environment::new(sender);
    VM::new(to, env, sender, value, data, gas_limit, gas_price, 0, db, cache, fork).unwrap()
}

fn funded_db(accounts: impl IntoIterator<Item = (Address, Account)>) -> Db {
    let mut db = Db::new();
    db.add_accounts(accounts);
    db
}

/// S1: a plain value transfer with no code costs exactly the intrinsic
/// 21000 gas and moves value from sender to recipient.
#[test]
fn s1_plain_value_transfer() {
    init_tracing();
    let sender = addr(0xA);
    let recipient = addr(0x02);
    let initial_balance = U256::from(10u64).pow(U256::from(18u64));

    let db = funded_db([(sender, Account::new(0, initial_balance, Vec::new(), Default::default()))]);
    let mut vm = vm_for(
        Some(recipient),
        sender,
        U256::from(1000u64),
        Vec::new(),
        21_000,
        U256::one(),
        db,
        Fork::Frontier,
    );

    let report = vm.transact().unwrap();

    assert!(report.success);
    assert_eq!(report.gas_used, 21_000);
    assert_eq!(vm.cache.get_balance(recipient), U256::from(1000u64));
    assert_eq!(
        vm.cache.get_balance(sender),
        initial_balance.saturating_sub(U256::from(21_000u64)).saturating_sub(U256::from(1000u64))
    );
    assert_eq!(vm.cache.get_nonce(sender), 1);
}

/// S2: a creation transaction whose init code stores 0x42 in memory and
/// returns it as the runtime code. The created address follows the CREATE
/// rule (keccak(rlp([sender, nonce]))) and the deployed code is exactly the
/// 32-byte big-endian encoding of 0x42.
#[test]
fn s2_create_deploys_returned_code() {
    init_tracing();
    let sender = addr(0xA);
    let initial_balance = U256::from(10u64).pow(U256::from(18u64));
    let init_code = vec![0x60, 0x42, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xF3];

    let db = funded_db([(sender, Account::new(0, initial_balance, Vec::new(), Default::default()))]);
    let mut vm = vm_for(None, sender, U256::zero(), init_code, 1_000_000, U256::one(), db, Fork::Frontier);

    let report = vm.transact().unwrap();

    assert!(report.success);
    let expected_address = calculate_create_address(sender, 0).unwrap();
    assert_eq!(report.created_address, Some(expected_address));

    let mut expected_code = [0u8; 32];
    expected_code[31] = 0x42;
    assert_eq!(vm.cache.get_code(expected_address), expected_code.to_vec());
}

/// S3: PUSH0 is cheaper than an equivalent PUSH1 0 on a fork that accepts
/// it, while producing identical observable output.
#[test]
fn s3_push0_is_cheaper_than_push1_zero() {
    init_tracing();
    let sender = addr(0xA);
    let balance = U256::from(10u64).pow(U256::from(18u64));

    let push0_code = vec![0x5F, 0x5F, 0x52, 0x60, 0x20, 0x5F, 0xF3];
    let push1_code = vec![0x60, 0x00, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xF3];

    let db_a = funded_db([(sender, Account::new(0, balance, Vec::new(), Default::default()))]);
    let mut vm_shanghai = vm_for(
        None,
        sender,
        U256::zero(),
        push0_code,
        1_000_000,
        U256::one(),
        db_a,
        Fork::Shanghai,
    );
    let report_shanghai = vm_shanghai.transact().unwrap();
    assert!(report_shanghai.success);
    assert_eq!(report_shanghai.output, vec![0u8; 32]);

    let db_b = funded_db([(sender, Account::new(0, balance, Vec::new(), Default::default()))]);
    let mut vm_homestead = vm_for(
        None,
        sender,
        U256::zero(),
        push1_code,
        1_000_000,
        U256::one(),
        db_b,
        Fork::Homestead,
    );
    let report_homestead = vm_homestead.transact().unwrap();
    assert!(report_homestead.success);
    assert_eq!(report_homestead.output, vec![0u8; 32]);

    assert!(report_shanghai.gas_used < report_homestead.gas_used);
}

/// S4: jumping into the middle of a PUSH's immediate bytes (a byte that
/// isn't a real JUMPDEST) fails INVALID_JUMP and burns all forwarded gas.
#[test]
fn s4_jump_into_non_jumpdest_consumes_all_gas() {
    init_tracing();
    let sender = addr(0xA);
    let balance = U256::from(10u64).pow(U256::from(18u64));
    // PUSH1 0, JUMP, STOP, JUMPDEST, STOP
    let code = vec![0x60, 0x00, 0x56, 0x00, 0x5B, 0x00];

    let db = funded_db([(sender, Account::new(0, balance, Vec::new(), Default::default()))]);
    let mut vm = vm_for(None, sender, U256::zero(), code, 1_000_000, U256::one(), db, Fork::Frontier);

    let report = vm.transact().unwrap();

    assert!(!report.success);
    assert!(report.logs.is_empty());
    assert_eq!(report.gas_used, 1_000_000);
}

/// S5: SSTORE inside a STATICCALL fails WRITE_PROTECTION; the outer frame
/// observes a failure push and the caller's own storage is unaffected.
#[test]
fn s5_staticcall_blocks_sstore() {
    init_tracing();
    let caller = addr(0xA);
    let callee = addr(0xB0B);
    let balance = U256::from(10u64).pow(U256::from(18u64));

    // SSTORE(1, 1): PUSH1 1, PUSH1 1, SSTORE
    let callee_code = vec![0x60, 0x01, 0x60, 0x01, 0x55];
    // STATICCALL(gas, callee, 0, 0, 0, 0)
    let mut outer_code = vec![
        0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, // ret_size ret_offset args_size args_offset
        0x73, // PUSH20 callee
    ];
    outer_code.extend_from_slice(callee.as_bytes());
    outer_code.extend_from_slice(&[0x5A, 0xFA]); // GAS, STATICCALL

    let db = funded_db([
        (caller, Account::new(0, balance, outer_code, Default::default())),
        (callee, Account::new(0, U256::zero(), callee_code, Default::default())),
    ]);
    let mut vm = vm_for(
        Some(caller),
        addr(0xF00D),
        U256::zero(),
        Vec::new(),
        1_000_000,
        U256::one(),
        db,
        Fork::Frontier,
    );

    let report = vm.transact().unwrap();

    assert!(report.success);
    assert_eq!(vm.cache.get_storage(caller, U256::one()), U256::zero());
    assert_eq!(vm.cache.get_storage(callee, U256::one()), U256::zero());
}

/// S6: CALL with value from A to B where B's code reverts — the transfer is
/// rolled back along with everything else the sub-frame attempted.
#[test]
fn s6_call_revert_rolls_back_value_transfer() {
    init_tracing();
    let caller = addr(0xA);
    let callee = addr(0xB);
    let caller_balance = U256::from(10u64);

    // REVERT(0, 0): PUSH1 0, PUSH1 0, REVERT
    let callee_code = vec![0x60, 0x00, 0x60, 0x00, 0xFD];
    let mut outer_code = vec![
        0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, // ret_size ret_offset args_size args_offset
        0x60, 0x01, // value = 1
        0x73, // PUSH20 callee
    ];
    outer_code.extend_from_slice(callee.as_bytes());
    outer_code.extend_from_slice(&[0x61, 0xFF, 0xFF, 0xF1]); // PUSH2 0xFFFF (gas), CALL

    let db = funded_db([
        (caller, Account::new(0, caller_balance, outer_code, Default::default())),
        (callee, Account::new(0, U256::zero(), callee_code, Default::default())),
    ]);
    let mut vm = vm_for(
        Some(caller),
        addr(0xF00D),
        U256::zero(),
        Vec::new(),
        1_000_000,
        U256::one(),
        db,
        Fork::Frontier,
    );

    let report = vm.transact().unwrap();

    assert!(report.success);
    assert_eq!(vm.cache.get_balance(caller), caller_balance);
    assert_eq!(vm.cache.get_balance(callee), U256::zero());
}

/// A CALL requesting more value than the caller holds is rejected without
/// touching gas or balances: the forwarded-gas charge never happens.
#[test]
fn call_with_value_above_balance_is_rejected_for_free() {
    init_tracing();
    let caller = addr(0xA);
    let callee = addr(0xB);
    let caller_balance = U256::from(5u64);

    let callee_code = vec![0x00]; // STOP; never reached
    let mut outer_code = vec![
        0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, // ret_size ret_offset args_size args_offset
        0x60, 0x0A, // value = 10, above the caller's balance of 5
        0x73,
    ];
    outer_code.extend_from_slice(callee.as_bytes());
    outer_code.extend_from_slice(&[0x61, 0xFF, 0xFF, 0xF1]); // PUSH2 0xFFFF (gas), CALL

    let db = funded_db([
        (caller, Account::new(0, caller_balance, outer_code, Default::default())),
        (callee, Account::new(0, U256::zero(), callee_code, Default::default())),
    ]);
    let mut vm = vm_for(
        Some(caller),
        addr(0xF00D),
        U256::zero(),
        Vec::new(),
        1_000_000,
        U256::one(),
        db,
        Fork::Frontier,
    );

    let report = vm.transact().unwrap();

    assert!(report.success);
    assert_eq!(vm.cache.get_balance(caller), caller_balance);
    assert_eq!(vm.cache.get_balance(callee), U256::zero());
}

/// CREATE with a value exceeding the creator's balance pushes 0 and never
/// deploys a contract at the would-be address.
#[test]
fn create_with_value_above_balance_deploys_nothing() {
    init_tracing();
    let sender = addr(0xA);
    let balance = U256::from(5u64);
    // Trivial init code that would return 1 byte of runtime code if reached.
    let init_code = vec![0x60, 0x00, 0x60, 0x00, 0xF3];

    // Write init_code into memory byte-by-byte via MSTORE8, then
    // CREATE(value=10, offset=0, size), where value exceeds the sender's
    // balance of 5.
    let mut code = Vec::new();
    for (i, byte) in init_code.iter().enumerate() {
        code.push(0x60);
        code.push(*byte);
        code.push(0x60);
        code.push(u8::try_from(i).unwrap());
        code.push(0x53); // MSTORE8
    }
    code.extend_from_slice(&[0x60, u8::try_from(init_code.len()).unwrap()]); // size
    code.extend_from_slice(&[0x60, 0x00]); // offset
    code.extend_from_slice(&[0x60, 0x0A]); // value = 10, above balance of 5
    code.push(0xF0); // CREATE

    let db = funded_db([(sender, Account::new(0, balance, code, Default::default()))]);
    let mut vm = vm_for(
        Some(sender),
        addr(0xF00D),
        U256::zero(),
        Vec::new(),
        1_000_000,
        U256::one(),
        db,
        Fork::Frontier,
    );

    let report = vm.transact().unwrap();

    assert!(report.success);
    assert_eq!(vm.cache.get_balance(sender), balance);
}

/// Jumping into the middle of a PUSH's immediate data is exactly as invalid
/// as jumping to an arbitrary non-JUMPDEST byte, even when that byte's value
/// happens to equal the JUMPDEST opcode.
#[test]
fn jump_into_push_immediate_data_is_invalid() {
    init_tracing();
    let sender = addr(0xA);
    let balance = U256::from(10u64).pow(U256::from(18u64));
    // PUSH1 4, JUMP, PUSH1 0x5B (the JUMPDEST byte, but as push data at index
    // 4, not an instruction), STOP.
    let code = vec![0x60, 0x04, 0x56, 0x60, 0x5B, 0x00];

    let recipient = addr(0xC0DE);
    let db = funded_db([
        (sender, Account::new(0, balance, Vec::new(), Default::default())),
        (recipient, Account::new(0, U256::zero(), code, Default::default())),
    ]);
    let mut vm = vm_for(
        Some(recipient),
        sender,
        U256::zero(),
        Vec::new(),
        1_000_000,
        U256::one(),
        db,
        Fork::Frontier,
    );

    let report = vm.transact().unwrap();

    assert!(!report.success);
    assert_eq!(report.gas_used, 1_000_000);
}
