//! The interpreter (C6/C7): opcode dispatch loop, call-frame stack, and the
//! state-transition function `transact` (C8). Opcode bodies live in
//! [`crate::opcode_handlers`] as `impl VM` blocks; this module owns the loop
//! that drives them plus the shared CALL/CREATE machinery every system
//! opcode funnels through.

use std::collections::HashSet;
use std::sync::Arc;

use ethereum_types::{Address, U256};
use keccak_hash::keccak;

use crate::call_frame::CallFrame;
use crate::constants::{create_opcode, CALL_DEPTH_LIMIT, INVALID_CONTRACT_PREFIX};
use crate::db::{CacheDB, Database};
use crate::environment::Environment;
use crate::errors::{InternalError, OpcodeSuccess, TxValidationError, VMError};
use crate::fork::Fork;
use crate::gas_cost;
use crate::opcodes::Opcode;
use crate::report::{ExecutionResult, TransactionReport};

/// Minimal RLP encoder, scoped to exactly what `calculate_create_address`
/// needs: a two-element list of (address, nonce). Not a general-purpose
/// codec — this crate has no other RLP consumer.
mod rlp {
    fn trimmed_be_bytes(value: u64) -> Vec<u8> {
        let bytes = value.to_be_bytes();
        match bytes.iter().position(|&b| b != 0) {
            Some(i) => bytes[i..].to_vec(),
            None => Vec::new(),
        }
    }

    pub fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
        if bytes.len() == 1 && bytes[0] < 0x80 {
            return vec![bytes[0]];
        }
        if bytes.len() < 56 {
            let mut out = Vec::with_capacity(1 + bytes.len());
            out.push(0x80u8.saturating_add(bytes.len() as u8));
            out.extend_from_slice(bytes);
            return out;
        }
        let len_bytes = trimmed_be_bytes(bytes.len() as u64);
        let mut out = Vec::with_capacity(1 + len_bytes.len() + bytes.len());
        out.push(0xb7u8.saturating_add(len_bytes.len() as u8));
        out.extend_from_slice(&len_bytes);
        out.extend_from_slice(bytes);
        out
    }

    pub fn encode_u64(value: u64) -> Vec<u8> {
        let bytes = trimmed_be_bytes(value);
        if bytes.is_empty() {
            vec![0x80]
        } else {
            encode_bytes(&bytes)
        }
    }

    pub fn encode_list(items: &[Vec<u8>]) -> Vec<u8> {
        let payload: Vec<u8> = items.concat();
        if payload.len() < 56 {
            let mut out = Vec::with_capacity(1 + payload.len());
            out.push(0xc0u8.saturating_add(payload.len() as u8));
            out.extend_from_slice(&payload);
            return out;
        }
        let len_bytes = trimmed_be_bytes(payload.len() as u64);
        let mut out = Vec::with_capacity(1 + len_bytes.len() + payload.len());
        out.push(0xf7u8.saturating_add(len_bytes.len() as u8));
        out.extend_from_slice(&len_bytes);
        out.extend_from_slice(&payload);
        out
    }
}

pub fn address_to_word(address: Address) -> U256 {
    let mut bytes = [0u8; 32];
    bytes[12..].copy_from_slice(address.as_bytes());
    U256::from_big_endian(&bytes)
}

pub fn word_to_address(word: U256) -> Address {
    let mut bytes = [0u8; 32];
    word.to_big_endian(&mut bytes);
    Address::from_slice(&bytes[12..])
}

/// Saturating `U256` -> `usize` conversion for memory offsets/sizes: a value
/// too large to be a real memory index saturates to `usize::MAX`, which then
/// fails as an unaffordable memory expansion rather than panicking.
pub fn word_to_usize(word: U256) -> usize {
    if word > U256::from(usize::MAX) {
        usize::MAX
    } else {
        word.as_usize()
    }
}

/// Pre-scans `bytecode` for JUMPDEST positions, skipping over PUSH immediate
/// data so a JUMPDEST byte embedded in push data is never treated as a valid
/// target.
pub fn get_valid_jump_destinations(bytecode: &[u8]) -> HashSet<usize> {
    let mut destinations = HashSet::new();
    let mut pc = 0usize;
    while pc < bytecode.len() {
        let Some(&byte) = bytecode.get(pc) else {
            break;
        };
        let opcode = Opcode::from(byte);
        if opcode == Opcode::JUMPDEST {
            destinations.insert(pc);
            pc = pc.saturating_add(1);
        } else {
            pc = pc
                .saturating_add(1)
                .saturating_add(opcode.push_data_len() as usize);
        }
    }
    destinations
}

/// `get_n_value`: maps a PUSHn/DUPn/SWAPn opcode to its n (1-indexed).
pub fn get_n_value(op: Opcode, base: Opcode) -> Result<usize, VMError> {
    let offset = (op as u8)
        .checked_sub(base as u8)
        .ok_or(InternalError::Overflow)?;
    Ok(usize::from(offset).saturating_add(1))
}

/// `get_number_of_topics`: maps LOGn to n (0-4).
pub fn get_number_of_topics(op: Opcode) -> Result<u8, VMError> {
    (op as u8)
        .checked_sub(Opcode::LOG0 as u8)
        .ok_or(VMError::Internal(InternalError::Overflow))
}

/// CREATE's target address: the last 20 bytes of
/// `KECCAK256(RLP([sender, sender_nonce]))`, computed with the nonce the
/// sender held *before* the creation's own nonce bump.
pub fn calculate_create_address(sender: Address, sender_nonce: u64) -> Result<Address, VMError> {
    let encoded = rlp::encode_list(&[
        rlp::encode_bytes(sender.as_bytes()),
        rlp::encode_u64(sender_nonce),
    ]);
    let hash = keccak(encoded);
    Ok(Address::from_slice(&hash.as_bytes()[12..]))
}

/// CREATE2's target address: the last 20 bytes of
/// `KECCAK256(0xFF ++ sender ++ salt ++ KECCAK256(init_code))`.
pub fn calculate_create2_address(sender: Address, init_code: &[u8], salt: U256) -> Address {
    let mut salt_bytes = [0u8; 32];
    salt.to_big_endian(&mut salt_bytes);
    let init_code_hash = keccak(init_code);

    let mut preimage = Vec::with_capacity(1 + 20 + 32 + 32);
    preimage.push(0xffu8);
    preimage.extend_from_slice(sender.as_bytes());
    preimage.extend_from_slice(&salt_bytes);
    preimage.extend_from_slice(init_code_hash.as_bytes());

    let hash = keccak(preimage);
    Address::from_slice(&hash.as_bytes()[12..])
}

/// Owns the call-frame stack, the chain/block environment, and the
/// journaled state overlay for one transaction's execution.
pub struct VM {
    pub call_frames: Vec<CallFrame>,
    pub env: Environment,
    pub db: Arc<dyn Database>,
    pub cache: CacheDB,
    pub fork: Fork,
    /// `None` for a create transaction, the callee for a call transaction.
    pub to: Option<Address>,
    pub sender: Address,
    pub gas_price: U256,
    pub gas_limit: u64,
    pub value: U256,
    pub nonce: u64,
    pub is_create: bool,
    /// The transaction's input: init code for a create, calldata for a call.
    pub data: Vec<u8>,
    /// Accumulated SSTORE clear-refund credit (see the refund-cap design
    /// note: this crate applies it uncapped, unlike later EIP-3529 forks).
    pub refunded_gas: u64,
}

impl VM {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        to: Option<Address>,
        env: Environment,
        sender: Address,
        value: U256,
        data: Vec<u8>,
        gas_limit: u64,
        gas_price: U256,
        nonce: u64,
        db: Arc<dyn Database>,
        mut cache: CacheDB,
        fork: Fork,
    ) -> Result<Self, VMError> {
        let is_create = to.is_none();

        let (target, bytecode, frame_calldata) = match to {
            Some(address) => {
                let code = cache.get_code(address);
                (address, code, data.clone())
            }
            None => {
                let creation_nonce = cache.get_nonce(sender);
                let address = calculate_create_address(sender, creation_nonce)?;
                (address, data.clone(), Vec::new())
            }
        };

        let initial_call_frame = CallFrame::new(
            sender,
            target,
            target,
            bytecode,
            value,
            frame_calldata,
            false,
            is_create,
            gas_limit,
            0,
        );

        Ok(Self {
            call_frames: vec![initial_call_frame],
            env,
            db,
            cache,
            fork,
            to,
            sender,
            gas_price,
            gas_limit,
            value,
            nonce,
            is_create,
            data,
            refunded_gas: 0,
        })
    }

    /// Charges `gas` against `current_call_frame`, failing with `OutOfGas`
    /// rather than letting `gas_used` exceed `gas_limit`.
    pub fn increase_consumed_gas(
        &self,
        current_call_frame: &mut CallFrame,
        gas: u64,
    ) -> Result<(), VMError> {
        let new_used = current_call_frame
            .gas_used
            .checked_add(gas)
            .ok_or(VMError::Internal(InternalError::Overflow))?;
        if new_used > current_call_frame.gas_limit {
            return Err(VMError::OutOfGas);
        }
        current_call_frame.gas_used = new_used;
        Ok(())
    }

    /// Moves `value` from `from` to `to`, or returns `Ok(false)` if `from`
    /// cannot afford it (a normal, non-exceptional call/create outcome).
    pub fn transfer_value(&mut self, from: Address, to: Address, value: U256) -> Result<bool, VMError> {
        if value.is_zero() {
            return Ok(true);
        }
        if self.cache.get_balance(from) < value {
            return Ok(false);
        }
        self.cache.decrease_balance(from, value)?;
        self.cache.increase_balance(to, value)?;
        Ok(true)
    }

    /// Validates the five preconditions of step 2 of the state-transition
    /// function and returns the transaction's intrinsic gas cost.
    fn validate_transaction(&mut self) -> Result<u64, TxValidationError> {
        let actual_nonce = self.cache.get_nonce(self.sender);
        if actual_nonce != self.nonce {
            return Err(TxValidationError::InvalidNonce {
                expected: actual_nonce,
                actual: self.nonce,
            });
        }

        if self.is_create
            && self.fork.metered_initcode()
            && self.data.len() > create_opcode::MAX_INITCODE_SIZE
        {
            return Err(TxValidationError::InitcodeTooLarge {
                size: self.data.len(),
                max: create_opcode::MAX_INITCODE_SIZE,
            });
        }

        let intrinsic = gas_cost::intrinsic_gas(&self.data, self.is_create, self.fork)
            .map_err(|_| TxValidationError::IntrinsicGasTooLow {
                gas: self.gas_limit,
                intrinsic: self.gas_limit,
            })?;
        if self.gas_limit < intrinsic {
            return Err(TxValidationError::IntrinsicGasTooLow {
                gas: self.gas_limit,
                intrinsic,
            });
        }

        let upfront = self
            .gas_price
            .checked_mul(U256::from(self.gas_limit))
            .ok_or(TxValidationError::InsufficientFunds)?;
        let required = upfront
            .checked_add(self.value)
            .ok_or(TxValidationError::InsufficientFunds)?;
        if self.cache.get_balance(self.sender) < required {
            return Err(TxValidationError::InsufficientFunds);
        }

        Ok(intrinsic)
    }

    /// Step 3: debits the gas allowance, bumps the sender's nonce, and
    /// charges the intrinsic cost against the initial frame.
    fn prepare_execution(&mut self, intrinsic_gas: u64) {
        let upfront_cost = self.gas_price.saturating_mul(U256::from(self.gas_limit));
        self.cache.decrease_balance(self.sender, upfront_cost).unwrap_or(());
        self.cache.increment_nonce(self.sender).unwrap_or(());
        if let Some(frame) = self.call_frames.last_mut() {
            frame.gas_used = intrinsic_gas;
        }
    }

    /// Step 5 (invoke) wrapped in its own checkpoint: the outer transaction
    /// behaves like a top-level CALL or CREATE against the initial frame.
    fn run_outer(&mut self) -> ExecutionResult {
        let target = match self.call_frames.last() {
            Some(frame) => frame.target,
            None => {
                return ExecutionResult::Halt {
                    reason: VMError::Internal(InternalError::NoCallFrame),
                    gas_used: self.gas_limit,
                }
            }
        };

        let checkpoint = self.cache.snapshot();

        let transferred = self.transfer_value(self.sender, target, self.value).unwrap_or(false);
        if !transferred {
            self.cache.revert(checkpoint);
            return ExecutionResult::Halt {
                reason: VMError::OutOfGas,
                gas_used: self.gas_limit,
            };
        }

        let outcome = match self.execute() {
            Ok(result) => result,
            Err(error) => ExecutionResult::Halt {
                reason: error,
                gas_used: self.gas_limit,
            },
        };

        let outcome = if self.is_create {
            self.finalize_create(outcome)
        } else {
            outcome
        };

        match &outcome {
            ExecutionResult::Success { .. } => self.cache.commit(checkpoint),
            _ => self.cache.revert(checkpoint),
        }

        outcome
    }

    /// Applies the code-deposit checks and charge to a successful top-level
    /// create's returned init-code output, deploying the runtime code on
    /// success. A failure here fails the whole transaction (all gas spent),
    /// which is why it's handled after, not inside, the interpreter loop.
    fn finalize_create(&mut self, result: ExecutionResult) -> ExecutionResult {
        let target = match self.call_frames.last() {
            Some(frame) => frame.target,
            None => return result,
        };
        let ExecutionResult::Success {
            reason,
            logs,
            return_data,
        } = result
        else {
            return result;
        };

        if self.fork.enforces_runtime_code_size_limit()
            && gas_cost::exceeds_max_code_size(return_data.len())
        {
            return self.create_failure();
        }
        if return_data.first() == Some(&INVALID_CONTRACT_PREFIX) {
            return self.create_failure();
        }

        let deposit_cost = match gas_cost::code_deposit_cost(return_data.len()) {
            Ok(cost) => cost,
            Err(_) => return self.create_failure(),
        };

        let (gas_used, gas_limit) = match self.call_frames.last() {
            Some(frame) => (frame.gas_used, frame.gas_limit),
            None => (0, 0),
        };
        let new_gas_used = gas_used.saturating_add(deposit_cost);
        if new_gas_used > gas_limit {
            return self.create_failure();
        }
        if let Some(frame) = self.call_frames.last_mut() {
            frame.gas_used = new_gas_used;
        }

        self.cache.set_code(target, return_data.clone());
        ExecutionResult::Success {
            reason,
            logs,
            return_data,
        }
    }

    fn create_failure(&self) -> ExecutionResult {
        let gas_limit = self.call_frames.last().map(|f| f.gas_limit).unwrap_or(self.gas_limit);
        ExecutionResult::Halt {
            reason: VMError::OutOfGas,
            gas_used: gas_limit,
        }
    }

    /// Steps 6-8: nets the accumulated SSTORE refund against gas used,
    /// refunds the unspent gas allowance to the sender, and pays the
    /// coinbase flat, uncapped — there is no EIP-3529 refund cap in scope.
    fn post_execution_changes(&mut self, result: ExecutionResult) -> TransactionReport {
        let (raw_gas_used, logs, output, success) = match &result {
            ExecutionResult::Success { logs, return_data, .. } => {
                let used = self.call_frames.last().map(|f| f.gas_used).unwrap_or(self.gas_limit);
                (used, logs.clone(), return_data.clone(), true)
            }
            ExecutionResult::Revert { gas_used, output, .. } => (*gas_used, Vec::new(), output.clone(), false),
            ExecutionResult::Halt { gas_used, .. } => (*gas_used, Vec::new(), Vec::new(), false),
        };

        let created_address = if success && self.is_create {
            self.call_frames.last().map(|f| f.target)
        } else {
            None
        };

        let gas_used = raw_gas_used.saturating_sub(self.refunded_gas);

        let unused = self.gas_limit.saturating_sub(gas_used);
        let sender_refund = self.gas_price.saturating_mul(U256::from(unused));
        self.cache.increase_balance(self.sender, sender_refund).unwrap_or(());

        let coinbase_amount = self.gas_price.saturating_mul(U256::from(gas_used));
        self.cache.increase_balance(self.env.coinbase, coinbase_amount).unwrap_or(());

        TransactionReport {
            success,
            gas_used,
            output,
            logs,
            created_address,
        }
    }

    /// The state-transition function (C8): validate, pre-charge, invoke,
    /// settle gas. Returns before any state mutation on validation failure.
    pub fn transact(&mut self) -> Result<TransactionReport, TxValidationError> {
        let intrinsic_gas = self.validate_transaction()?;
        self.prepare_execution(intrinsic_gas);
        let result = self.run_outer();
        Ok(self.post_execution_changes(result))
    }

    /// Runs the popped top-of-stack frame until it produces an
    /// [`ExecutionResult`], then restores it to `call_frames` so the caller
    /// (a nested CALL/CREATE handler, or `run_outer`) can still inspect its
    /// final gas accounting.
    pub fn execute(&mut self) -> Result<ExecutionResult, VMError> {
        let mut frame = self
            .call_frames
            .pop()
            .ok_or(VMError::Internal(InternalError::NoCallFrame))?;

        let outcome = loop {
            let opcode = Opcode::from(frame.current_opcode_byte());

            #[cfg(feature = "trace")]
            tracing::trace!(
                pc = frame.pc,
                ?opcode,
                gas_remaining = frame.gas_remaining(),
                "dispatch"
            );

            if !self.fork.accepts(opcode) {
                break ExecutionResult::Halt {
                    reason: VMError::InvalidOpcode,
                    gas_used: frame.gas_limit,
                };
            }

            match self.dispatch(&mut frame, opcode) {
                Ok(OpcodeSuccess::Continue) => {
                    if !matches!(opcode, Opcode::JUMP | Opcode::JUMPI) {
                        let step = 1usize.saturating_add(opcode.push_data_len() as usize);
                        if let Err(error) = frame.increment_pc_by(step) {
                            break ExecutionResult::Halt {
                                reason: error,
                                gas_used: frame.gas_limit,
                            };
                        }
                    }
                }
                Ok(OpcodeSuccess::Result(reason)) => {
                    break ExecutionResult::Success {
                        reason,
                        logs: frame.logs.clone(),
                        return_data: frame.output.clone(),
                    };
                }
                Err(VMError::RevertOpcode) => {
                    break ExecutionResult::Revert {
                        reason: VMError::RevertOpcode,
                        gas_used: frame.gas_used,
                        output: frame.output.clone(),
                    };
                }
                Err(error) => {
                    tracing::warn!(?error, pc = frame.pc, depth = frame.depth, "frame failed");
                    break ExecutionResult::Halt {
                        reason: error,
                        gas_used: frame.gas_limit,
                    };
                }
            }
        };

        self.call_frames.push(frame);
        Ok(outcome)
    }

    /// Shared CALL/CALLCODE/DELEGATECALL/STATICCALL machinery: forwards
    /// `gas_forwarded` (plus `stipend`, granted free on top and never charged
    /// to the caller) to a new frame over `code_address`'s code, transfers
    /// `value` first when `transfers_value` (rolling back on insufficient
    /// balance), and on return refunds unused gas, copies output into the
    /// caller's memory, and pushes the success flag.
    #[allow(clippy::too_many_arguments)]
    pub fn generic_call(
        &mut self,
        current_call_frame: &mut CallFrame,
        gas_forwarded: u64,
        stipend: u64,
        value: U256,
        transfers_value: bool,
        msg_sender: Address,
        target: Address,
        code_address: Address,
        is_static: bool,
        args_offset: usize,
        args_size: usize,
        ret_offset: usize,
        ret_size: usize,
    ) -> Result<(), VMError> {
        if current_call_frame.depth >= CALL_DEPTH_LIMIT {
            current_call_frame.stack.push(U256::zero())?;
            return Ok(());
        }

        // Balance check happens before any gas is deducted: an unaffordable
        // value transfer rejects the call for free rather than burning the
        // gas that would have been forwarded.
        if transfers_value && self.cache.get_balance(msg_sender) < value {
            current_call_frame.stack.push(U256::zero())?;
            return Ok(());
        }

        let calldata = current_call_frame.memory.load_range(args_offset, args_size)?;
        let code = self.cache.get_code(code_address);

        self.increase_consumed_gas(current_call_frame, gas_forwarded)?;

        let checkpoint = self.cache.snapshot();
        let transferred = if transfers_value {
            self.transfer_value(msg_sender, target, value)?
        } else {
            true
        };

        let outcome = if !transferred {
            self.cache.revert(checkpoint);
            None
        } else {
            let sub_frame = CallFrame::new(
                msg_sender,
                target,
                code_address,
                code,
                value,
                calldata,
                is_static || current_call_frame.is_static,
                false,
                gas_forwarded.saturating_add(stipend),
                current_call_frame.depth.saturating_add(1),
            );
            tracing::debug!(
                target = ?target, code_address = ?code_address, %value, gas_forwarded, "call frame enter"
            );
            self.call_frames.push(sub_frame);
            let result = self.execute()?;
            let finished = self
                .call_frames
                .pop()
                .ok_or(VMError::Internal(InternalError::NoCallFrame))?;
            tracing::debug!(target = ?target, success = result.is_success(), "call frame exit");

            match &result {
                ExecutionResult::Success { .. } => self.cache.commit(checkpoint),
                _ => self.cache.revert(checkpoint),
            }
            Some((result, finished))
        };

        let (success, output, leftover_gas) = match outcome {
            None => (false, Vec::new(), 0),
            Some((ExecutionResult::Success { return_data, .. }, frame)) => {
                (true, return_data, frame.gas_remaining())
            }
            Some((ExecutionResult::Revert { output, .. }, frame)) => {
                (false, output, frame.gas_remaining())
            }
            Some((ExecutionResult::Halt { .. }, _frame)) => (false, Vec::new(), 0),
        };

        current_call_frame.gas_used = current_call_frame.gas_used.saturating_sub(leftover_gas);

        let copy_len = ret_size.min(output.len());
        if copy_len > 0 {
            if let Some(slice) = output.get(..copy_len) {
                current_call_frame.memory.store_bytes(ret_offset, slice)?;
            }
        }
        current_call_frame.last_return_data = output;

        current_call_frame
            .stack
            .push(if success { U256::one() } else { U256::zero() })?;
        Ok(())
    }

    /// Shared CREATE/CREATE2 machinery: rejects collisions with an existing
    /// contract or an insufficient sender balance up front, otherwise runs
    /// the init code in a fresh frame over `target`, applies the code-deposit
    /// checks, and — on a deposit failure — applies the fork's nonce policy
    /// (F0 leaves the empty account and bumped nonce; F1/F2 roll both back).
    pub fn create(
        &mut self,
        current_call_frame: &mut CallFrame,
        value: U256,
        init_code: Vec<u8>,
        target: Address,
    ) -> Result<(), VMError> {
        if current_call_frame.depth >= CALL_DEPTH_LIMIT {
            current_call_frame.stack.push(U256::zero())?;
            return Ok(());
        }

        let existing = self.cache.get_account(target);
        if existing.info.nonce != 0 || existing.has_code() {
            current_call_frame.stack.push(U256::zero())?;
            return Ok(());
        }

        let creator = current_call_frame.target;
        if self.cache.get_balance(creator) < value {
            current_call_frame.stack.push(U256::zero())?;
            return Ok(());
        }

        let gas_forwarded = gas_cost::max_gas_forwarded(current_call_frame.gas_remaining());
        self.increase_consumed_gas(current_call_frame, gas_forwarded)?;
        self.cache.increment_nonce(creator)?;

        let checkpoint = self.cache.snapshot();
        let transferred = self.transfer_value(creator, target, value)?;
        if !transferred {
            self.cache.revert(checkpoint);
            if !self.fork.create_failure_reverts_nonce() {
                self.cache.commit(checkpoint);
            }
            current_call_frame.stack.push(U256::zero())?;
            return Ok(());
        }

        let sub_frame = CallFrame::new(
            creator,
            target,
            target,
            init_code,
            value,
            Vec::new(),
            current_call_frame.is_static,
            true,
            gas_forwarded,
            current_call_frame.depth.saturating_add(1),
        );
        tracing::debug!(target = ?target, %value, gas_forwarded, "create frame enter");
        self.call_frames.push(sub_frame);
        let result = self.execute()?;
        tracing::debug!(target = ?target, success = result.is_success(), "create frame exit");
        let finished = self
            .call_frames
            .pop()
            .ok_or(VMError::Internal(InternalError::NoCallFrame))?;

        let deployed = self.finish_nested_create(target, result, checkpoint);

        current_call_frame.gas_used = current_call_frame.gas_used.saturating_sub(finished.gas_remaining());
        current_call_frame.last_return_data.clear();

        match deployed {
            Some(address) => current_call_frame.stack.push(address_to_word(address))?,
            None => current_call_frame.stack.push(U256::zero())?,
        }
        Ok(())
    }

    fn finish_nested_create(
        &mut self,
        target: Address,
        result: ExecutionResult,
        checkpoint: usize,
    ) -> Option<Address> {
        let ExecutionResult::Success { return_data, .. } = result else {
            self.cache.revert(checkpoint);
            return None;
        };

        if self.fork.enforces_runtime_code_size_limit()
            && gas_cost::exceeds_max_code_size(return_data.len())
        {
            self.cache.revert(checkpoint);
            return None;
        }
        if return_data.first() == Some(&INVALID_CONTRACT_PREFIX) {
            self.cache.revert(checkpoint);
            return None;
        }

        let Ok(deposit_cost) = gas_cost::code_deposit_cost(return_data.len()) else {
            self.cache.revert(checkpoint);
            return None;
        };
        let Some(frame) = self.call_frames.last_mut() else {
            self.cache.revert(checkpoint);
            return None;
        };
        let new_gas_used = frame.gas_used.saturating_add(deposit_cost);
        if new_gas_used > frame.gas_limit {
            if self.fork.create_failure_reverts_nonce() {
                self.cache.revert(checkpoint);
                return None;
            }
            // F0: the deposit failure is swallowed; the empty account at
            // `target` (and the creator's nonce bump) survive.
            self.cache.commit(checkpoint);
            return Some(target);
        }
        frame.gas_used = new_gas_used;

        self.cache.set_code(target, return_data);
        self.cache.commit(checkpoint);
        Some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_address_is_deterministic_in_sender_and_nonce() {
        let sender = Address::from_low_u64_be(0x1234);
        let a = calculate_create_address(sender, 0).unwrap();
        let b = calculate_create_address(sender, 1).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, calculate_create_address(sender, 0).unwrap());
    }

    #[test]
    fn create2_address_depends_on_salt_and_code() {
        let sender = Address::from_low_u64_be(0x1234);
        let code_a = vec![0x60, 0x00];
        let code_b = vec![0x60, 0x01];
        let salt = U256::from(7);
        let a = calculate_create2_address(sender, &code_a, salt);
        let b = calculate_create2_address(sender, &code_b, salt);
        assert_ne!(a, b);
    }

    #[test]
    fn jumpdest_inside_push_data_is_not_a_valid_destination() {
        // PUSH1 0x5B (JUMPDEST byte as push data) followed by a real JUMPDEST.
        let bytecode = vec![0x60, 0x5B, 0x5B];
        let destinations = get_valid_jump_destinations(&bytecode);
        assert!(!destinations.contains(&1));
        assert!(destinations.contains(&2));
    }

    #[test]
    fn address_word_round_trips() {
        let address = Address::from_low_u64_be(0xdead_beef);
        assert_eq!(word_to_address(address_to_word(address)), address);
    }
}
