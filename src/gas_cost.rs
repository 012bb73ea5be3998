//! Gas schedule (C5): constants and derived cost formulas. All fork variants
//! share these constants; F2 additionally meters initcode (see
//! [`create_opcode`] and [`intrinsic_gas`]).

use crate::constants::{create_opcode, MAX_CODE_SIZE};
use crate::errors::{InternalError, VMError};
use crate::fork::Fork;

pub const ZERO: u64 = 0;
pub const BASE: u64 = 2;
pub const VERYLOW: u64 = 3;
pub const LOW: u64 = 5;
pub const MID: u64 = 8;
pub const HIGH: u64 = 10;

pub const MEMORY: u64 = 3;
pub const COPY: u64 = 3;
pub const MEMORY_EXPANSION_QUOTIENT: u64 = 512;

pub const SLOAD: u64 = 50;
pub const SSTORE_SET: u64 = 20_000;
pub const SSTORE_RESET: u64 = 5_000;
pub const SSTORE_CLEAR_REFUND: u64 = 5_000;

pub const CREATE: u64 = 32_000;
pub const CODEDEPOSIT: u64 = 200;
pub const CALL_BASE: u64 = 40;
pub const CALL_VALUE: u64 = 9_000;
pub const CALL_STIPEND: u64 = 2_300;
pub const NEW_ACCOUNT: u64 = 25_000;

pub const JUMPDEST: u64 = 1;
pub const EXP_BASE: u64 = 10;
pub const EXP_PER_BYTE: u64 = 10;
pub const SHA3: u64 = 30;
pub const SHA3_WORD: u64 = 6;
pub const BALANCE: u64 = 20;
pub const EXTCODESIZE: u64 = 20;
pub const EXTCODECOPY: u64 = 20;
pub const EXTCODEHASH: u64 = 20;
pub const BLOCKHASH: u64 = 20;
pub const LOG: u64 = 375;
pub const LOG_DATA: u64 = 8;
pub const LOG_TOPIC: u64 = 375;
pub const SELFDESTRUCT: u64 = 0;

/// PUSH0 (F2 only) is priced the same as any other BASE-tier opcode.
pub const PUSH0: u64 = BASE;

pub const TX_BASE: u64 = 21_000;
pub const TX_CREATE: u64 = 53_000;
pub const TX_DATA_ZERO: u64 = 4;
pub const TX_DATA_NONZERO: u64 = 68;

fn words(size: usize) -> Result<u64, VMError> {
    let size: u64 = size.try_into().map_err(|_| InternalError::TypeConversion)?;
    let padded = size
        .checked_add(31)
        .ok_or(VMError::Internal(InternalError::Overflow))?;
    Ok(padded / 32)
}

/// f(w) = 3w + floor(w^2/512); returns the delta for growing from
/// `current_words` to `new_words`.
pub fn memory_expansion_cost(current_words: u64, new_words: u64) -> Result<u64, VMError> {
    if new_words <= current_words {
        return Ok(0);
    }
    let cost = |w: u64| -> Result<u64, VMError> {
        let linear = MEMORY
            .checked_mul(w)
            .ok_or(VMError::Internal(InternalError::Overflow))?;
        let quadratic = w
            .checked_mul(w)
            .ok_or(VMError::Internal(InternalError::Overflow))?
            / MEMORY_EXPANSION_QUOTIENT;
        linear
            .checked_add(quadratic)
            .ok_or(VMError::Internal(InternalError::Overflow))
    };
    cost(new_words)?
        .checked_sub(cost(current_words)?)
        .ok_or(VMError::Internal(InternalError::Underflow))
}

pub fn copy_cost(size: usize) -> Result<u64, VMError> {
    COPY.checked_mul(words(size)?)
        .ok_or(VMError::Internal(InternalError::Overflow))
}

pub fn sha3_cost(size: usize) -> Result<u64, VMError> {
    SHA3_WORD
        .checked_mul(words(size)?)
        .and_then(|w| w.checked_add(SHA3))
        .ok_or(VMError::Internal(InternalError::Overflow))
}

/// byte-length(0) = 0 by definition, matching the Frontier gas schedule.
pub fn exp_cost(exponent_byte_len: usize) -> Result<u64, VMError> {
    if exponent_byte_len == 0 {
        return Ok(EXP_BASE);
    }
    let len: u64 = exponent_byte_len
        .try_into()
        .map_err(|_| InternalError::TypeConversion)?;
    EXP_PER_BYTE
        .checked_mul(len)
        .and_then(|b| b.checked_add(EXP_BASE))
        .ok_or(VMError::Internal(InternalError::Overflow))
}

pub fn log_cost(data_size: usize, num_topics: u8) -> Result<u64, VMError> {
    let size: u64 = data_size
        .try_into()
        .map_err(|_| InternalError::TypeConversion)?;
    let data_cost = LOG_DATA
        .checked_mul(size)
        .ok_or(VMError::Internal(InternalError::Overflow))?;
    let topic_cost = LOG_TOPIC
        .checked_mul(num_topics.into())
        .ok_or(VMError::Internal(InternalError::Overflow))?;
    LOG.checked_add(data_cost)
        .and_then(|g| g.checked_add(topic_cost))
        .ok_or(VMError::Internal(InternalError::Overflow))
}

pub fn sstore_cost(current_value_is_zero: bool, new_value_is_zero: bool) -> u64 {
    if current_value_is_zero && !new_value_is_zero {
        SSTORE_SET
    } else {
        SSTORE_RESET
    }
}

pub fn sstore_refund(current_value_is_zero: bool, new_value_is_zero: bool) -> u64 {
    if !current_value_is_zero && new_value_is_zero {
        SSTORE_CLEAR_REFUND
    } else {
        0
    }
}

pub const CALL_GAS_RETENTION_DIVISOR: u64 = 64;

/// The "all but one 64th" rule: a CALL/CREATE may forward at most
/// `gas_remaining - gas_remaining/64` to the sub-frame, so the caller always
/// retains enough to process the outcome.
pub fn max_gas_forwarded(gas_remaining: u64) -> u64 {
    gas_remaining.saturating_sub(gas_remaining / CALL_GAS_RETENTION_DIVISOR)
}

pub fn call_cost(value_is_nonzero: bool, target_exists: bool) -> Result<u64, VMError> {
    let mut cost = CALL_BASE;
    if value_is_nonzero {
        cost = cost
            .checked_add(CALL_VALUE)
            .ok_or(VMError::Internal(InternalError::Overflow))?;
        if !target_exists {
            cost = cost
                .checked_add(NEW_ACCOUNT)
                .ok_or(VMError::Internal(InternalError::Overflow))?;
        }
    }
    Ok(cost)
}

/// intrinsic(data, is_create) per §4.5, plus F2's initcode-word metering.
pub fn intrinsic_gas(data: &[u8], is_create: bool, fork: Fork) -> Result<u64, VMError> {
    let mut gas = if is_create { TX_CREATE } else { TX_BASE };
    for byte in data {
        let per_byte = if *byte == 0 {
            TX_DATA_ZERO
        } else {
            TX_DATA_NONZERO
        };
        gas = gas
            .checked_add(per_byte)
            .ok_or(VMError::Internal(InternalError::Overflow))?;
    }
    if is_create && fork.metered_initcode() {
        let initcode_words = words(data.len())?;
        let initcode_gas = initcode_words
            .checked_mul(create_opcode::INIT_CODE_WORD_COST)
            .ok_or(VMError::Internal(InternalError::Overflow))?;
        gas = gas
            .checked_add(initcode_gas)
            .ok_or(VMError::Internal(InternalError::Overflow))?;
    }
    Ok(gas)
}

pub fn code_deposit_cost(runtime_code_len: usize) -> Result<u64, VMError> {
    let len: u64 = runtime_code_len
        .try_into()
        .map_err(|_| InternalError::TypeConversion)?;
    CODEDEPOSIT
        .checked_mul(len)
        .ok_or(VMError::Internal(InternalError::Overflow))
}

pub fn exceeds_max_code_size(len: usize) -> bool {
    len > MAX_CODE_SIZE
}
