//! Flat constants that are not part of the per-fork gas schedule (see
//! [`crate::gas_cost`] for those).

pub const WORD_SIZE: usize = 32;
pub const STACK_LIMIT: usize = 1024;
pub const CALL_DEPTH_LIMIT: usize = 1024;

/// EIP-170, carried forward unconditionally as a runtime-code cap; F2 is the
/// only fork that additionally caps initcode (see [`create_opcode`]).
pub const MAX_CODE_SIZE: usize = 0x6000;

pub const INVALID_CONTRACT_PREFIX: u8 = 0xef;

/// BLOCKHASH only resolves for the 256 most recent blocks; anything older
/// (or not yet mined) returns zero.
pub const BLOCKHASH_WINDOW: u64 = 256;

pub const EMPTY_CODE_HASH_STR: &str =
    "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470";

pub mod create_opcode {
    pub const INIT_CODE_WORD_COST: u64 = 2;
    pub const MAX_INITCODE_SIZE: usize = 2 * super::MAX_CODE_SIZE;
}
