use thiserror::Error;

/// Conditions that should be unreachable given a correctly driven VM; surfacing
/// one of these means a bug in this crate, not in the executed bytecode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalError {
    #[error("arithmetic overflow")]
    Overflow,
    #[error("arithmetic underflow")]
    Underflow,
    #[error("program counter overflowed")]
    PcOverflowed,
    #[error("account missing from cache after warm-up")]
    AccountNotCached,
    #[error("call frame stack is empty")]
    NoCallFrame,
    #[error("conversion between numeric types failed")]
    TypeConversion,
}

/// Errors fatal to the enclosing frame (propagation tier 1 in the error
/// taxonomy): each consumes all gas forwarded to the frame, rolls back the
/// frame's mutations, and surfaces to the caller as "callee returned 0".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VMError {
    #[error("out of gas")]
    OutOfGas,
    #[error("stack underflow")]
    StackUnderflow,
    #[error("stack overflow")]
    StackOverflow,
    #[error("invalid jump destination")]
    InvalidJump,
    #[error("invalid opcode")]
    InvalidOpcode,
    #[error("state-changing opcode in a static context")]
    WriteProtection,
    #[error("call depth exceeded")]
    CallDepthExceeded,
    #[error("returndatacopy past end of return buffer")]
    ReturnDataOutOfBounds,
    /// Not a failure kind per the error taxonomy: signals a cooperative
    /// REVERT, which preserves gas_remaining and still rolls back mutations.
    #[error("revert")]
    RevertOpcode,
    #[error(transparent)]
    Internal(#[from] InternalError),
}

/// Transaction-level validation errors (propagation tier 3): returned before
/// any State mutation, so the pre-validation snapshot is simply discarded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxValidationError {
    #[error("invalid nonce: expected {expected}, got {actual}")]
    InvalidNonce { expected: u64, actual: u64 },
    #[error("intrinsic gas too low: {gas} < {intrinsic}")]
    IntrinsicGasTooLow { gas: u64, intrinsic: u64 },
    #[error("insufficient balance to cover gas and value")]
    InsufficientFunds,
    #[error("initcode size {size} exceeds the maximum of {max}")]
    InitcodeTooLarge { size: usize, max: usize },
}

/// Why an opcode loop iteration completed without continuing to the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultReason {
    Stop,
    Return,
    Revert,
    SelfDestruct,
}

/// Non-error outcome of dispatching a single opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpcodeSuccess {
    Continue,
    Result(ResultReason),
}
