//! Per-invocation and per-transaction results (boundary (b) in the external
//! interfaces contract).

use ethereum_types::Address;

use crate::call_frame::Log;
use crate::errors::{ResultReason, VMError};

/// The outcome of running a single frame to completion: a successful
/// interpreter loop (STOP/RETURN/SELFDESTRUCT), a cooperative REVERT, or a
/// halt that consumes all gas forwarded to the frame.
#[derive(Debug, Clone)]
pub enum ExecutionResult {
    Success {
        reason: ResultReason,
        logs: Vec<Log>,
        return_data: Vec<u8>,
    },
    Revert {
        reason: VMError,
        gas_used: u64,
        output: Vec<u8>,
    },
    Halt {
        reason: VMError,
        gas_used: u64,
    },
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success { .. })
    }

    pub fn output(&self) -> &[u8] {
        match self {
            ExecutionResult::Success { return_data, .. } => return_data,
            ExecutionResult::Revert { output, .. } => output,
            ExecutionResult::Halt { .. } => &[],
        }
    }
}

/// The receipt-equivalent produced by [`crate::vm::VM::transact`]: whether
/// the transaction succeeded, how much gas it used net of refunds, its
/// top-level output, the logs it emitted, and the address it created (for
/// create transactions only — a transaction can only create one top-level
/// contract, even though nested CREATEs may create more).
#[derive(Debug, Clone)]
pub struct TransactionReport {
    pub success: bool,
    pub gas_used: u64,
    pub output: Vec<u8>,
    pub logs: Vec<Log>,
    pub created_address: Option<Address>,
}
