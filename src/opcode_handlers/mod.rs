pub mod arithmetic;
pub mod bitwise_comparison;
pub mod block;
pub mod dup;
pub mod environment;
pub mod exchange;
pub mod keccak;
pub mod logging;
pub mod push;
pub mod stack_memory_storage_flow;
pub mod system;

use ethereum_types::{Address, U256};

use crate::call_frame::{CallFrame, Log};
use crate::errors::{InternalError, OpcodeSuccess, ResultReason, VMError};
use crate::gas_cost;
use crate::opcodes::Opcode;
use crate::vm::{address_to_word, get_n_value, get_number_of_topics, word_to_address, word_to_usize, VM};

impl VM {
    /// The dispatch table (C6): one arm per opcode byte, grouped the way
    /// the submodules are, falling through to `INVALID_OPCODE` for anything
    /// this fork doesn't define.
    pub(crate) fn dispatch(
        &mut self,
        current_call_frame: &mut CallFrame,
        opcode: Opcode,
    ) -> Result<OpcodeSuccess, VMError> {
        match opcode {
            Opcode::STOP => self.op_stop(),

            Opcode::ADD => self.op_add(current_call_frame),
            Opcode::MUL => self.op_mul(current_call_frame),
            Opcode::SUB => self.op_sub(current_call_frame),
            Opcode::DIV => self.op_div(current_call_frame),
            Opcode::SDIV => self.op_sdiv(current_call_frame),
            Opcode::MOD => self.op_mod(current_call_frame),
            Opcode::SMOD => self.op_smod(current_call_frame),
            Opcode::ADDMOD => self.op_addmod(current_call_frame),
            Opcode::MULMOD => self.op_mulmod(current_call_frame),
            Opcode::EXP => self.op_exp(current_call_frame),
            Opcode::SIGNEXTEND => self.op_signextend(current_call_frame),

            Opcode::LT => self.op_lt(current_call_frame),
            Opcode::GT => self.op_gt(current_call_frame),
            Opcode::SLT => self.op_slt(current_call_frame),
            Opcode::SGT => self.op_sgt(current_call_frame),
            Opcode::EQ => self.op_eq(current_call_frame),
            Opcode::ISZERO => self.op_iszero(current_call_frame),
            Opcode::AND => self.op_and(current_call_frame),
            Opcode::OR => self.op_or(current_call_frame),
            Opcode::XOR => self.op_xor(current_call_frame),
            Opcode::NOT => self.op_not(current_call_frame),
            Opcode::BYTE => self.op_byte(current_call_frame),
            Opcode::SHL => self.op_shl(current_call_frame),
            Opcode::SHR => self.op_shr(current_call_frame),
            Opcode::SAR => self.op_sar(current_call_frame),

            Opcode::KECCAK256 => self.op_keccak256(current_call_frame),

            Opcode::ADDRESS => self.op_address(current_call_frame),
            Opcode::BALANCE => self.op_balance(current_call_frame),
            Opcode::ORIGIN => self.op_origin(current_call_frame),
            Opcode::CALLER => self.op_caller(current_call_frame),
            Opcode::CALLVALUE => self.op_callvalue(current_call_frame),
            Opcode::CALLDATALOAD => self.op_calldataload(current_call_frame),
            Opcode::CALLDATASIZE => self.op_calldatasize(current_call_frame),
            Opcode::CALLDATACOPY => self.op_calldatacopy(current_call_frame),
            Opcode::CODESIZE => self.op_codesize(current_call_frame),
            Opcode::CODECOPY => self.op_codecopy(current_call_frame),
            Opcode::GASPRICE => self.op_gasprice(current_call_frame),
            Opcode::EXTCODESIZE => self.op_extcodesize(current_call_frame),
            Opcode::EXTCODECOPY => self.op_extcodecopy(current_call_frame),
            Opcode::RETURNDATASIZE => self.op_returndatasize(current_call_frame),
            Opcode::RETURNDATACOPY => self.op_returndatacopy(current_call_frame),
            Opcode::EXTCODEHASH => self.op_extcodehash(current_call_frame),

            Opcode::BLOCKHASH => self.op_blockhash(current_call_frame),
            Opcode::COINBASE => self.op_coinbase(current_call_frame),
            Opcode::TIMESTAMP => self.op_timestamp(current_call_frame),
            Opcode::NUMBER => self.op_number(current_call_frame),
            Opcode::DIFFICULTY => self.op_difficulty(current_call_frame),
            Opcode::GASLIMIT => self.op_gaslimit(current_call_frame),
            Opcode::CHAINID => self.op_chainid(current_call_frame),
            Opcode::SELFBALANCE => self.op_selfbalance(current_call_frame),
            Opcode::BASEFEE => self.op_basefee(current_call_frame),

            Opcode::POP => self.op_pop(current_call_frame),
            Opcode::MLOAD => self.op_mload(current_call_frame),
            Opcode::MSTORE => self.op_mstore(current_call_frame),
            Opcode::MSTORE8 => self.op_mstore8(current_call_frame),
            Opcode::SLOAD => self.op_sload(current_call_frame),
            Opcode::SSTORE => self.op_sstore(current_call_frame),
            Opcode::JUMP => self.op_jump(current_call_frame),
            Opcode::JUMPI => self.op_jumpi(current_call_frame),
            Opcode::PC => self.op_pc(current_call_frame),
            Opcode::MSIZE => self.op_msize(current_call_frame),
            Opcode::GAS => self.op_gas(current_call_frame),
            Opcode::JUMPDEST => self.op_jumpdest(current_call_frame),

            Opcode::PUSH0 => self.op_push0(current_call_frame),
            op if op.is_push() => self.op_push(current_call_frame, op),

            op @ (Opcode::DUP1
            | Opcode::DUP2
            | Opcode::DUP3
            | Opcode::DUP4
            | Opcode::DUP5
            | Opcode::DUP6
            | Opcode::DUP7
            | Opcode::DUP8
            | Opcode::DUP9
            | Opcode::DUP10
            | Opcode::DUP11
            | Opcode::DUP12
            | Opcode::DUP13
            | Opcode::DUP14
            | Opcode::DUP15
            | Opcode::DUP16) => self.op_dup(current_call_frame, op),

            op @ (Opcode::SWAP1
            | Opcode::SWAP2
            | Opcode::SWAP3
            | Opcode::SWAP4
            | Opcode::SWAP5
            | Opcode::SWAP6
            | Opcode::SWAP7
            | Opcode::SWAP8
            | Opcode::SWAP9
            | Opcode::SWAP10
            | Opcode::SWAP11
            | Opcode::SWAP12
            | Opcode::SWAP13
            | Opcode::SWAP14
            | Opcode::SWAP15
            | Opcode::SWAP16) => self.op_swap(current_call_frame, op),

            op @ (Opcode::LOG0 | Opcode::LOG1 | Opcode::LOG2 | Opcode::LOG3 | Opcode::LOG4) => {
                self.op_log(current_call_frame, op)
            }

            Opcode::CREATE => self.op_create(current_call_frame),
            Opcode::CALL => self.op_call(current_call_frame),
            Opcode::CALLCODE => self.op_callcode(current_call_frame),
            Opcode::RETURN => self.op_return(current_call_frame),
            Opcode::DELEGATECALL => self.op_delegatecall(current_call_frame),
            Opcode::CREATE2 => self.op_create2(current_call_frame),
            Opcode::STATICCALL => self.op_staticcall(current_call_frame),
            Opcode::REVERT => self.op_revert(current_call_frame),
            Opcode::SELFDESTRUCT => self.op_selfdestruct(current_call_frame),

            Opcode::INVALID => Err(VMError::InvalidOpcode),
        }
    }

    fn op_stop(&mut self) -> Result<OpcodeSuccess, VMError> {
        Ok(OpcodeSuccess::Result(ResultReason::Stop))
    }
}
