use crate::{errors::VMError, opcodes::Opcode};
use ethereum_types::U256;

/// A single instruction as a structured value, assembled into bytecode by
/// [`Operation::to_bytecode`]. Used by tests to build scenario bytecode
/// without hand-computing opcode bytes.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Operation {
    Stop,
    Add,
    Mul,
    Sub,
    Div,
    Sdiv,
    Mod,
    SMod,
    Addmod,
    Mulmod,
    Exp,
    SignExtend,
    Lt,
    Gt,
    Slt,
    Sgt,
    Eq,
    IsZero,
    And,
    Or,
    Xor,
    Not,
    Byte,
    Shl,
    Shr,
    Sar,
    Keccak256,
    Address,
    Balance,
    Origin,
    Caller,
    Callvalue,
    CallDataLoad,
    CallDataSize,
    CallDataCopy,
    Codesize,
    Codecopy,
    Gasprice,
    ExtcodeSize,
    ExtcodeCopy,
    ReturnDataSize,
    ReturnDataCopy,
    ExtcodeHash,
    BlockHash,
    Coinbase,
    Timestamp,
    Number,
    Difficulty,
    Gaslimit,
    Chainid,
    SelfBalance,
    Basefee,
    Pop,
    Mload,
    Mstore,
    Mstore8,
    Sload,
    Sstore,
    Jump,
    Jumpi,
    PC,
    Msize,
    Gas,
    Jumpdest,
    Push0,
    Push((u8, U256)),
    Dup(u8),
    Swap(u8),
    Log(u8),
    Create,
    Call,
    CallCode,
    Return,
    DelegateCall,
    Create2,
    StaticCall,
    Revert,
    Invalid,
    SelfDestruct,
}

impl Operation {
    pub fn to_bytecode(&self) -> Result<Vec<u8>, VMError> {
        let bytecode = match self {
            Operation::Stop => vec![Opcode::STOP as u8],
            Operation::Add => vec![Opcode::ADD as u8],
            Operation::Mul => vec![Opcode::MUL as u8],
            Operation::Sub => vec![Opcode::SUB as u8],
            Operation::Div => vec![Opcode::DIV as u8],
            Operation::Sdiv => vec![Opcode::SDIV as u8],
            Operation::Mod => vec![Opcode::MOD as u8],
            Operation::SMod => vec![Opcode::SMOD as u8],
            Operation::Addmod => vec![Opcode::ADDMOD as u8],
            Operation::Mulmod => vec![Opcode::MULMOD as u8],
            Operation::Exp => vec![Opcode::EXP as u8],
            Operation::SignExtend => vec![Opcode::SIGNEXTEND as u8],
            Operation::Lt => vec![Opcode::LT as u8],
            Operation::Gt => vec![Opcode::GT as u8],
            Operation::Slt => vec![Opcode::SLT as u8],
            Operation::Sgt => vec![Opcode::SGT as u8],
            Operation::Eq => vec![Opcode::EQ as u8],
            Operation::IsZero => vec![Opcode::ISZERO as u8],
            Operation::And => vec![Opcode::AND as u8],
            Operation::Or => vec![Opcode::OR as u8],
            Operation::Xor => vec![Opcode::XOR as u8],
            Operation::Not => vec![Opcode::NOT as u8],
            Operation::Byte => vec![Opcode::BYTE as u8],
            Operation::Shl => vec![Opcode::SHL as u8],
            Operation::Shr => vec![Opcode::SHR as u8],
            Operation::Sar => vec![Opcode::SAR as u8],
            Operation::Keccak256 => vec![Opcode::KECCAK256 as u8],
            Operation::Address => vec![Opcode::ADDRESS as u8],
            Operation::Balance => vec![Opcode::BALANCE as u8],
            Operation::Origin => vec![Opcode::ORIGIN as u8],
            Operation::Caller => vec![Opcode::CALLER as u8],
            Operation::Callvalue => vec![Opcode::CALLVALUE as u8],
            Operation::CallDataLoad => vec![Opcode::CALLDATALOAD as u8],
            Operation::CallDataSize => vec![Opcode::CALLDATASIZE as u8],
            Operation::CallDataCopy => vec![Opcode::CALLDATACOPY as u8],
            Operation::Codesize => vec![Opcode::CODESIZE as u8],
            Operation::Codecopy => vec![Opcode::CODECOPY as u8],
            Operation::Gasprice => vec![Opcode::GASPRICE as u8],
            Operation::ExtcodeSize => vec![Opcode::EXTCODESIZE as u8],
            Operation::ExtcodeCopy => vec![Opcode::EXTCODECOPY as u8],
            Operation::ReturnDataSize => vec![Opcode::RETURNDATASIZE as u8],
            Operation::ReturnDataCopy => vec![Opcode::RETURNDATACOPY as u8],
            Operation::ExtcodeHash => vec![Opcode::EXTCODEHASH as u8],
            Operation::BlockHash => vec![Opcode::BLOCKHASH as u8],
            Operation::Coinbase => vec![Opcode::COINBASE as u8],
            Operation::Timestamp => vec![Opcode::TIMESTAMP as u8],
            Operation::Number => vec![Opcode::NUMBER as u8],
            Operation::Difficulty => vec![Opcode::DIFFICULTY as u8],
            Operation::Gaslimit => vec![Opcode::GASLIMIT as u8],
            Operation::Chainid => vec![Opcode::CHAINID as u8],
            Operation::SelfBalance => vec![Opcode::SELFBALANCE as u8],
            Operation::Basefee => vec![Opcode::BASEFEE as u8],
            Operation::Pop => vec![Opcode::POP as u8],
            Operation::Mload => vec![Opcode::MLOAD as u8],
            Operation::Mstore => vec![Opcode::MSTORE as u8],
            Operation::Mstore8 => vec![Opcode::MSTORE8 as u8],
            Operation::Sload => vec![Opcode::SLOAD as u8],
            Operation::Sstore => vec![Opcode::SSTORE as u8],
            Operation::Jump => vec![Opcode::JUMP as u8],
            Operation::Jumpi => vec![Opcode::JUMPI as u8],
            Operation::PC => vec![Opcode::PC as u8],
            Operation::Msize => vec![Opcode::MSIZE as u8],
            Operation::Gas => vec![Opcode::GAS as u8],
            Operation::Jumpdest => vec![Opcode::JUMPDEST as u8],
            Operation::Push0 => vec![Opcode::PUSH0 as u8],
            Operation::Push((n, value)) => {
                if *n == 0 || *n > 32 {
                    return Err(VMError::Internal(crate::errors::InternalError::TypeConversion));
                }
                if value.bits().div_ceil(8) > usize::from(*n) {
                    return Err(VMError::Internal(crate::errors::InternalError::TypeConversion));
                }
                let mut word_buffer = [0u8; 32];
                value.to_big_endian(&mut word_buffer);
                let skip = 32usize.saturating_sub(usize::from(*n));
                let value_to_push = word_buffer
                    .get(skip..)
                    .ok_or(VMError::Internal(crate::errors::InternalError::TypeConversion))?;

                let opcode_byte = (Opcode::PUSH1 as u8).saturating_add(n.saturating_sub(1));
                let mut bytes = vec![opcode_byte];
                bytes.extend_from_slice(value_to_push);
                bytes
            }
            Operation::Dup(n) => {
                if *n == 0 || *n > 16 {
                    return Err(VMError::Internal(crate::errors::InternalError::TypeConversion));
                }
                vec![(Opcode::DUP1 as u8).saturating_add(n.saturating_sub(1))]
            }
            Operation::Swap(n) => {
                if *n == 0 || *n > 16 {
                    return Err(VMError::Internal(crate::errors::InternalError::TypeConversion));
                }
                vec![(Opcode::SWAP1 as u8).saturating_add(n.saturating_sub(1))]
            }
            Operation::Log(n) => {
                if *n > 4 {
                    return Err(VMError::Internal(crate::errors::InternalError::TypeConversion));
                }
                vec![(Opcode::LOG0 as u8).saturating_add(*n)]
            }
            Operation::Create => vec![Opcode::CREATE as u8],
            Operation::Call => vec![Opcode::CALL as u8],
            Operation::CallCode => vec![Opcode::CALLCODE as u8],
            Operation::Return => vec![Opcode::RETURN as u8],
            Operation::DelegateCall => vec![Opcode::DELEGATECALL as u8],
            Operation::Create2 => vec![Opcode::CREATE2 as u8],
            Operation::StaticCall => vec![Opcode::STATICCALL as u8],
            Operation::Revert => vec![Opcode::REVERT as u8],
            Operation::Invalid => vec![Opcode::INVALID as u8],
            Operation::SelfDestruct => vec![Opcode::SELFDESTRUCT as u8],
        };
        Ok(bytecode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_encodes_opcode_and_left_pads_value() {
        let op = Operation::Push((2, U256::from(0xabu64)));
        assert_eq!(op.to_bytecode().unwrap(), vec![Opcode::PUSH2 as u8, 0x00, 0xab]);
    }

    #[test]
    fn dup_and_swap_offset_from_their_base_opcode() {
        assert_eq!(Operation::Dup(3).to_bytecode().unwrap(), vec![Opcode::DUP3 as u8]);
        assert_eq!(Operation::Swap(1).to_bytecode().unwrap(), vec![Opcode::SWAP1 as u8]);
    }

    #[test]
    fn push_rejects_a_value_too_large_for_n() {
        assert!(Operation::Push((1, U256::from(0x1234u64))).to_bytecode().is_err());
    }
}
