use std::collections::HashSet;

use ethereum_types::{Address, U256};

use crate::constants::STACK_LIMIT;
use crate::errors::VMError;
use crate::memory::Memory;
use crate::vm::get_valid_jump_destinations;

/// Ordered sequence of Words, length <= 1024 (C2).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stack {
    items: Vec<U256>,
}

impl Stack {
    pub fn push(&mut self, value: U256) -> Result<(), VMError> {
        if self.items.len() >= STACK_LIMIT {
            return Err(VMError::StackOverflow);
        }
        self.items.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<U256, VMError> {
        self.items.pop().ok_or(VMError::StackUnderflow)
    }

    /// peek(d): the element at depth d, 0 = top.
    pub fn peek(&self, depth: usize) -> Result<U256, VMError> {
        let len = self.items.len();
        let index = len
            .checked_sub(depth)
            .and_then(|i| i.checked_sub(1))
            .ok_or(VMError::StackUnderflow)?;
        self.items.get(index).copied().ok_or(VMError::StackUnderflow)
    }

    pub fn set(&mut self, depth: usize, value: U256) -> Result<(), VMError> {
        let len = self.items.len();
        let index = len
            .checked_sub(depth)
            .and_then(|i| i.checked_sub(1))
            .ok_or(VMError::StackUnderflow)?;
        let slot = self.items.get_mut(index).ok_or(VMError::StackUnderflow)?;
        *slot = value;
        Ok(())
    }

    /// dup(n), 1 <= n <= 16: duplicates the element at depth n-1 onto top.
    pub fn dup(&mut self, n: usize) -> Result<(), VMError> {
        let value = self.peek(n.saturating_sub(1))?;
        self.push(value)
    }

    /// swap(n), 1 <= n <= 16: exchanges top with the element at depth n.
    pub fn swap(&mut self, n: usize) -> Result<(), VMError> {
        let len = self.items.len();
        let top = len.checked_sub(1).ok_or(VMError::StackUnderflow)?;
        let other = len
            .checked_sub(n)
            .and_then(|i| i.checked_sub(1))
            .ok_or(VMError::StackUnderflow)?;
        self.items.swap(top, other);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// (address, topics, data) per the data model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Log {
    pub address: Address,
    pub topics: Vec<U256>,
    pub data: Vec<u8>,
}

/// One invocation of the interpreter against a Message: owns its own PC,
/// Stack, Memory, logs, and last-return-data exclusively.
#[derive(Debug, Clone)]
pub struct CallFrame {
    pub pc: usize,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub msg_sender: Address,
    /// The execution context's self-address.
    pub target: Address,
    /// Where code was loaded from; differs from `target` for DELEGATECALL
    /// and CALLCODE.
    pub code_address: Address,
    pub bytecode: Vec<u8>,
    pub msg_value: U256,
    pub stack: Stack,
    pub memory: Memory,
    pub calldata: Vec<u8>,
    /// This frame's own output, populated by RETURN/REVERT.
    pub output: Vec<u8>,
    /// The most recent nested call's return-data, updated on every inner
    /// return regardless of success.
    pub last_return_data: Vec<u8>,
    pub is_static: bool,
    pub is_create: bool,
    pub logs: Vec<Log>,
    pub depth: usize,
    pub valid_jump_destinations: HashSet<usize>,
}

impl CallFrame {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        msg_sender: Address,
        target: Address,
        code_address: Address,
        bytecode: Vec<u8>,
        msg_value: U256,
        calldata: Vec<u8>,
        is_static: bool,
        is_create: bool,
        gas_limit: u64,
        depth: usize,
    ) -> Self {
        let valid_jump_destinations = get_valid_jump_destinations(&bytecode);
        Self {
            pc: 0,
            gas_limit,
            gas_used: 0,
            msg_sender,
            target,
            code_address,
            bytecode,
            msg_value,
            stack: Stack::default(),
            memory: Memory::default(),
            calldata,
            output: Vec::new(),
            last_return_data: Vec::new(),
            is_static,
            is_create,
            logs: Vec::new(),
            depth,
            valid_jump_destinations,
        }
    }

    pub fn gas_remaining(&self) -> u64 {
        self.gas_limit.saturating_sub(self.gas_used)
    }

    pub fn current_opcode_byte(&self) -> u8 {
        self.bytecode.get(self.pc).copied().unwrap_or(0x00)
    }

    pub fn increment_pc_by(&mut self, count: usize) -> Result<(), VMError> {
        self.pc = self
            .pc
            .checked_add(count)
            .ok_or(crate::errors::InternalError::PcOverflowed)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dup_duplicates_element_at_depth_n_minus_1() {
        let mut stack = Stack::default();
        stack.push(U256::from(1)).unwrap();
        stack.push(U256::from(2)).unwrap();
        stack.push(U256::from(3)).unwrap();
        stack.dup(3).unwrap();
        assert_eq!(stack.peek(0).unwrap(), U256::from(1));
        assert_eq!(stack.len(), 4);
    }

    #[test]
    fn swap_exchanges_top_with_depth_n() {
        let mut stack = Stack::default();
        stack.push(U256::from(1)).unwrap();
        stack.push(U256::from(2)).unwrap();
        stack.swap(1).unwrap();
        assert_eq!(stack.peek(0).unwrap(), U256::from(1));
        assert_eq!(stack.peek(1).unwrap(), U256::from(2));
    }

    #[test]
    fn push_beyond_limit_overflows() {
        let mut stack = Stack::default();
        for i in 0..STACK_LIMIT {
            stack.push(U256::from(i)).unwrap();
        }
        assert_eq!(stack.push(U256::zero()), Err(VMError::StackOverflow));
    }
}
