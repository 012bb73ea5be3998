use super::*;

// Stack, Memory, Storage and Flow Operations (C6.6): POP, MLOAD, MSTORE,
// MSTORE8, SLOAD, SSTORE, JUMP, JUMPI, PC, MSIZE, GAS, JUMPDEST.

impl VM {
    pub fn op_pop(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::BASE)?;
        current_call_frame.stack.pop()?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_mload(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        let offset = word_to_usize(current_call_frame.stack.pop()?);
        let expansion = current_call_frame.memory.expansion_cost(offset, 32)?;
        let gas = gas_cost::VERYLOW.checked_add(expansion).ok_or(InternalError::Overflow)?;
        self.increase_consumed_gas(current_call_frame, gas)?;

        let value = current_call_frame.memory.load_word(offset)?;
        current_call_frame.stack.push(value)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_mstore(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        let offset = word_to_usize(current_call_frame.stack.pop()?);
        let value = current_call_frame.stack.pop()?;

        let expansion = current_call_frame.memory.expansion_cost(offset, 32)?;
        let gas = gas_cost::VERYLOW.checked_add(expansion).ok_or(InternalError::Overflow)?;
        self.increase_consumed_gas(current_call_frame, gas)?;

        current_call_frame.memory.store_word(offset, value)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_mstore8(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        let offset = word_to_usize(current_call_frame.stack.pop()?);
        let value = current_call_frame.stack.pop()?;

        let expansion = current_call_frame.memory.expansion_cost(offset, 1)?;
        let gas = gas_cost::VERYLOW.checked_add(expansion).ok_or(InternalError::Overflow)?;
        self.increase_consumed_gas(current_call_frame, gas)?;

        current_call_frame.memory.store_byte(offset, value.byte(0))?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_sload(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::SLOAD)?;
        let key = current_call_frame.stack.pop()?;
        let value = self.cache.get_storage(current_call_frame.target, key);
        current_call_frame.stack.push(value)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_sstore(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        if current_call_frame.is_static {
            return Err(VMError::WriteProtection);
        }

        let key = current_call_frame.stack.pop()?;
        let new_value = current_call_frame.stack.pop()?;

        let current_value = self.cache.get_storage(current_call_frame.target, key);
        let gas = gas_cost::sstore_cost(current_value.is_zero(), new_value.is_zero());
        self.increase_consumed_gas(current_call_frame, gas)?;

        self.refunded_gas = self
            .refunded_gas
            .saturating_add(gas_cost::sstore_refund(current_value.is_zero(), new_value.is_zero()));

        self.cache.set_storage(current_call_frame.target, key, new_value);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_jump(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::MID)?;
        let destination = word_to_usize(current_call_frame.stack.pop()?);
        jump_to(current_call_frame, destination)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_jumpi(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::HIGH)?;
        let destination = word_to_usize(current_call_frame.stack.pop()?);
        let condition = current_call_frame.stack.pop()?;

        if condition.is_zero() {
            current_call_frame.increment_pc_by(1)?;
        } else {
            jump_to(current_call_frame, destination)?;
        }
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_pc(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::BASE)?;
        current_call_frame.stack.push(U256::from(current_call_frame.pc))?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_msize(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::BASE)?;
        current_call_frame.stack.push(U256::from(current_call_frame.memory.size()))?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_gas(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::BASE)?;
        current_call_frame.stack.push(U256::from(current_call_frame.gas_remaining()))?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_jumpdest(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::JUMPDEST)?;
        Ok(OpcodeSuccess::Continue)
    }
}

/// JUMP/JUMPI both move the PC themselves on a taken jump; the dispatch loop
/// skips its own post-opcode increment for these two opcodes specifically so
/// a jump always lands exactly on `destination`, never one past it.
fn jump_to(current_call_frame: &mut CallFrame, destination: usize) -> Result<(), VMError> {
    if !current_call_frame.valid_jump_destinations.contains(&destination) {
        return Err(VMError::InvalidJump);
    }
    current_call_frame.pc = destination;
    Ok(())
}
