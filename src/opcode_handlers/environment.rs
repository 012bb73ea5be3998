use super::*;

// Environmental Information (C6.4): ADDRESS, BALANCE, ORIGIN, CALLER,
// CALLVALUE, CALLDATALOAD, CALLDATASIZE, CALLDATACOPY, CODESIZE, CODECOPY,
// GASPRICE, EXTCODESIZE, EXTCODECOPY, RETURNDATASIZE, RETURNDATACOPY,
// EXTCODEHASH.

impl VM {
    pub fn op_address(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::BASE)?;
        current_call_frame.stack.push(address_to_word(current_call_frame.target))?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_balance(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::BALANCE)?;
        let address = word_to_address(current_call_frame.stack.pop()?);
        let balance = self.cache.get_balance(address);
        current_call_frame.stack.push(balance)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_origin(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::BASE)?;
        current_call_frame.stack.push(address_to_word(self.env.origin))?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_caller(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::BASE)?;
        current_call_frame.stack.push(address_to_word(current_call_frame.msg_sender))?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_callvalue(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::BASE)?;
        current_call_frame.stack.push(current_call_frame.msg_value)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_calldataload(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::VERYLOW)?;
        let offset = word_to_usize(current_call_frame.stack.pop()?);

        let mut word = [0u8; 32];
        for (i, slot) in word.iter_mut().enumerate() {
            let index = offset.saturating_add(i);
            if let Some(byte) = current_call_frame.calldata.get(index) {
                *slot = *byte;
            }
        }
        current_call_frame.stack.push(U256::from_big_endian(&word))?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_calldatasize(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::BASE)?;
        current_call_frame.stack.push(U256::from(current_call_frame.calldata.len()))?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_calldatacopy(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        let dest_offset = word_to_usize(current_call_frame.stack.pop()?);
        let data_offset = word_to_usize(current_call_frame.stack.pop()?);
        let size = word_to_usize(current_call_frame.stack.pop()?);

        let expansion = current_call_frame.memory.expansion_cost(dest_offset, size)?;
        let gas = gas_cost::VERYLOW
            .checked_add(gas_cost::copy_cost(size)?)
            .and_then(|g| g.checked_add(expansion))
            .ok_or(InternalError::Overflow)?;
        self.increase_consumed_gas(current_call_frame, gas)?;

        if size == 0 {
            return Ok(OpcodeSuccess::Continue);
        }

        let data = copy_padded(&current_call_frame.calldata, data_offset, size);
        current_call_frame.memory.store_bytes(dest_offset, &data)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_codesize(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::BASE)?;
        current_call_frame.stack.push(U256::from(current_call_frame.bytecode.len()))?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_codecopy(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        let dest_offset = word_to_usize(current_call_frame.stack.pop()?);
        let code_offset = word_to_usize(current_call_frame.stack.pop()?);
        let size = word_to_usize(current_call_frame.stack.pop()?);

        let expansion = current_call_frame.memory.expansion_cost(dest_offset, size)?;
        let gas = gas_cost::VERYLOW
            .checked_add(gas_cost::copy_cost(size)?)
            .and_then(|g| g.checked_add(expansion))
            .ok_or(InternalError::Overflow)?;
        self.increase_consumed_gas(current_call_frame, gas)?;

        if size == 0 {
            return Ok(OpcodeSuccess::Continue);
        }

        let data = copy_padded(&current_call_frame.bytecode, code_offset, size);
        current_call_frame.memory.store_bytes(dest_offset, &data)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_gasprice(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::BASE)?;
        current_call_frame.stack.push(self.env.gas_price)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_extcodesize(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::EXTCODESIZE)?;
        let address = word_to_address(current_call_frame.stack.pop()?);
        let code = self.cache.get_code(address);
        current_call_frame.stack.push(U256::from(code.len()))?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_extcodecopy(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        let address = word_to_address(current_call_frame.stack.pop()?);
        let dest_offset = word_to_usize(current_call_frame.stack.pop()?);
        let code_offset = word_to_usize(current_call_frame.stack.pop()?);
        let size = word_to_usize(current_call_frame.stack.pop()?);

        let expansion = current_call_frame.memory.expansion_cost(dest_offset, size)?;
        let gas = gas_cost::EXTCODECOPY
            .checked_add(gas_cost::copy_cost(size)?)
            .and_then(|g| g.checked_add(expansion))
            .ok_or(InternalError::Overflow)?;
        self.increase_consumed_gas(current_call_frame, gas)?;

        if size == 0 {
            return Ok(OpcodeSuccess::Continue);
        }

        let code = self.cache.get_code(address);
        let data = copy_padded(&code, code_offset, size);
        current_call_frame.memory.store_bytes(dest_offset, &data)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_returndatasize(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::BASE)?;
        current_call_frame.stack.push(U256::from(current_call_frame.last_return_data.len()))?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_returndatacopy(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        let dest_offset = word_to_usize(current_call_frame.stack.pop()?);
        let returndata_offset = word_to_usize(current_call_frame.stack.pop()?);
        let size = word_to_usize(current_call_frame.stack.pop()?);

        let end = returndata_offset
            .checked_add(size)
            .ok_or(VMError::Internal(InternalError::Overflow))?;
        if end > current_call_frame.last_return_data.len() {
            return Err(VMError::ReturnDataOutOfBounds);
        }

        let expansion = current_call_frame.memory.expansion_cost(dest_offset, size)?;
        let gas = gas_cost::VERYLOW
            .checked_add(gas_cost::copy_cost(size)?)
            .and_then(|g| g.checked_add(expansion))
            .ok_or(InternalError::Overflow)?;
        self.increase_consumed_gas(current_call_frame, gas)?;

        if size == 0 {
            return Ok(OpcodeSuccess::Continue);
        }

        let data = current_call_frame
            .last_return_data
            .get(returndata_offset..end)
            .ok_or(VMError::ReturnDataOutOfBounds)?
            .to_vec();
        current_call_frame.memory.store_bytes(dest_offset, &data)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_extcodehash(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::EXTCODEHASH)?;
        let address = word_to_address(current_call_frame.stack.pop()?);
        let account = self.cache.get_account(address);
        let hash = if account.is_empty() {
            U256::zero()
        } else {
            U256::from_big_endian(account.bytecode_hash().as_bytes())
        };
        current_call_frame.stack.push(hash)?;
        Ok(OpcodeSuccess::Continue)
    }
}

/// Reads `size` bytes from `source` starting at `offset`, zero-padding past
/// the end — CALLDATACOPY/CODECOPY/EXTCODECOPY/RETURNDATACOPY all read past
/// their source's length as implicit zeroes rather than erroring.
fn copy_padded(source: &[u8], offset: usize, size: usize) -> Vec<u8> {
    let mut out = vec![0u8; size];
    for (i, slot) in out.iter_mut().enumerate() {
        let index = offset.saturating_add(i);
        if let Some(byte) = source.get(index) {
            *slot = *byte;
        }
    }
    out
}
