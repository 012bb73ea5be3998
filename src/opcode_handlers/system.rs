use super::*;

use crate::vm::{calculate_create2_address, calculate_create_address};

// System Operations (C6.11): CALL, CALLCODE, RETURN, DELEGATECALL, CREATE,
// CREATE2, STATICCALL, REVERT, SELFDESTRUCT.

impl VM {
    pub fn op_call(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        let gas_hint = current_call_frame.stack.pop()?;
        let callee = word_to_address(current_call_frame.stack.pop()?);
        let value = current_call_frame.stack.pop()?;
        let args_offset = word_to_usize(current_call_frame.stack.pop()?);
        let args_size = word_to_usize(current_call_frame.stack.pop()?);
        let ret_offset = word_to_usize(current_call_frame.stack.pop()?);
        let ret_size = word_to_usize(current_call_frame.stack.pop()?);

        if current_call_frame.is_static && !value.is_zero() {
            return Err(VMError::WriteProtection);
        }

        let target_exists = self.cache.account_exists(callee);
        let (gas_forwarded, stipend) = self.call_gas_and_stipend(
            current_call_frame,
            gas_hint,
            !value.is_zero(),
            target_exists,
            args_offset,
            args_size,
            ret_offset,
            ret_size,
        )?;

        self.generic_call(
            current_call_frame,
            gas_forwarded,
            stipend,
            value,
            !value.is_zero(),
            current_call_frame.target,
            callee,
            callee,
            false,
            args_offset,
            args_size,
            ret_offset,
            ret_size,
        )?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_callcode(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        let gas_hint = current_call_frame.stack.pop()?;
        let code_address = word_to_address(current_call_frame.stack.pop()?);
        let value = current_call_frame.stack.pop()?;
        let args_offset = word_to_usize(current_call_frame.stack.pop()?);
        let args_size = word_to_usize(current_call_frame.stack.pop()?);
        let ret_offset = word_to_usize(current_call_frame.stack.pop()?);
        let ret_size = word_to_usize(current_call_frame.stack.pop()?);

        let target_exists = self.cache.account_exists(current_call_frame.target);
        let (gas_forwarded, stipend) = self.call_gas_and_stipend(
            current_call_frame,
            gas_hint,
            !value.is_zero(),
            target_exists,
            args_offset,
            args_size,
            ret_offset,
            ret_size,
        )?;

        self.generic_call(
            current_call_frame,
            gas_forwarded,
            stipend,
            value,
            !value.is_zero(),
            current_call_frame.target,
            current_call_frame.target,
            code_address,
            false,
            args_offset,
            args_size,
            ret_offset,
            ret_size,
        )?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_delegatecall(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        let gas_hint = current_call_frame.stack.pop()?;
        let code_address = word_to_address(current_call_frame.stack.pop()?);
        let args_offset = word_to_usize(current_call_frame.stack.pop()?);
        let args_size = word_to_usize(current_call_frame.stack.pop()?);
        let ret_offset = word_to_usize(current_call_frame.stack.pop()?);
        let ret_size = word_to_usize(current_call_frame.stack.pop()?);

        let target_exists = self.cache.account_exists(current_call_frame.target);
        let (gas_forwarded, _stipend) = self.call_gas_and_stipend(
            current_call_frame,
            gas_hint,
            false,
            target_exists,
            args_offset,
            args_size,
            ret_offset,
            ret_size,
        )?;

        self.generic_call(
            current_call_frame,
            gas_forwarded,
            0,
            current_call_frame.msg_value,
            false,
            current_call_frame.msg_sender,
            current_call_frame.target,
            code_address,
            false,
            args_offset,
            args_size,
            ret_offset,
            ret_size,
        )?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_staticcall(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        let gas_hint = current_call_frame.stack.pop()?;
        let code_address = word_to_address(current_call_frame.stack.pop()?);
        let args_offset = word_to_usize(current_call_frame.stack.pop()?);
        let args_size = word_to_usize(current_call_frame.stack.pop()?);
        let ret_offset = word_to_usize(current_call_frame.stack.pop()?);
        let ret_size = word_to_usize(current_call_frame.stack.pop()?);

        let target_exists = self.cache.account_exists(code_address);
        let (gas_forwarded, _stipend) = self.call_gas_and_stipend(
            current_call_frame,
            gas_hint,
            false,
            target_exists,
            args_offset,
            args_size,
            ret_offset,
            ret_size,
        )?;

        self.generic_call(
            current_call_frame,
            gas_forwarded,
            0,
            U256::zero(),
            false,
            current_call_frame.target,
            code_address,
            code_address,
            true,
            args_offset,
            args_size,
            ret_offset,
            ret_size,
        )?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_create(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        if current_call_frame.is_static {
            return Err(VMError::WriteProtection);
        }

        let value = current_call_frame.stack.pop()?;
        let offset = word_to_usize(current_call_frame.stack.pop()?);
        let size = word_to_usize(current_call_frame.stack.pop()?);

        let expansion = current_call_frame.memory.expansion_cost(offset, size)?;
        let gas = gas_cost::CREATE
            .checked_add(expansion)
            .ok_or(InternalError::Overflow)?;
        self.increase_consumed_gas(current_call_frame, gas)?;

        let init_code = current_call_frame.memory.load_range(offset, size)?;
        let creator_nonce = self.cache.get_nonce(current_call_frame.target);
        let target = calculate_create_address(current_call_frame.target, creator_nonce)?;

        self.create(current_call_frame, value, init_code, target)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_create2(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        if current_call_frame.is_static {
            return Err(VMError::WriteProtection);
        }

        let value = current_call_frame.stack.pop()?;
        let offset = word_to_usize(current_call_frame.stack.pop()?);
        let size = word_to_usize(current_call_frame.stack.pop()?);
        let salt = current_call_frame.stack.pop()?;

        let expansion = current_call_frame.memory.expansion_cost(offset, size)?;
        let hashing = gas_cost::copy_cost(size)?;
        let gas = gas_cost::CREATE
            .checked_add(expansion)
            .and_then(|g| g.checked_add(hashing))
            .ok_or(InternalError::Overflow)?;
        self.increase_consumed_gas(current_call_frame, gas)?;

        let init_code = current_call_frame.memory.load_range(offset, size)?;
        let target = calculate_create2_address(current_call_frame.target, &init_code, salt);

        self.create(current_call_frame, value, init_code, target)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_return(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        let offset = word_to_usize(current_call_frame.stack.pop()?);
        let size = word_to_usize(current_call_frame.stack.pop()?);

        let expansion = current_call_frame.memory.expansion_cost(offset, size)?;
        self.increase_consumed_gas(current_call_frame, expansion)?;

        current_call_frame.output = current_call_frame.memory.load_range(offset, size)?;
        Ok(OpcodeSuccess::Result(ResultReason::Return))
    }

    pub fn op_revert(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        let offset = word_to_usize(current_call_frame.stack.pop()?);
        let size = word_to_usize(current_call_frame.stack.pop()?);

        let expansion = current_call_frame.memory.expansion_cost(offset, size)?;
        self.increase_consumed_gas(current_call_frame, expansion)?;

        current_call_frame.output = current_call_frame.memory.load_range(offset, size)?;
        Err(VMError::RevertOpcode)
    }

    pub fn op_selfdestruct(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        if current_call_frame.is_static {
            return Err(VMError::WriteProtection);
        }
        self.increase_consumed_gas(current_call_frame, gas_cost::SELFDESTRUCT)?;

        let recipient = word_to_address(current_call_frame.stack.pop()?);
        let balance = self.cache.get_balance(current_call_frame.target);

        if recipient != current_call_frame.target {
            self.cache.increase_balance(recipient, balance)?;
        }
        self.cache.clear_account(current_call_frame.target);

        Ok(OpcodeSuccess::Result(ResultReason::SelfDestruct))
    }

    /// Computes the gas a CALL-family opcode forwards to its sub-frame: the
    /// static call-cost and the memory expansion over `max(args, ret)` are
    /// charged to the caller first, then the "all-but-one-64th" rule caps the
    /// gas hint taken off the stack. A non-zero value transfer additionally
    /// grants `CALL_STIPEND` on top, free of charge to the caller.
    #[allow(clippy::too_many_arguments)]
    fn call_gas_and_stipend(
        &mut self,
        current_call_frame: &mut CallFrame,
        gas_hint: U256,
        value_is_nonzero: bool,
        target_exists: bool,
        args_offset: usize,
        args_size: usize,
        ret_offset: usize,
        ret_size: usize,
    ) -> Result<(u64, u64), VMError> {
        let args_end = args_offset.saturating_add(args_size);
        let ret_end = ret_offset.saturating_add(ret_size);
        let expansion = current_call_frame.memory.expansion_cost(0, args_end.max(ret_end))?;

        let static_cost = gas_cost::call_cost(value_is_nonzero, target_exists)?
            .checked_add(expansion)
            .ok_or(InternalError::Overflow)?;
        self.increase_consumed_gas(current_call_frame, static_cost)?;

        let capped = gas_cost::max_gas_forwarded(current_call_frame.gas_remaining());
        let requested = if gas_hint > U256::from(capped) {
            capped
        } else {
            gas_hint.as_u64()
        };

        let stipend = if value_is_nonzero { gas_cost::CALL_STIPEND } else { 0 };
        Ok((requested, stipend))
    }
}
