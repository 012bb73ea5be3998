use super::*;

// Comparison & Bitwise Operations (C6.2): LT, GT, SLT, SGT, EQ, ISZERO, AND,
// OR, XOR, NOT, BYTE, SHL, SHR, SAR.

impl VM {
    pub fn op_lt(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::VERYLOW)?;
        let lhs = current_call_frame.stack.pop()?;
        let rhs = current_call_frame.stack.pop()?;
        current_call_frame.stack.push(bool_to_word(lhs < rhs))?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_gt(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::VERYLOW)?;
        let lhs = current_call_frame.stack.pop()?;
        let rhs = current_call_frame.stack.pop()?;
        current_call_frame.stack.push(bool_to_word(lhs > rhs))?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_slt(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::VERYLOW)?;
        let lhs = current_call_frame.stack.pop()?;
        let rhs = current_call_frame.stack.pop()?;
        current_call_frame.stack.push(bool_to_word(signed_lt(lhs, rhs)))?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_sgt(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::VERYLOW)?;
        let lhs = current_call_frame.stack.pop()?;
        let rhs = current_call_frame.stack.pop()?;
        current_call_frame.stack.push(bool_to_word(signed_lt(rhs, lhs)))?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_eq(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::VERYLOW)?;
        let lhs = current_call_frame.stack.pop()?;
        let rhs = current_call_frame.stack.pop()?;
        current_call_frame.stack.push(bool_to_word(lhs == rhs))?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_iszero(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::VERYLOW)?;
        let value = current_call_frame.stack.pop()?;
        current_call_frame.stack.push(bool_to_word(value.is_zero()))?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_and(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::VERYLOW)?;
        let lhs = current_call_frame.stack.pop()?;
        let rhs = current_call_frame.stack.pop()?;
        current_call_frame.stack.push(lhs & rhs)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_or(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::VERYLOW)?;
        let lhs = current_call_frame.stack.pop()?;
        let rhs = current_call_frame.stack.pop()?;
        current_call_frame.stack.push(lhs | rhs)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_xor(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::VERYLOW)?;
        let lhs = current_call_frame.stack.pop()?;
        let rhs = current_call_frame.stack.pop()?;
        current_call_frame.stack.push(lhs ^ rhs)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_not(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::VERYLOW)?;
        let value = current_call_frame.stack.pop()?;
        current_call_frame.stack.push(!value)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_byte(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::VERYLOW)?;
        let index = current_call_frame.stack.pop()?;
        let value = current_call_frame.stack.pop()?;

        let result = if index >= U256::from(32) {
            U256::zero()
        } else {
            U256::from(value.byte(31usize.saturating_sub(index.as_usize())))
        };

        current_call_frame.stack.push(result)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_shl(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::VERYLOW)?;
        let shift = current_call_frame.stack.pop()?;
        let value = current_call_frame.stack.pop()?;
        current_call_frame.stack.push(checked_shift_left(value, shift))?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_shr(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::VERYLOW)?;
        let shift = current_call_frame.stack.pop()?;
        let value = current_call_frame.stack.pop()?;
        current_call_frame.stack.push(checked_shift_right(value, shift))?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_sar(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::VERYLOW)?;
        let shift = current_call_frame.stack.pop()?;
        let value = current_call_frame.stack.pop()?;
        current_call_frame.stack.push(arithmetic_shift_right(value, shift))?;
        Ok(OpcodeSuccess::Continue)
    }
}

fn bool_to_word(value: bool) -> U256 {
    if value {
        U256::one()
    } else {
        U256::zero()
    }
}

fn signed_lt(lhs: U256, rhs: U256) -> bool {
    let lhs_negative = lhs.bit(255);
    let rhs_negative = rhs.bit(255);
    match (lhs_negative, rhs_negative) {
        (true, false) => true,
        (false, true) => false,
        _ => lhs < rhs,
    }
}

/// Shifts of 256 or more always produce zero — the plain `<<`/`>>` operators
/// on `U256` panic for a shift that large, so every shift opcode routes
/// through here instead.
pub(crate) fn checked_shift_left(value: U256, shift: U256) -> U256 {
    if shift >= U256::from(256) {
        U256::zero()
    } else {
        value << shift.as_usize()
    }
}

pub(crate) fn checked_shift_right(value: U256, shift: U256) -> U256 {
    if shift >= U256::from(256) {
        U256::zero()
    } else {
        value >> shift.as_usize()
    }
}

pub(crate) fn arithmetic_shift_right(value: U256, shift: U256) -> U256 {
    let negative = value.bit(255);
    if shift >= U256::from(256) {
        return if negative { U256::MAX } else { U256::zero() };
    }
    let shift = shift.as_usize();
    let shifted = value >> shift;
    if !negative || shift == 0 {
        return shifted;
    }
    let fill = U256::MAX << (256usize.saturating_sub(shift));
    shifted | fill
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_extracts_most_significant_first() {
        let value = U256::from(0x1122_3344u64);
        assert_eq!(U256::from(value.byte(31)), U256::from(0x11));
    }

    #[test]
    fn sar_of_negative_one_stays_negative_one() {
        let minus_one = U256::MAX;
        assert_eq!(arithmetic_shift_right(minus_one, U256::from(4)), U256::MAX);
    }

    #[test]
    fn shl_past_256_is_zero() {
        assert_eq!(checked_shift_left(U256::one(), U256::from(300)), U256::zero());
    }

    #[test]
    fn signed_lt_treats_negative_as_smaller() {
        assert!(signed_lt(U256::MAX, U256::one()));
        assert!(!signed_lt(U256::one(), U256::MAX));
    }
}
