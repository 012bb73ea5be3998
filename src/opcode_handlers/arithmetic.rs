use super::*;
use ethereum_types::U512;

// Arithmetic Operations (C6.1): ADD, SUB, MUL, DIV, SDIV, MOD, SMOD, ADDMOD,
// MULMOD, EXP, SIGNEXTEND. All operate mod 2^256; division and modulo by
// zero yield 0 rather than trapping.

impl VM {
    pub fn op_add(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::VERYLOW)?;
        let augend = current_call_frame.stack.pop()?;
        let addend = current_call_frame.stack.pop()?;
        current_call_frame.stack.push(augend.overflowing_add(addend).0)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_sub(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::VERYLOW)?;
        let minuend = current_call_frame.stack.pop()?;
        let subtrahend = current_call_frame.stack.pop()?;
        current_call_frame.stack.push(minuend.overflowing_sub(subtrahend).0)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_mul(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::LOW)?;
        let multiplicand = current_call_frame.stack.pop()?;
        let multiplier = current_call_frame.stack.pop()?;
        current_call_frame.stack.push(multiplicand.overflowing_mul(multiplier).0)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_div(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::LOW)?;
        let dividend = current_call_frame.stack.pop()?;
        let divisor = current_call_frame.stack.pop()?;
        let quotient = dividend.checked_div(divisor).unwrap_or_default();
        current_call_frame.stack.push(quotient)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_sdiv(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::LOW)?;
        let dividend = current_call_frame.stack.pop()?;
        let divisor = current_call_frame.stack.pop()?;

        if divisor.is_zero() {
            current_call_frame.stack.push(U256::zero())?;
            return Ok(OpcodeSuccess::Continue);
        }

        let dividend_negative = is_negative(dividend);
        let divisor_negative = is_negative(divisor);
        let quotient = abs(dividend)
            .checked_div(abs(divisor))
            .unwrap_or_default();
        let result = if dividend_negative != divisor_negative {
            negate(quotient)
        } else {
            quotient
        };

        current_call_frame.stack.push(result)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_mod(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::LOW)?;
        let dividend = current_call_frame.stack.pop()?;
        let divisor = current_call_frame.stack.pop()?;
        current_call_frame
            .stack
            .push(dividend.checked_rem(divisor).unwrap_or_default())?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_smod(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::LOW)?;
        let dividend = current_call_frame.stack.pop()?;
        let divisor = current_call_frame.stack.pop()?;

        if divisor.is_zero() {
            current_call_frame.stack.push(U256::zero())?;
            return Ok(OpcodeSuccess::Continue);
        }

        let remainder = abs(dividend).checked_rem(abs(divisor)).unwrap_or_default();
        let result = if is_negative(dividend) {
            negate(remainder)
        } else {
            remainder
        };

        current_call_frame.stack.push(result)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_addmod(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::MID)?;
        let augend = current_call_frame.stack.pop()?;
        let addend = current_call_frame.stack.pop()?;
        let modulus = current_call_frame.stack.pop()?;

        if modulus.is_zero() {
            current_call_frame.stack.push(U256::zero())?;
            return Ok(OpcodeSuccess::Continue);
        }

        // Full-precision add-then-reduce: reduce each operand into range
        // first so the 256-bit add can't wrap before the modulus is applied.
        let a = augend.checked_rem(modulus).unwrap_or_default();
        let b = addend.checked_rem(modulus).unwrap_or_default();
        let (sum, overflowed) = a.overflowing_add(b);
        let sum_mod = if overflowed {
            // sum wrapped past 2^256; both a, b < modulus <= 2^256, so the
            // true sum exceeds 2^256 by the wrapped remainder plus 2^256 mod
            // modulus worth of correction, computed via checked subtraction
            // from the modulus instead of widening into U512.
            let complement = U256::MAX.checked_rem(modulus).unwrap_or_default();
            let one_mod = U256::one().checked_rem(modulus).unwrap_or_default();
            let wraparound = complement.overflowing_add(one_mod).0.checked_rem(modulus).unwrap_or_default();
            sum.checked_rem(modulus)
                .unwrap_or_default()
                .overflowing_add(wraparound)
                .0
                .checked_rem(modulus)
                .unwrap_or_default()
        } else {
            sum.checked_rem(modulus).unwrap_or_default()
        };

        current_call_frame.stack.push(sum_mod)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_mulmod(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::MID)?;
        let multiplicand = current_call_frame.stack.pop()?;
        let multiplier = current_call_frame.stack.pop()?;
        let modulus = current_call_frame.stack.pop()?;

        if modulus.is_zero() {
            current_call_frame.stack.push(U256::zero())?;
            return Ok(OpcodeSuccess::Continue);
        }

        // Widen into U512 so the full double-width product can be reduced
        // without ever wrapping, matching MULMOD's unbounded-intermediate
        // semantics.
        let wide_product = U512::from(multiplicand) * U512::from(multiplier);
        let wide_modulus = U512::from(modulus);
        let reduced = wide_product % wide_modulus;
        current_call_frame.stack.push(U256::try_from(reduced).unwrap_or_default())?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_exp(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        let base = current_call_frame.stack.pop()?;
        let exponent = current_call_frame.stack.pop()?;

        let byte_len = exponent.bits().div_ceil(8);
        let gas = gas_cost::exp_cost(byte_len)?;
        self.increase_consumed_gas(current_call_frame, gas)?;

        current_call_frame.stack.push(base.overflowing_pow(exponent).0)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_signextend(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::LOW)?;
        let byte_size = current_call_frame.stack.pop()?;
        let value = current_call_frame.stack.pop()?;

        if byte_size >= U256::from(31) {
            current_call_frame.stack.push(value)?;
            return Ok(OpcodeSuccess::Continue);
        }

        let byte_size = byte_size.as_usize();
        let sign_bit_index = byte_size.saturating_mul(8).saturating_add(7);
        let sign_bit_set = value.bit(sign_bit_index);

        let mask = (U256::one() << sign_bit_index).saturating_sub(U256::one());
        let result = if sign_bit_set { value | !mask } else { value & mask };

        current_call_frame.stack.push(result)?;
        Ok(OpcodeSuccess::Continue)
    }
}

/// Shifts the value right by 255 bits and checks whether the top bit is 1.
fn is_negative(value: U256) -> bool {
    value.bit(255)
}

/// Negates a number in two's complement.
fn negate(value: U256) -> U256 {
    (!value).overflowing_add(U256::one()).0
}

fn abs(value: U256) -> U256 {
    if is_negative(value) {
        negate(value)
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::new_vm_with_bytecode;

    fn min_i256() -> U256 {
        U256::one() << 255
    }

    #[test]
    fn add_wraps_on_overflow() {
        assert_eq!(U256::MAX.overflowing_add(U256::one()).0, U256::zero());
    }

    #[test]
    fn sub_wraps_on_underflow() {
        assert_eq!(U256::zero().overflowing_sub(U256::one()).0, U256::MAX);
    }

    #[test]
    fn div_by_zero_is_zero() {
        assert_eq!(U256::one().checked_div(U256::zero()).unwrap_or_default(), U256::zero());
    }

    #[test]
    fn sdiv_of_min_i256_by_minus_one_overflows_to_itself() {
        // -1 in two's complement is U256::MAX; the mathematical quotient
        // (2^255) doesn't fit in a signed 256-bit word, so SDIV wraps back to
        // the original dividend rather than trapping.
        let min = min_i256();
        let minus_one = U256::MAX;
        let quotient = abs(min).checked_div(abs(minus_one)).unwrap_or_default();
        let result = if is_negative(min) != is_negative(minus_one) {
            negate(quotient)
        } else {
            quotient
        };
        assert_eq!(result, min);
    }

    #[test]
    fn exp_with_zero_exponent_is_one() {
        assert_eq!(U256::from(123u64).overflowing_pow(U256::zero()).0, U256::one());
    }

    #[test]
    fn mulmod_reduces_a_product_wider_than_256_bits() {
        let wide_product = U512::from(U256::MAX) * U512::from(U256::MAX);
        let reduced = wide_product % U512::from(U256::from(7u64));
        assert_eq!(U256::try_from(reduced).unwrap(), U256::from(4u64));
    }

    #[test]
    fn bytecode_ending_mid_push_zero_pads_and_runs_to_completion() {
        // PUSH2 with a single trailing immediate byte: the code ends before
        // the second byte, which the push handler zero-pads, and running off
        // the end of the bytecode afterward is an implicit STOP.
        let mut vm = new_vm_with_bytecode(vec![0x61, 0xFF]).unwrap();
        let report = vm.transact().unwrap();
        assert!(report.success);
    }
}
