use super::*;
use keccak_hash::keccak;

// KECCAK256 (C6.3): hashes a memory range, expanding and charging for it
// first.

impl VM {
    pub fn op_keccak256(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        let offset = word_to_usize(current_call_frame.stack.pop()?);
        let size = word_to_usize(current_call_frame.stack.pop()?);

        let expansion = current_call_frame.memory.expansion_cost(offset, size)?;
        let gas = gas_cost::sha3_cost(size)?
            .checked_add(expansion)
            .ok_or(InternalError::Overflow)?;
        self.increase_consumed_gas(current_call_frame, gas)?;

        let bytes = current_call_frame.memory.load_range(offset, size)?;
        let hash = keccak(bytes);
        current_call_frame.stack.push(U256::from_big_endian(hash.as_bytes()))?;
        Ok(OpcodeSuccess::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_of_empty_input_matches_known_keccak_empty() {
        let hash = keccak(Vec::<u8>::new());
        let expected = "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a47";
        assert_eq!(hex::encode(hash.as_bytes()), expected);
    }
}
